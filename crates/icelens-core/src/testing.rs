//! In-memory driver used by unit tests.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
};

use crate::{
    AddressSpace, Architecture, Core, Driver, Error, Gfn, Pa, PageFault, Registers, Va,
};

/// A flat architecture where virtual addresses map 1:1 to physical ones.
pub struct MockArch;

impl Architecture for MockArch {
    const PAGE_SIZE: u64 = 0x1000;
    const PAGE_SHIFT: u64 = 12;
    const PAGE_MASK: u64 = 0xfff;
    const BREAKPOINT: &'static [u8] = &[0xcc];

    type Registers = MockRegisters;

    fn va_is_kernel(va: Va) -> bool {
        va.0 >> 63 != 0
    }

    fn translate_address<D>(_core: &Core<D>, va: Va, _root: Pa) -> Result<Pa, Error>
    where
        D: Driver<Architecture = Self>,
    {
        Ok(Pa(va.0))
    }
}

#[derive(Debug, Default, Clone)]
pub struct MockRegisters {
    pub ip: u64,
    pub sp: u64,
    pub result: u64,
    pub root: u64,
}

impl Registers for MockRegisters {
    fn instruction_pointer(&self) -> Va {
        Va(self.ip)
    }

    fn set_instruction_pointer(&mut self, ip: Va) {
        self.ip = ip.0;
    }

    fn stack_pointer(&self) -> Va {
        Va(self.sp)
    }

    fn result(&self) -> u64 {
        self.result
    }

    fn set_result(&mut self, value: u64) {
        self.result = value;
    }

    fn translation_root(&self) -> Pa {
        Pa(self.root)
    }
}

/// A driver over a sparse `HashMap` of guest pages.
pub struct MockDriver {
    memory: RefCell<HashMap<Gfn, Vec<u8>>>,
    registers: RefCell<MockRegisters>,
    breakpoints: RefCell<HashMap<u64, Va>>,
    next_breakpoint: Cell<u64>,
    fail_install: Cell<bool>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            memory: RefCell::new(HashMap::new()),
            registers: RefCell::new(MockRegisters::default()),
            breakpoints: RefCell::new(HashMap::new()),
            next_breakpoint: Cell::new(0),
            fail_install: Cell::new(false),
        }
    }

    /// Writes bytes into the backing memory, creating pages as needed.
    pub fn seed(&self, pa: Pa, data: &[u8]) {
        let mut memory = self.memory.borrow_mut();
        let mut position = 0;

        while position < data.len() {
            let pa = pa + position as u64;
            let gfn = MockArch::gfn_from_pa(pa);
            let offset = MockArch::pa_offset(pa) as usize;
            let length = usize::min(
                data.len() - position,
                MockArch::PAGE_SIZE as usize - offset,
            );

            let page = memory
                .entry(gfn)
                .or_insert_with(|| vec![0; MockArch::PAGE_SIZE as usize]);
            page[offset..offset + length].copy_from_slice(&data[position..position + length]);

            position += length;
        }
    }

    pub fn set_mock_registers(&self, registers: MockRegisters) {
        *self.registers.borrow_mut() = registers;
    }

    pub fn breakpoint_count(&self) -> usize {
        self.breakpoints.borrow().len()
    }

    /// Makes the next breakpoint installation fail.
    pub fn fail_next_install(&self) {
        self.fail_install.set(true);
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl Driver for MockDriver {
    type Architecture = MockArch;
    type Breakpoint = u64;

    fn read_page(&self, gfn: Gfn) -> Result<Vec<u8>, Error> {
        self.memory
            .borrow()
            .get(&gfn)
            .cloned()
            .ok_or_else(|| {
                Error::page_fault(PageFault {
                    address: Va(MockArch::pa_from_gfn(gfn).0),
                    root: Pa(0),
                })
            })
    }

    fn write_page(&self, gfn: Gfn, offset: u64, data: &[u8]) -> Result<(), Error> {
        let mut memory = self.memory.borrow_mut();
        let page = memory
            .entry(gfn)
            .or_insert_with(|| vec![0; MockArch::PAGE_SIZE as usize]);

        let offset = offset as usize;
        page[offset..offset + data.len()].copy_from_slice(data);

        Ok(())
    }

    fn registers(&self) -> Result<MockRegisters, Error> {
        Ok(self.registers.borrow().clone())
    }

    fn set_registers(&self, registers: &MockRegisters) -> Result<(), Error> {
        *self.registers.borrow_mut() = registers.clone();
        Ok(())
    }

    fn install_breakpoint(&self, va: Va, _space: AddressSpace) -> Result<u64, Error> {
        if self.fail_install.replace(false) {
            return Err(Error::Other("breakpoint budget exhausted"));
        }

        let handle = self.next_breakpoint.get();
        self.next_breakpoint.set(handle + 1);
        self.breakpoints.borrow_mut().insert(handle, va);

        Ok(handle)
    }

    fn remove_breakpoint(&self, breakpoint: u64) -> Result<(), Error> {
        self.breakpoints.borrow_mut().remove(&breakpoint);
        Ok(())
    }

    fn single_step(&self) -> Result<(), Error> {
        Ok(())
    }
}
