//! AMD64 architecture support: the register file model and the 4-level
//! page-table walk used for guest virtual-address translation.

mod paging;
mod registers;

use icelens_core::{AccessContext, Architecture, Core, Driver, Error, Pa, Va};

pub use self::{
    paging::{PageTableEntry, PageTableLevel},
    registers::Registers,
};

/// Physical-address frame mask (bits 12..52).
const FRAME_MASK: u64 = 0x000f_ffff_ffff_f000;

/// The AMD64 architecture.
pub struct Amd64;

impl Amd64 {
    /// Checks whether a virtual address is canonical (bits 47..64 are a
    /// sign extension of bit 47).
    pub fn va_is_canonical(va: Va) -> bool {
        matches!(va.0 >> 47, 0 | 0x1_ffff)
    }
}

impl Architecture for Amd64 {
    const PAGE_SIZE: u64 = 0x1000;
    const PAGE_SHIFT: u64 = 12;
    const PAGE_MASK: u64 = 0xfff;

    // INT3
    const BREAKPOINT: &'static [u8] = &[0xcc];

    type Registers = Registers;

    fn va_is_kernel(va: Va) -> bool {
        va.0 >> 63 != 0
    }

    fn translate_address<D>(core: &Core<D>, va: Va, root: Pa) -> Result<Pa, Error>
    where
        D: Driver<Architecture = Self>,
    {
        if !Self::va_is_canonical(va) {
            return Err(Error::page_fault((va, root)));
        }

        let mut table = Pa(root.0 & FRAME_MASK);

        for level in PageTableLevel::WALK {
            let slot = table + level.index(va.0) * 8;
            let entry = core.read_struct::<PageTableEntry>(AccessContext::direct(slot))?;

            if !entry.present() {
                return Err(Error::page_fault((va, root)));
            }

            if level == PageTableLevel::Pt
                || (level.supports_large_pages() && entry.large())
            {
                let mask = level.page_mask();
                return Ok(Pa(((entry.pfn() << 12) & !mask) | (va.0 & mask)));
            }

            table = Pa(entry.pfn() << 12);
        }

        Err(Error::page_fault((va, root)))
    }
}
