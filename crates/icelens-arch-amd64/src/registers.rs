use icelens_core::{Pa, Va};
use serde::{Deserialize, Serialize};

/// The AMD64 register file of a virtual CPU.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Registers {
    pub rax: u64,
    pub rbx: u64,
    pub rcx: u64,
    pub rdx: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub rsp: u64,
    pub rbp: u64,
    pub r8: u64,
    pub r9: u64,
    pub r10: u64,
    pub r11: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,
    pub rip: u64,
    pub rflags: u64,
    pub cr3: u64,
    pub gs_base: u64,
    pub shadow_gs: u64,

    /// Whether the code segment is in 64-bit long mode.
    pub cs_long: bool,

    /// The current privilege level (0 = kernel, 3 = user).
    pub cpl: u8,
}

impl icelens_core::Registers for Registers {
    fn instruction_pointer(&self) -> Va {
        Va(self.rip)
    }

    fn set_instruction_pointer(&mut self, ip: Va) {
        self.rip = ip.0;
    }

    fn stack_pointer(&self) -> Va {
        Va(self.rsp)
    }

    fn result(&self) -> u64 {
        self.rax
    }

    fn set_result(&mut self, value: u64) {
        self.rax = value;
    }

    fn translation_root(&self) -> Pa {
        // CR3 carries PCID bits in the low 12; only the frame matters.
        Pa(self.cr3 & 0x000f_ffff_ffff_f000)
    }
}
