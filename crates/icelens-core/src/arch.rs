use crate::{Core, Driver, Error, Gfn, Pa, Va};

/// Guest CPU architecture.
///
/// The architecture owns everything the core cannot know generically: the
/// page geometry, the software-breakpoint encoding, the register file layout
/// and the page-table walk.
pub trait Architecture {
    /// The page size.
    const PAGE_SIZE: u64;

    /// The page shift.
    const PAGE_SHIFT: u64;

    /// The page mask.
    const PAGE_MASK: u64;

    /// The byte sequence a software breakpoint is encoded as.
    const BREAKPOINT: &'static [u8];

    /// The register file of a virtual CPU.
    type Registers: Registers;

    /// Converts a physical address to a guest frame number.
    fn gfn_from_pa(pa: Pa) -> Gfn {
        Gfn(pa.0 >> Self::PAGE_SHIFT)
    }

    /// Converts a guest frame number to a physical address.
    fn pa_from_gfn(gfn: Gfn) -> Pa {
        Pa(gfn.0 << Self::PAGE_SHIFT)
    }

    /// Returns the offset of a physical address within its page.
    fn pa_offset(pa: Pa) -> u64 {
        pa.0 & Self::PAGE_MASK
    }

    /// Returns the offset of a virtual address within its page.
    fn va_offset(va: Va) -> u64 {
        va.0 & Self::PAGE_MASK
    }

    /// Checks whether a virtual address lies in the kernel half of the
    /// address space.
    fn va_is_kernel(va: Va) -> bool;

    /// Translates a guest virtual address to a physical address by walking
    /// the paging structures rooted at `root`.
    fn translate_address<D>(core: &Core<D>, va: Va, root: Pa) -> Result<Pa, Error>
    where
        D: Driver<Architecture = Self>,
        Self: Sized;
}

/// The register file of a virtual CPU.
///
/// Only the registers the introspection layer itself needs are abstracted
/// here; architecture-specific consumers downcast to the concrete type.
pub trait Registers: Clone + std::fmt::Debug {
    /// Returns the instruction pointer.
    fn instruction_pointer(&self) -> Va;

    /// Sets the instruction pointer.
    fn set_instruction_pointer(&mut self, ip: Va);

    /// Returns the stack pointer.
    fn stack_pointer(&self) -> Va;

    /// Returns the function return value register.
    fn result(&self) -> u64;

    /// Sets the function return value register.
    fn set_result(&mut self, value: u64);

    /// Returns the active page-table root.
    fn translation_root(&self) -> Pa;
}
