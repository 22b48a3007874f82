use crate::{AddressSpace, Architecture, Error, Gfn, Va};

/// A hypervisor driver.
///
/// The driver is the only component that talks to the virtualization
/// backend. Everything above it (core, reader, OS modules) is backend
/// agnostic and reaches guest state exclusively through this trait.
pub trait Driver {
    /// The CPU architecture the backend exposes.
    type Architecture: Architecture;

    /// An opaque handle to an installed physical breakpoint.
    type Breakpoint: Copy + Eq + std::hash::Hash + std::fmt::Debug;

    /// Reads one page of guest physical memory.
    fn read_page(&self, gfn: Gfn) -> Result<Vec<u8>, Error>;

    /// Writes into one page of guest physical memory.
    ///
    /// `offset + data.len()` must not cross the page boundary.
    fn write_page(&self, gfn: Gfn, offset: u64, data: &[u8]) -> Result<(), Error>;

    /// Returns the register file of the virtual CPU.
    fn registers(&self) -> Result<<Self::Architecture as Architecture>::Registers, Error>;

    /// Replaces the register file of the virtual CPU.
    fn set_registers(&self, registers: &<Self::Architecture as Architecture>::Registers)
        -> Result<(), Error>;

    /// Installs a software breakpoint at a guest virtual address, valid in
    /// the given address space.
    fn install_breakpoint(&self, va: Va, space: AddressSpace)
        -> Result<Self::Breakpoint, Error>;

    /// Removes a previously installed breakpoint.
    fn remove_breakpoint(&self, breakpoint: Self::Breakpoint) -> Result<(), Error>;

    /// Executes a single guest instruction and returns.
    fn single_step(&self) -> Result<(), Error>;
}
