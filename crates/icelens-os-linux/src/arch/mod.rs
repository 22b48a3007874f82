//! Architecture-specific pieces the Linux module needs beyond the generic
//! [`Architecture`] contract.

mod amd64;

use icelens_core::{Architecture, Core, Driver, Error, Va};

/// Calling-convention and per-CPU access for one architecture.
pub trait ArchAdapter: Architecture {
    /// Returns the base of the per-CPU area for the current CPU.
    fn per_cpu_base(registers: &Self::Registers) -> Va;

    /// Checks whether the CPU is executing user code.
    fn in_user_mode(registers: &Self::Registers) -> bool;

    /// Reads the function argument at `index` in the current frame,
    /// following the kernel's calling convention.
    fn function_argument<D>(
        core: &Core<D>,
        registers: &Self::Registers,
        index: u64,
    ) -> Result<u64, Error>
    where
        D: Driver<Architecture = Self>,
        Self: Sized;

    /// Overwrites the function argument at `index` in the current frame.
    fn set_function_argument<D>(core: &Core<D>, index: u64, value: u64) -> Result<(), Error>
    where
        D: Driver<Architecture = Self>,
        Self: Sized;

    /// Reads the stack slot at `index` (in pointer widths) above the stack
    /// pointer.
    fn stack_value<D>(
        core: &Core<D>,
        registers: &Self::Registers,
        index: u64,
    ) -> Result<u64, Error>
    where
        D: Driver<Architecture = Self>,
        Self: Sized;
}
