use icelens_arch_amd64::Amd64;
use icelens_core::{AccessContext, Core, Driver, Error, Registers as _, Va};

use super::ArchAdapter;

impl ArchAdapter for Amd64 {
    fn per_cpu_base(registers: &Self::Registers) -> Va {
        // In user mode GS holds the user base; the kernel base is parked
        // in the shadow GS MSR until the next SWAPGS.
        if registers.cpl == 3 {
            Va(registers.shadow_gs)
        } else {
            Va(registers.gs_base)
        }
    }

    fn in_user_mode(registers: &Self::Registers) -> bool {
        registers.cpl == 3
    }

    fn function_argument<D>(
        core: &Core<D>,
        registers: &Self::Registers,
        index: u64,
    ) -> Result<u64, Error>
    where
        D: Driver<Architecture = Self>,
    {
        match index {
            0 => Ok(registers.rdi),
            1 => Ok(registers.rsi),
            2 => Ok(registers.rdx),
            3 => Ok(registers.rcx),
            4 => Ok(registers.r8),
            5 => Ok(registers.r9),
            // At a function entry breakpoint the return address occupies
            // slot 0, so the first stack argument is one slot up.
            _ => Self::stack_value(core, registers, index - 6 + 1),
        }
    }

    fn set_function_argument<D>(core: &Core<D>, index: u64, value: u64) -> Result<(), Error>
    where
        D: Driver<Architecture = Self>,
    {
        let mut registers = core.registers()?;

        let slot = match index {
            0 => &mut registers.rdi,
            1 => &mut registers.rsi,
            2 => &mut registers.rdx,
            3 => &mut registers.rcx,
            4 => &mut registers.r8,
            5 => &mut registers.r9,
            _ => {
                let address = Va(registers.rsp) + (index - 6 + 1) * 8;
                let ctx = AccessContext::paging(address, registers.translation_root());
                return core.write_u64(ctx, value);
            }
        };

        *slot = value;
        core.set_registers(&registers)
    }

    fn stack_value<D>(
        core: &Core<D>,
        registers: &Self::Registers,
        index: u64,
    ) -> Result<u64, Error>
    where
        D: Driver<Architecture = Self>,
    {
        let address = Va(registers.rsp) + index * 8;
        core.read_u64(AccessContext::paging(address, registers.translation_root()))
    }
}
