use serde::{Deserialize, Serialize};

use crate::{Pa, Va};

/// A process handle.
///
/// Identity is the address of the kernel process object; the translation
/// root is captured alongside it so reads in the process's context never
/// re-derive it. The handle is never mutated; it goes stale if the guest
/// destroys the underlying object, which shows up as read failures.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Process {
    /// The address of the kernel process object.
    pub object: Va,

    /// The page-table root of the process.
    pub dtb: Pa,
}

/// A thread handle, always interpreted relative to an owning process.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Thread {
    /// The address of the kernel thread object.
    pub object: Va,
}

/// A user-space module handle.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Module {
    /// The address of the object describing the mapping.
    pub object: Va,

    /// Attributes of the mapping.
    pub flags: ModuleFlags,
}

/// A kernel driver handle. Same shape as [`Module`] but scoped to the
/// kernel address space only.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DriverModule {
    /// The address of the kernel module object.
    pub object: Va,
}

bitflags::bitflags! {
    /// OS-agnostic process attributes.
    #[derive(
        Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    pub struct ProcessFlags: u32 {
        /// The process is a kernel thread.
        const KERNEL_THREAD = 1 << 0;

        /// The process is exiting.
        const EXITING = 1 << 1;
    }
}

bitflags::bitflags! {
    /// OS-agnostic module attributes.
    #[derive(
        Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    )]
    pub struct ModuleFlags: u32 {
        /// The mapping is executable.
        const EXECUTABLE = 1 << 0;

        /// The module lives in the kernel address space.
        const KERNEL = 1 << 1;
    }
}

/// The walk-control signal returned by enumeration callbacks.
///
/// `Stop` short-circuits the traversal at the current node boundary; it is
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalkStep {
    /// Continue with the next node.
    Continue,

    /// Stop the traversal.
    Stop,
}

/// An opaque token identifying one registered lifecycle listener.
///
/// Unique for the lifetime of the attached OS module; never reused while
/// still live.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BpId(pub u64);

/// How long [`proc_join`] waits for the target process.
///
/// [`proc_join`]: super::OsModule::proc_join
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinMode {
    /// Return as soon as the target process is current, in any mode.
    AnyMode,

    /// Return once the target process is current and executing user code.
    UserMode,
}

/// A callback invoked on process lifecycle events.
pub type ProcessEventCallback = Box<dyn FnMut(Process)>;

/// A callback invoked on thread lifecycle events.
pub type ThreadEventCallback = Box<dyn FnMut(Process, Thread)>;

/// A callback invoked when a process maps a new executable image.
pub type ModuleEventCallback = Box<dyn FnMut(Process, Module)>;

/// A callback invoked when a kernel driver is loaded.
pub type DriverEventCallback = Box<dyn FnMut(DriverModule)>;

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_serde<T: serde::Serialize + serde::de::DeserializeOwned>() {}

    #[test]
    fn handles_and_their_flags_are_serializable() {
        assert_serde::<Process>();
        assert_serde::<Thread>();
        assert_serde::<Module>();
        assert_serde::<DriverModule>();
        assert_serde::<ProcessFlags>();
        assert_serde::<ModuleFlags>();
    }
}
