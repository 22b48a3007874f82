//! Guest operating system abstractions.

mod common;
mod events;

pub use self::{
    common::{
        BpId, DriverEventCallback, DriverModule, JoinMode, Module, ModuleEventCallback,
        ModuleFlags, Process, ProcessEventCallback, ProcessFlags, Thread, ThreadEventCallback,
        WalkStep,
    },
    events::{BreakpointRegistry, ListenerCallback},
};

use crate::{Driver, Error, Pa, Reader, Span, SymbolStore, Va};

/// A callback driving one enumeration step.
pub type WalkCallback<'a, T> = &'a mut dyn FnMut(T) -> Result<WalkStep, Error>;

/// The capability set of one guest OS family.
///
/// One implementation exists per supported guest OS; a [`Session`] owns at
/// most one at a time and forwards every introspection request to it. All
/// lookups that may legitimately find nothing return `Option`; errors are
/// reserved for failed guest reads and structural corruption.
///
/// [`Session`]: crate::Session
pub trait OsModule<D>
where
    D: Driver,
{
    /// Checks whether the address lies in the guest kernel's half of the
    /// address space.
    fn is_kernel_address(&self, va: Va) -> bool;

    /// Checks whether a page fault may be injected for the address in the
    /// current execution context.
    fn can_inject_fault(&self, va: Va) -> bool;

    /// Populates the reader's address-space context: the user root from the
    /// given process, the kernel root always.
    ///
    /// Must be called before any read through the reader is valid.
    fn reader_setup(&self, reader: &mut Reader<'_, D>, process: Option<Process>) -> bool;

    /// Returns the kernel symbol store.
    fn kernel_symbols(&self) -> &dyn SymbolStore;

    /// Enumerates all processes in kernel list order.
    fn proc_list(&self, on_process: WalkCallback<'_, Process>) -> Result<(), Error>;

    /// Returns the currently executing process.
    fn proc_current(&self) -> Result<Process, Error>;

    /// Finds the first process with the given name, in traversal order.
    fn proc_find_name(&self, name: &str) -> Result<Option<Process>, Error>;

    /// Finds the first process with the given id, in traversal order.
    fn proc_find_pid(&self, pid: u64) -> Result<Option<Process>, Error>;

    /// Returns the process name.
    fn proc_name(&self, process: Process) -> Result<String, Error>;

    /// Checks whether the process object is still readable.
    fn proc_is_valid(&self, process: Process) -> bool;

    /// Returns the process id, or `None` if the field cannot be read.
    fn proc_id(&self, process: Process) -> Option<u64>;

    /// Returns the process attributes.
    fn proc_flags(&self, process: Process) -> Result<ProcessFlags, Error>;

    /// Blocks until the given process is current, per the join mode.
    fn proc_join(&self, process: Process, mode: JoinMode) -> Result<(), Error>;

    /// Translates a virtual address in the process's context.
    fn proc_resolve(&self, process: Process, va: Va) -> Result<Pa, Error>;

    /// Returns the process that owns the given pointer, defaulting to the
    /// current process when no disambiguation is needed.
    fn proc_select(&self, va: Va) -> Result<Process, Error>;

    /// Enumerates the threads of a process.
    fn thread_list(
        &self,
        process: Process,
        on_thread: WalkCallback<'_, Thread>,
    ) -> Result<(), Error>;

    /// Returns the currently executing thread.
    fn thread_current(&self) -> Result<Thread, Error>;

    /// Returns the process owning the given thread.
    fn thread_proc(&self, thread: Thread) -> Result<Process, Error>;

    /// Returns the thread's program counter, or `None` when no execution
    /// context is known for it.
    fn thread_pc(&self, thread: Thread) -> Result<Option<Va>, Error>;

    /// Returns the thread id, or `None` if the field cannot be read.
    fn thread_id(&self, thread: Thread) -> Option<u64>;

    /// Enumerates the executable mappings of a process.
    fn mod_list(&self, process: Process, on_module: WalkCallback<'_, Module>) -> Result<(), Error>;

    /// Returns the module name, if it is backed by a named file.
    fn mod_name(&self, process: Process, module: Module) -> Result<Option<String>, Error>;

    /// Returns the module's address range.
    fn mod_span(&self, process: Process, module: Module) -> Result<Option<Span>, Error>;

    /// Finds the module of a process containing the given address.
    fn mod_find(&self, process: Process, va: Va) -> Result<Option<Module>, Error>;

    /// Enumerates loaded kernel drivers.
    fn driver_list(&self, on_driver: WalkCallback<'_, DriverModule>) -> Result<(), Error>;

    /// Returns the driver name.
    fn driver_name(&self, driver: DriverModule) -> Result<String, Error>;

    /// Returns the driver's address range.
    fn driver_span(&self, driver: DriverModule) -> Result<Option<Span>, Error>;

    /// Finds the driver containing the given address.
    fn driver_find(&self, va: Va) -> Result<Option<DriverModule>, Error>;

    /// Registers a listener for process creation.
    fn proc_listen_create(&self, callback: ProcessEventCallback) -> Option<BpId>;

    /// Registers a listener for process deletion.
    fn proc_listen_delete(&self, callback: ProcessEventCallback) -> Option<BpId>;

    /// Registers a listener for thread creation.
    fn thread_listen_create(&self, callback: ThreadEventCallback) -> Option<BpId>;

    /// Registers a listener for thread deletion.
    fn thread_listen_delete(&self, callback: ThreadEventCallback) -> Option<BpId>;

    /// Registers a listener for executable images being mapped.
    fn mod_listen_load(&self, callback: ModuleEventCallback) -> Option<BpId>;

    /// Registers a listener for kernel driver loads.
    fn drv_listen_load(&self, callback: DriverEventCallback) -> Option<BpId>;

    /// Removes a listener. Returns the number of listeners removed;
    /// idempotent for unknown or already-removed ids.
    fn unlisten(&self, id: BpId) -> usize;

    /// Dispatches a guest breakpoint hit at the given instruction pointer
    /// to every matching listener, in registration order. Returns the
    /// number of callbacks invoked.
    fn handle_breakpoint(&self, ip: Va) -> usize;

    /// Reads the stack slot at the given index in the current frame.
    fn read_stack(&self, index: u64) -> Result<u64, Error>;

    /// Reads the function argument at the given index in the current frame.
    fn read_arg(&self, index: u64) -> Result<u64, Error>;

    /// Overwrites the function argument at the given index in the current
    /// frame.
    fn write_arg(&self, index: u64, value: u64) -> Result<(), Error>;

    /// Dumps internal state for diagnostics. Does not mutate state.
    fn debug_print(&self);
}
