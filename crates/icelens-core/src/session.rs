use std::rc::Rc;

use crate::{
    os::{
        BpId, DriverEventCallback, DriverModule, Module, ModuleEventCallback, Process,
        ProcessEventCallback, ProcessFlags, Thread, ThreadEventCallback, WalkCallback,
    },
    Core, Driver, Error, OsModule, Pa, Reader, Span, SymbolStore, Va,
};

/// The introspection session: a memory core plus at most one attached OS
/// module.
///
/// Every request is forwarded to the attached module. The unattached state
/// is valid and inert, never an error: boolean queries return `false`,
/// reader setup reports `true` (nothing special needed), lookups and
/// listener registrations return `None`, `unlisten` removes nothing and
/// `debug_print` does nothing.
pub struct Session<D>
where
    D: Driver,
{
    core: Rc<Core<D>>,
    os: Option<Box<dyn OsModule<D>>>,
}

impl<D> Session<D>
where
    D: Driver,
{
    /// Creates a session over the given driver, with no OS module attached.
    pub fn new(driver: D) -> Self {
        Self {
            core: Rc::new(Core::new(driver)),
            os: None,
        }
    }

    /// Creates a session over an existing core.
    ///
    /// Used when the OS module must be constructed against the core before
    /// being attached.
    pub fn from_core(core: Rc<Core<D>>) -> Self {
        Self { core, os: None }
    }

    /// Returns the shared memory core.
    ///
    /// OS modules hold a clone of this handle, so module and session see
    /// the same caches.
    pub fn core(&self) -> &Rc<Core<D>> {
        &self.core
    }

    /// Attaches an OS module, replacing any previous one.
    pub fn attach(&mut self, os: Box<dyn OsModule<D>>) {
        self.os = Some(os);
    }

    /// Detaches the current OS module, if any.
    pub fn detach(&mut self) -> Option<Box<dyn OsModule<D>>> {
        self.os.take()
    }

    /// Returns the attached OS module, if any.
    pub fn os(&self) -> Option<&dyn OsModule<D>> {
        self.os.as_deref()
    }

    /// Checks whether the address lies in the guest kernel's address half.
    pub fn is_kernel_address(&self, va: Va) -> bool {
        match &self.os {
            Some(os) => os.is_kernel_address(va),
            None => false,
        }
    }

    /// Checks whether a page fault may be injected for the address.
    pub fn can_inject_fault(&self, va: Va) -> bool {
        match &self.os {
            Some(os) => os.can_inject_fault(va),
            None => false,
        }
    }

    /// Populates the reader's address-space context for the given process.
    pub fn reader_setup(&self, reader: &mut Reader<'_, D>, process: Option<Process>) -> bool {
        match &self.os {
            Some(os) => os.reader_setup(reader, process),
            None => true,
        }
    }

    /// Returns the kernel symbol store.
    pub fn kernel_symbols(&self) -> Option<&dyn SymbolStore> {
        self.os.as_deref().map(|os| os.kernel_symbols())
    }

    /// Enumerates all processes.
    pub fn proc_list(&self, on_process: WalkCallback<'_, Process>) -> Result<(), Error> {
        match &self.os {
            Some(os) => os.proc_list(on_process),
            None => Ok(()),
        }
    }

    /// Returns the currently executing process.
    pub fn proc_current(&self) -> Result<Option<Process>, Error> {
        match &self.os {
            Some(os) => os.proc_current().map(Some),
            None => Ok(None),
        }
    }

    /// Finds the first process with the given name.
    pub fn proc_find_name(&self, name: &str) -> Result<Option<Process>, Error> {
        match &self.os {
            Some(os) => os.proc_find_name(name),
            None => Ok(None),
        }
    }

    /// Finds the first process with the given id.
    pub fn proc_find_pid(&self, pid: u64) -> Result<Option<Process>, Error> {
        match &self.os {
            Some(os) => os.proc_find_pid(pid),
            None => Ok(None),
        }
    }

    /// Returns the process name.
    pub fn proc_name(&self, process: Process) -> Result<Option<String>, Error> {
        match &self.os {
            Some(os) => os.proc_name(process).map(Some),
            None => Ok(None),
        }
    }

    /// Checks whether the process object is still readable.
    pub fn proc_is_valid(&self, process: Process) -> bool {
        match &self.os {
            Some(os) => os.proc_is_valid(process),
            None => false,
        }
    }

    /// Returns the process id.
    pub fn proc_id(&self, process: Process) -> Option<u64> {
        self.os.as_deref().and_then(|os| os.proc_id(process))
    }

    /// Returns the process attributes.
    pub fn proc_flags(&self, process: Process) -> Result<Option<ProcessFlags>, Error> {
        match &self.os {
            Some(os) => os.proc_flags(process).map(Some),
            None => Ok(None),
        }
    }

    /// Translates a virtual address in the process's context.
    pub fn proc_resolve(&self, process: Process, va: Va) -> Result<Option<Pa>, Error> {
        match &self.os {
            Some(os) => os.proc_resolve(process, va).map(Some),
            None => Ok(None),
        }
    }

    /// Returns the process owning the given pointer.
    pub fn proc_select(&self, va: Va) -> Result<Option<Process>, Error> {
        match &self.os {
            Some(os) => os.proc_select(va).map(Some),
            None => Ok(None),
        }
    }

    /// Enumerates the threads of a process.
    pub fn thread_list(
        &self,
        process: Process,
        on_thread: WalkCallback<'_, Thread>,
    ) -> Result<(), Error> {
        match &self.os {
            Some(os) => os.thread_list(process, on_thread),
            None => Ok(()),
        }
    }

    /// Returns the currently executing thread.
    pub fn thread_current(&self) -> Result<Option<Thread>, Error> {
        match &self.os {
            Some(os) => os.thread_current().map(Some),
            None => Ok(None),
        }
    }

    /// Returns the process owning the given thread.
    pub fn thread_proc(&self, thread: Thread) -> Result<Option<Process>, Error> {
        match &self.os {
            Some(os) => os.thread_proc(thread).map(Some),
            None => Ok(None),
        }
    }

    /// Returns the thread id.
    pub fn thread_id(&self, thread: Thread) -> Option<u64> {
        self.os.as_deref().and_then(|os| os.thread_id(thread))
    }

    /// Enumerates the executable mappings of a process.
    pub fn mod_list(
        &self,
        process: Process,
        on_module: WalkCallback<'_, Module>,
    ) -> Result<(), Error> {
        match &self.os {
            Some(os) => os.mod_list(process, on_module),
            None => Ok(()),
        }
    }

    /// Finds the module of a process containing the given address.
    pub fn mod_find(&self, process: Process, va: Va) -> Result<Option<Module>, Error> {
        match &self.os {
            Some(os) => os.mod_find(process, va),
            None => Ok(None),
        }
    }

    /// Returns the module name.
    pub fn mod_name(&self, process: Process, module: Module) -> Result<Option<String>, Error> {
        match &self.os {
            Some(os) => os.mod_name(process, module),
            None => Ok(None),
        }
    }

    /// Returns the module's address range.
    pub fn mod_span(&self, process: Process, module: Module) -> Result<Option<Span>, Error> {
        match &self.os {
            Some(os) => os.mod_span(process, module),
            None => Ok(None),
        }
    }

    /// Enumerates loaded kernel drivers.
    pub fn driver_list(&self, on_driver: WalkCallback<'_, DriverModule>) -> Result<(), Error> {
        match &self.os {
            Some(os) => os.driver_list(on_driver),
            None => Ok(()),
        }
    }

    /// Finds the driver containing the given address.
    pub fn driver_find(&self, va: Va) -> Result<Option<DriverModule>, Error> {
        match &self.os {
            Some(os) => os.driver_find(va),
            None => Ok(None),
        }
    }

    /// Registers a listener for process creation.
    pub fn listen_proc_create(&self, callback: ProcessEventCallback) -> Option<BpId> {
        self.os.as_deref().and_then(|os| os.proc_listen_create(callback))
    }

    /// Registers a listener for process deletion.
    pub fn listen_proc_delete(&self, callback: ProcessEventCallback) -> Option<BpId> {
        self.os.as_deref().and_then(|os| os.proc_listen_delete(callback))
    }

    /// Registers a listener for thread creation.
    pub fn listen_thread_create(&self, callback: ThreadEventCallback) -> Option<BpId> {
        self.os.as_deref().and_then(|os| os.thread_listen_create(callback))
    }

    /// Registers a listener for thread deletion.
    pub fn listen_thread_delete(&self, callback: ThreadEventCallback) -> Option<BpId> {
        self.os.as_deref().and_then(|os| os.thread_listen_delete(callback))
    }

    /// Registers a listener for executable images being mapped.
    pub fn listen_mod_load(&self, callback: ModuleEventCallback) -> Option<BpId> {
        self.os.as_deref().and_then(|os| os.mod_listen_load(callback))
    }

    /// Registers a listener for kernel driver loads.
    pub fn listen_drv_load(&self, callback: DriverEventCallback) -> Option<BpId> {
        self.os.as_deref().and_then(|os| os.drv_listen_load(callback))
    }

    /// Removes a listener. Returns the number of listeners removed.
    pub fn unlisten(&self, id: BpId) -> usize {
        match &self.os {
            Some(os) => os.unlisten(id),
            None => 0,
        }
    }

    /// Dispatches a guest breakpoint hit to the attached module. Returns
    /// the number of callbacks invoked.
    pub fn handle_breakpoint(&self, ip: Va) -> usize {
        match &self.os {
            Some(os) => os.handle_breakpoint(ip),
            None => 0,
        }
    }

    /// Reads the stack slot at the given index in the current frame.
    pub fn read_stack(&self, index: u64) -> Result<Option<u64>, Error> {
        match &self.os {
            Some(os) => os.read_stack(index).map(Some),
            None => Ok(None),
        }
    }

    /// Reads the function argument at the given index in the current frame.
    pub fn read_arg(&self, index: u64) -> Result<Option<u64>, Error> {
        match &self.os {
            Some(os) => os.read_arg(index).map(Some),
            None => Ok(None),
        }
    }

    /// Overwrites the function argument at the given index. Returns whether
    /// a module was attached to perform the write.
    pub fn write_arg(&self, index: u64, value: u64) -> Result<bool, Error> {
        match &self.os {
            Some(os) => os.write_arg(index, value).map(|()| true),
            None => Ok(false),
        }
    }

    /// Dumps the attached module's internal state for diagnostics.
    pub fn debug_print(&self) {
        if let Some(os) = &self.os {
            os.debug_print();
        }
    }
}
