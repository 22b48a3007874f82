//! Linux guest introspection.
//!
//! [`LinuxOs`] reconstructs processes, threads, mappings and kernel
//! modules from raw guest memory, using a per-kernel-build [`Offsets`]
//! table and a kernel symbol store. Lifecycle events are driven by
//! breakpoints on well-known kernel entry points.

pub mod arch;
mod offsets;

use std::rc::Rc;

use icelens_core::{
    os::{
        BpId, BreakpointRegistry, DriverEventCallback, DriverModule, JoinMode, ListenerCallback,
        Module, ModuleEventCallback, ModuleFlags, Process, ProcessEventCallback, ProcessFlags,
        Thread, ThreadEventCallback, WalkCallback, WalkStep,
    },
    AddressSpace, Architecture, Core, Driver, Error, OsModule, Pa, Reader, Registers as _, Span,
    SymbolStore, Va,
};

pub use self::{arch::ArchAdapter, offsets::Offsets};

/// Upper bound on kernel-list traversals. A well-formed guest never comes
/// close; exceeding it means the list is corrupt or adversarial.
const LIST_WALK_LIMIT: usize = 65536;

/// Upper bound on single steps spent waiting in [`OsModule::proc_join`].
const JOIN_STEP_LIMIT: usize = 1 << 16;

// task_struct.flags bits.
const PF_EXITING: u32 = 0x0000_0004;
const PF_KTHREAD: u32 = 0x0020_0000;

// vm_area_struct.vm_flags bits.
const VM_EXEC: u64 = 0x4;

// Kernel entry points backing the lifecycle events. `wake_up_new_task`
// sees every new task, `do_exit` every dying one; `perf_event_mmap` runs
// once the new vma is fully constructed.
const PROC_CREATE_HOOK: &str = "wake_up_new_task";
const PROC_DELETE_HOOK: &str = "do_exit";
const MODULE_LOAD_HOOK: &str = "perf_event_mmap";
const DRIVER_LOAD_HOOK: &str = "do_init_module";

/// The Linux OS capability module.
pub struct LinuxOs<D>
where
    D: Driver + 'static,
    D::Architecture: ArchAdapter,
{
    core: Rc<Core<D>>,
    offsets: &'static Offsets,
    symbols: Box<dyn SymbolStore>,
    kernel_space: AddressSpace,
    init_task: Va,

    /// Per-CPU offset of the `current_task` variable.
    current_task: Va,

    registry: BreakpointRegistry<D>,
    release: String,
}

impl<D> LinuxOs<D>
where
    D: Driver + 'static,
    D::Architecture: ArchAdapter,
{
    /// Attaches to a Linux guest.
    ///
    /// Fails with [`Error::UnsupportedKernel`] if no offset table matches
    /// the given kernel release, rather than proceeding with guessed
    /// layouts.
    pub fn new(
        core: Rc<Core<D>>,
        release: &str,
        symbols: Box<dyn SymbolStore>,
    ) -> Result<Self, Error> {
        let offsets = Offsets::for_release(release)
            .ok_or_else(|| Error::UnsupportedKernel(release.to_owned()))?;

        let init_task = symbols
            .address_of("init_task")
            .ok_or(Error::Other("missing init_task symbol"))?;
        let current_task = symbols
            .address_of("current_task")
            .ok_or(Error::Other("missing current_task symbol"))?;

        let registers = core.registers()?;
        let kernel_space = AddressSpace::shared(registers.translation_root());

        tracing::debug!(
            release,
            %init_task,
            kernel_root = %kernel_space.kernel_root,
            "attached to linux guest"
        );

        Ok(Self {
            core,
            offsets,
            symbols,
            kernel_space,
            init_task,
            current_task,
            registry: BreakpointRegistry::new(),
            release: release.to_owned(),
        })
    }

    fn kernel_reader(&self) -> Reader<'_, D> {
        Reader::new(&self.core, self.kernel_space)
    }

    fn current_task_object(&self) -> Result<Va, Error> {
        let registers = self.core.registers()?;
        let base = D::Architecture::per_cpu_base(&registers);
        self.kernel_reader().read_ptr(base + self.current_task)
    }

    fn process_from_task(&self, task: Va) -> Result<Process, Error> {
        Ok(Process {
            object: task,
            dtb: task_dtb(&self.core, self.offsets, self.kernel_space, task)?,
        })
    }

    fn vma_module(&self, reader: &Reader<'_, D>, vma: Va) -> Result<Option<Module>, Error> {
        let file = reader.read_ptr(vma + self.offsets.vm_area_struct.vm_file)?;
        if file.is_null() {
            // Anonymous mapping.
            return Ok(None);
        }

        let raw = reader.read_u64(vma + self.offsets.vm_area_struct.vm_flags)?;

        let mut flags = ModuleFlags::empty();
        if raw & VM_EXEC != 0 {
            flags |= ModuleFlags::EXECUTABLE;
        }

        Ok(Some(Module { object: vma, flags }))
    }

    fn listen_at(&self, symbol: &str, callback: ListenerCallback) -> Option<BpId> {
        let address = match self.symbols.address_of(symbol) {
            Some(address) => address,
            None => {
                tracing::warn!(symbol, "hook symbol not found");
                return None;
            }
        };

        self.registry
            .listen(self.core.driver(), address, self.kernel_space, callback)
    }
}

/// Resolves the mm of a task, falling back to `active_mm` for kernel
/// threads borrowing one.
fn task_mm<D>(
    core: &Core<D>,
    offsets: &'static Offsets,
    space: AddressSpace,
    task: Va,
) -> Result<Va, Error>
where
    D: Driver,
{
    let reader = Reader::new(core, space);

    let mm = reader.read_ptr(task + offsets.task_struct.mm)?;
    if !mm.is_null() {
        return Ok(mm);
    }

    reader.read_ptr(task + offsets.task_struct.active_mm)
}

/// Resolves the page-table root of a task.
///
/// `mm->pgd` is a kernel virtual address; the directory table base is its
/// physical translation. A kernel thread without any mm runs on the kernel
/// mapping itself.
fn task_dtb<D>(
    core: &Core<D>,
    offsets: &'static Offsets,
    space: AddressSpace,
    task: Va,
) -> Result<Pa, Error>
where
    D: Driver,
{
    let mm = task_mm(core, offsets, space, task)?;
    if mm.is_null() {
        return Ok(space.kernel_root);
    }

    let reader = Reader::new(core, space);
    let pgd = reader.read_ptr(mm + offsets.mm_struct.pgd)?;

    core.translate(pgd, space.kernel_root)
}

fn task_pids<D>(
    core: &Core<D>,
    offsets: &'static Offsets,
    space: AddressSpace,
    task: Va,
) -> Result<(u32, u32), Error>
where
    D: Driver,
{
    let reader = Reader::new(core, space);
    let pid = reader.read_u32(task + offsets.task_struct.pid)?;
    let tgid = reader.read_u32(task + offsets.task_struct.tgid)?;
    Ok((pid, tgid))
}

/// Walks a circular list threaded through task objects, starting from (and
/// including) the root object.
fn walk_task_list<D>(
    core: &Core<D>,
    space: AddressSpace,
    root: Va,
    link_offset: u64,
    mut on_task: impl FnMut(Va) -> Result<WalkStep, Error>,
) -> Result<(), Error>
where
    D: Driver,
{
    let reader = Reader::new(core, space);
    let head = root + link_offset;
    let mut link = head;
    let mut visited = 0;

    loop {
        if visited >= LIST_WALK_LIMIT {
            return Err(Error::MalformedList {
                head,
                limit: LIST_WALK_LIMIT,
            });
        }
        visited += 1;

        // A link numerically below its embedded offset cannot belong to a
        // real object.
        let object = link
            .0
            .checked_sub(link_offset)
            .map(Va)
            .ok_or(Error::MalformedList {
                head,
                limit: LIST_WALK_LIMIT,
            })?;

        if on_task(object)? == WalkStep::Stop {
            return Ok(());
        }

        link = reader.read_ptr(link)?;
        if link == head {
            return Ok(());
        }
    }
}

impl<D> OsModule<D> for LinuxOs<D>
where
    D: Driver + 'static,
    D::Architecture: ArchAdapter,
{
    fn is_kernel_address(&self, va: Va) -> bool {
        D::Architecture::va_is_kernel(va)
    }

    fn can_inject_fault(&self, va: Va) -> bool {
        if D::Architecture::va_is_kernel(va) {
            return false;
        }

        match self.core.registers() {
            Ok(registers) => D::Architecture::in_user_mode(&registers),
            Err(_) => false,
        }
    }

    fn reader_setup(&self, reader: &mut Reader<'_, D>, process: Option<Process>) -> bool {
        let user_root = match process {
            Some(process) => process.dtb,
            None => match self.proc_current() {
                Ok(process) => process.dtb,
                Err(err) => {
                    tracing::warn!(%err, "cannot resolve current process for reader");
                    return false;
                }
            },
        };

        reader.set_space(AddressSpace::new(user_root, self.kernel_space.kernel_root));
        true
    }

    fn kernel_symbols(&self) -> &dyn SymbolStore {
        self.symbols.as_ref()
    }

    fn proc_list(&self, on_process: WalkCallback<'_, Process>) -> Result<(), Error> {
        walk_task_list(
            &self.core,
            self.kernel_space,
            self.init_task,
            self.offsets.task_struct.tasks,
            |task| match self.process_from_task(task) {
                Ok(process) => on_process(process),
                Err(err) => {
                    tracing::warn!(%task, %err, "skipping unreadable task");
                    Ok(WalkStep::Continue)
                }
            },
        )
    }

    fn proc_current(&self) -> Result<Process, Error> {
        self.process_from_task(self.current_task_object()?)
    }

    fn proc_find_name(&self, name: &str) -> Result<Option<Process>, Error> {
        let mut found = None;

        self.proc_list(&mut |process| {
            let matches = match self.proc_name(process) {
                Ok(candidate) => candidate == name,
                Err(err) => {
                    tracing::warn!(object = %process.object, %err, "skipping unnamed process");
                    false
                }
            };

            if matches {
                found = Some(process);
                return Ok(WalkStep::Stop);
            }

            Ok(WalkStep::Continue)
        })?;

        Ok(found)
    }

    fn proc_find_pid(&self, pid: u64) -> Result<Option<Process>, Error> {
        let mut found = None;

        self.proc_list(&mut |process| {
            if self.proc_id(process) == Some(pid) {
                found = Some(process);
                return Ok(WalkStep::Stop);
            }

            Ok(WalkStep::Continue)
        })?;

        Ok(found)
    }

    fn proc_name(&self, process: Process) -> Result<String, Error> {
        let width = self.offsets.task_struct.comm_len as usize;
        let mut buffer = vec![0u8; width];

        self.kernel_reader()
            .read(process.object + self.offsets.task_struct.comm, &mut buffer)?;

        // Truncate at the first NUL, or at capacity for a guest buffer
        // with no terminator at all.
        let len = memchr::memchr(0, &buffer).unwrap_or(width - 1);

        Ok(String::from_utf8_lossy(&buffer[..len]).into_owned())
    }

    fn proc_is_valid(&self, process: Process) -> bool {
        !process.object.is_null()
            && self
                .kernel_reader()
                .read_u32(process.object + self.offsets.task_struct.tgid)
                .is_ok()
    }

    fn proc_id(&self, process: Process) -> Option<u64> {
        self.kernel_reader()
            .read_u32(process.object + self.offsets.task_struct.tgid)
            .ok()
            .map(u64::from)
    }

    fn proc_flags(&self, process: Process) -> Result<ProcessFlags, Error> {
        let raw = self
            .kernel_reader()
            .read_u32(process.object + self.offsets.task_struct.flags)?;

        let mut flags = ProcessFlags::empty();
        if raw & PF_KTHREAD != 0 {
            flags |= ProcessFlags::KERNEL_THREAD;
        }
        if raw & PF_EXITING != 0 {
            flags |= ProcessFlags::EXITING;
        }

        Ok(flags)
    }

    fn proc_join(&self, process: Process, mode: JoinMode) -> Result<(), Error> {
        for _ in 0..JOIN_STEP_LIMIT {
            if self.current_task_object()? == process.object {
                let in_user = match mode {
                    JoinMode::AnyMode => true,
                    JoinMode::UserMode => {
                        let registers = self.core.registers()?;
                        D::Architecture::in_user_mode(&registers)
                    }
                };

                if in_user {
                    return Ok(());
                }
            }

            self.core.driver().single_step()?;
            self.core.flush_caches();
        }

        Err(Error::Other("join step limit reached"))
    }

    fn proc_resolve(&self, process: Process, va: Va) -> Result<Pa, Error> {
        let root = if D::Architecture::va_is_kernel(va) {
            self.kernel_space.kernel_root
        } else {
            process.dtb
        };

        self.core.translate(va, root)
    }

    fn proc_select(&self, _va: Va) -> Result<Process, Error> {
        // Pointers are interpreted in the current context.
        self.proc_current()
    }

    fn thread_list(
        &self,
        process: Process,
        on_thread: WalkCallback<'_, Thread>,
    ) -> Result<(), Error> {
        walk_task_list(
            &self.core,
            self.kernel_space,
            process.object,
            self.offsets.task_struct.thread_group,
            |task| on_thread(Thread { object: task }),
        )
    }

    fn thread_current(&self) -> Result<Thread, Error> {
        Ok(Thread {
            object: self.current_task_object()?,
        })
    }

    fn thread_proc(&self, thread: Thread) -> Result<Process, Error> {
        let leader = self
            .kernel_reader()
            .read_ptr(thread.object + self.offsets.task_struct.group_leader)?;

        self.process_from_task(leader)
    }

    fn thread_pc(&self, thread: Thread) -> Result<Option<Va>, Error> {
        // Only the running thread has live register state; a sleeping
        // thread's context is parked on its kernel stack.
        if self.current_task_object()? != thread.object {
            return Ok(None);
        }

        let registers = self.core.registers()?;
        Ok(Some(registers.instruction_pointer()))
    }

    fn thread_id(&self, thread: Thread) -> Option<u64> {
        self.kernel_reader()
            .read_u32(thread.object + self.offsets.task_struct.pid)
            .ok()
            .map(u64::from)
    }

    fn mod_list(&self, process: Process, on_module: WalkCallback<'_, Module>) -> Result<(), Error> {
        let reader = self.kernel_reader();

        let mm = task_mm(&self.core, self.offsets, self.kernel_space, process.object)?;
        if mm.is_null() {
            // A kernel thread maps nothing.
            return Ok(());
        }

        let head = mm + self.offsets.mm_struct.mmap;
        let mut vma = reader.read_ptr(head)?;
        let mut visited = 0;

        while !vma.is_null() {
            if visited >= LIST_WALK_LIMIT {
                return Err(Error::MalformedList {
                    head,
                    limit: LIST_WALK_LIMIT,
                });
            }
            visited += 1;

            let next = reader.read_ptr(vma + self.offsets.vm_area_struct.vm_next)?;

            match self.vma_module(&reader, vma) {
                Ok(Some(module)) => {
                    if on_module(module)? == WalkStep::Stop {
                        return Ok(());
                    }
                }
                Ok(None) => {}
                Err(err) => tracing::warn!(%vma, %err, "skipping unreadable vma"),
            }

            vma = next;
        }

        Ok(())
    }

    fn mod_name(&self, _process: Process, module: Module) -> Result<Option<String>, Error> {
        let reader = self.kernel_reader();

        let file = reader.read_ptr(module.object + self.offsets.vm_area_struct.vm_file)?;
        if file.is_null() {
            return Ok(None);
        }

        let dentry =
            reader.read_ptr(file + self.offsets.file.f_path + self.offsets.path.dentry)?;
        let d_name = dentry + self.offsets.dentry.d_name;

        let len = reader.read_u32(d_name + self.offsets.qstr.len)?;
        let name = reader.read_ptr(d_name + self.offsets.qstr.name)?;
        if name.is_null() {
            return Ok(None);
        }

        let mut buffer = vec![0u8; usize::min(len as usize, 255)];
        reader.read(name, &mut buffer)?;

        Ok(Some(String::from_utf8_lossy(&buffer).into_owned()))
    }

    fn mod_span(&self, _process: Process, module: Module) -> Result<Option<Span>, Error> {
        let reader = self.kernel_reader();

        let start = reader.read_ptr(module.object + self.offsets.vm_area_struct.vm_start)?;
        let end = reader.read_ptr(module.object + self.offsets.vm_area_struct.vm_end)?;

        if end < start {
            return Ok(None);
        }

        Ok(Some(Span::new(start, end.0 - start.0)))
    }

    fn mod_find(&self, process: Process, va: Va) -> Result<Option<Module>, Error> {
        let mut found = None;

        self.mod_list(process, &mut |module| {
            match self.mod_span(process, module) {
                Ok(Some(span)) if span.contains(va) => {
                    found = Some(module);
                    return Ok(WalkStep::Stop);
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(object = %module.object, %err, "skipping unreadable mapping")
                }
            }

            Ok(WalkStep::Continue)
        })?;

        Ok(found)
    }

    fn driver_list(&self, on_driver: WalkCallback<'_, DriverModule>) -> Result<(), Error> {
        let head = self
            .symbols
            .address_of("modules")
            .ok_or(Error::Other("missing modules symbol"))?;

        let reader = self.kernel_reader();
        let mut link = reader.read_ptr(head)?;
        let mut visited = 0;

        while link != head {
            if visited >= LIST_WALK_LIMIT {
                return Err(Error::MalformedList {
                    head,
                    limit: LIST_WALK_LIMIT,
                });
            }
            visited += 1;

            let object = link
                .0
                .checked_sub(self.offsets.module.list)
                .map(Va)
                .ok_or(Error::MalformedList {
                    head,
                    limit: LIST_WALK_LIMIT,
                })?;

            let next = reader.read_ptr(link)?;
            let driver = DriverModule { object };

            if on_driver(driver)? == WalkStep::Stop {
                return Ok(());
            }

            link = next;
        }

        Ok(())
    }

    fn driver_name(&self, driver: DriverModule) -> Result<String, Error> {
        let width = self.offsets.module.name_len as usize;
        let mut buffer = vec![0u8; width];

        self.kernel_reader()
            .read(driver.object + self.offsets.module.name, &mut buffer)?;

        let len = memchr::memchr(0, &buffer).unwrap_or(width - 1);

        Ok(String::from_utf8_lossy(&buffer[..len]).into_owned())
    }

    fn driver_span(&self, driver: DriverModule) -> Result<Option<Span>, Error> {
        let reader = self.kernel_reader();

        let base = reader.read_ptr(driver.object + self.offsets.module.base)?;
        if base.is_null() {
            return Ok(None);
        }

        let size = reader.read_u32(driver.object + self.offsets.module.size)?;

        Ok(Some(Span::new(base, u64::from(size))))
    }

    fn driver_find(&self, va: Va) -> Result<Option<DriverModule>, Error> {
        let mut found = None;

        self.driver_list(&mut |driver| {
            match self.driver_span(driver) {
                Ok(Some(span)) if span.contains(va) => {
                    found = Some(driver);
                    return Ok(WalkStep::Stop);
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!(object = %driver.object, %err, "skipping unreadable module")
                }
            }

            Ok(WalkStep::Continue)
        })?;

        Ok(found)
    }

    fn proc_listen_create(&self, mut callback: ProcessEventCallback) -> Option<BpId> {
        let core = Rc::clone(&self.core);
        let offsets = self.offsets;
        let space = self.kernel_space;

        self.listen_at(
            PROC_CREATE_HOOK,
            Box::new(move || {
                let registers = core.registers()?;
                let task = Va(D::Architecture::function_argument(&core, &registers, 0)?);

                let (pid, tgid) = task_pids(&core, offsets, space, task)?;
                if pid != tgid {
                    // A new thread in an existing process.
                    return Ok(());
                }

                let dtb = task_dtb(&core, offsets, space, task)?;
                callback(Process { object: task, dtb });

                Ok(())
            }),
        )
    }

    fn proc_listen_delete(&self, mut callback: ProcessEventCallback) -> Option<BpId> {
        let core = Rc::clone(&self.core);
        let offsets = self.offsets;
        let space = self.kernel_space;
        let current_task = self.current_task;

        self.listen_at(
            PROC_DELETE_HOOK,
            Box::new(move || {
                let registers = core.registers()?;
                let base = D::Architecture::per_cpu_base(&registers);
                let task = Reader::new(&core, space).read_ptr(base + current_task)?;

                let (pid, tgid) = task_pids(&core, offsets, space, task)?;
                if pid != tgid {
                    return Ok(());
                }

                let dtb = task_dtb(&core, offsets, space, task)?;
                callback(Process { object: task, dtb });

                Ok(())
            }),
        )
    }

    fn thread_listen_create(&self, mut callback: ThreadEventCallback) -> Option<BpId> {
        let core = Rc::clone(&self.core);
        let offsets = self.offsets;
        let space = self.kernel_space;

        self.listen_at(
            PROC_CREATE_HOOK,
            Box::new(move || {
                let registers = core.registers()?;
                let task = Va(D::Architecture::function_argument(&core, &registers, 0)?);

                let reader = Reader::new(&core, space);
                let leader = reader.read_ptr(task + offsets.task_struct.group_leader)?;
                let dtb = task_dtb(&core, offsets, space, leader)?;

                callback(
                    Process {
                        object: leader,
                        dtb,
                    },
                    Thread { object: task },
                );

                Ok(())
            }),
        )
    }

    fn thread_listen_delete(&self, mut callback: ThreadEventCallback) -> Option<BpId> {
        let core = Rc::clone(&self.core);
        let offsets = self.offsets;
        let space = self.kernel_space;
        let current_task = self.current_task;

        self.listen_at(
            PROC_DELETE_HOOK,
            Box::new(move || {
                let registers = core.registers()?;
                let base = D::Architecture::per_cpu_base(&registers);

                let reader = Reader::new(&core, space);
                let task = reader.read_ptr(base + current_task)?;
                let leader = reader.read_ptr(task + offsets.task_struct.group_leader)?;
                let dtb = task_dtb(&core, offsets, space, leader)?;

                callback(
                    Process {
                        object: leader,
                        dtb,
                    },
                    Thread { object: task },
                );

                Ok(())
            }),
        )
    }

    fn mod_listen_load(&self, mut callback: ModuleEventCallback) -> Option<BpId> {
        let core = Rc::clone(&self.core);
        let offsets = self.offsets;
        let space = self.kernel_space;
        let current_task = self.current_task;

        self.listen_at(
            MODULE_LOAD_HOOK,
            Box::new(move || {
                let registers = core.registers()?;
                let vma = Va(D::Architecture::function_argument(&core, &registers, 0)?);

                let reader = Reader::new(&core, space);
                let file = reader.read_ptr(vma + offsets.vm_area_struct.vm_file)?;
                let raw = reader.read_u64(vma + offsets.vm_area_struct.vm_flags)?;

                // Only executable file-backed mappings count as modules.
                if file.is_null() || raw & VM_EXEC == 0 {
                    return Ok(());
                }

                let base = D::Architecture::per_cpu_base(&registers);
                let task = reader.read_ptr(base + current_task)?;
                let dtb = task_dtb(&core, offsets, space, task)?;

                callback(
                    Process { object: task, dtb },
                    Module {
                        object: vma,
                        flags: ModuleFlags::EXECUTABLE,
                    },
                );

                Ok(())
            }),
        )
    }

    fn drv_listen_load(&self, mut callback: DriverEventCallback) -> Option<BpId> {
        let core = Rc::clone(&self.core);

        self.listen_at(
            DRIVER_LOAD_HOOK,
            Box::new(move || {
                let registers = core.registers()?;
                let module = Va(D::Architecture::function_argument(&core, &registers, 0)?);

                callback(DriverModule { object: module });

                Ok(())
            }),
        )
    }

    fn unlisten(&self, id: BpId) -> usize {
        self.registry.unlisten(self.core.driver(), id)
    }

    fn handle_breakpoint(&self, ip: Va) -> usize {
        self.registry.dispatch(ip)
    }

    fn read_stack(&self, index: u64) -> Result<u64, Error> {
        let registers = self.core.registers()?;
        D::Architecture::stack_value(&self.core, &registers, index)
    }

    fn read_arg(&self, index: u64) -> Result<u64, Error> {
        let registers = self.core.registers()?;
        D::Architecture::function_argument(&self.core, &registers, index)
    }

    fn write_arg(&self, index: u64, value: u64) -> Result<(), Error> {
        D::Architecture::set_function_argument(&self.core, index, value)
    }

    fn debug_print(&self) {
        tracing::info!(
            release = %self.release,
            init_task = %self.init_task,
            kernel_root = %self.kernel_space.kernel_root,
            listeners = self.registry.listener_count(),
            breakpoints = self.registry.breakpoint_count(),
            "linux module state"
        );
    }
}

impl<D> Drop for LinuxOs<D>
where
    D: Driver + 'static,
    D::Architecture: ArchAdapter,
{
    fn drop(&mut self) {
        self.registry.clear(self.core.driver());
    }
}
