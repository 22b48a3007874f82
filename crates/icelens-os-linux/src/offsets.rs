//! Per-kernel-build structure layouts.
//!
//! Field offsets inside kernel structures vary with the kernel version and
//! build configuration, so each supported build carries its own table,
//! keyed by the exact release string (`uname -r`). There is no guessing
//! path: an unknown release fails attach outright.

/// Byte offsets into `struct task_struct`.
#[derive(Debug, Clone, Copy)]
#[allow(missing_docs)]
pub struct TaskStruct {
    pub flags: u64,
    pub tasks: u64,
    pub mm: u64,
    pub active_mm: u64,
    pub pid: u64,
    pub tgid: u64,
    pub group_leader: u64,
    pub thread_group: u64,
    pub comm: u64,

    /// Declared width of the `comm` buffer; names never exceed
    /// `comm_len - 1` bytes.
    pub comm_len: u64,
}

/// Byte offsets into `struct mm_struct`.
#[derive(Debug, Clone, Copy)]
#[allow(missing_docs)]
pub struct MmStruct {
    pub mmap: u64,
    pub pgd: u64,
}

/// Byte offsets into `struct vm_area_struct`.
#[derive(Debug, Clone, Copy)]
#[allow(missing_docs)]
pub struct VmAreaStruct {
    pub vm_start: u64,
    pub vm_end: u64,
    pub vm_next: u64,
    pub vm_flags: u64,
    pub vm_file: u64,
}

/// Byte offsets into `struct module`.
#[derive(Debug, Clone, Copy)]
#[allow(missing_docs)]
pub struct KernelModule {
    pub list: u64,
    pub name: u64,

    /// Declared width of the `name` buffer.
    pub name_len: u64,
    pub base: u64,
    pub size: u64,
}

/// Byte offsets into `struct file`.
#[derive(Debug, Clone, Copy)]
#[allow(missing_docs)]
pub struct File {
    pub f_path: u64,
}

/// Byte offsets into `struct path`.
#[derive(Debug, Clone, Copy)]
#[allow(missing_docs)]
pub struct Path {
    pub dentry: u64,
}

/// Byte offsets into `struct dentry`.
#[derive(Debug, Clone, Copy)]
#[allow(missing_docs)]
pub struct Dentry {
    pub d_name: u64,
}

/// Byte offsets into `struct qstr`.
#[derive(Debug, Clone, Copy)]
#[allow(missing_docs)]
pub struct Qstr {
    pub len: u64,
    pub name: u64,
}

/// The complete offset table for one kernel build.
#[derive(Debug, Clone, Copy)]
#[allow(missing_docs)]
pub struct Offsets {
    /// The exact release string this table applies to.
    pub release: &'static str,

    pub task_struct: TaskStruct,
    pub mm_struct: MmStruct,
    pub vm_area_struct: VmAreaStruct,
    pub module: KernelModule,
    pub file: File,
    pub path: Path,
    pub dentry: Dentry,
    pub qstr: Qstr,
}

impl Offsets {
    /// Returns the table matching the given kernel release, if supported.
    pub fn for_release(release: &str) -> Option<&'static Offsets> {
        TABLES.iter().find(|table| table.release == release).copied()
    }
}

static TABLES: &[&Offsets] = &[&UBUNTU_4_15_0_39, &UBUNTU_4_15_0_42];

static UBUNTU_4_15_0_39: Offsets = Offsets {
    release: "4.15.0-39-generic",
    task_struct: TaskStruct {
        flags: 0x3c,
        tasks: 0x7a8,
        mm: 0x7f8,
        active_mm: 0x800,
        pid: 0x8a8,
        tgid: 0x8ac,
        group_leader: 0x8e8,
        thread_group: 0x948,
        comm: 0xa50,
        comm_len: 15,
    },
    mm_struct: MmStruct {
        mmap: 0x0,
        pgd: 0x50,
    },
    vm_area_struct: VmAreaStruct {
        vm_start: 0x0,
        vm_end: 0x8,
        vm_next: 0x10,
        vm_flags: 0x50,
        vm_file: 0xa0,
    },
    module: KernelModule {
        list: 0x8,
        name: 0x18,
        name_len: 56,
        base: 0x158,
        size: 0x160,
    },
    file: File { f_path: 0x10 },
    path: Path { dentry: 0x8 },
    dentry: Dentry { d_name: 0x20 },
    qstr: Qstr { len: 0x4, name: 0x8 },
};

static UBUNTU_4_15_0_42: Offsets = Offsets {
    release: "4.15.0-42-generic",
    task_struct: TaskStruct {
        flags: 0x3c,
        tasks: 0x7a8,
        mm: 0x7f8,
        active_mm: 0x800,
        pid: 0x8a8,
        tgid: 0x8ac,
        group_leader: 0x8e8,
        thread_group: 0x948,
        comm: 0xa50,
        comm_len: 15,
    },
    mm_struct: MmStruct {
        mmap: 0x0,
        pgd: 0x50,
    },
    vm_area_struct: VmAreaStruct {
        vm_start: 0x0,
        vm_end: 0x8,
        vm_next: 0x10,
        vm_flags: 0x50,
        vm_file: 0xa0,
    },
    module: KernelModule {
        list: 0x8,
        name: 0x18,
        name_len: 56,
        base: 0x158,
        size: 0x160,
    },
    file: File { f_path: 0x10 },
    path: Path { dentry: 0x8 },
    dentry: Dentry { d_name: 0x20 },
    qstr: Qstr { len: 0x4, name: 0x8 },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_release_resolves() {
        let offsets = Offsets::for_release("4.15.0-39-generic").unwrap();
        assert_eq!(offsets.task_struct.comm, 0xa50);
        assert_eq!(offsets.mm_struct.pgd, 0x50);
    }

    #[test]
    fn unknown_release_is_rejected() {
        assert!(Offsets::for_release("5.99.0-1-generic").is_none());
        assert!(Offsets::for_release("").is_none());
    }
}
