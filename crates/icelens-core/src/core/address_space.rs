use serde::{Deserialize, Serialize};

use super::{Pa, Va};

/// A guest address space, identified by its pair of page-table roots.
///
/// A process's virtual-to-physical mapping is described by two directory
/// table bases: the root used for user-half addresses and the root used for
/// kernel-half addresses. On systems without kernel page-table isolation
/// the two are the same physical address.
///
/// An `AddressSpace` is immutable once captured; two address spaces are
/// equal iff both roots match.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AddressSpace {
    /// The page-table root used for user-half virtual addresses.
    pub user_root: Pa,

    /// The page-table root used for kernel-half virtual addresses.
    pub kernel_root: Pa,
}

impl AddressSpace {
    /// Creates an address space with distinct user and kernel roots.
    pub fn new(user_root: impl Into<Pa>, kernel_root: impl Into<Pa>) -> Self {
        Self {
            user_root: user_root.into(),
            kernel_root: kernel_root.into(),
        }
    }

    /// Creates an address space where both halves share one root.
    pub fn shared(root: impl Into<Pa>) -> Self {
        let root = root.into();
        Self {
            user_root: root,
            kernel_root: root,
        }
    }

    /// Checks whether both roots are unset.
    pub fn is_null(&self) -> bool {
        self.user_root.is_null() && self.kernel_root.is_null()
    }
}

impl std::fmt::Display for AddressSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "user: {}, kernel: {}", self.user_root, self.kernel_root)
    }
}

/// A contiguous virtual-address range, used for module and driver extents.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Span {
    /// The base address of the range.
    pub base: Va,

    /// The size of the range in bytes.
    pub size: u64,
}

impl Span {
    /// Creates a new span.
    pub fn new(base: impl Into<Va>, size: u64) -> Self {
        Self {
            base: base.into(),
            size,
        }
    }

    /// Checks whether the given address falls inside the span.
    pub fn contains(&self, address: Va) -> bool {
        address >= self.base && address.0 < self.base.0 + self.size
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} + 0x{:x}", self.base, self.size)
    }
}
