use crate::{Pa, Va};

/// An error that can occur while introspecting a guest.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An error occurred in the hypervisor driver.
    #[error(transparent)]
    Driver(Box<dyn std::error::Error>),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A page fault occurred.
    #[error("Page not present ({:?}, len: {})", .0[0], .0.len())]
    PageFault(PageFaults),

    /// The given address has invalid width.
    #[error("Invalid address width")]
    InvalidAddressWidth,

    /// A kernel list did not return to its sentinel within the traversal
    /// bound, or a link pointed somewhere no object can live. The guest
    /// structure is corrupt or adversarial.
    #[error("Malformed kernel list at {head} (traversal bound {limit})")]
    MalformedList {
        /// The list head the traversal started from.
        head: Va,

        /// The traversal bound that was exceeded.
        limit: usize,
    },

    /// The guest kernel build has no matching offset table.
    #[error("Unsupported kernel: {0}")]
    UnsupportedKernel(String),

    /// Operation not supported.
    #[error("Operation not supported.")]
    NotSupported,

    /// Other error.
    #[error("{0}")]
    Other(&'static str),
}

/// A page fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageFault {
    /// The virtual address that caused the page fault.
    pub address: Va,

    /// The root of the page table hierarchy.
    pub root: Pa,
}

/// A collection of page faults.
pub type PageFaults = smallvec::SmallVec<[PageFault; 1]>;

impl From<(Va, Pa)> for PageFault {
    fn from((address, root): (Va, Pa)) -> Self {
        Self { address, root }
    }
}

impl Error {
    /// Creates a new page fault error.
    pub fn page_fault(pf: impl Into<PageFault>) -> Self {
        Self::PageFault(smallvec::smallvec![pf.into()])
    }
}
