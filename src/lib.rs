//! Guest OS introspection core for a hypervisor-based debugger.
//!
//! Given raw access to a virtual machine's physical memory and register
//! state, this library reconstructs semantic operating-system objects
//! (processes, threads, mappings, drivers) without any cooperation from
//! the guest, and delivers lifecycle events driven by breakpoints inside
//! the guest kernel.
//!
//! The crate is an umbrella over the workspace members:
//!
//! - [`icelens_core`] (re-exported at the root): addresses, the
//!   [`Driver`] seam, the memory [`Core`], the [`OsModule`] capability
//!   trait and the [`Session`] dispatcher.
//! - [`arch_amd64`]: AMD64 registers and page-table translation.
//! - [`os_linux`]: the Linux OS capability module.

pub use icelens_core::*;

#[cfg(feature = "arch-amd64")]
pub use icelens_arch_amd64 as arch_amd64;

#[cfg(feature = "os-linux")]
pub use icelens_os_linux as os_linux;
