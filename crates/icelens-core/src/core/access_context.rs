use serde::{Deserialize, Serialize};

use super::macros::impl_address;

impl_address!(Gfn, "guest frame number");
impl_address!(Pa, "guest physical address");
impl_address!(Va, "guest virtual address");

/// The mechanism used for translating an address before a memory access.
///
/// Raw physical reads and page-table-translated virtual reads share one
/// access path; this enum records which of the two a given address needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TranslationMechanism {
    /// Direct mapping (no translation). The address is a physical address.
    Direct,

    /// Paging-based translation through the guest's paging structures,
    /// rooted at the given page-table root.
    Paging {
        /// The root of the paging structure (e.g. a CR3 value on x86).
        root: Pa,
    },
}

/// The context for a single memory access: an address plus the way it must
/// be translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccessContext {
    /// The address to access. Interpreted according to [`mechanism`].
    ///
    /// [`mechanism`]: Self::mechanism
    pub address: u64,

    /// The mechanism used for address translation.
    pub mechanism: TranslationMechanism,
}

impl AccessContext {
    /// Creates a new `AccessContext` with direct mapping.
    pub fn direct(address: impl Into<Pa>) -> Self {
        Self {
            address: u64::from(address.into()),
            mechanism: TranslationMechanism::Direct,
        }
    }

    /// Creates a new `AccessContext` with paging-based translation.
    pub fn paging(address: impl Into<Va>, root: impl Into<Pa>) -> Self {
        Self {
            address: address.into().0,
            mechanism: TranslationMechanism::Paging {
                root: root.into(),
            },
        }
    }
}

impl From<Pa> for AccessContext {
    fn from(value: Pa) -> Self {
        Self::direct(value)
    }
}

impl From<(Va, Pa)> for AccessContext {
    fn from(value: (Va, Pa)) -> Self {
        Self::paging(value.0, value.1)
    }
}

impl ::std::ops::Add<u64> for AccessContext {
    type Output = AccessContext;

    fn add(self, rhs: u64) -> Self::Output {
        Self {
            address: self.address + rhs,
            ..self
        }
    }
}

impl ::std::ops::AddAssign<u64> for AccessContext {
    fn add_assign(&mut self, rhs: u64) {
        self.address += rhs;
    }
}
