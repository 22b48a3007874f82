use crate::Va;

/// A store of kernel symbols for the running guest.
///
/// Implementations are loaded from debug artifacts of the guest kernel
/// build (System.map files, debug packages). OS modules use the store to
/// locate well-known functions and globals and to label addresses in
/// diagnostics.
pub trait SymbolStore {
    /// Returns the name of the symbol covering the given address, if any.
    fn resolve(&self, va: Va) -> Option<String>;

    /// Returns the address of the named symbol, if known.
    fn address_of(&self, name: &str) -> Option<Va>;
}

impl SymbolStore for std::collections::BTreeMap<String, Va> {
    fn resolve(&self, va: Va) -> Option<String> {
        self.iter()
            .filter(|(_, &addr)| addr <= va)
            .max_by_key(|(_, &addr)| addr)
            .map(|(name, _)| name.clone())
    }

    fn address_of(&self, name: &str) -> Option<Va> {
        self.get(name).copied()
    }
}
