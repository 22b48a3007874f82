use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use indexmap::IndexMap;

use crate::{AddressSpace, Driver, Error, Va};

use super::BpId;

/// The closure bound to one listener.
///
/// Callbacks carry no payload; the OS module builds a closure that captures
/// everything needed to reconstruct the event's handles from guest state.
pub type ListenerCallback = Box<dyn FnMut() -> Result<(), Error>>;

struct Listener {
    address: Va,
    callback: Rc<RefCell<ListenerCallback>>,
}

struct Slot<B> {
    handle: B,
    references: usize,
}

/// Maps installed guest breakpoints to lifecycle listeners.
///
/// Listeners are kept in registration order; dispatch walks a snapshot of
/// the ids matching the hit address, so a callback may remove itself or any
/// other listener mid-fire without corrupting the iteration. Breakpoints
/// are shared per address and removed from the guest only when the last
/// listener on that address is gone.
pub struct BreakpointRegistry<D>
where
    D: Driver,
{
    next_id: Cell<u64>,
    listeners: RefCell<IndexMap<BpId, Listener>>,
    slots: RefCell<HashMap<Va, Slot<D::Breakpoint>>>,
}

impl<D> BreakpointRegistry<D>
where
    D: Driver,
{
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            listeners: RefCell::new(IndexMap::new()),
            slots: RefCell::new(HashMap::new()),
        }
    }

    /// Binds a callback to a guest breakpoint at `address`.
    ///
    /// Installs the breakpoint on first use of the address; later listeners
    /// on the same address share it. Returns `None` if the breakpoint
    /// cannot be installed.
    pub fn listen(
        &self,
        driver: &D,
        address: Va,
        space: AddressSpace,
        callback: ListenerCallback,
    ) -> Option<BpId> {
        {
            let mut slots = self.slots.borrow_mut();

            match slots.get_mut(&address) {
                Some(slot) => slot.references += 1,
                None => {
                    let handle = match driver.install_breakpoint(address, space) {
                        Ok(handle) => handle,
                        Err(err) => {
                            tracing::warn!(%address, %err, "failed to install breakpoint");
                            return None;
                        }
                    };

                    slots.insert(
                        address,
                        Slot {
                            handle,
                            references: 1,
                        },
                    );
                }
            }
        }

        let id = BpId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        self.listeners.borrow_mut().insert(
            id,
            Listener {
                address,
                callback: Rc::new(RefCell::new(callback)),
            },
        );

        tracing::debug!(listener = id.0, %address, "listener registered");

        Some(id)
    }

    /// Removes a listener and, if it was the last one on its address, the
    /// underlying breakpoint.
    ///
    /// Returns the number of listeners removed; 0 for unknown or
    /// already-removed ids.
    pub fn unlisten(&self, driver: &D, id: BpId) -> usize {
        let listener = self.listeners.borrow_mut().shift_remove(&id);

        let Some(listener) = listener else {
            return 0;
        };

        let mut slots = self.slots.borrow_mut();

        let last = match slots.get_mut(&listener.address) {
            Some(slot) => {
                slot.references -= 1;
                slot.references == 0
            }
            None => false,
        };

        if last {
            if let Some(slot) = slots.remove(&listener.address) {
                if let Err(err) = driver.remove_breakpoint(slot.handle) {
                    tracing::warn!(
                        address = %listener.address,
                        %err,
                        "failed to remove breakpoint"
                    );
                }
            }
        }

        tracing::debug!(listener = id.0, address = %listener.address, "listener removed");

        1
    }

    /// Dispatches a breakpoint hit at `address` to every listener bound to
    /// it, in registration order.
    ///
    /// The matching ids are snapshotted before any callback runs; listeners
    /// removed mid-fire are skipped, and a callback error is logged without
    /// stopping the remaining callbacks. Returns the number of callbacks
    /// invoked.
    pub fn dispatch(&self, address: Va) -> usize {
        let matching = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, listener)| listener.address == address)
            .map(|(id, listener)| (*id, Rc::clone(&listener.callback)))
            .collect::<Vec<_>>();

        let mut fired = 0;

        for (id, callback) in matching {
            if !self.listeners.borrow().contains_key(&id) {
                continue;
            }

            fired += 1;

            if let Err(err) = (callback.borrow_mut())() {
                tracing::warn!(listener = id.0, %err, "listener callback failed");
            }
        }

        fired
    }

    /// Removes every listener and breakpoint.
    pub fn clear(&self, driver: &D) {
        let ids = self.listeners.borrow().keys().copied().collect::<Vec<_>>();

        for id in ids {
            self.unlisten(driver, id);
        }
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Returns the number of installed breakpoints.
    pub fn breakpoint_count(&self) -> usize {
        self.slots.borrow().len()
    }
}

impl<D> Default for BreakpointRegistry<D>
where
    D: Driver,
{
    fn default() -> Self {
        Self::new()
    }
}
