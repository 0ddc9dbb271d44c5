//! Synchronous signals.
//!
//! Models own their signals and consumers connect closures to them. An emit
//! calls every connected closure on the emitting thread, oldest connection
//! first.
//!
//! The connection table is only locked while it is read or changed, never
//! while closures run, so a closure may connect, disconnect, emit again, or
//! read back the model that emitted.
//!
//! ```
//! use paramtree_core::Signal;
//!
//! let dict_modified = Signal::<()>::new();
//! let id = dict_modified.connect(|_| println!("configuration changed"));
//! dict_modified.emit(());
//! assert!(dict_modified.disconnect(id));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Identifies one connection of one [`Signal`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

struct Connections<Args> {
    slots: SlotMap<ConnectionId, (u64, Slot<Args>)>,
    // Slot keys are reused after removal, so call order comes from here.
    next_seq: u64,
}

impl<Args> Connections<Args> {
    fn snapshot(&self) -> Vec<Slot<Args>> {
        let mut ordered: Vec<_> = self.slots.values().collect();
        ordered.sort_unstable_by_key(|(seq, _)| *seq);
        ordered.into_iter().map(|(_, slot)| slot.clone()).collect()
    }
}

/// A list of closures called with `&Args` on every [`emit`](Signal::emit).
///
/// Use `()` for notifications without a payload and a tuple for several
/// values.
pub struct Signal<Args> {
    connections: Mutex<Connections<Args>>,
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// A signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(Connections {
                slots: SlotMap::with_key(),
                next_seq: 0,
            }),
            blocked: AtomicBool::new(false),
        }
    }

    /// Adds `slot`; it stays connected until [`disconnect`](Self::disconnect).
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let mut connections = self.connections.lock();
        let seq = connections.next_seq;
        connections.next_seq += 1;
        connections.slots.insert((seq, Arc::new(slot)))
    }

    /// Adds `slot` for as long as the returned guard lives.
    pub fn connect_scoped<F>(self: &Arc<Self>, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        ConnectionGuard {
            id: self.connect(slot),
            signal: Arc::downgrade(self),
        }
    }

    /// Returns false if `id` was not connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().slots.remove(id).is_some()
    }

    /// Removes every slot, including guarded ones.
    pub fn disconnect_all(&self) {
        self.connections.lock().slots.clear();
    }

    /// Number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().slots.len()
    }

    /// While blocked, emits are dropped.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::Release);
    }

    /// See [`set_blocked`](Self::set_blocked).
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::Acquire)
    }

    /// Calls every connected slot with `args`.
    ///
    /// Slots connected during the emit are first called on the next one.
    /// Slots disconnected during the emit may still be called this time.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "emit dropped, signal blocked");
            return;
        }

        let slots = self.connections.lock().snapshot();
        tracing::trace!(target: targets::SIGNAL, slots = slots.len(), "emit");
        for slot in &slots {
            slot(&args);
        }
    }
}

/// Disconnects its slot when dropped.
///
/// Holds the signal weakly; outliving the signal is fine.
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use paramtree_core::Signal;
///
/// let signal = Arc::new(Signal::<i32>::new());
/// let total = Arc::new(AtomicI32::new(0));
/// {
///     let total = total.clone();
///     let _guard = signal.connect_scoped(move |&n| {
///         total.fetch_add(n, Ordering::SeqCst);
///     });
///     signal.emit(42);
/// }
/// signal.emit(43);
/// assert_eq!(total.load(Ordering::SeqCst), 42);
/// ```
pub struct ConnectionGuard<Args: 'static> {
    signal: Weak<Signal<Args>>,
    id: ConnectionId,
}

impl<Args: 'static> ConnectionGuard<Args> {
    /// The guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl<Args: 'static> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.upgrade() {
            signal.disconnect(self.id);
        }
    }
}
