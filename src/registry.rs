//! Subscription registry: handle allocation and listener lifecycle.
//!
//! The allocator and the subscription table share one mutex, so
//! `allocate`, `activate`, `register`, and `unregister` are
//! linearizable with respect to each other: concurrent listen commands
//! can never draw the same handle, and an unlisten racing an in-flight
//! event can never double-cancel a listener.
//!
//! Handle lifecycle is `Unregistered -> Active -> Removed`, with
//! `Removed` terminal. The counter never goes backwards, so a removed
//! handle is never reissued within a process run.

use crate::client::CancelToken;
use crate::error::{BridgeError, Result};
use crate::types::{Handle, ListenerKind};
use parking_lot::Mutex;
use std::collections::HashMap;

/// One live subscription. The registry is the exclusive owner of the
/// cancel token; nothing else is permitted to invoke it.
struct Subscription {
    kind: ListenerKind,
    cancel: CancelToken,
}

struct Inner {
    /// Next handle to issue. Starts at 0, strictly increasing.
    next_handle: u64,
    active: HashMap<Handle, Subscription>,
}

/// Tracks live listeners by handle and owns their cancel tokens.
pub struct SubscriptionRegistry {
    inner: Mutex<Inner>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_handle: 0,
                active: HashMap::new(),
            }),
        }
    }

    /// Issue the next unused handle. Never fails, never reuses.
    pub fn allocate(&self) -> Handle {
        let mut inner = self.inner.lock();
        let handle = Handle(inner.next_handle);
        inner.next_handle += 1;
        handle
    }

    /// Store a subscription as Active under a previously allocated
    /// handle. The dispatcher allocates first so the event callback
    /// can carry its handle before the native listener attaches.
    pub fn activate(&self, handle: Handle, kind: ListenerKind, cancel: CancelToken) {
        let previous = self.inner.lock().active.insert(
            handle,
            Subscription { kind, cancel },
        );
        debug_assert!(previous.is_none(), "handle {handle} registered twice");
    }

    /// Allocate a handle and store the subscription in one step.
    pub fn register(&self, kind: ListenerKind, cancel: CancelToken) -> Handle {
        let mut inner = self.inner.lock();
        let handle = Handle(inner.next_handle);
        inner.next_handle += 1;
        inner.active.insert(handle, Subscription { kind, cancel });
        handle
    }

    /// Detach the listener behind `handle` and forget it.
    ///
    /// Fails with [`BridgeError::UnknownHandle`] when the handle was
    /// never issued or is already removed; in that case nothing is
    /// cancelled and the registry is unchanged. Exactly one
    /// cancellation ever happens per handle.
    pub fn unregister(&self, handle: Handle) -> Result<()> {
        let subscription = self
            .inner
            .lock()
            .active
            .remove(&handle)
            .ok_or(BridgeError::UnknownHandle(handle))?;

        // Invoked outside the lock; the native cancel may call back
        // into the bridge on the same thread.
        subscription.cancel.invoke();
        Ok(())
    }

    /// Detach every active listener, in unspecified order. Used at
    /// process shutdown so native listeners never leak.
    pub fn shutdown(&self) {
        let drained: Vec<Subscription> = {
            let mut inner = self.inner.lock();
            inner.active.drain().map(|(_, sub)| sub).collect()
        };

        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "cancelling outstanding listeners");
        }
        for subscription in drained {
            subscription.cancel.invoke();
        }
    }

    /// Whether `handle` currently has an Active subscription.
    pub fn is_active(&self, handle: Handle) -> bool {
        self.inner.lock().active.contains_key(&handle)
    }

    /// The listener kind behind `handle`, if Active.
    pub fn kind(&self, handle: Handle) -> Option<ListenerKind> {
        self.inner.lock().active.get(&handle).map(|sub| sub.kind)
    }

    /// Number of Active subscriptions.
    pub fn len(&self) -> usize {
        self.inner.lock().active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().active.is_empty()
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SubscriptionRegistry {
    fn drop(&mut self) {
        self.shutdown();
    }
}
