//! Exclusive ownership of the input channel.
//!
//! While a foreground action runs, its [`ActionHandle`] sits in the
//! [`ActionLock`] and the input channel accepts nothing but `stop`. The lock
//! only gates input: ticks keep running on their own schedule regardless.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::console::Console;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub(crate) u64);

/// Cooperative cancellation flag shared by a session and its handle.
/// Sessions read it at the top of their next tick.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The controllable side of a running action.
#[derive(Debug, Clone)]
pub struct ActionHandle {
    pub id: ActionId,
    pub label: String,
    stop: StopFlag,
    stop_message: String,
}

impl ActionHandle {
    pub fn new(id: ActionId, label: &str, stop: StopFlag, stop_message: &str) -> Self {
        Self {
            id,
            label: label.to_string(),
            stop,
            stop_message: stop_message.to_string(),
        }
    }

    /// Ask the action to end at its next tick boundary.
    pub fn stop(&self, console: &mut Console) {
        if !self.stop_message.is_empty() {
            console.append_line(self.stop_message.clone(), "");
        }
        self.stop.raise();
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.is_raised()
    }
}

#[derive(Debug, Default)]
pub struct ActionLock {
    holder: Option<ActionHandle>,
}

impl ActionLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `holder`. Fails, leaving the current holder in place, when the
    /// lock is already held.
    pub fn lock(&mut self, holder: ActionHandle) -> bool {
        if self.holder.is_some() {
            return false;
        }
        self.holder = Some(holder);
        true
    }

    /// Clear the lock unconditionally. Idempotent.
    pub fn unlock(&mut self) {
        self.holder = None;
    }

    /// Clear the lock only if it is still held by `id`. A session that
    /// outlives an explicit stop must not release a newer holder.
    pub fn release(&mut self, id: ActionId) -> bool {
        match &self.holder {
            Some(holder) if holder.id == id => {
                self.holder = None;
                true
            }
            _ => false,
        }
    }

    /// Route a stop request to the holder and clear the lock.
    pub fn stop_holder(&mut self, console: &mut Console) -> bool {
        match self.holder.take() {
            Some(holder) => {
                holder.stop(console);
                true
            }
            None => false,
        }
    }

    pub fn holder(&self) -> Option<&ActionHandle> {
        self.holder.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.holder.is_some()
    }
}
