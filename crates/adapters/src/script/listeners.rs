// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Change-listener bookkeeping shared by script handle implementations.

use super::{ChangeListener, HandleChange, ListenerId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Set of subscribed change listeners.
#[derive(Default)]
pub struct Listeners {
    next_id: AtomicU64,
    entries: Mutex<Vec<(ListenerId, ChangeListener)>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: ChangeListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries.lock().push((id, listener));
        id
    }

    pub fn remove(&self, id: ListenerId) {
        self.entries.lock().retain(|(lid, _)| *lid != id);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every listener. Listeners run outside the lock so they may
    /// subscribe or unsubscribe.
    pub fn emit(&self, change: HandleChange) {
        let listeners: Vec<ChangeListener> = self
            .entries
            .lock()
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(change);
        }
    }
}

#[cfg(test)]
#[path = "listeners_tests.rs"]
mod tests;
