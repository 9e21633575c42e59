// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;

fn recorder() -> (ChangeListener, Arc<Mutex<Vec<HandleChange>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let listener: ChangeListener = Arc::new(move |change| sink.lock().push(change));
    (listener, seen)
}

#[test]
fn emit_reaches_every_listener() {
    let listeners = Listeners::new();
    let (a, seen_a) = recorder();
    let (b, seen_b) = recorder();
    listeners.add(a);
    listeners.add(b);

    listeners.emit(HandleChange::Running);

    assert_eq!(*seen_a.lock(), vec![HandleChange::Running]);
    assert_eq!(*seen_b.lock(), vec![HandleChange::Running]);
}

#[test]
fn removed_listener_is_not_called() {
    let listeners = Listeners::new();
    let (a, seen) = recorder();
    let id = listeners.add(a);
    assert_eq!(listeners.len(), 1);

    listeners.remove(id);
    listeners.emit(HandleChange::Status);

    assert!(listeners.is_empty());
    assert!(seen.lock().is_empty());
}

#[test]
fn listener_may_unsubscribe_itself_during_emit() {
    let listeners = Arc::new(Listeners::new());
    let slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

    let inner = Arc::clone(&listeners);
    let slot_ref = Arc::clone(&slot);
    let id = listeners.add(Arc::new(move |_| {
        if let Some(id) = *slot_ref.lock() {
            inner.remove(id);
        }
    }));
    *slot.lock() = Some(id);

    listeners.emit(HandleChange::Status);

    assert!(listeners.is_empty());
}
