// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::AtomicUsize;

#[tokio::test]
async fn fake_script_load_marks_loaded() {
    let script = FakeScript::new("Greeter.csx");
    assert!(!script.is_loaded());

    script.load().await.unwrap();

    assert!(script.is_loaded());
    assert_eq!(
        script.calls(),
        vec![ScriptCall::Load {
            id: "Greeter.csx".to_string()
        }]
    );
}

#[tokio::test]
async fn fake_script_load_failure() {
    let script = FakeScript::new("Broken.csx");
    script.fail_load(true);

    let result = script.load().await;

    assert!(matches!(result, Err(ScriptError::LoadFailed(_))));
    assert!(!script.is_loaded());
}

#[test]
fn fake_script_execute_and_cancel_notify_listeners() {
    let script = FakeScript::new("Greeter.csx");
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    script.subscribe(Arc::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    script.execute();
    assert!(script.is_running());
    assert_eq!(script.status(), ScriptStatus::Running);

    script.cancel();
    assert!(!script.is_running());
    assert_eq!(script.status(), ScriptStatus::Canceled);

    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn fake_script_execute_without_running() {
    let script = FakeScript::new("Oneshot.csx");
    script.run_on_execute(false);

    script.execute();

    assert!(!script.is_running());
    assert_eq!(script.execute_count(), 1);
}

#[test]
fn fake_directory_resolves_case_insensitively() {
    let dir = FakeScriptDirectory::new();
    dir.add_script("Greeter.csx");
    dir.add_file("Orphan.csx");

    assert!(dir.exists(&ScriptId::new("greeter.CSX")));
    assert!(dir.resolve(&ScriptId::new("GREETER.csx")).is_some());
    assert!(dir.exists(&ScriptId::new("orphan.csx")));
    assert!(dir.resolve(&ScriptId::new("orphan.csx")).is_none());
}

#[test]
fn fake_directory_delete_drops_handle() {
    let dir = FakeScriptDirectory::new();
    let script = dir.add_script("Greeter.csx");
    let weak = Arc::downgrade(&script);
    drop(script);

    dir.delete("greeter.csx");

    assert!(!dir.exists(&ScriptId::new("Greeter.csx")));
    assert!(weak.upgrade().is_none());
}

#[test]
fn fake_directory_shares_call_log() {
    let dir = FakeScriptDirectory::new();
    let a = dir.add_script("A.csx");
    let b = dir.add_script("B.csx");

    b.execute();
    a.execute();

    assert_eq!(dir.executed(), vec!["B.csx", "A.csx"]);
    assert_eq!(a.execute_count(), 1);
}

#[test]
fn fake_host_toggle() {
    let host = FakeHost::new();
    assert!(host.can_execute());
    host.set_can_execute(false);
    assert!(!host.can_execute());
}
