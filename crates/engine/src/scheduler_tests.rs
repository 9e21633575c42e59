// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::registry::TaskRegistry;
use autorun_adapters::{FakeScriptDirectory, InlineDispatch, ScriptCall};
use autorun_core::{AutostartEntry, Clock, FakeClock};
use tokio::time::Instant;

const STEP: Duration = Duration::from_millis(100);

fn tasks(scripts: &FakeScriptDirectory, ids: &[&str]) -> (TaskRegistry, Vec<Arc<AutostartTask>>) {
    let clock = FakeClock::new();
    let entries: Vec<AutostartEntry> = ids
        .iter()
        .map(|id| AutostartEntry::new(*id, clock.now()))
        .collect();
    let mut registry = TaskRegistry::new(Arc::new(InlineDispatch));
    registry.rebuild(&entries, scripts);
    let snapshot = registry.tasks();
    (registry, snapshot)
}

fn ids(list: &[ScriptId]) -> Vec<&str> {
    list.iter().map(|id| id.as_str()).collect()
}

#[tokio::test(start_paused = true)]
async fn starts_tasks_in_order() {
    let scripts = FakeScriptDirectory::new();
    for id in ["One.csx", "Two.csx", "Three.csx"] {
        scripts.add_script(id);
    }
    let (_registry, snapshot) = tasks(&scripts, &["Two.csx", "Three.csx", "One.csx"]);

    let report = run_pass(&snapshot, STEP).await;

    assert_eq!(ids(&report.started), vec!["Two.csx", "Three.csx", "One.csx"]);
    assert_eq!(scripts.executed(), vec!["Two.csx", "Three.csx", "One.csx"]);
}

#[tokio::test(start_paused = true)]
async fn loads_before_execute_when_not_loaded() {
    let scripts = FakeScriptDirectory::new();
    let cold = scripts.add_script("Cold.csx");
    let warm = scripts.add_script("Warm.csx");
    warm.set_loaded(true);
    let (_registry, snapshot) = tasks(&scripts, &["Cold.csx", "Warm.csx"]);

    run_pass(&snapshot, STEP).await;

    assert_eq!(
        cold.calls(),
        vec![
            ScriptCall::Load { id: "Cold.csx".into() },
            ScriptCall::Execute { id: "Cold.csx".into() },
        ]
    );
    assert_eq!(
        warm.calls(),
        vec![ScriptCall::Execute { id: "Warm.csx".into() }]
    );
}

#[tokio::test(start_paused = true)]
async fn skips_task_whose_load_fails_and_continues() {
    let scripts = FakeScriptDirectory::new();
    scripts.add_script("Before.csx");
    scripts.add_script("Broken.csx").fail_load(true);
    scripts.add_script("After.csx");
    let (_registry, snapshot) = tasks(&scripts, &["Before.csx", "Broken.csx", "After.csx"]);

    let report = run_pass(&snapshot, STEP).await;

    assert_eq!(ids(&report.started), vec!["Before.csx", "After.csx"]);
    assert_eq!(ids(&report.load_failed), vec!["Broken.csx"]);
    assert_eq!(scripts.executed(), vec!["Before.csx", "After.csx"]);
}

#[tokio::test(start_paused = true)]
async fn skips_missing_unsaved_and_running() {
    let scripts = FakeScriptDirectory::new();
    scripts.add_file("NoHandle.csx");
    scripts.add_script("Draft.csx").set_saved(false);
    scripts.add_script("Busy.csx").set_running(true);
    scripts.add_script("Ready.csx");
    let (_registry, snapshot) = tasks(
        &scripts,
        &["NoHandle.csx", "Draft.csx", "Busy.csx", "Ready.csx", "Gone.csx"],
    );

    let report = run_pass(&snapshot, STEP).await;

    assert_eq!(ids(&report.started), vec!["Ready.csx"]);
    assert_eq!(ids(&report.skipped_missing), vec!["NoHandle.csx", "Gone.csx"]);
    assert_eq!(ids(&report.skipped_unsaved), vec!["Draft.csx"]);
    assert_eq!(ids(&report.skipped_running), vec!["Busy.csx"]);
    assert_eq!(report.skipped(), 4);
    assert_eq!(scripts.executed(), vec!["Ready.csx"]);
}

#[tokio::test(start_paused = true)]
async fn waits_between_started_tasks_only() {
    let scripts = FakeScriptDirectory::new();
    scripts.add_script("A.csx");
    scripts.add_script("B.csx");
    let (_registry, snapshot) = tasks(&scripts, &["A.csx", "Missing.csx", "B.csx"]);

    let start = Instant::now();
    run_pass(&snapshot, STEP).await;

    assert_eq!(start.elapsed(), STEP * 2);
}

#[tokio::test(start_paused = true)]
async fn empty_pass_reports_nothing() {
    let report = run_pass(&[], STEP).await;
    assert_eq!(report, PassReport::default());
}
