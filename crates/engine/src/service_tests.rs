// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use autorun_adapters::{FakeHost, FakeScriptDirectory, InlineDispatch, ScriptCall};
use autorun_core::{FakeClock, SequentialIdGen, TaskStatus};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

pub(crate) type TestService =
    AutostartService<FakeScriptDirectory, FakeHost, FakeClock, SequentialIdGen>;

pub(crate) struct TestContext {
    pub dir: TempDir,
    pub service: TestService,
    pub scripts: FakeScriptDirectory,
    pub host: FakeHost,
}

impl TestContext {
    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("autostart.json")
    }

    pub fn executed(&self) -> Vec<String> {
        self.scripts.executed()
    }
}

/// Service whose store already lists `entries`, in order
pub(crate) fn setup(entries: &[&str]) -> TestContext {
    setup_with_delays(entries, Delays::default())
}

pub(crate) fn setup_with_delays(entries: &[&str], delays: Delays) -> TestContext {
    let dir = TempDir::new().unwrap();
    let store_path = dir.path().join("autostart.json");
    let clock = FakeClock::new();
    {
        let mut store = AutostartStore::load(&store_path);
        for id in entries {
            store.add(*id, &clock);
        }
    }

    let scripts = FakeScriptDirectory::new();
    let host = FakeHost::new();
    let service = AutostartService::new(
        AutostartConfig::new(store_path).with_delays(delays),
        AutostartDeps {
            directory: scripts.clone(),
            host: host.clone(),
            dispatch: Arc::new(InlineDispatch),
            ids: SequentialIdGen::new("pass"),
        },
        clock,
    );
    TestContext {
        dir,
        service,
        scripts,
        host,
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test]
async fn initialize_prunes_and_binds_without_executing() {
    let ctx = setup(&["Alive.csx", "Deleted.csx", "NoHandle.csx"]);
    ctx.scripts.add_script("Alive.csx");
    ctx.scripts.add_file("NoHandle.csx");

    let report = ctx.service.initialize().await.unwrap();

    assert_eq!(report.pruned, 1);
    assert_eq!(
        ctx.service.entries(),
        vec![ScriptId::new("Alive.csx"), ScriptId::new("NoHandle.csx")]
    );
    assert_eq!(ctx.service.find("Alive.csx").unwrap().status(), TaskStatus::Waiting);
    assert_eq!(ctx.service.find("NoHandle.csx").unwrap().status(), TaskStatus::Missing);
    assert!(ctx.scripts.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn connect_waits_for_settle_then_runs_pass() {
    let ctx = setup(&["A.csx", "B.csx"]);
    ctx.scripts.add_script("A.csx");
    ctx.scripts.add_script("B.csx");

    let pass = ctx.service.handle_event(SessionEvent::Connected).unwrap();

    tokio::time::sleep(ms(499)).await;
    assert!(ctx.executed().is_empty());

    let report = pass.await.unwrap().unwrap();
    assert_eq!(report.started, vec![ScriptId::new("A.csx"), ScriptId::new("B.csx")]);
    assert_eq!(ctx.executed(), vec!["A.csx", "B.csx"]);
}

#[tokio::test(start_paused = true)]
async fn connect_prunes_files_deleted_since_startup() {
    let ctx = setup(&["Keep.csx", "Doomed.csx"]);
    ctx.scripts.add_script("Keep.csx");
    ctx.scripts.add_script("Doomed.csx");
    ctx.service.initialize().await.unwrap();
    assert_eq!(ctx.service.tasks().len(), 2);

    ctx.scripts.delete("Doomed.csx");
    let report = ctx
        .service
        .handle_event(SessionEvent::Connected)
        .unwrap()
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.started, vec![ScriptId::new("Keep.csx")]);
    assert!(!ctx.service.is_autostart("Doomed.csx"));
    assert!(ctx.service.find("Doomed.csx").is_none());
    let saved = std::fs::read_to_string(ctx.store_path()).unwrap();
    assert!(!saved.contains("Doomed.csx"));
}

#[tokio::test(start_paused = true)]
async fn second_connect_supersedes_in_flight_pass() {
    let ctx = setup(&["Only.csx"]);
    ctx.scripts.add_script("Only.csx");

    let first = ctx.service.handle_event(SessionEvent::Connected).unwrap();
    tokio::time::sleep(ms(200)).await;
    let second = ctx.service.handle_event(SessionEvent::Connected).unwrap();

    assert!(first.await.unwrap_err().is_cancelled());
    second.await.unwrap().unwrap();
    assert_eq!(ctx.executed(), vec!["Only.csx"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_connects_leave_one_abortable_pass() {
    let delays = Delays {
        settle: ms(100),
        ..Delays::none()
    };
    for _ in 0..10 {
        let ctx = setup_with_delays(&["Race.csx"], delays);
        ctx.scripts.add_script("Race.csx");

        let barrier = Arc::new(std::sync::Barrier::new(2));
        let connects: Vec<_> = (0..2)
            .map(|_| {
                let service = ctx.service.clone();
                let barrier = Arc::clone(&barrier);
                let runtime = tokio::runtime::Handle::current();
                std::thread::spawn(move || {
                    let _guard = runtime.enter();
                    barrier.wait();
                    service.handle_event(SessionEvent::Connected).unwrap()
                })
            })
            .collect();
        let passes: Vec<_> = connects.into_iter().map(|t| t.join().unwrap()).collect();

        ctx.service.handle_event(SessionEvent::Disconnected);
        for pass in passes {
            assert!(pass.await.unwrap_err().is_cancelled());
        }
        tokio::time::sleep(ms(150)).await;
        assert!(ctx.executed().is_empty());
    }
}

#[tokio::test(start_paused = true)]
async fn disconnect_aborts_pass_before_it_starts() {
    let ctx = setup(&["A.csx"]);
    ctx.scripts.add_script("A.csx");

    let pass = ctx.service.handle_event(SessionEvent::Connected).unwrap();
    tokio::time::sleep(ms(100)).await;
    assert!(ctx.service.handle_event(SessionEvent::Disconnected).is_none());

    assert!(pass.await.unwrap_err().is_cancelled());
    tokio::time::sleep(ms(1000)).await;
    assert!(ctx.executed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn disconnect_mid_pass_stops_remaining_tasks() {
    let ctx = setup(&["First.csx", "Second.csx", "Third.csx"]);
    for id in ["First.csx", "Second.csx", "Third.csx"] {
        ctx.scripts.add_script(id);
    }

    let pass = ctx.service.handle_event(SessionEvent::Connected).unwrap();
    // Settle (500ms) has passed and the first task started
    tokio::time::sleep(ms(550)).await;
    ctx.service.handle_event(SessionEvent::Disconnected);

    assert!(pass.await.unwrap_err().is_cancelled());
    assert_eq!(ctx.executed(), vec!["First.csx"]);
}

#[tokio::test(start_paused = true)]
async fn run_drives_passes_from_event_channel() {
    let ctx = setup(&["Loop.csx"]);
    ctx.scripts.add_script("Loop.csx");
    let (tx, rx) = mpsc::channel(8);

    let service = ctx.service.clone();
    let runner = tokio::spawn(async move { service.run(rx).await });

    tx.send(SessionEvent::Connected).await.unwrap();
    tokio::time::sleep(ms(1000)).await;
    assert_eq!(ctx.executed(), vec!["Loop.csx"]);

    drop(tx);
    runner.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn running_tasks_are_not_started_twice() {
    let ctx = setup(&["Busy.csx"]);
    ctx.scripts.add_script("Busy.csx");

    let first = ctx.service.handle_event(SessionEvent::Connected).unwrap();
    first.await.unwrap().unwrap();
    let second = ctx.service.handle_event(SessionEvent::Connected).unwrap();
    let report = second.await.unwrap().unwrap();

    assert_eq!(report.skipped_running, vec![ScriptId::new("Busy.csx")]);
    assert_eq!(ctx.executed(), vec!["Busy.csx"]);
}

#[tokio::test]
async fn set_autostart_enables_and_disables() {
    let ctx = setup(&["Existing.csx"]);
    ctx.scripts.add_script("Existing.csx");
    ctx.scripts.add_script("New.csx");
    ctx.service.initialize().await.unwrap();
    let mut events = ctx.service.subscribe();

    assert!(ctx.service.set_autostart("New.csx", true).await);
    assert!(!ctx.service.set_autostart("new.CSX", true).await);
    assert!(ctx.service.is_autostart("NEW.csx"));
    assert_eq!(
        ctx.service.entries(),
        vec![ScriptId::new("Existing.csx"), ScriptId::new("New.csx")]
    );
    assert_eq!(events.try_recv().unwrap(), RegistryEvent::Added(ScriptId::new("New.csx")));

    assert!(ctx.service.set_autostart("Existing.csx", false).await);
    assert!(!ctx.service.is_autostart("Existing.csx"));
    assert_eq!(
        events.try_recv().unwrap(),
        RegistryEvent::Removed(ScriptId::new("Existing.csx"))
    );
    assert!(ctx.service.find("Existing.csx").is_none());
}

#[tokio::test]
async fn autostart_list_survives_restart_of_service() {
    let ctx = setup(&[]);
    ctx.scripts.add_script("Persist.csx");
    ctx.service.set_autostart("Persist.csx", true).await;

    let reloaded = AutostartService::new(
        AutostartConfig::new(ctx.store_path()),
        AutostartDeps {
            directory: ctx.scripts.clone(),
            host: ctx.host.clone(),
            dispatch: Arc::new(InlineDispatch),
            ids: SequentialIdGen::new("pass"),
        },
        FakeClock::new(),
    );

    assert!(reloaded.is_autostart("persist.csx"));
}

#[tokio::test]
async fn shutdown_cancels_running_tasks() {
    let ctx = setup(&["Running.csx", "Idle.csx"]);
    ctx.scripts.add_script("Running.csx").set_running(true);
    ctx.scripts.add_script("Idle.csx");
    ctx.service.initialize().await.unwrap();

    assert_eq!(ctx.service.shutdown(), 1);
    assert_eq!(
        ctx.scripts.calls(),
        vec![ScriptCall::Cancel {
            id: "Running.csx".into()
        }]
    );
}
