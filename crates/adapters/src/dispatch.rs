// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Marshaling work onto the designated UI context
//!
//! Observable state is only mutated from one context. Code running
//! anywhere else hands closures to a [`UiDispatch`] instead of touching
//! that state directly.

use std::io;
use std::thread;
use tokio::sync::{mpsc, oneshot};

/// Unit of work run on the UI context.
pub type UiJob = Box<dyn FnOnce() + Send + 'static>;

/// Runs closures on a single designated context.
pub trait UiDispatch: Send + Sync + 'static {
    /// Queue `job` without waiting for it (invokeAsync).
    fn post(&self, job: UiJob);
}

/// Run `f` on the UI context and wait for its result (invoke).
///
/// Returns `None` if the context shut down before running `f`.
pub async fn invoke<D, F, R>(dispatch: &D, f: F) -> Option<R>
where
    D: UiDispatch + ?Sized,
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    dispatch.post(Box::new(move || {
        let _ = tx.send(f());
    }));
    rx.await.ok()
}

/// Dispatcher backed by a dedicated OS thread draining a queue.
///
/// Jobs run one at a time in submission order. The thread exits once
/// every clone of the dispatcher is dropped.
#[derive(Clone)]
pub struct ChannelDispatch {
    tx: mpsc::UnboundedSender<UiJob>,
}

impl ChannelDispatch {
    pub fn spawn(name: &str) -> io::Result<(Self, thread::JoinHandle<()>)> {
        let (tx, mut rx) = mpsc::unbounded_channel::<UiJob>();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                while let Some(job) = rx.blocking_recv() {
                    job();
                }
                tracing::debug!("ui dispatch loop exited");
            })?;
        Ok((Self { tx }, handle))
    }
}

impl UiDispatch for ChannelDispatch {
    fn post(&self, job: UiJob) {
        if self.tx.send(job).is_err() {
            tracing::warn!("ui dispatch loop closed, dropping job");
        }
    }
}

/// Dispatcher that runs jobs immediately on the calling thread.
///
/// Suitable when the caller already is the UI context, and for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatch;

impl UiDispatch for InlineDispatch {
    fn post(&self, job: UiJob) {
        job();
    }
}

impl<T: UiDispatch + ?Sized> UiDispatch for std::sync::Arc<T> {
    fn post(&self, job: UiJob) {
        (**self).post(job);
    }
}

/// Dispatcher that queues jobs until the test runs them.
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone, Default)]
pub struct ManualDispatch {
    queue: std::sync::Arc<parking_lot::Mutex<Vec<UiJob>>>,
}

#[cfg(any(test, feature = "test-support"))]
impl ManualDispatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run queued jobs (including ones they queue) until the queue is empty.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let jobs: Vec<UiJob> = std::mem::take(&mut *self.queue.lock());
            if jobs.is_empty() {
                return ran;
            }
            for job in jobs {
                job();
                ran += 1;
            }
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl UiDispatch for ManualDispatch {
    fn post(&self, job: UiJob) {
        self.queue.lock().push(job);
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
