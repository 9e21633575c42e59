// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Autorun autostart engine

mod config;
mod controller;
mod reconcile;
mod registry;
mod scheduler;
mod service;

pub use config::{AutostartConfig, Delays};
pub use controller::{RestartOutcome, TaskCommand};
pub use reconcile::{reconcile, ReconcileReport};
pub use registry::{AutostartTask, RegistryEvent, TaskRegistry};
pub use scheduler::{run_pass, PassReport};
pub use service::{AutostartDeps, AutostartService};
