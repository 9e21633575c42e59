// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Autorun daemon library
//!
//! Startup, configuration and shutdown for `autorund`.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod env;
pub mod lifecycle;

pub use lifecycle::{
    refresh_scripts, startup, Config, DaemonService, DaemonState, DelaysConfig, FileConfig,
    LifecycleError,
};
