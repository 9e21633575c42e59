// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! autorun-core: domain types shared by the autorun crates

pub mod clock;
pub mod entry;
pub mod event;
pub mod id;
pub mod script_id;
pub mod status;

pub use clock::{Clock, FakeClock, SystemClock};
pub use entry::AutostartEntry;
pub use event::{PassId, SessionEvent};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use script_id::ScriptId;
pub use status::{HandleState, ScriptStatus, TaskStatus};
