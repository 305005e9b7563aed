// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scheduler-level error types.
//!
//! Plain enums with a manual `Display`, not a `thiserror` derive. `anyhow`
//! shows up only in the `host` binary, which is ordinary `std` code.

use core::fmt;

use walletrt_abi::TaskId;

/// A task yielded something that is neither a recognized [`crate::Syscall`]
/// nor the bare "yield now" sentinel.
///
/// Always a bug in the task, never in the scheduler. The step that produced
/// it is logged at `ERROR` and the task is dropped; the loop continues.
#[derive(Copy, Clone, Debug)]
pub struct ProtocolError {
    pub task: TaskId,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} yielded neither a syscall nor a bare continue", self.task)
    }
}

/// Errors a [`crate::Scheduler`] can report back to its caller.
#[derive(Copy, Clone, Debug)]
pub enum SchedulerError {
    /// The time queue is at capacity. There is no safe recovery: an
    /// unschedulable task means a livelocked system, so callers are expected
    /// to treat this as fatal rather than retry.
    QueueFull,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::QueueFull => write!(f, "time queue is at capacity"),
        }
    }
}
