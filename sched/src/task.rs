// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The task state-machine interface.
//!
//! An enum-of-suspend-reasons with a resume function per state: a task here
//! is a trait with a `resume` entry point that returns what it wants to do
//! next. Applications implement this trait (commonly as a small explicit
//! state machine) rather than the scheduler providing one.

use walletrt_abi::{Failure, Outcome, Value};

use crate::syscall::Syscall;

/// What a task does in response to being resumed.
pub enum Step {
    /// Suspend again, re-arming via `syscall`.
    Yield(Syscall),
    /// The "bare yield" sentinel: run again on the next loop iteration
    /// without registering any wait condition.
    Continue,
    /// The task has finished, successfully or otherwise.
    Done(Outcome),
}

/// An opaque, suspendable computation owned by the scheduler's task slab.
///
/// The scheduler never inspects a task's interior, only what it returns
/// from these three entry points.
pub trait Task {
    /// Resume the task with a value produced by whatever it was suspended
    /// on (a `Sleep` deadline, a `Select` message, a `Signal` payload, a
    /// `Wait` child's outcome, or [`Value::Unit`] on first entry).
    fn resume(&mut self, value: Value) -> Step;

    /// Resume the task by raising `failure` at its current suspend point,
    /// e.g. because a `Wait` it was inside is being torn down.
    fn fail(&mut self, failure: Failure) -> Step;

    /// Forcibly terminate the task, releasing any scoped resources it
    /// currently owns. Called instead of `resume`/`fail` when the task is
    /// being cancelled outright (`Wait::exit`, workflow teardown) rather
    /// than resumed with a value or a failure.
    fn close(&mut self);
}
