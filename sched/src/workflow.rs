// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State for the default-vs-foreground workflow arbitration.
//!
//! This module only holds the registry; `start_default`/`close_default`/
//! `start_workflow` live on [`crate::Scheduler`] itself, since arbitrating
//! workflows means scheduling and closing tasks, which only the scheduler
//! can do.

use alloc::boxed::Box;

use walletrt_abi::TaskId;

use crate::task::Task;

/// Produces a fresh default task on demand, e.g. a new idle-screen
/// coroutine each time the default is (re)started.
pub trait DefaultFactory {
    fn create(&mut self) -> Box<dyn Task>;
}

impl<F: FnMut() -> Box<dyn Task>> DefaultFactory for F {
    fn create(&mut self) -> Box<dyn Task> {
        (self)()
    }
}

/// Tracks the one default task and the stack of transient foreground
/// tasks above it.
///
/// Invariant (enforced by `Scheduler`, once a factory has been set): at any
/// moment exactly one of (default running, ≥1 foreground running) holds.
#[derive(Default)]
pub struct WorkflowSupervisor {
    pub(crate) factory: Option<Box<dyn DefaultFactory>>,
    pub(crate) default_task: Option<TaskId>,
    pub(crate) foreground: alloc::vec::Vec<TaskId>,
}

impl WorkflowSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_default(&self) -> bool {
        self.default_task.is_some()
    }

    pub fn foreground_count(&self) -> usize {
        self.foreground.len()
    }
}
