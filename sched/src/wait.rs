// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bookkeeping for an in-flight `Wait`.
//!
//! Rather than wrapping each child in its own supervising coroutine that
//! reports back to the parent (an owning tree of boxed coroutines
//! referencing their own parent is awkward under Rust's ownership model),
//! the scheduler keeps a flat `child -> parent` lookup and routes each
//! tracked child's completion to its [`WaitRecord`] directly. See
//! `scheduler.rs` for where that lookup is consulted.

use alloc::vec::Vec;

use walletrt_abi::TaskId;

/// State for one outstanding `Wait` syscall.
pub(crate) struct WaitRecord {
    pub(crate) parent: TaskId,
    pub(crate) spawned: Vec<TaskId>,
    pub(crate) finished: Vec<TaskId>,
    pub(crate) wait_for: u8,
    pub(crate) exit_others: bool,
}

impl WaitRecord {
    pub(crate) fn new(parent: TaskId, spawned: Vec<TaskId>, wait_for: u8, exit_others: bool) -> Self {
        WaitRecord {
            parent,
            spawned,
            finished: Vec::new(),
            wait_for,
            exit_others,
        }
    }

    /// Children that haven't reported a terminal outcome yet.
    pub(crate) fn still_running(&self) -> impl Iterator<Item = TaskId> + '_ {
        let finished = &self.finished;
        self.spawned
            .iter()
            .copied()
            .filter(move |c| !finished.contains(c))
    }

    /// Whether `wait_for` children have now finished.
    pub(crate) fn satisfied(&self) -> bool {
        self.finished.len() >= self.wait_for as usize
    }
}

/// What a tracked task's completion should be routed to: the `Wait` it was
/// spawned under, or the workflow supervisor (a foreground task has no
/// parent `Wait`, but completion routing is the same mechanism tagged
/// differently).
#[derive(Copy, Clone)]
pub(crate) enum CompletionTarget {
    WaitChild(TaskId),
    Foreground,
}
