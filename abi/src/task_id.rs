// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stable task handles.

use core::fmt;

/// A stable handle to a task owned by the scheduler's task slab.
///
/// An index + generation pair: the `index` names a slab slot, and
/// `generation` is bumped every time that slot is reused, so a handle
/// captured before a task exited can never be mistaken for whatever new
/// task later occupies the same slot.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TaskId {
    index: u32,
    generation: u32,
}

impl TaskId {
    /// Constructs a handle for slab slot `index` at `generation`.
    ///
    /// This is public so a task slab living outside this crate can mint
    /// handles, but it is not meant to be called by task bodies themselves;
    /// treat it as slab-internal.
    pub fn new(index: u32, generation: u32) -> Self {
        TaskId { index, generation }
    }

    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task#{}.{}", self.index, self.generation)
    }
}
