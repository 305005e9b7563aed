// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tasks paused on an interface, waiting for a message.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use walletrt_abi::{Interface, TaskId};

/// Maps each interface id to the ordered list of tasks currently `Select`ed
/// on it. Unbounded, unlike the time queue: there is no hard limit on how
/// many tasks can be waiting for I/O at once.
#[derive(Default)]
pub struct PausedTable {
    by_interface: BTreeMap<u16, Vec<TaskId>>,
}

impl PausedTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `task` as waiting on `iface`, behind any task already
    /// waiting there.
    pub fn pause(&mut self, iface: Interface, task: TaskId) {
        self.by_interface.entry(iface.0).or_default().push(task);
    }

    /// Removes and returns every task waiting on `iface`, in the order they
    /// registered. The interface's entry is left empty afterwards.
    pub fn drain(&mut self, iface: Interface) -> Vec<TaskId> {
        self.by_interface.remove(&iface.0).unwrap_or_default()
    }

    /// Removes the first occurrence of `task` from whichever interface list
    /// it's on, if any. Used by `Wait::exit` to cancel a child mid-`Select`.
    pub fn remove(&mut self, task: TaskId) -> bool {
        for tasks in self.by_interface.values_mut() {
            if let Some(pos) = tasks.iter().position(|&t| t == task) {
                tasks.remove(pos);
                return true;
            }
        }
        false
    }

    #[cfg(test)]
    pub(crate) fn waiting_on(&self, iface: Interface) -> &[TaskId] {
        self.by_interface
            .get(&iface.0)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
