// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Owns every live task behind a generation-stamped handle.

use alloc::boxed::Box;
use alloc::vec::Vec;

use walletrt_abi::TaskId;

use crate::task::Task;

enum Slot {
    Occupied { generation: u32, task: Box<dyn Task> },
    Vacant { generation: u32 },
}

/// A slab of boxed tasks indexed by [`TaskId`]. Reusing a freed slot bumps
/// its generation counter, so a handle captured before a task exited can
/// never be confused with whatever later task occupies the same index.
#[derive(Default)]
pub struct TaskSlab {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl TaskSlab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `task`, returning its freshly minted handle.
    pub fn insert(&mut self, task: Box<dyn Task>) -> TaskId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            let generation = match slot {
                Slot::Vacant { generation } => *generation,
                Slot::Occupied { .. } => unreachable!("free list points at an occupied slot"),
            };
            *slot = Slot::Occupied { generation, task };
            TaskId::new(index, generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot::Occupied { generation: 0, task });
            TaskId::new(index, 0)
        }
    }

    fn slot_matches(&self, id: TaskId) -> bool {
        matches!(
            self.slots.get(id.index() as usize),
            Some(Slot::Occupied { generation, .. }) if *generation == id.generation()
        )
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut dyn Task> {
        if !self.slot_matches(id) {
            return None;
        }
        match &mut self.slots[id.index() as usize] {
            Slot::Occupied { task, .. } => Some(task.as_mut()),
            Slot::Vacant { .. } => None,
        }
    }

    /// Removes and returns the task at `id`, bumping its slot's generation
    /// so the handle can't be reused. Returns `None` if `id` is stale.
    pub fn remove(&mut self, id: TaskId) -> Option<Box<dyn Task>> {
        if !self.slot_matches(id) {
            return None;
        }
        let index = id.index() as usize;
        let next_generation = id.generation().wrapping_add(1);
        let old = core::mem::replace(
            &mut self.slots[index],
            Slot::Vacant { generation: next_generation },
        );
        self.free.push(index as u32);
        match old {
            Slot::Occupied { task, .. } => Some(task),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.slot_matches(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walletrt_abi::{Failure, Outcome, Value};

    struct Noop;
    impl Task for Noop {
        fn resume(&mut self, _value: Value) -> crate::task::Step {
            crate::task::Step::Continue
        }
        fn fail(&mut self, _failure: Failure) -> crate::task::Step {
            crate::task::Step::Done(Ok(Value::Unit) as Outcome)
        }
        fn close(&mut self) {}
    }

    #[test]
    fn reused_slot_bumps_generation() {
        let mut slab = TaskSlab::new();
        let a = slab.insert(Box::new(Noop));
        assert!(slab.contains(a));

        slab.remove(a).unwrap();
        assert!(!slab.contains(a));

        let b = slab.insert(Box::new(Noop));
        assert_eq!(b.index(), a.index());
        assert_ne!(b.generation(), a.generation());
        assert!(!slab.contains(a));
        assert!(slab.contains(b));
    }

    #[test]
    fn distinct_indices_get_distinct_handles() {
        let mut slab = TaskSlab::new();
        let a = slab.insert(Box::new(Noop));
        let b = slab.insert(Box::new(Noop));
        assert_ne!(a.index(), b.index());
    }
}
