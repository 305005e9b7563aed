// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single-slot rendezvous between two tasks.
//!
//! `Signal::send` is called from *inside* another task's own `resume`, not
//! via a syscall yield: there is no `&mut Scheduler` available at that call
//! site. So a `Signal` doesn't reach into the scheduler's time queue
//! directly; it shares a small "ready" side channel (a queue owned by the
//! scheduler, handed out as an `Rc<RefCell<_>>`) that the scheduler drains
//! into the real time queue right after the step that touched it returns.
//! Nothing else runs in between in a single-threaded cooperative scheduler,
//! so this deferred drain is observably identical to an immediate push.

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use core::cell::RefCell;

use walletrt_abi::{TaskId, Value};

pub(crate) type ReadyQueue = Rc<RefCell<VecDeque<(TaskId, Value)>>>;

struct SignalInner {
    task: Option<TaskId>,
    value: Option<Value>,
    ready: ReadyQueue,
}

impl SignalInner {
    /// If both slots are occupied, hands the value to the task via the
    /// ready queue and clears both slots.
    fn try_deliver(&mut self) {
        if self.task.is_some() && self.value.is_some() {
            let task = self.task.take().expect("just checked");
            let value = self.value.take().expect("just checked");
            self.ready.borrow_mut().push_back((task, value));
        }
    }
}

/// A rendezvous slot holding at most one waiting task and at most one
/// pending value.
///
/// Cheaply cloneable: clones share the same underlying slot, so a `Signal`
/// can be handed to multiple task bodies by value while still referring to
/// one rendezvous.
#[derive(Clone)]
pub struct Signal {
    inner: Rc<RefCell<SignalInner>>,
}

impl Signal {
    pub(crate) fn new(ready: ReadyQueue) -> Self {
        Signal {
            inner: Rc::new(RefCell::new(SignalInner {
                task: None,
                value: None,
                ready,
            })),
        }
    }

    /// Arms the signal with `task`, to be resumed once a value arrives (or
    /// immediately, if a value is already buffered).
    pub(crate) fn handle(&self, task: TaskId) {
        let mut inner = self.inner.borrow_mut();
        inner.task = Some(task);
        inner.try_deliver();
    }

    /// Delivers `value` to whichever task is currently awaiting this
    /// signal. If no task is awaiting it yet, the value is buffered; a
    /// second `send` before any task awaits overwrites the first.
    pub fn send(&self, value: Value) {
        let mut inner = self.inner.borrow_mut();
        inner.value = Some(value);
        inner.try_deliver();
    }

    /// Whether neither slot is currently occupied. Exposed for tests.
    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        let inner = self.inner.borrow();
        inner.task.is_none() && inner.value.is_none()
    }
}
