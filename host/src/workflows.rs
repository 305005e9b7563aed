// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Demo application tasks exercising the scheduler: an idle default screen
//! and a PIN-entry-shaped foreground workflow.
//!
//! There's no dedicated timeout syscall, so waiting for a touch within a
//! time budget is expressed as `Wait((Select(TOUCH), Sleep(budget)),
//! wait_for=1, exit_others=true)`.

use walletrt_abi::{Failure, Message, Value, TOUCH};
use walletrt_sched::{Signal, Step, Syscall, Task};

/// Wraps a single syscall as a one-shot task: yields it once, then finishes
/// with whatever it was resumed with. `Wait`'s children must themselves be
/// tasks, not bare syscalls, so this gives a syscall a minimal task body.
pub struct Once {
    syscall: Option<Syscall>,
}

impl Once {
    pub fn new(syscall: Syscall) -> Self {
        Once { syscall: Some(syscall) }
    }
}

impl Task for Once {
    fn resume(&mut self, value: Value) -> Step {
        match self.syscall.take() {
            Some(syscall) => Step::Yield(syscall),
            None => Step::Done(Ok(value)),
        }
    }

    fn fail(&mut self, failure: Failure) -> Step {
        Step::Done(Err(failure))
    }

    fn close(&mut self) {}
}

/// The idle default workflow: wakes up once a second and logs a heartbeat.
/// Runs forever; the workflow supervisor closes it the instant a foreground
/// workflow starts, and restarts a fresh one once none remain.
pub struct IdleWorkflow {
    ticks: u32,
}

impl IdleWorkflow {
    const TICK_US: u32 = 1_000_000;

    pub fn new() -> Self {
        IdleWorkflow { ticks: 0 }
    }
}

impl Task for IdleWorkflow {
    fn resume(&mut self, _value: Value) -> Step {
        self.ticks += 1;
        walletrt_abi::info!("idle", "heartbeat #{}", self.ticks);
        Step::Yield(Syscall::Sleep { delay_us: Self::TICK_US })
    }

    fn fail(&mut self, failure: Failure) -> Step {
        Step::Done(Err(failure))
    }

    fn close(&mut self) {
        walletrt_abi::debug!("idle", "closed after {} heartbeat(s)", self.ticks);
    }
}

/// A PIN-entry-shaped foreground workflow: wait for a confirming touch,
/// bounded by `timeout_us`. Resolves `Ok` if the touch arrives in time,
/// `Err(Failure::Cancelled)` on timeout.
pub struct PinEntryWorkflow {
    timeout_us: u32,
    started: bool,
    /// Notified with the final outcome once this workflow settles, so an
    /// unrelated task (here, [`StatusWatcher`]) can observe completion
    /// without being a `Wait` parent of this one.
    done: Signal,
}

impl PinEntryWorkflow {
    pub fn new(timeout_us: u32, done: Signal) -> Self {
        PinEntryWorkflow { timeout_us, started: false, done }
    }
}

impl Task for PinEntryWorkflow {
    fn resume(&mut self, value: Value) -> Step {
        if !self.started {
            self.started = true;
            walletrt_abi::info!("pin", "awaiting confirmation touch (timeout {}us)", self.timeout_us);
            let children: Vec<Box<dyn Task>> = vec![
                Box::new(Once::new(Syscall::Select { iface: TOUCH })),
                Box::new(Once::new(Syscall::Sleep { delay_us: self.timeout_us })),
            ];
            return Step::Yield(Syscall::Wait { children, wait_for: 1, exit_others: true });
        }

        match value {
            Value::Message(Message::Touch { event, .. }) => {
                walletrt_abi::info!("pin", "touch event {} confirms entry", event);
                self.done.send(Value::any(true));
                Step::Done(Ok(Value::Unit))
            }
            _ => {
                walletrt_abi::warning!("pin", "timed out waiting for confirmation");
                self.done.send(Value::any(false));
                Step::Done(Err(Failure::Cancelled))
            }
        }
    }

    fn fail(&mut self, failure: Failure) -> Step {
        self.done.send(Value::any(false));
        Step::Done(Err(failure))
    }

    fn close(&mut self) {
        walletrt_abi::debug!("pin", "entry closed externally");
    }
}

/// Awaits a single notification on a [`Signal`] and logs it. Stands in for
/// whatever part of the firmware cares about a workflow's outcome without
/// itself being the `Wait` parent driving that workflow.
pub struct StatusWatcher {
    signal: Signal,
    started: bool,
}

impl StatusWatcher {
    pub fn new(signal: Signal) -> Self {
        StatusWatcher { signal, started: false }
    }
}

impl Task for StatusWatcher {
    fn resume(&mut self, value: Value) -> Step {
        if !self.started {
            self.started = true;
            return Step::Yield(Syscall::Signal(self.signal.clone()));
        }
        let confirmed = value.downcast_ref::<bool>().copied().unwrap_or(false);
        walletrt_abi::info!("watcher", "pin entry outcome: confirmed={}", confirmed);
        Step::Done(Ok(Value::Unit))
    }

    fn fail(&mut self, failure: Failure) -> Step {
        Step::Done(Err(failure))
    }

    fn close(&mut self) {}
}
