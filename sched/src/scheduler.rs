// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The scheduler: owns every piece of state a task can suspend into, and
//! drives the main loop that steps tasks in response to timeouts and
//! incoming messages.

use alloc::boxed::Box;
use alloc::collections::{BTreeMap, VecDeque};
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use walletrt_abi::{ticks_diff, Deadline, Failure, Interface, Message, Outcome, TaskId, Value};

use crate::clock::Clock;
use crate::config::SchedulerConfig;
use crate::error::{ProtocolError, SchedulerError};
use crate::message_source::MessageSource;
use crate::paused_table::PausedTable;
use crate::signal::{ReadyQueue, Signal};
use crate::slab::TaskSlab;
use crate::syscall::Syscall;
use crate::task::{Step, Task};
use crate::time_queue::TimeQueue;
use crate::wait::{CompletionTarget, WaitRecord};
use crate::workflow::{DefaultFactory, WorkflowSupervisor};

/// Default time-queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Upper bound on how long `run_once` blocks in the message source when the
/// time queue is empty.
pub const MAX_SELECT_DELAY: u32 = 1_000_000;

/// Owns the time queue, the paused table, every live task, and the
/// workflow registry. `CAP` is the time queue's compile-time capacity.
pub struct Scheduler<const CAP: usize = DEFAULT_QUEUE_CAPACITY> {
    slab: TaskSlab,
    time_queue: TimeQueue<CAP>,
    paused: PausedTable,
    waits: BTreeMap<TaskId, WaitRecord>,
    completion_routes: BTreeMap<TaskId, CompletionTarget>,
    ready: ReadyQueue,
    workflows: WorkflowSupervisor,
    max_select_delay_us: u32,
    after_step_hook: Option<Box<dyn FnMut()>>,
}

impl<const CAP: usize> Scheduler<CAP> {
    pub fn new(config: SchedulerConfig) -> Self {
        assert_eq!(
            config.queue_capacity, CAP,
            "SchedulerConfig::queue_capacity ({}) must match Scheduler<CAP>'s CAP ({})",
            config.queue_capacity, CAP
        );
        walletrt_abi::log::set_level(config.initial_log_level);
        Scheduler {
            slab: TaskSlab::new(),
            time_queue: TimeQueue::new(),
            paused: PausedTable::new(),
            waits: BTreeMap::new(),
            completion_routes: BTreeMap::new(),
            ready: Rc::new(RefCell::new(VecDeque::new())),
            workflows: WorkflowSupervisor::new(),
            max_select_delay_us: config.max_select_delay_us,
            after_step_hook: None,
        }
    }

    /// Installs a hook run after every individual task step (used on the
    /// host to refresh a display after each frame-producing step).
    pub fn set_after_step_hook(&mut self, hook: impl FnMut() + 'static) {
        self.after_step_hook = Some(Box::new(hook));
    }

    /// Mints a new rendezvous [`Signal`] sharing this scheduler's ready
    /// side-channel.
    pub fn new_signal(&self) -> Signal {
        Signal::new(self.ready.clone())
    }

    /// Entries currently sitting in the time queue (not the total live task
    /// count, which also includes tasks paused on an interface or inside a
    /// `Wait`).
    pub fn queued_task_count(&self) -> usize {
        self.time_queue.len()
    }

    // --- task lifecycle -------------------------------------------------

    /// Schedules a freshly created task to start `delay_us` microseconds
    /// from `now`, resumed initially with `value`.
    pub fn schedule_task(
        &mut self,
        task: Box<dyn Task>,
        now: Deadline,
        value: Value,
        delay_us: u32,
    ) -> Result<TaskId, SchedulerError> {
        let id = self.slab.insert(task);
        let deadline = now.plus_us(delay_us);
        match self.time_queue.push(deadline, id, value) {
            Ok(()) => Ok(id),
            Err(err) => {
                self.slab.remove(id);
                Err(err)
            }
        }
    }

    /// Removes `task` from the time queue, if present. A no-op if it
    /// isn't queued there (e.g. it's paused on an interface instead).
    pub fn unschedule_task(&mut self, task: TaskId) -> bool {
        self.time_queue.remove_task(task)
    }

    /// Closes `id` outright. If `id` is itself suspended inside a `Wait`
    /// (e.g. the default task, closed here when a foreground workflow
    /// starts), that `Wait`'s still-running children are exited first:
    /// cancelling a `Wait`'s parent fans out to its children before the
    /// parent itself is torn down.
    fn close_task(&mut self, id: TaskId) {
        if let Some(record) = self.waits.remove(&id) {
            self.exit_wait(&record);
        }
        self.paused.remove(id);
        self.time_queue.remove_task(id);
        self.completion_routes.remove(&id);
        if let Some(t) = self.slab.get_mut(id) {
            t.close();
        }
        self.slab.remove(id);
    }

    // --- workflow supervisor ---------------------------------------------

    /// Installs `factory` and starts the first default task.
    pub fn start_default(&mut self, now: Deadline, factory: impl FnMut() -> Box<dyn Task> + 'static) {
        let mut factory: Box<dyn DefaultFactory> = Box::new(factory);
        let task = factory.create();
        let id = self.slab.insert(task);
        let _ = self.time_queue.push(now, id, Value::Unit);
        self.workflows.factory = Some(factory);
        self.workflows.default_task = Some(id);
    }

    /// Closes the running default task, if any.
    pub fn close_default(&mut self) {
        if let Some(id) = self.workflows.default_task.take() {
            self.close_task(id);
        }
    }

    /// Closes the default (if running) and starts `task` as a foreground
    /// workflow. The default is automatically restarted once no
    /// foreground workflow remains.
    pub fn start_workflow(&mut self, now: Deadline, task: Box<dyn Task>) -> TaskId {
        self.close_default();
        let id = self.slab.insert(task);
        let _ = self.time_queue.push(now, id, Value::Unit);
        self.workflows.foreground.push(id);
        self.completion_routes.insert(id, CompletionTarget::Foreground);
        id
    }

    pub fn workflows(&self) -> &WorkflowSupervisor {
        &self.workflows
    }

    // --- the step engine --------------------------------------------------

    /// Advances `task` by one step: resumes it with `resume`, then acts on
    /// whatever it yields. Recurses (through `finish_task`) when a task's
    /// completion wakes up a `Wait` parent or the workflow supervisor, so
    /// one external event can cascade through several logical steps before
    /// `run_once` returns: nothing else runs between a completion and its
    /// parent's resumption.
    fn step(&mut self, task: TaskId, now: Deadline, resume: Outcome) {
        let Some(handle) = self.slab.get_mut(task) else {
            return;
        };
        let result = match resume {
            Ok(value) => handle.resume(value),
            Err(failure) => handle.fail(failure),
        };

        match result {
            Step::Done(outcome) => self.finish_task(task, now, outcome),
            Step::Continue => match self.time_queue.push(now, task, Value::Unit) {
                Ok(()) => {}
                Err(_) => {
                    walletrt_abi::critical!(
                        "sched",
                        "time queue exhausted rescheduling a bare-yield task; dropping it"
                    );
                    self.finish_task(task, now, Err(Failure::Cancelled));
                }
            },
            Step::Yield(syscall) => self.handle_syscall(task, now, syscall),
        }

        if let Some(hook) = &mut self.after_step_hook {
            hook();
        }
    }

    fn handle_syscall(&mut self, task: TaskId, now: Deadline, syscall: Syscall) {
        match syscall {
            Syscall::Sleep { delay_us } => {
                let deadline = now.plus_us(delay_us);
                if self.time_queue.push(deadline, task, Value::Deadline(deadline)).is_err() {
                    walletrt_abi::critical!("sched", "time queue exhausted arming a sleep; dropping task");
                    self.finish_task(task, now, Err(Failure::Cancelled));
                }
            }
            Syscall::Select { iface } => {
                self.paused.pause(iface, task);
            }
            Syscall::Signal(signal) => {
                signal.handle(task);
            }
            Syscall::Wait { children, wait_for, exit_others } => {
                self.start_wait(task, now, children, wait_for, exit_others);
            }
        }
    }

    fn start_wait(
        &mut self,
        parent: TaskId,
        now: Deadline,
        children: Vec<Box<dyn Task>>,
        wait_for: u8,
        exit_others: bool,
    ) {
        // A `Wait` that can never be satisfied is a malformed yield from the
        // parent task, not a scheduler condition: the same class of bug a
        // protocol failure covers, just caught here instead of at a generic
        // "unrecognized yield" arm, since this encoding's `Syscall` enum
        // makes that arm unreachable by construction.
        if wait_for == 0 || wait_for as usize > children.len() {
            let err = ProtocolError { task: parent };
            walletrt_abi::error!("sched", "{err}");
            for mut child in children {
                child.close();
            }
            self.step(parent, now, Err(Failure::Cancelled));
            return;
        }

        let mut spawned = Vec::with_capacity(children.len());
        for child in children {
            let id = self.slab.insert(child);
            spawned.push(id);
            let _ = self.time_queue.push(now, id, Value::Unit);
            self.completion_routes.insert(id, CompletionTarget::WaitChild(parent));
        }
        self.waits.insert(parent, WaitRecord::new(parent, spawned, wait_for, exit_others));
    }

    fn finish_task(&mut self, task: TaskId, now: Deadline, outcome: Outcome) {
        match &outcome {
            Ok(_) => walletrt_abi::debug!("sched", "{:?} finished", task),
            Err(Failure::Cancelled) => walletrt_abi::debug!("sched", "{:?} cancelled", task),
            Err(Failure::Raised(_)) => walletrt_abi::error!("sched", "{:?} raised a failure", task),
        }

        // Defensive: a task that just produced a terminal outcome should
        // already be absent from both structures (invariant I1), but
        // removing unconditionally costs nothing and keeps that invariant
        // true even if a future syscall arm forgets to re-arm correctly.
        self.paused.remove(task);
        self.time_queue.remove_task(task);
        self.slab.remove(task);

        if let Some(target) = self.completion_routes.remove(&task) {
            match target {
                CompletionTarget::WaitChild(parent) => self.on_wait_child_finished(parent, task, now, outcome),
                CompletionTarget::Foreground => self.on_foreground_finished(task, now),
            }
        }
    }

    fn on_wait_child_finished(&mut self, parent: TaskId, child: TaskId, now: Deadline, outcome: Outcome) {
        let Some(record) = self.waits.get_mut(&parent) else {
            return;
        };
        record.finished.push(child);
        let is_failure = outcome.is_err();

        if record.satisfied() || is_failure {
            let record = self.waits.remove(&parent).expect("just looked it up");
            if record.exit_others {
                self.exit_wait(&record);
            }
            self.step(parent, now, outcome);
        }
    }

    /// `Wait::exit`: close every child that hasn't already reported a
    /// terminal outcome.
    fn exit_wait(&mut self, record: &WaitRecord) {
        for child in record.still_running() {
            self.close_task(child);
        }
    }

    fn on_foreground_finished(&mut self, task: TaskId, now: Deadline) {
        self.workflows.foreground.retain(|&t| t != task);
        if self.workflows.foreground.is_empty() {
            if let Some(factory) = &mut self.workflows.factory {
                let fresh = factory.create();
                let id = self.slab.insert(fresh);
                let _ = self.time_queue.push(now, id, Value::Unit);
                self.workflows.default_task = Some(id);
            }
        }
    }

    /// Cancels a `Wait`'s parent from the outside: closes its still-running
    /// children, then propagates cancellation to the parent itself.
    pub fn cancel_wait(&mut self, parent: TaskId, now: Deadline) {
        if let Some(record) = self.waits.remove(&parent) {
            self.exit_wait(&record);
        }
        self.step(parent, now, Err(Failure::Cancelled));
    }

    fn drain_ready(&mut self, now: Deadline) {
        let items: Vec<(TaskId, Value)> = {
            let mut queue = self.ready.borrow_mut();
            queue.drain(..).collect()
        };
        for (task, value) in items {
            let _ = self.time_queue.push(now, task, value);
        }
    }

    // --- the main loop ------------------------------------------------

    /// Runs exactly one iteration: deliver one message (to every task
    /// paused on its interface) or service one expired deadline.
    pub fn run_once<M: MessageSource, C: Clock>(&mut self, messages: &mut M, clock: &C) {
        let now = clock.now();
        self.drain_ready(now);

        let delay: i32 = match self.time_queue.peektime() {
            Some(t) => ticks_diff(t, now),
            None => self.max_select_delay_us as i32,
        };

        match messages.select(delay) {
            Some((iface, message)) => self.deliver(iface, message, clock),
            None => self.service_timeout(clock),
        }
    }

    fn deliver<C: Clock>(&mut self, iface: Interface, message: Message, clock: &C) {
        let now = clock.now();
        for task in self.paused.drain(iface) {
            self.step(task, now, Ok(Value::Message(message.clone())));
        }
    }

    fn service_timeout<C: Clock>(&mut self, clock: &C) {
        let now = clock.now();
        if let Some((_deadline, task, value)) = self.time_queue.pop() {
            self.step(task, now, Ok(value));
        }
    }

    /// Runs forever. Never returns; the host binary's entry point and real
    /// firmware both call this directly.
    pub fn run_forever<M: MessageSource, C: Clock>(&mut self, messages: &mut M, clock: &C) -> ! {
        loop {
            self.run_once(messages, clock);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test_support::ManualClock;

    struct FakeSource {
        pending: VecDeque<(Interface, Message)>,
    }

    impl FakeSource {
        fn new() -> Self {
            FakeSource { pending: VecDeque::new() }
        }

        fn push(&mut self, iface: Interface, message: Message) {
            self.pending.push_back((iface, message));
        }
    }

    impl MessageSource for FakeSource {
        fn select(&mut self, _timeout_us: i32) -> Option<(Interface, Message)> {
            self.pending.pop_front()
        }
    }

    fn touch(event: u8) -> Message {
        Message::Touch { event, x: 1, y: 2 }
    }

    /// A task that yields `Sleep(delay_us)` on its first resume and records
    /// the deadline it's woken with on its second.
    struct SleepOnce {
        delay_us: u32,
        started: bool,
        result: Rc<RefCell<Option<Deadline>>>,
    }

    impl SleepOnce {
        fn new(delay_us: u32) -> (Self, Rc<RefCell<Option<Deadline>>>) {
            let result = Rc::new(RefCell::new(None));
            (SleepOnce { delay_us, started: false, result: result.clone() }, result)
        }
    }

    impl Task for SleepOnce {
        fn resume(&mut self, value: Value) -> Step {
            if !self.started {
                self.started = true;
                Step::Yield(Syscall::Sleep { delay_us: self.delay_us })
            } else {
                if let Value::Deadline(d) = value {
                    *self.result.borrow_mut() = Some(d);
                }
                Step::Done(Ok(Value::Unit))
            }
        }
        fn fail(&mut self, failure: Failure) -> Step {
            Step::Done(Err(failure))
        }
        fn close(&mut self) {}
    }

    /// A task that yields `Select(iface)` on its first resume, then
    /// forwards whatever it's resumed with as its own return value and
    /// (optionally) logs a marker so tests can observe delivery order.
    struct SelectOnce {
        iface: Interface,
        started: bool,
        marker: u8,
        log: Option<Rc<RefCell<Vec<u8>>>>,
    }

    impl SelectOnce {
        fn new(iface: Interface) -> Self {
            SelectOnce { iface, started: false, marker: 0, log: None }
        }

        fn with_log(iface: Interface, marker: u8, log: Rc<RefCell<Vec<u8>>>) -> Self {
            SelectOnce { iface, started: false, marker, log: Some(log) }
        }
    }

    impl Task for SelectOnce {
        fn resume(&mut self, value: Value) -> Step {
            if !self.started {
                self.started = true;
                Step::Yield(Syscall::Select { iface: self.iface })
            } else {
                if let Some(log) = &self.log {
                    log.borrow_mut().push(self.marker);
                }
                Step::Done(Ok(value))
            }
        }
        fn fail(&mut self, failure: Failure) -> Step {
            Step::Done(Err(failure))
        }
        fn close(&mut self) {}
    }

    /// A one-shot task that sends a value on a signal and finishes
    /// immediately, modelling "task B does `s.send(value)`" as a plain
    /// synchronous action inside a step.
    struct SignalSender {
        signal: Signal,
        value: Option<Value>,
    }

    impl Task for SignalSender {
        fn resume(&mut self, _value: Value) -> Step {
            self.signal.send(self.value.take().expect("sends exactly once"));
            Step::Done(Ok(Value::Unit))
        }
        fn fail(&mut self, failure: Failure) -> Step {
            Step::Done(Err(failure))
        }
        fn close(&mut self) {}
    }

    /// A task that yields `Signal(signal)` on its first resume and records
    /// whatever it's resumed with on its second.
    struct SignalOnce {
        signal: Signal,
        started: bool,
        result: Rc<RefCell<Option<Value>>>,
    }

    impl Task for SignalOnce {
        fn resume(&mut self, value: Value) -> Step {
            if !self.started {
                self.started = true;
                Step::Yield(Syscall::Signal(self.signal.clone()))
            } else {
                *self.result.borrow_mut() = Some(value);
                Step::Done(Ok(Value::Unit))
            }
        }
        fn fail(&mut self, failure: Failure) -> Step {
            Step::Done(Err(failure))
        }
        fn close(&mut self) {}
    }

    /// A task that yields `Wait(children, wait_for, exit_others)` on its
    /// first resume and records the outcome it's resumed/failed with on
    /// its second.
    struct WaitOnce {
        started: bool,
        children: Option<Vec<Box<dyn Task>>>,
        wait_for: u8,
        exit_others: bool,
        result: Rc<RefCell<Option<Outcome>>>,
    }

    impl Task for WaitOnce {
        fn resume(&mut self, value: Value) -> Step {
            if !self.started {
                self.started = true;
                let children = self.children.take().expect("children set on construction");
                Step::Yield(Syscall::Wait { children, wait_for: self.wait_for, exit_others: self.exit_others })
            } else {
                *self.result.borrow_mut() = Some(Ok(value));
                Step::Done(Ok(Value::Unit))
            }
        }
        fn fail(&mut self, failure: Failure) -> Step {
            *self.result.borrow_mut() = Some(Err(failure));
            Step::Done(Ok(Value::Unit))
        }
        fn close(&mut self) {}
    }

    /// Raises on its very first step.
    struct CrashOnce;

    impl Task for CrashOnce {
        fn resume(&mut self, _value: Value) -> Step {
            Step::Done(Err(Failure::raised("boom")))
        }
        fn fail(&mut self, failure: Failure) -> Step {
            Step::Done(Err(failure))
        }
        fn close(&mut self) {}
    }

    fn scheduler8() -> Scheduler<8> {
        Scheduler::new(SchedulerConfig::new().queue_capacity(8))
    }

    #[test]
    fn two_sleepers_resume_in_deadline_order() {
        let clock = ManualClock::new(0);
        let mut source = FakeSource::new();
        let mut sched = scheduler8();

        let (a, a_result) = SleepOnce::new(1000);
        let (b, b_result) = SleepOnce::new(500);
        sched.schedule_task(Box::new(a), clock.now(), Value::Unit, 0).unwrap();
        sched.schedule_task(Box::new(b), clock.now(), Value::Unit, 0).unwrap();

        // Kick both off the ground: each's first step just arms its sleep.
        sched.run_once(&mut source, &clock);
        sched.run_once(&mut source, &clock);

        clock.set(500);
        sched.run_once(&mut source, &clock);
        assert_eq!(*b_result.borrow(), Some(Deadline(500)));
        assert!(a_result.borrow().is_none());

        clock.set(1000);
        sched.run_once(&mut source, &clock);
        assert_eq!(*a_result.borrow(), Some(Deadline(1000)));
    }

    #[test]
    fn multi_waiter_fan_in_resumes_in_registration_order() {
        let clock = ManualClock::new(0);
        let mut source = FakeSource::new();
        let mut sched = scheduler8();
        let iface = Interface(42);
        let log = Rc::new(RefCell::new(Vec::new()));

        for marker in 0..3u8 {
            let task = SelectOnce::with_log(iface, marker, log.clone());
            sched.schedule_task(Box::new(task), clock.now(), Value::Unit, 0).unwrap();
        }
        // Arm all three Selects.
        for _ in 0..3 {
            sched.run_once(&mut source, &clock);
        }

        source.push(iface, Message::UsbReport(Default::default()));
        sched.run_once(&mut source, &clock);

        assert_eq!(*log.borrow(), alloc::vec![0, 1, 2]);
    }

    #[test]
    fn race_between_sleep_and_select_cancels_the_loser() {
        let clock = ManualClock::new(0);
        let mut source = FakeSource::new();
        let mut sched = scheduler8();

        let result = Rc::new(RefCell::new(None));
        let sleep_child: Box<dyn Task> = Box::new(SleepOnce::new(1000).0);
        let select_child: Box<dyn Task> = Box::new(SelectOnce::new(walletrt_abi::TOUCH));
        let parent = WaitOnce {
            started: false,
            children: Some(alloc::vec![sleep_child, select_child]),
            wait_for: 1,
            exit_others: true,
            result: result.clone(),
        };
        sched.schedule_task(Box::new(parent), clock.now(), Value::Unit, 0).unwrap();

        // Start the parent (yields Wait), then let each child take its own
        // first step (sleep arms at +1000, select arms on TOUCH).
        sched.run_once(&mut source, &clock);
        sched.run_once(&mut source, &clock);
        sched.run_once(&mut source, &clock);
        assert_eq!(sched.queued_task_count(), 1); // only the sleeping child

        clock.set(100);
        source.push(walletrt_abi::TOUCH, touch(walletrt_abi::TOUCH_START));
        sched.run_once(&mut source, &clock);

        match result.borrow().as_ref().expect("parent resumed") {
            Ok(Value::Message(Message::Touch { event, .. })) => {
                assert_eq!(*event, walletrt_abi::TOUCH_START)
            }
            other => panic!("unexpected outcome: {:?}", other.is_ok()),
        }
        assert_eq!(sched.queued_task_count(), 0); // sleeping child was exited
    }

    #[test]
    fn signal_send_before_await_and_after_are_both_delivered_next_iteration() {
        let clock = ManualClock::new(0);
        let mut source = FakeSource::new();
        let mut sched = scheduler8();
        let signal = sched.new_signal();
        let result = Rc::new(RefCell::new(None));

        let receiver = SignalOnce { signal: signal.clone(), started: false, result: result.clone() };
        let sender = SignalSender { signal: signal.clone(), value: Some(Value::any(7u32)) };
        sched.schedule_task(Box::new(receiver), clock.now(), Value::Unit, 0).unwrap();
        sched.schedule_task(Box::new(sender), clock.now(), Value::Unit, 0).unwrap();

        sched.run_once(&mut source, &clock); // receiver arms the signal
        assert!(!signal.is_idle());
        sched.run_once(&mut source, &clock); // sender delivers into the ready queue
        assert!(signal.is_idle());

        sched.run_once(&mut source, &clock); // next iteration: receiver resumes
        let got = result.borrow();
        assert_eq!(*got.as_ref().unwrap().downcast_ref::<u32>().unwrap(), 7);
    }

    #[test]
    fn workflow_handover_restarts_default_after_foreground_completes() {
        struct Idle {
            id: u32,
            closed: Rc<RefCell<Option<u32>>>,
        }
        impl Task for Idle {
            fn resume(&mut self, _value: Value) -> Step {
                Step::Continue
            }
            fn fail(&mut self, failure: Failure) -> Step {
                Step::Done(Err(failure))
            }
            fn close(&mut self) {
                *self.closed.borrow_mut() = Some(self.id);
            }
        }
        struct ForegroundOnce;
        impl Task for ForegroundOnce {
            fn resume(&mut self, _value: Value) -> Step {
                Step::Done(Ok(Value::Unit))
            }
            fn fail(&mut self, failure: Failure) -> Step {
                Step::Done(Err(failure))
            }
            fn close(&mut self) {}
        }

        let clock = ManualClock::new(0);
        let mut source = FakeSource::new();
        let mut sched = scheduler8();

        let created = Rc::new(RefCell::new(0u32));
        let closed = Rc::new(RefCell::new(None));
        let factory = {
            let created = created.clone();
            let closed = closed.clone();
            move || -> Box<dyn Task> {
                let mut n = created.borrow_mut();
                *n += 1;
                Box::new(Idle { id: *n, closed: closed.clone() })
            }
        };

        sched.start_default(clock.now(), factory);
        assert_eq!(*created.borrow(), 1);
        assert!(sched.workflows().has_default());

        sched.run_once(&mut source, &clock); // default just keeps yielding Continue

        sched.start_workflow(clock.now(), Box::new(ForegroundOnce));
        assert_eq!(*closed.borrow(), Some(1));
        assert!(!sched.workflows().has_default());
        assert_eq!(sched.workflows().foreground_count(), 1);

        sched.run_once(&mut source, &clock); // foreground task finishes
        assert_eq!(*created.borrow(), 2);
        assert!(sched.workflows().has_default());
        assert_eq!(sched.workflows().foreground_count(), 0);
    }

    #[test]
    fn closing_a_waiting_parent_exits_its_still_running_children() {
        // The default task is itself suspended inside a `Wait` (e.g. idling
        // on "whichever comes first: a button or a timeout") when a
        // foreground workflow starts and `close_default` tears it down. That
        // must fan out to the Wait's still-running children instead of
        // leaving them orphaned in the time queue.
        let clock = ManualClock::new(0);
        let mut source = FakeSource::new();
        let mut sched = scheduler8();

        struct ClosingChild {
            closed: Rc<RefCell<bool>>,
        }
        impl Task for ClosingChild {
            fn resume(&mut self, _value: Value) -> Step {
                Step::Yield(Syscall::Sleep { delay_us: 1_000_000 })
            }
            fn fail(&mut self, failure: Failure) -> Step {
                Step::Done(Err(failure))
            }
            fn close(&mut self) {
                *self.closed.borrow_mut() = true;
            }
        }

        let child_closed = Rc::new(RefCell::new(false));
        let factory_child_closed = child_closed.clone();
        sched.start_default(clock.now(), move || {
            let child: Box<dyn Task> = Box::new(ClosingChild { closed: factory_child_closed.clone() });
            Box::new(WaitOnce {
                started: false,
                children: Some(alloc::vec![child]),
                wait_for: 1,
                exit_others: true,
                result: Rc::new(RefCell::new(None)),
            }) as Box<dyn Task>
        });

        sched.run_once(&mut source, &clock); // default yields Wait, spawning the child
        assert_eq!(sched.queued_task_count(), 1); // the spawned child, queued to run

        sched.close_default();
        assert!(*child_closed.borrow());
        assert_eq!(sched.queued_task_count(), 0);
    }

    #[test]
    fn cancel_wait_exits_children_then_throws_into_the_parent() {
        let clock = ManualClock::new(0);
        let mut source = FakeSource::new();
        let mut sched = scheduler8();

        let result = Rc::new(RefCell::new(None));
        let child_closed = Rc::new(RefCell::new(false));
        struct ClosingChild {
            closed: Rc<RefCell<bool>>,
        }
        impl Task for ClosingChild {
            fn resume(&mut self, _value: Value) -> Step {
                Step::Yield(Syscall::Sleep { delay_us: 1_000_000 })
            }
            fn fail(&mut self, failure: Failure) -> Step {
                Step::Done(Err(failure))
            }
            fn close(&mut self) {
                *self.closed.borrow_mut() = true;
            }
        }

        let child: Box<dyn Task> = Box::new(ClosingChild { closed: child_closed.clone() });
        let parent = WaitOnce {
            started: false,
            children: Some(alloc::vec![child]),
            wait_for: 1,
            exit_others: true,
            result: result.clone(),
        };
        let parent_id = sched.schedule_task(Box::new(parent), clock.now(), Value::Unit, 0).unwrap();
        sched.run_once(&mut source, &clock); // parent yields Wait, spawns the child

        sched.cancel_wait(parent_id, clock.now());

        assert!(*child_closed.borrow());
        match result.borrow().as_ref().expect("parent was resumed") {
            Err(Failure::Cancelled) => {}
            other => panic!("expected a cancellation, got {:?}", other.as_ref().err().is_some()),
        }
    }

    #[test]
    fn a_crashed_task_is_dropped_without_disturbing_the_next_one() {
        let clock = ManualClock::new(0);
        let mut source = FakeSource::new();
        let mut sched = scheduler8();

        let (normal, normal_result) = SleepOnce::new(10);
        sched.schedule_task(Box::new(CrashOnce), clock.now(), Value::Unit, 0).unwrap();
        sched.schedule_task(Box::new(normal), clock.now(), Value::Unit, 0).unwrap();

        sched.run_once(&mut source, &clock); // crash: logged and dropped
        sched.run_once(&mut source, &clock); // normal task arms its sleep

        clock.set(10);
        sched.run_once(&mut source, &clock);
        assert_eq!(*normal_result.borrow(), Some(Deadline(10)));
    }

    #[test]
    fn select_with_no_message_never_progresses() {
        let clock = ManualClock::new(0);
        let mut source = FakeSource::new();
        let mut sched = scheduler8();
        let log = Rc::new(RefCell::new(Vec::new()));

        let task = SelectOnce::with_log(Interface(7), 1, log.clone());
        sched.schedule_task(Box::new(task), clock.now(), Value::Unit, 0).unwrap();
        sched.run_once(&mut source, &clock); // arms the Select

        clock.set(1_000_000);
        sched.run_once(&mut source, &clock);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn schedule_then_unschedule_leaves_queue_untouched() {
        let clock = ManualClock::new(0);
        let mut sched = scheduler8();
        let id = sched
            .schedule_task(Box::new(CrashOnce), clock.now(), Value::Unit, 1000)
            .unwrap();
        assert_eq!(sched.queued_task_count(), 1);
        assert!(sched.unschedule_task(id));
        assert_eq!(sched.queued_task_count(), 0);
    }

    #[test]
    fn capacity_exhaustion_is_reported_not_silently_dropped() {
        let clock = ManualClock::new(0);
        let mut sched: Scheduler<1> = Scheduler::new(SchedulerConfig::new().queue_capacity(1));
        sched
            .schedule_task(Box::new(CrashOnce), clock.now(), Value::Unit, 0)
            .unwrap();
        let err = sched.schedule_task(Box::new(CrashOnce), clock.now(), Value::Unit, 0);
        assert!(matches!(err, Err(SchedulerError::QueueFull)));
    }
}
