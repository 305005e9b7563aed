// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host harness for `walletrt-sched`.
//!
//! Wires the scheduler to a real monotonic clock and a channel-backed
//! message source standing in for USB/touch hardware, starts an idle
//! default workflow, and runs a small demo sequence exercising the
//! default-vs-foreground handover: a background thread stands in for "the
//! surrounding firmware decided to start a workflow" (e.g. a wire message
//! requesting PIN confirmation), and a second thread stands in for the
//! user's confirming touch. A Ctrl-C handler stands in for "the firmware
//! aborted the in-progress workflow" and exercises `Scheduler::cancel_wait`
//! directly, rather than only ever letting the PIN prompt resolve on its
//! own timeout or touch.

mod clock;
mod log_sink;
mod message_source;
mod workflows;

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use walletrt_abi::log::{self, Level};
use walletrt_abi::{Message, Value, TOUCH, TOUCH_START};
use walletrt_sched::{Clock, Scheduler, SchedulerConfig};

use clock::SystemClock;
use log_sink::TerminalSink;
use message_source::ChannelSource;
use workflows::{IdleWorkflow, PinEntryWorkflow, StatusWatcher};

static SINK: TerminalSink = TerminalSink;

/// How long the demo PIN prompt waits for a confirming touch before it
/// cancels itself.
const PIN_TIMEOUT_US: u32 = 5_000_000;

fn main() -> anyhow::Result<()> {
    log::set_sink(&SINK);

    let clock = SystemClock::new();
    let mut sched: Scheduler<64> =
        Scheduler::new(SchedulerConfig::new().initial_log_level(Level::Debug));

    let (msg_tx, msg_rx) = mpsc::channel();
    let mut messages = ChannelSource::new(msg_rx);
    let (start_tx, start_rx) = mpsc::channel::<()>();

    let (abort_tx, abort_rx) = mpsc::channel::<()>();
    ctrlc::set_handler(move || {
        let _ = abort_tx.send(());
    })?;

    sched.start_default(clock.now(), || Box::new(IdleWorkflow::new()));

    thread::spawn(move || {
        thread::sleep(Duration::from_secs(2));
        let _ = start_tx.send(());
    });
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(2500));
        let _ = msg_tx.send((TOUCH, Message::Touch { event: TOUCH_START, x: 120, y: 80 }));
    });

    let mut in_flight_pin_entry: Option<walletrt_sched::TaskId> = None;

    loop {
        sched.run_once(&mut messages, &clock);
        if start_rx.try_recv().is_ok() {
            let done = sched.new_signal();
            sched.schedule_task(Box::new(StatusWatcher::new(done.clone())), clock.now(), Value::Unit, 0)
                .expect("time queue has room for the watcher");
            let id = sched.start_workflow(clock.now(), Box::new(PinEntryWorkflow::new(PIN_TIMEOUT_US, done)));
            in_flight_pin_entry = Some(id);
        }
        if abort_rx.try_recv().is_ok() {
            if let Some(id) = in_flight_pin_entry.take() {
                walletrt_abi::warning!("main", "ctrl-c: aborting in-flight pin entry");
                sched.cancel_wait(id, clock.now());
            } else {
                return Ok(());
            }
        }
    }
}
