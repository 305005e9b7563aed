// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single-threaded, preemption-free task scheduler.
//!
//! Tasks are opaque state machines ([`Task`]) that run to a suspend point
//! and yield a [`Syscall`] describing how they want to be woken back up.
//! The [`Scheduler`] owns a bounded [`time_queue::TimeQueue`] of timed
//! wake-ups, an unbounded [`paused_table::PausedTable`] of tasks waiting on
//! external interfaces, and a small [`workflow::WorkflowSupervisor`] that
//! arbitrates between one long-lived default task and a stack of transient
//! foreground tasks.
//!
//! There is exactly one executor. Nothing here is `Send`/`Sync` on purpose:
//! every data structure is touched from one call stack, so none of it needs
//! locking, and the load-bearing invariant is that a task only yields
//! control at an explicit suspend point.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod clock;
pub mod config;
pub mod error;
pub mod message_source;
pub mod paused_table;
pub mod scheduler;
pub mod signal;
pub mod slab;
pub mod syscall;
pub mod task;
pub mod time_queue;
pub mod workflow;

mod wait;

pub use clock::Clock;
pub use config::SchedulerConfig;
pub use error::{ProtocolError, SchedulerError};
pub use message_source::MessageSource;
pub use scheduler::{Scheduler, DEFAULT_QUEUE_CAPACITY, MAX_SELECT_DELAY};
pub use signal::Signal;
pub use syscall::Syscall;
pub use task::{Step, Task};
pub use workflow::{DefaultFactory, WorkflowSupervisor};

pub use walletrt_abi::{Failure, Interface, Message, Outcome, TaskId, Value};
