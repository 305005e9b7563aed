// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Types shared between the scheduler core and its clients.
//!
//! This crate is deliberately small: it holds the vocabulary tasks and the
//! scheduler both need to agree on (task handles, the microsecond deadline
//! type, interface/message shapes, the resume/return value type, failures,
//! and a minimal logging facade) without pulling in any scheduling logic
//! itself.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod log;
pub mod message;
pub mod task_id;
pub mod time;
pub mod value;

pub use message::{Interface, Message, TOUCH, TOUCH_END, TOUCH_MOVE, TOUCH_START};
pub use task_id::TaskId;
pub use time::{ticks_diff, Deadline};
pub use value::{Failure, Outcome, Value};
