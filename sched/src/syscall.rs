// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The four await primitives a task can yield.
//!
//! A tagged variant with a fixed payload per arm, matched once at the step
//! engine: not dynamic dispatch, not a trait object. Each arm says how the
//! task wants to be re-armed; how that re-arming actually happens (pushing
//! into the time queue, the paused table, a `Wait` record, etc.) is the
//! scheduler's job, not the syscall's.

use alloc::boxed::Box;
use alloc::vec::Vec;

use walletrt_abi::Interface;

use crate::signal::Signal;
use crate::task::Task;

/// A value a task yields from `resume`/`fail` to suspend itself until some
/// condition is met.
pub enum Syscall {
    /// Resume after at least `delay_us` microseconds.
    Sleep { delay_us: u32 },
    /// Resume with the next message delivered on `iface`.
    Select { iface: Interface },
    /// Resume with whatever value is next sent to `signal`.
    Signal(Signal),
    /// Spawn `children`, resume once `wait_for` of them have finished
    /// (normally or by failure). If `exit_others` is set, any children
    /// still running at that point are closed.
    Wait {
        children: Vec<Box<dyn Task>>,
        wait_for: u8,
        exit_others: bool,
    },
}
