// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Runtime configuration knobs.
//!
//! This crate has exactly one task model and no address-space partitioning,
//! so configuration is genuinely a runtime concern rather than a build-time
//! codegen layer: a plain builder, consumed once at startup.
//!
//! Time-queue *capacity* is not a field here: `heapless::BinaryHeap` sizes
//! its backing storage at compile time, so capacity is threaded through as
//! the `CAP` const generic on [`crate::Scheduler`] instead of a runtime
//! value. [`SchedulerConfig::queue_capacity`] still records the intended
//! capacity, purely so `Scheduler::new` can assert it matches `CAP` and
//! catch a mismatched config at construction rather than silently ignoring
//! it.

use walletrt_abi::log::Level;

use crate::scheduler::{DEFAULT_QUEUE_CAPACITY, MAX_SELECT_DELAY};

/// Construction-time configuration for a [`crate::Scheduler`].
#[derive(Copy, Clone, Debug)]
pub struct SchedulerConfig {
    pub(crate) queue_capacity: usize,
    pub(crate) max_select_delay_us: u32,
    pub(crate) initial_log_level: Level,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_select_delay_us: MAX_SELECT_DELAY,
            initial_log_level: Level::Warning,
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents the time-queue capacity this config expects the caller's
    /// `Scheduler<CAP>` to be instantiated with.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Upper bound, in microseconds, on how long `run_once` will ask the
    /// message source to block when the time queue is empty.
    pub fn max_select_delay_us(mut self, delay_us: u32) -> Self {
        self.max_select_delay_us = delay_us;
        self
    }

    pub fn initial_log_level(mut self, level: Level) -> Self {
        self.initial_log_level = level;
        self
    }
}
