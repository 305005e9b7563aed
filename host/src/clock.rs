// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A real monotonic clock for the host harness.

use std::time::Instant;

use walletrt_abi::Deadline;
use walletrt_sched::Clock;

/// Wraps `std::time::Instant` down to the scheduler's wrap-aware 32-bit
/// microsecond counter. Truncating `u128` microseconds-since-start into a
/// `u32` reproduces the same wraparound a real firmware's free-running
/// hardware timer would have, roughly every 71 minutes of uptime.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { start: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Deadline {
        Deadline(self.start.elapsed().as_micros() as u32)
    }
}
