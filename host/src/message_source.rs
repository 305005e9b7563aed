// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A channel-backed [`MessageSource`], standing in for real USB/touch
//! hardware on the host.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use walletrt_abi::{Interface, Message};
use walletrt_sched::MessageSource;

/// Feeds touch/USB events pushed onto a channel. This is the harness's sole
/// blocking point, matching the scheduler's own `msg.select` contract:
/// negative timeouts are treated as an immediate poll.
pub struct ChannelSource {
    rx: Receiver<(Interface, Message)>,
}

impl ChannelSource {
    pub fn new(rx: Receiver<(Interface, Message)>) -> Self {
        ChannelSource { rx }
    }
}

impl MessageSource for ChannelSource {
    fn select(&mut self, timeout_us: i32) -> Option<(Interface, Message)> {
        let timeout = Duration::from_micros(timeout_us.max(0) as u64);
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
