// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The external event source `run_once` blocks on.

use walletrt_abi::{Interface, Message};

/// The scheduler's sole blocking point: wait up to `timeout_us` for the
/// next external message.
///
/// Negative timeouts are treated as zero (poll, don't block). The
/// scheduler is payload-agnostic: messages for interfaces with no waiters
/// are simply discarded.
pub trait MessageSource {
    fn select(&mut self, timeout_us: i32) -> Option<(Interface, Message)>;
}
