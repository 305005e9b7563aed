// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A colored terminal [`Sink`] for the host harness.

use core::fmt;

use walletrt_abi::log::{Level, Sink};

/// Color code per level.
fn color(level: Level) -> &'static str {
    match level {
        Level::Debug => "32",
        Level::Info => "36",
        Level::Warning => "33",
        Level::Error => "31",
        Level::Critical => "1;31",
    }
}

/// Writes to stderr so a demo's stdout (if any) stays clean.
pub struct TerminalSink;

impl Sink for TerminalSink {
    fn write(&self, level: Level, target: &str, args: fmt::Arguments<'_>) {
        eprintln!(
            "\x1b[35m{target}\x1b[0m {} \x1b[{}m{args}\x1b[0m",
            level.name(),
            color(level),
        );
    }
}
