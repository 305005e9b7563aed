// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A minimal, level-filtered logging facade.
//!
//! Five numeric levels, one global threshold, no persistence, no buffering.
//! No `log`/`tracing`/`defmt` dependency for this no_std niche; this crate
//! carries its own tiny facade, built on `critical-section`-guarded global
//! state rather than a bare `static mut`.

use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;

/// Severity, ordered so that `Level::Debug < Level::Critical`.
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Debug)]
#[repr(u8)]
pub enum Level {
    Debug = 10,
    Info = 20,
    Warning = 30,
    Error = 40,
    Critical = 50,
}

impl Level {
    pub fn name(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

/// Receives formatted log records that pass the current threshold.
///
/// Installed once, globally, via [`set_sink`]. The host harness installs a
/// colored terminal sink; real firmware would install one that writes to a
/// debug UART or nowhere at all.
pub trait Sink: Sync {
    fn write(&self, level: Level, target: &str, args: fmt::Arguments<'_>);
}

struct NullSink;

impl Sink for NullSink {
    fn write(&self, _level: Level, _target: &str, _args: fmt::Arguments<'_>) {}
}

static NULL_SINK: NullSink = NullSink;
static THRESHOLD: Mutex<Cell<Level>> = Mutex::new(Cell::new(Level::Warning));
static SINK: Mutex<Cell<Option<&'static dyn Sink>>> = Mutex::new(Cell::new(None));

/// Sets the global severity threshold. Records below this level are not
/// even formatted, let alone emitted.
pub fn set_level(level: Level) {
    critical_section::with(|cs| THRESHOLD.borrow(cs).set(level));
}

/// Returns the current severity threshold.
pub fn level() -> Level {
    critical_section::with(|cs| THRESHOLD.borrow(cs).get())
}

/// Installs the process/device-wide sink. Call once at startup.
pub fn set_sink(sink: &'static dyn Sink) {
    critical_section::with(|cs| SINK.borrow(cs).set(Some(sink)));
}

#[doc(hidden)]
pub fn dispatch(level: Level, target: &str, args: fmt::Arguments<'_>) {
    if level < level() {
        return;
    }
    critical_section::with(|cs| {
        let sink = SINK.borrow(cs).get().unwrap_or(&NULL_SINK);
        sink.write(level, target, args);
    });
}

/// Emits a record at `DEBUG` if the threshold allows it.
#[macro_export]
macro_rules! debug {
    ($target:expr, $($arg:tt)+) => {
        $crate::log::dispatch($crate::log::Level::Debug, $target, format_args!($($arg)+))
    };
}

/// Emits a record at `INFO` if the threshold allows it.
#[macro_export]
macro_rules! info {
    ($target:expr, $($arg:tt)+) => {
        $crate::log::dispatch($crate::log::Level::Info, $target, format_args!($($arg)+))
    };
}

/// Emits a record at `WARNING` if the threshold allows it.
#[macro_export]
macro_rules! warning {
    ($target:expr, $($arg:tt)+) => {
        $crate::log::dispatch($crate::log::Level::Warning, $target, format_args!($($arg)+))
    };
}

/// Emits a record at `ERROR` if the threshold allows it.
#[macro_export]
macro_rules! error {
    ($target:expr, $($arg:tt)+) => {
        $crate::log::dispatch($crate::log::Level::Error, $target, format_args!($($arg)+))
    };
}

/// Emits a record at `CRITICAL` if the threshold allows it.
#[macro_export]
macro_rules! critical {
    ($target:expr, $($arg:tt)+) => {
        $crate::log::dispatch($crate::log::Level::Critical, $target, format_args!($($arg)+))
    };
}
