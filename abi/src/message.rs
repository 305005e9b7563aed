// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interfaces and messages: the envelope a `Select` syscall waits on.
//!
//! An [`Interface`] is just a small integer naming a source of external
//! events (a touch controller, a USB endpoint, a button). Tasks never see
//! raw driver state directly; they register interest in an interface id via
//! `Select` and the scheduler hands back whichever [`Message`] arrived for
//! it.

use heapless::Vec;

/// Maximum payload size for a single USB report, matching a typical USB
/// HID endpoint's wire size.
pub const USB_REPORT_LEN: usize = 64;

/// Identifies a source of external events. Most interface ids are assigned
/// by the host application; a handful are reserved here because the
/// scheduler itself needs to recognize them (e.g. to route touch events to
/// whichever workflow currently owns the screen).
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Interface(pub u16);

/// Reserved interface id for touch-panel events.
pub const TOUCH: Interface = Interface(255);

/// Touch event kinds delivered on the [`TOUCH`] interface.
pub const TOUCH_START: u8 = 1;
pub const TOUCH_MOVE: u8 = 2;
pub const TOUCH_END: u8 = 4;

/// A single event delivered to whichever task is selecting on the
/// interface it arrived on.
#[derive(Clone, Debug)]
pub enum Message {
    /// A touch-panel event: one of [`TOUCH_START`], [`TOUCH_MOVE`], or
    /// [`TOUCH_END`], with panel coordinates.
    Touch { event: u8, x: i16, y: i16 },
    /// A raw USB HID report, bounded to [`USB_REPORT_LEN`] bytes so
    /// delivering one never requires a heap allocation.
    UsbReport(Vec<u8, USB_REPORT_LEN>),
}
