// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wrap-aware microsecond deadlines.
//!
//! This clock is a 32-bit microsecond counter that is expected to wrap
//! during the device's lifetime. All ordering between two deadlines must
//! therefore go through [`ticks_diff`] rather than a plain `<`/`>`.

/// A point in time, measured in microseconds against a free-running 32-bit
/// counter that wraps.
#[derive(Copy, Clone, Eq, PartialEq, Debug, derive_more::From, derive_more::Into)]
#[repr(transparent)]
pub struct Deadline(pub u32);

impl Deadline {
    /// The deadline `delay_us` microseconds after `self`, wrapping on overflow.
    pub fn plus_us(self, delay_us: u32) -> Self {
        Deadline(self.0.wrapping_add(delay_us))
    }
}

/// Signed distance from `earlier` to `later`, wrap-aware.
///
/// A positive result means `later` is ahead of `earlier`; a negative result
/// means `later` is already in the past relative to `earlier`. Subtracts as
/// unsigned, then reinterprets the low 32 bits as signed, so a wrap of the
/// counter doesn't invert the comparison as long as the two deadlines are
/// within 2^31 microseconds of one another (~35 minutes), which holds for
/// every scheduling decision this crate makes.
pub fn ticks_diff(later: Deadline, earlier: Deadline) -> i32 {
    later.0.wrapping_sub(earlier.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_without_wrap() {
        assert_eq!(ticks_diff(Deadline(1_000), Deadline(500)), 500);
        assert_eq!(ticks_diff(Deadline(500), Deadline(1_000)), -500);
    }

    #[test]
    fn diff_across_wrap() {
        let just_before_wrap = Deadline(u32::MAX - 10);
        let just_after_wrap = Deadline(9);
        // 20us elapsed across the wrap point.
        assert_eq!(ticks_diff(just_after_wrap, just_before_wrap), 20);
        assert_eq!(ticks_diff(just_before_wrap, just_after_wrap), -20);
    }

    #[test]
    fn plus_us_wraps() {
        let d = Deadline(u32::MAX - 5).plus_us(10);
        assert_eq!(ticks_diff(d, Deadline(u32::MAX - 5)), 10);
    }
}
