// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use agenda_domain::DomainError;
use time::{Duration, Time};

/// Minutes in a day; the exclusive upper bound for interval ends.
const MINUTES_PER_DAY: i32 = 24 * 60;

/// A half-open `[start, end)` interval within one day, in minutes from
/// midnight.
///
/// Minute resolution is exact for this domain: working intervals,
/// slot grids, and service durations are all whole minutes. Adjacent
/// intervals (`end == start`) never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeInterval {
    start_minute: i32,
    end_minute: i32,
}

impl TimeInterval {
    /// Creates a new `TimeInterval` from minutes-from-midnight bounds.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimeRange` if the bounds fall
    /// outside `0..=1440` or `end_minute <= start_minute`.
    pub fn new(start_minute: i32, end_minute: i32) -> Result<Self, DomainError> {
        if start_minute < 0 || end_minute > MINUTES_PER_DAY || end_minute <= start_minute {
            return Err(DomainError::InvalidTimeRange {
                detail: format!("interval minutes {start_minute} .. {end_minute}"),
            });
        }
        Ok(Self {
            start_minute,
            end_minute,
        })
    }

    /// Creates a new `TimeInterval` from wall-clock times.
    ///
    /// Seconds are truncated; the domain works at minute resolution.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimeRange` if `end <= start`.
    pub fn from_times(start: Time, end: Time) -> Result<Self, DomainError> {
        Self::new(minute_of_day(start), minute_of_day(end))
    }

    /// Returns the start bound in minutes from midnight (inclusive).
    #[must_use]
    pub const fn start_minute(&self) -> i32 {
        self.start_minute
    }

    /// Returns the end bound in minutes from midnight (exclusive).
    #[must_use]
    pub const fn end_minute(&self) -> i32 {
        self.end_minute
    }

    /// Returns the start bound as a wall-clock time.
    #[must_use]
    pub fn start_time(&self) -> Time {
        time_at_minute(self.start_minute)
    }

    /// Returns the interval length in minutes.
    #[must_use]
    pub const fn duration_minutes(&self) -> i32 {
        self.end_minute - self.start_minute
    }

    /// Returns whether the two intervals share any instant.
    ///
    /// Half-open semantics: `[9:00, 10:00)` and `[10:00, 11:00)` do
    /// not overlap.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start_minute < other.end_minute && self.end_minute > other.start_minute
    }

    /// Returns whether `other` fits entirely inside this interval.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        other.start_minute >= self.start_minute && other.end_minute <= self.end_minute
    }

    /// Removes `cut` from this interval, returning the remaining
    /// pieces.
    ///
    /// A cut strictly inside the interval splits it into two pieces;
    /// a cut overlapping one edge truncates; a covering cut leaves
    /// nothing; a disjoint cut leaves the interval unchanged.
    #[must_use]
    pub fn subtract(&self, cut: &Self) -> Vec<Self> {
        if !self.overlaps(cut) {
            return vec![*self];
        }
        let mut pieces: Vec<Self> = Vec::with_capacity(2);
        if cut.start_minute > self.start_minute {
            pieces.push(Self {
                start_minute: self.start_minute,
                end_minute: cut.start_minute,
            });
        }
        if cut.end_minute < self.end_minute {
            pieces.push(Self {
                start_minute: cut.end_minute,
                end_minute: self.end_minute,
            });
        }
        pieces
    }
}

/// Sorts intervals and merges any that overlap or touch.
#[must_use]
pub fn normalize(mut intervals: Vec<TimeInterval>) -> Vec<TimeInterval> {
    intervals.sort_unstable();
    let mut merged: Vec<TimeInterval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if interval.start_minute <= last.end_minute => {
                last.end_minute = last.end_minute.max(interval.end_minute);
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Converts a wall-clock time to minutes from midnight, truncating
/// seconds.
#[must_use]
pub fn minute_of_day(time: Time) -> i32 {
    i32::from(time.hour()) * 60 + i32::from(time.minute())
}

/// Converts minutes from midnight back to a wall-clock time.
///
/// Relies on `Time`'s wrapping addition, so minute 1440 maps to
/// midnight; callers only convert slot starts, which are always
/// strictly inside the day.
#[must_use]
pub fn time_at_minute(minute: i32) -> Time {
    Time::MIDNIGHT + Duration::minutes(i64::from(minute))
}
