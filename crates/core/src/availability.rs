// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::interval::TimeInterval;
use time::Date;

/// Candidate slot starts are aligned to this wall-clock grid.
pub const SLOT_GRID_MINUTES: i32 = 15;

/// Availability is never reported further ahead than this many days
/// from today.
pub const DEFAULT_MAX_DAYS_AHEAD: i64 = 60;

/// Returns whether `date` is inside the bookable horizon relative to
/// `today`.
///
/// Past dates and dates beyond [`DEFAULT_MAX_DAYS_AHEAD`] are outside
/// the horizon; they produce empty availability, never an error.
#[must_use]
pub fn within_horizon(today: Date, date: Date) -> bool {
    let days_ahead: i64 = i64::from(date.to_julian_day() - today.to_julian_day());
    (0..=DEFAULT_MAX_DAYS_AHEAD).contains(&days_ahead)
}

/// Computes the bookable slot starts for one staff member on one day.
///
/// Candidates are grid-aligned minutes (`minute % 15 == 0`, wall
/// clock, not interval-relative) such that the occupied window
/// `[t, t + duration)` fits entirely inside a single working interval
/// and overlaps none of the `occupied` intervals. Adjacency is not a
/// conflict: a slot may start exactly when an existing booking ends.
///
/// Returns starts in ascending minute order.
#[must_use]
pub fn slot_starts(
    working: &[TimeInterval],
    occupied: &[TimeInterval],
    duration_minutes: i32,
) -> Vec<i32> {
    if duration_minutes < 1 {
        return Vec::new();
    }
    let mut starts: Vec<i32> = Vec::new();
    for interval in working {
        let first: i32 = next_grid_minute(interval.start_minute());
        let mut candidate: i32 = first;
        while candidate + duration_minutes <= interval.end_minute() {
            let Ok(window) = TimeInterval::new(candidate, candidate + duration_minutes) else {
                break;
            };
            if !occupied.iter().any(|busy| busy.overlaps(&window)) {
                starts.push(candidate);
            }
            candidate += SLOT_GRID_MINUTES;
        }
    }
    starts.sort_unstable();
    starts.dedup();
    starts
}

/// Returns whether a resource with `capacity` units can absorb an
/// extra `quantity` units over `window`, given the units already
/// claimed by overlapping bookings.
///
/// `claimed` pairs each active booking's occupied interval with the
/// units it holds; entries not overlapping `window` are ignored.
#[must_use]
pub fn resource_capacity_allows(
    capacity: i32,
    claimed: &[(TimeInterval, i32)],
    window: &TimeInterval,
    quantity: i32,
) -> bool {
    let in_use: i32 = claimed
        .iter()
        .filter(|(interval, _)| interval.overlaps(window))
        .map(|(_, units)| units)
        .sum();
    in_use + quantity <= capacity
}

/// Rounds `minute` up to the next grid-aligned minute.
const fn next_grid_minute(minute: i32) -> i32 {
    let remainder: i32 = minute.rem_euclid(SLOT_GRID_MINUTES);
    if remainder == 0 {
        minute
    } else {
        minute + (SLOT_GRID_MINUTES - remainder)
    }
}
