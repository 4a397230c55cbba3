// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod availability;
mod error;
mod interval;
mod recurrence;
mod schedule;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use availability::{
    DEFAULT_MAX_DAYS_AHEAD, SLOT_GRID_MINUTES, resource_capacity_allows, slot_starts,
    within_horizon,
};
pub use error::CoreError;
pub use interval::{TimeInterval, minute_of_day, normalize, time_at_minute};
pub use recurrence::{MAX_SERIES_OCCURRENCES, occurrence_dates};
pub use schedule::slots_for_date;
