// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// How often a recurring series repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Every `interval_value` weeks.
    Weekly,
    /// Every `interval_value` fortnights.
    Biweekly,
    /// Every `interval_value` months, on `day_of_month`.
    Monthly,
}

impl Frequency {
    /// Converts this frequency to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }
}

impl FromStr for Frequency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(DomainError::InvalidFrequency(s.to_string())),
        }
    }
}

/// What to do when an occurrence collides with an existing booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStrategy {
    /// Leave the conflicting date unbooked and continue.
    #[default]
    Skip,
    /// Search forward for the next free slot and book that instead.
    Reschedule,
    /// Abort the whole expansion and roll back created occurrences.
    Fail,
}

impl ConflictStrategy {
    /// Converts this strategy to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Skip => "skip",
            Self::Reschedule => "reschedule",
            Self::Fail => "fail",
        }
    }
}

impl FromStr for ConflictStrategy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "reschedule" => Ok(Self::Reschedule),
            "fail" => Ok(Self::Fail),
            _ => Err(DomainError::InvalidConflictStrategy(s.to_string())),
        }
    }
}

/// A recurrence rule describing a series of bookings.
///
/// The rule carries the repetition pattern and end condition; the
/// time-of-day and duration of each occurrence are copied from the
/// series' first booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    /// Canonical identifier assigned by the database.
    /// `None` indicates the rule has not been persisted yet.
    pub rule_id: Option<i64>,
    /// The business this rule belongs to.
    pub business_id: i64,
    /// Repetition cadence.
    pub frequency: Frequency,
    /// Multiplier on the cadence (every N weeks/fortnights/months).
    pub interval_value: u32,
    /// Stop after this many occurrences (including the first).
    pub max_occurrences: Option<u32>,
    /// Stop after this date (inclusive).
    pub end_date: Option<Date>,
    /// Response to a per-occurrence conflict.
    pub conflict_strategy: ConflictStrategy,
    /// ISO days (1 = Monday .. 7 = Sunday) the series may fall on.
    /// Only meaningful for weekly/biweekly rules.
    pub days_of_week: Option<Vec<u8>>,
    /// Day of month for monthly rules; clamped to the month's length.
    pub day_of_month: Option<u8>,
}

impl RecurrenceRule {
    /// Creates a new `RecurrenceRule` without a persisted ID, checking
    /// structural invariants.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRecurrenceRule` if:
    /// - `interval_value` is zero
    /// - `max_occurrences` is `Some(0)`
    /// - `days_of_week` is supplied on a monthly rule, is empty, or
    ///   contains a value outside 1..=7
    /// - `day_of_month` is supplied on a weekly/biweekly rule or is
    ///   outside 1..=31
    pub fn new(
        business_id: i64,
        frequency: Frequency,
        interval_value: u32,
        max_occurrences: Option<u32>,
        end_date: Option<Date>,
        conflict_strategy: ConflictStrategy,
        days_of_week: Option<Vec<u8>>,
        day_of_month: Option<u8>,
    ) -> Result<Self, DomainError> {
        if interval_value == 0 {
            return Err(DomainError::InvalidRecurrenceRule(String::from(
                "interval_value must be at least 1",
            )));
        }
        if max_occurrences == Some(0) {
            return Err(DomainError::InvalidRecurrenceRule(String::from(
                "max_occurrences must be at least 1",
            )));
        }
        if let Some(days) = &days_of_week {
            if frequency == Frequency::Monthly {
                return Err(DomainError::InvalidRecurrenceRule(String::from(
                    "days_of_week is only valid for weekly and biweekly rules",
                )));
            }
            if days.is_empty() {
                return Err(DomainError::InvalidRecurrenceRule(String::from(
                    "days_of_week must not be empty when supplied",
                )));
            }
            if let Some(bad) = days.iter().find(|d| !(1..=7).contains(*d)) {
                return Err(DomainError::InvalidRecurrenceRule(format!(
                    "days_of_week entry {bad} is outside 1..=7"
                )));
            }
        }
        if let Some(day) = day_of_month {
            if frequency != Frequency::Monthly {
                return Err(DomainError::InvalidRecurrenceRule(String::from(
                    "day_of_month is only valid for monthly rules",
                )));
            }
            if !(1..=31).contains(&day) {
                return Err(DomainError::InvalidRecurrenceRule(format!(
                    "day_of_month {day} is outside 1..=31"
                )));
            }
        }
        Ok(Self {
            rule_id: None,
            business_id,
            frequency,
            interval_value,
            max_occurrences,
            end_date,
            conflict_strategy,
            days_of_week,
            day_of_month,
        })
    }
}
