// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::{Date, Time};

/// Which week of a biweekly template a date falls into.
///
/// Label `A` covers even whole-week offsets from the plan's
/// `valid_from`, label `B` covers odd offsets. Weekly plans always
/// use label `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeekLabel {
    /// Even whole weeks since `valid_from` (including week zero).
    #[default]
    A,
    /// Odd whole weeks since `valid_from`.
    B,
}

impl WeekLabel {
    /// Computes the week label for `date` relative to `valid_from`.
    ///
    /// `floor(days_since(valid_from) / 7) mod 2` — even ⇒ `A`, odd ⇒
    /// `B`. Euclidean arithmetic keeps the label deterministic even for
    /// dates before `valid_from` (which plan resolution rules out).
    #[must_use]
    pub fn for_date(valid_from: Date, date: Date) -> Self {
        let days: i64 = i64::from(date.to_julian_day() - valid_from.to_julian_day());
        let weeks: i64 = days.div_euclid(7);
        if weeks.rem_euclid(2) == 0 { Self::A } else { Self::B }
    }

    /// Converts this label to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

impl FromStr for WeekLabel {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            _ => Err(DomainError::InvalidWeekLabel(s.to_string())),
        }
    }
}

impl std::fmt::Display for WeekLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The cadence of a staff work plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    /// The same template every week (label `A` only).
    #[default]
    Weekly,
    /// Alternating `A`/`B` templates.
    Biweekly,
}

impl PlanType {
    /// Converts this plan type to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
        }
    }
}

impl FromStr for PlanType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            _ => Err(DomainError::InvalidPlanType(s.to_string())),
        }
    }
}

/// One contiguous availability window within a weekly template.
///
/// Multiple intervals per day express split shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingInterval {
    /// ISO day of week: 1 = Monday .. 7 = Sunday.
    day_of_week: u8,
    /// Window start (inclusive).
    start: Time,
    /// Window end (exclusive).
    end: Time,
}

impl WorkingInterval {
    /// Creates a new `WorkingInterval`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDayOfWeek` if `day_of_week` is not
    /// 1..=7, or `DomainError::InvalidTimeRange` if `end <= start`.
    pub fn new(day_of_week: u8, start: Time, end: Time) -> Result<Self, DomainError> {
        if !(1..=7).contains(&day_of_week) {
            return Err(DomainError::InvalidDayOfWeek(day_of_week));
        }
        if end <= start {
            return Err(DomainError::InvalidTimeRange {
                detail: format!("working interval {start} .. {end}"),
            });
        }
        Ok(Self {
            day_of_week,
            start,
            end,
        })
    }

    /// Returns the ISO day of week (1 = Monday .. 7 = Sunday).
    #[must_use]
    pub const fn day_of_week(&self) -> u8 {
        self.day_of_week
    }

    /// Returns the window start (inclusive).
    #[must_use]
    pub const fn start(&self) -> Time {
        self.start
    }

    /// Returns the window end (exclusive).
    #[must_use]
    pub const fn end(&self) -> Time {
        self.end
    }
}

/// A staff member's work plan: a weekly or biweekly template of
/// working intervals, valid over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffPlan {
    /// Canonical identifier assigned by the database.
    /// `None` indicates the plan has not been persisted yet.
    pub plan_id: Option<i64>,
    /// The staff member this plan belongs to.
    pub staff_id: i64,
    /// Weekly or biweekly cadence.
    pub plan_type: PlanType,
    /// First date the plan covers (inclusive).
    pub valid_from: Date,
    /// Last date the plan covers (inclusive); `None` = open-ended.
    pub valid_to: Option<Date>,
    /// Template intervals, keyed by week label.
    ///
    /// Weekly plans only populate label `A`.
    pub intervals: Vec<(WeekLabel, WorkingInterval)>,
}

impl StaffPlan {
    /// Returns whether this plan covers `date`.
    #[must_use]
    pub fn covers(&self, date: Date) -> bool {
        date >= self.valid_from && self.valid_to.is_none_or(|to| date <= to)
    }

    /// Returns the template intervals for `date`, already filtered to
    /// the resolved week label and day-of-week bucket.
    #[must_use]
    pub fn intervals_for(&self, date: Date) -> Vec<WorkingInterval> {
        let label: WeekLabel = match self.plan_type {
            PlanType::Weekly => WeekLabel::A,
            PlanType::Biweekly => WeekLabel::for_date(self.valid_from, date),
        };
        let day: u8 = date.weekday().number_from_monday();
        self.intervals
            .iter()
            .filter(|(interval_label, interval)| {
                *interval_label == label && interval.day_of_week() == day
            })
            .map(|(_, interval)| *interval)
            .collect()
    }
}

/// Whether a schedule exception removes or adds availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    /// Extra availability outside the template.
    Available,
    /// Time off inside the template.
    Unavailable,
}

impl ExceptionKind {
    /// Converts this kind to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Unavailable => "unavailable",
        }
    }
}

impl FromStr for ExceptionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "unavailable" => Ok(Self::Unavailable),
            _ => Err(DomainError::InvalidExceptionKind(s.to_string())),
        }
    }
}

/// A point override of the template for one exact date.
///
/// A whole-day exception (no times) applies to the entire day; a
/// timed exception applies to `[start, end)` only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleException {
    /// The staff member the exception applies to.
    pub staff_id: i64,
    /// The exact date the exception overrides.
    pub date: Date,
    /// Sub-window start; `None` together with `end` ⇒ whole day.
    pub start: Option<Time>,
    /// Sub-window end; `None` together with `start` ⇒ whole day.
    pub end: Option<Time>,
    /// Removes or adds availability.
    pub kind: ExceptionKind,
    /// Free-form reason ("vacation", "training", ...).
    pub reason: Option<String>,
}

impl ScheduleException {
    /// Creates a new `ScheduleException`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PartialExceptionWindow` if only one of
    /// `start`/`end` is supplied, or `DomainError::InvalidTimeRange`
    /// if both are supplied and `end <= start`.
    pub fn new(
        staff_id: i64,
        date: Date,
        start: Option<Time>,
        end: Option<Time>,
        kind: ExceptionKind,
        reason: Option<String>,
    ) -> Result<Self, DomainError> {
        match (start, end) {
            (Some(s), Some(e)) if e <= s => {
                return Err(DomainError::InvalidTimeRange {
                    detail: format!("schedule exception {s} .. {e}"),
                });
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(DomainError::PartialExceptionWindow);
            }
            _ => {}
        }
        Ok(Self {
            staff_id,
            date,
            start,
            end,
            kind,
            reason,
        })
    }

    /// Returns whether the exception applies to the whole day.
    #[must_use]
    pub const fn is_whole_day(&self) -> bool {
        self.start.is_none()
    }
}

/// The scope at which a closure period applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosureScope {
    /// Every location of the business is closed.
    Business,
    /// One location is closed.
    Location,
}

/// An inclusive date range during which no availability exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosurePeriod {
    /// Business-wide or single-location.
    pub scope: ClosureScope,
    /// First closed date (inclusive).
    pub start_date: Date,
    /// Last closed date (inclusive).
    pub end_date: Date,
    /// Free-form reason.
    pub reason: Option<String>,
}

impl ClosurePeriod {
    /// Creates a new `ClosurePeriod`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidClosurePeriod` if `end_date` is
    /// before `start_date`.
    pub fn new(
        scope: ClosureScope,
        start_date: Date,
        end_date: Date,
        reason: Option<String>,
    ) -> Result<Self, DomainError> {
        if end_date < start_date {
            return Err(DomainError::InvalidClosurePeriod {
                start_date,
                end_date,
            });
        }
        Ok(Self {
            scope,
            start_date,
            end_date,
            reason,
        })
    }

    /// Returns whether `date` falls inside the closure (inclusive).
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}
