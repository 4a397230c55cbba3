// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::booking::BookingStatus;
use crate::class_event::ClassBookingStatus;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A time range is empty or inverted (`end <= start`).
    InvalidTimeRange {
        /// A human-readable description of the offending range.
        detail: String,
    },
    /// Day-of-week value outside ISO 1 (Monday) .. 7 (Sunday).
    InvalidDayOfWeek(u8),
    /// Booking status string is not recognized.
    InvalidBookingStatus(String),
    /// A booking status transition violates the lifecycle state machine.
    InvalidStatusTransition {
        /// The current status.
        from: BookingStatus,
        /// The requested status.
        to: BookingStatus,
    },
    /// A booking was submitted without items.
    EmptyBookingItems,
    /// Recurrence frequency string is not recognized.
    InvalidFrequency(String),
    /// Conflict strategy string is not recognized.
    InvalidConflictStrategy(String),
    /// A recurrence rule is structurally invalid.
    InvalidRecurrenceRule(String),
    /// Exception kind string is not recognized.
    InvalidExceptionKind(String),
    /// A schedule exception carries only one of start/end time.
    PartialExceptionWindow,
    /// A closure period has `end_date` before `start_date`.
    InvalidClosurePeriod {
        /// The offending start date.
        start_date: time::Date,
        /// The offending end date.
        end_date: time::Date,
    },
    /// Plan type string is not recognized.
    InvalidPlanType(String),
    /// Week label string is not recognized.
    InvalidWeekLabel(String),
    /// Class event capacity figures violate the capacity invariant.
    InvalidCapacity(String),
    /// Class booking status string is not recognized.
    InvalidClassBookingStatus(String),
    /// A class booking status transition violates the state machine.
    InvalidClassTransition {
        /// The current status.
        from: ClassBookingStatus,
        /// The requested status.
        to: ClassBookingStatus,
    },
    /// Class event status string is not recognized.
    InvalidClassEventStatus(String),
    /// A service has a non-positive duration.
    InvalidServiceDuration(i32),
    /// An idempotency key is empty or over-long.
    InvalidIdempotencyKey(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTimeRange { detail } => write!(f, "Invalid time range: {detail}"),
            Self::InvalidDayOfWeek(day) => {
                write!(f, "Invalid day of week: {day} (expected 1..=7)")
            }
            Self::InvalidBookingStatus(s) => write!(f, "Invalid booking status: {s}"),
            Self::InvalidStatusTransition { from, to } => {
                write!(f, "Invalid booking status transition: {from} -> {to}")
            }
            Self::EmptyBookingItems => write!(f, "A booking requires at least one item"),
            Self::InvalidFrequency(s) => write!(f, "Invalid recurrence frequency: {s}"),
            Self::InvalidConflictStrategy(s) => write!(f, "Invalid conflict strategy: {s}"),
            Self::InvalidRecurrenceRule(msg) => write!(f, "Invalid recurrence rule: {msg}"),
            Self::InvalidExceptionKind(s) => write!(f, "Invalid exception kind: {s}"),
            Self::PartialExceptionWindow => {
                write!(
                    f,
                    "Schedule exception must carry both start and end time, or neither"
                )
            }
            Self::InvalidClosurePeriod {
                start_date,
                end_date,
            } => {
                write!(f, "Invalid closure period: {start_date} .. {end_date}")
            }
            Self::InvalidPlanType(s) => write!(f, "Invalid plan type: {s}"),
            Self::InvalidWeekLabel(s) => write!(f, "Invalid week label: {s}"),
            Self::InvalidCapacity(msg) => write!(f, "Invalid class capacity: {msg}"),
            Self::InvalidClassBookingStatus(s) => {
                write!(f, "Invalid class booking status: {s}")
            }
            Self::InvalidClassTransition { from, to } => {
                write!(f, "Invalid class booking transition: {from} -> {to}")
            }
            Self::InvalidClassEventStatus(s) => write!(f, "Invalid class event status: {s}"),
            Self::InvalidServiceDuration(minutes) => {
                write!(f, "Invalid service duration: {minutes} minutes")
            }
            Self::InvalidIdempotencyKey(msg) => write!(f, "Invalid idempotency key: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}
