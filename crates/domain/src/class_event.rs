// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::PrimitiveDateTime;

/// Lifecycle state of a fixed-capacity group event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ClassEventStatus {
    /// Bookable.
    #[default]
    #[serde(rename = "SCHEDULED")]
    Scheduled,
    /// Cancelled; no further bookings accepted.
    #[serde(rename = "CANCELLED")]
    Cancelled,
}

impl ClassEventStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for ClassEventStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" => Ok(Self::Scheduled),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidClassEventStatus(s.to_string())),
        }
    }
}

/// A fixed-capacity group event with an optional FIFO waitlist.
///
/// Seat counters are maintained redundantly on the event row so the
/// capacity check is O(1) under the row lock, instead of counting
/// bookings on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEvent {
    /// Canonical identifier assigned by the database.
    /// `None` indicates the event has not been persisted yet.
    pub class_event_id: Option<i64>,
    /// The business this event belongs to.
    pub business_id: i64,
    /// The location where the event takes place.
    pub location_id: i64,
    /// Display name ("Yoga 101").
    pub name: String,
    /// Event start.
    pub start_time: PrimitiveDateTime,
    /// Event end.
    pub end_time: PrimitiveDateTime,
    /// Total seats.
    pub capacity_total: i32,
    /// Seats held back from online booking.
    pub capacity_reserved: i32,
    /// Current number of `CONFIRMED` bookings.
    pub confirmed_count: i32,
    /// Current number of `WAITLISTED` bookings.
    pub waitlist_count: i32,
    /// Whether a full event queues instead of rejecting.
    pub waitlist_enabled: bool,
    /// Lifecycle state.
    pub status: ClassEventStatus,
}

impl ClassEvent {
    /// Creates a new `ClassEvent`, checking the capacity invariants.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCapacity` if `capacity_total < 1`,
    /// any counter is negative, the reserve exceeds the total, or
    /// `DomainError::InvalidTimeRange` if `end_time <= start_time`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        business_id: i64,
        location_id: i64,
        name: String,
        start_time: PrimitiveDateTime,
        end_time: PrimitiveDateTime,
        capacity_total: i32,
        capacity_reserved: i32,
        waitlist_enabled: bool,
    ) -> Result<Self, DomainError> {
        if end_time <= start_time {
            return Err(DomainError::InvalidTimeRange {
                detail: format!("class event {start_time} .. {end_time}"),
            });
        }
        if capacity_total < 1 {
            return Err(DomainError::InvalidCapacity(format!(
                "capacity_total must be at least 1, got {capacity_total}"
            )));
        }
        if capacity_reserved < 0 || capacity_reserved > capacity_total {
            return Err(DomainError::InvalidCapacity(format!(
                "capacity_reserved {capacity_reserved} is outside 0..={capacity_total}"
            )));
        }
        Ok(Self {
            class_event_id: None,
            business_id,
            location_id,
            name,
            start_time,
            end_time,
            capacity_total,
            capacity_reserved,
            confirmed_count: 0,
            waitlist_count: 0,
            waitlist_enabled,
            status: ClassEventStatus::Scheduled,
        })
    }

    /// Returns the number of bookable seats remaining.
    #[must_use]
    pub const fn seats_left(&self) -> i32 {
        self.capacity_total - self.capacity_reserved - self.confirmed_count
    }
}

/// Lifecycle state of one customer's claim on a class event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassBookingStatus {
    /// Holds a seat.
    #[serde(rename = "CONFIRMED")]
    Confirmed,
    /// Queued; holds a dense 1-based waitlist position.
    #[serde(rename = "WAITLISTED")]
    Waitlisted,
    /// Terminal. The row persists for audit.
    #[serde(rename = "CANCELLED_BY_CUSTOMER")]
    CancelledByCustomer,
}

impl ClassBookingStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "CONFIRMED",
            Self::Waitlisted => "WAITLISTED",
            Self::CancelledByCustomer => "CANCELLED_BY_CUSTOMER",
        }
    }

    /// Returns whether this status claims a seat or queue position.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Waitlisted)
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - Waitlisted → Confirmed (promotion)
    /// - Confirmed → `CancelledByCustomer`
    /// - Waitlisted → `CancelledByCustomer`
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Waitlisted, Self::Confirmed)
                | (Self::Confirmed | Self::Waitlisted, Self::CancelledByCustomer)
        )
    }
}

impl FromStr for ClassBookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONFIRMED" => Ok(Self::Confirmed),
            "WAITLISTED" => Ok(Self::Waitlisted),
            "CANCELLED_BY_CUSTOMER" => Ok(Self::CancelledByCustomer),
            _ => Err(DomainError::InvalidClassBookingStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for ClassBookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One customer's claim on a class event.
///
/// Invariant: at most one non-cancelled row per
/// `(class_event_id, customer_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassBooking {
    /// Canonical identifier assigned by the database.
    pub class_booking_id: Option<i64>,
    /// The event being claimed.
    pub class_event_id: i64,
    /// The customer claiming a seat.
    pub customer_id: i64,
    /// Seat, queue position, or cancelled.
    pub status: ClassBookingStatus,
    /// Dense 1-based FIFO rank among `WAITLISTED` rows for the event.
    /// `None` unless `status` is `Waitlisted`.
    pub waitlist_position: Option<i32>,
    /// When the claim was first made; FIFO tiebreaker.
    pub booked_at: PrimitiveDateTime,
    /// When the claim was cancelled, if it was.
    pub cancelled_at: Option<PrimitiveDateTime>,
}
