// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::PrimitiveDateTime;

/// Represents the lifecycle state of a booking.
///
/// Bookings are never physically deleted; every terminal outcome is a
/// status transition so the audit trail stays intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Created but not yet confirmed. Occupies staff time.
    #[default]
    Pending,
    /// Confirmed appointment. Occupies staff time.
    Confirmed,
    /// Cancelled by customer or operator. Releases the time.
    Cancelled,
    /// Superseded by a reschedule-as-new-booking.
    Replaced,
    /// The appointment took place.
    Completed,
    /// The customer did not show up.
    NoShow,
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "replaced" => Ok(Self::Replaced),
            "completed" => Ok(Self::Completed),
            "no_show" => Ok(Self::NoShow),
            _ => Err(DomainError::InvalidBookingStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl BookingStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Replaced => "replaced",
            Self::Completed => "completed",
            Self::NoShow => "no_show",
        }
    }

    /// Returns whether a booking in this status occupies staff time.
    ///
    /// Only active bookings participate in conflict detection and
    /// availability computation.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - Pending → Confirmed
    /// - Pending → Cancelled
    /// - Pending → Replaced
    /// - Confirmed → Cancelled
    /// - Confirmed → Completed
    /// - Confirmed → `NoShow`
    /// - Confirmed → Replaced
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending | Self::Confirmed, Self::Cancelled | Self::Replaced)
                | (Self::Confirmed, Self::Completed | Self::NoShow)
        )
    }
}

/// The atomic unit of a booking: one staff member occupying one
/// continuous time interval for one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingItem {
    /// Canonical identifier assigned by the database.
    /// `None` indicates the item has not been persisted yet.
    pub item_id: Option<i64>,
    /// The staff member performing the service.
    pub staff_id: i64,
    /// The service being performed.
    pub service_id: i64,
    /// Start of the occupied window (inclusive).
    pub start_time: PrimitiveDateTime,
    /// End of the occupied window (exclusive).
    pub end_time: PrimitiveDateTime,
    /// The price charged, in cents.
    pub price_cents: i64,
}

impl BookingItem {
    /// Creates a new `BookingItem` without a persisted ID.
    ///
    /// # Arguments
    ///
    /// * `staff_id` - The staff member
    /// * `service_id` - The service
    /// * `start_time` - Start of the occupied window (inclusive)
    /// * `end_time` - End of the occupied window (exclusive)
    /// * `price_cents` - The price in cents
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimeRange` if `end_time <= start_time`.
    pub fn new(
        staff_id: i64,
        service_id: i64,
        start_time: PrimitiveDateTime,
        end_time: PrimitiveDateTime,
        price_cents: i64,
    ) -> Result<Self, DomainError> {
        if end_time <= start_time {
            return Err(DomainError::InvalidTimeRange {
                detail: format!("booking item {start_time} .. {end_time}"),
            });
        }
        Ok(Self {
            item_id: None,
            staff_id,
            service_id,
            start_time,
            end_time,
            price_cents,
        })
    }

    /// Creates a `BookingItem` with an existing persisted ID.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimeRange` if `end_time <= start_time`.
    pub fn with_id(
        item_id: i64,
        staff_id: i64,
        service_id: i64,
        start_time: PrimitiveDateTime,
        end_time: PrimitiveDateTime,
        price_cents: i64,
    ) -> Result<Self, DomainError> {
        let mut item = Self::new(staff_id, service_id, start_time, end_time, price_cents)?;
        item.item_id = Some(item_id);
        Ok(item)
    }

    /// Returns whether this item's window overlaps `[start, end)`.
    ///
    /// Half-open semantics: adjacent intervals (`end == start`) never
    /// overlap.
    #[must_use]
    pub fn overlaps(&self, start: PrimitiveDateTime, end: PrimitiveDateTime) -> bool {
        self.start_time < end && self.end_time > start
    }
}

/// A booking container: one customer visit made of one or more
/// sequential items, each with its own staff, time, and service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Canonical identifier assigned by the database.
    /// `None` indicates the booking has not been persisted yet.
    pub booking_id: Option<i64>,
    /// The business this booking belongs to.
    pub business_id: i64,
    /// The location where the booking takes place.
    pub location_id: i64,
    /// The customer, when known (walk-ins have no client).
    pub client_id: Option<i64>,
    /// The lifecycle state.
    pub status: BookingStatus,
    /// Free-form operator notes.
    pub notes: Option<String>,
    /// Client-supplied token making creation safe to retry.
    pub idempotency_key: Option<String>,
    /// The recurrence rule this booking belongs to, if any.
    pub recurrence_rule_id: Option<i64>,
    /// 0-based ordinal within the recurring series.
    pub recurrence_index: Option<i32>,
    /// The booking this one replaced (reschedule-as-replacement).
    pub replaces_booking_id: Option<i64>,
    /// The booking that replaced this one.
    pub replaced_by_booking_id: Option<i64>,
    /// The items making up this booking, ordered by start time.
    pub items: Vec<BookingItem>,
}

impl Booking {
    /// Creates a new `Booking` without a persisted ID.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyBookingItems` if `items` is empty.
    pub fn new(
        business_id: i64,
        location_id: i64,
        client_id: Option<i64>,
        items: Vec<BookingItem>,
    ) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::EmptyBookingItems);
        }
        Ok(Self {
            booking_id: None,
            business_id,
            location_id,
            client_id,
            status: BookingStatus::Pending,
            notes: None,
            idempotency_key: None,
            recurrence_rule_id: None,
            recurrence_index: None,
            replaces_booking_id: None,
            replaced_by_booking_id: None,
            items,
        })
    }

    /// Validates and applies a status transition.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the lifecycle
    /// state machine forbids the requested transition.
    pub fn transition_to(&mut self, target: BookingStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidStatusTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }

    /// Returns the start of the first item, if any.
    #[must_use]
    pub fn first_start(&self) -> Option<PrimitiveDateTime> {
        self.items.iter().map(|item| item.start_time).min()
    }
}
