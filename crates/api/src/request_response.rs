// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates and times cross the boundary as strings: dates as
//! `YYYY-MM-DD`, date-times as `YYYY-MM-DD HH:MM:SS`, and availability
//! slot starts as `HH:MM`. Parsing happens once, at the boundary, and
//! a malformed value is a validation error, never a panic.

use std::collections::BTreeMap;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

use crate::error::ApiError;
use agenda_domain::{Booking, BookingItem, ClassBooking};
use agenda_persistence::ConflictingItem;

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
const DATETIME_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const CLOCK_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]");

/// Parses a `YYYY-MM-DD` date from a request field.
///
/// # Errors
///
/// Returns `ApiError::Validation` naming `field` if the text does not
/// parse.
pub fn parse_date(field: &str, text: &str) -> Result<Date, ApiError> {
    Date::parse(text, &DATE_FORMAT).map_err(|e| ApiError::Validation {
        field: field.to_string(),
        message: format!("expected YYYY-MM-DD, got {text:?}: {e}"),
    })
}

/// Parses a `YYYY-MM-DD HH:MM:SS` date-time from a request field.
///
/// # Errors
///
/// Returns `ApiError::Validation` naming `field` if the text does not
/// parse.
pub fn parse_datetime(field: &str, text: &str) -> Result<PrimitiveDateTime, ApiError> {
    PrimitiveDateTime::parse(text, &DATETIME_FORMAT).map_err(|e| ApiError::Validation {
        field: field.to_string(),
        message: format!("expected YYYY-MM-DD HH:MM:SS, got {text:?}: {e}"),
    })
}

/// Formats a date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(value: Date) -> String {
    value.format(&DATE_FORMAT).unwrap_or_default()
}

/// Formats a date-time as `YYYY-MM-DD HH:MM:SS`.
#[must_use]
pub fn format_datetime(value: PrimitiveDateTime) -> String {
    value.format(&DATETIME_FORMAT).unwrap_or_default()
}

/// Formats a time of day as `HH:MM`.
#[must_use]
pub fn format_clock(value: Time) -> String {
    value.format(&CLOCK_FORMAT).unwrap_or_default()
}

/// API request to compute availability over a date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityRequest {
    /// The location being queried.
    pub location_id: i64,
    /// The services the appointment consists of (at least one).
    pub service_ids: Vec<i64>,
    /// First date of the range (`YYYY-MM-DD`, inclusive).
    pub date_from: String,
    /// Last date of the range (`YYYY-MM-DD`, inclusive).
    pub date_to: String,
    /// Restrict to one staff member; `None` unions all capable staff.
    pub staff_id: Option<i64>,
}

/// API response carrying bookable slot starts per date.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AvailabilityResponse {
    /// `HH:MM` slot starts keyed by `YYYY-MM-DD` date, both ascending.
    pub days: BTreeMap<String, Vec<String>>,
}

/// One requested appointment segment inside a create-booking call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookingItemRequest {
    /// The service to perform.
    pub service_id: i64,
    /// The staff member to perform it.
    pub staff_id: i64,
    /// Segment start (`YYYY-MM-DD HH:MM:SS`). The end is derived from
    /// the service's duration plus buffer.
    pub start_time: String,
}

/// API request to create a booking.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateBookingRequest {
    /// The business the booking belongs to.
    pub business_id: i64,
    /// The location where the booking takes place.
    pub location_id: i64,
    /// The customer, when known.
    pub client_id: Option<i64>,
    /// The requested segments (at least one).
    pub items: Vec<BookingItemRequest>,
    /// Free-form operator notes.
    pub notes: Option<String>,
    /// Client token making the call safe to retry for 24 hours.
    pub idempotency_key: Option<String>,
}

/// One persisted booking item.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookingItemInfo {
    /// The persisted item id.
    pub item_id: i64,
    /// The staff member occupied.
    pub staff_id: i64,
    /// The service performed.
    pub service_id: i64,
    /// Occupied window start (`YYYY-MM-DD HH:MM:SS`).
    pub start_time: String,
    /// Occupied window end (`YYYY-MM-DD HH:MM:SS`).
    pub end_time: String,
    /// The price charged, in cents.
    pub price_cents: i64,
}

/// One existing item a rejected booking collided with.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConflictingItemInfo {
    /// The persisted id of the existing item.
    pub item_id: i64,
    /// The staff member both sides want.
    pub staff_id: i64,
    /// Start of the existing occupied window (`YYYY-MM-DD HH:MM:SS`).
    pub start_time: String,
    /// End of the existing occupied window (`YYYY-MM-DD HH:MM:SS`).
    pub end_time: String,
}

impl ConflictingItemInfo {
    /// Renders a conflicting item for the wire.
    #[must_use]
    pub fn of(conflict: &ConflictingItem) -> Self {
        Self {
            item_id: conflict.item_id,
            staff_id: conflict.staff_id,
            start_time: format_datetime(conflict.start_time),
            end_time: format_datetime(conflict.end_time),
        }
    }
}

/// One persisted booking with its items.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookingInfo {
    /// The persisted booking id.
    pub booking_id: i64,
    /// The business the booking belongs to.
    pub business_id: i64,
    /// The location where the booking takes place.
    pub location_id: i64,
    /// The customer, when known.
    pub client_id: Option<i64>,
    /// The lifecycle state.
    pub status: String,
    /// Free-form operator notes.
    pub notes: Option<String>,
    /// The recurrence rule the booking belongs to, if any.
    pub recurrence_rule_id: Option<i64>,
    /// 0-based ordinal within the recurring series.
    pub recurrence_index: Option<i32>,
    /// The booking this one replaced.
    pub replaces_booking_id: Option<i64>,
    /// The booking that replaced this one.
    pub replaced_by_booking_id: Option<i64>,
    /// The items, ordered by start time.
    pub items: Vec<BookingItemInfo>,
}

impl BookingInfo {
    /// Renders a domain booking for the wire.
    #[must_use]
    pub fn of(booking: &Booking) -> Self {
        Self {
            booking_id: booking.booking_id.unwrap_or_default(),
            business_id: booking.business_id,
            location_id: booking.location_id,
            client_id: booking.client_id,
            status: booking.status.as_str().to_string(),
            notes: booking.notes.clone(),
            recurrence_rule_id: booking.recurrence_rule_id,
            recurrence_index: booking.recurrence_index,
            replaces_booking_id: booking.replaces_booking_id,
            replaced_by_booking_id: booking.replaced_by_booking_id,
            items: booking.items.iter().map(item_info).collect(),
        }
    }
}

fn item_info(item: &BookingItem) -> BookingItemInfo {
    BookingItemInfo {
        item_id: item.item_id.unwrap_or_default(),
        staff_id: item.staff_id,
        service_id: item.service_id,
        start_time: format_datetime(item.start_time),
        end_time: format_datetime(item.end_time),
        price_cents: item.price_cents,
    }
}

/// API response for a create-booking call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateBookingResponse {
    /// The booking, freshly created or replayed.
    pub booking: BookingInfo,
    /// `false` when an unexpired idempotency key replayed an earlier
    /// booking instead of writing a new one.
    pub created: bool,
    /// A success message.
    pub message: String,
}

/// API request to move a booking to a new start.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RescheduleBookingRequest {
    /// The new start of the first item (`YYYY-MM-DD HH:MM:SS`); every
    /// item shifts by the same offset.
    pub new_start_time: String,
    /// When `true`, the move creates a replacement booking and retires
    /// the original instead of editing it in place.
    #[serde(default)]
    pub as_replacement: bool,
}

/// API request to apply a lifecycle transition to a booking.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransitionBookingRequest {
    /// The target status (`confirmed`, `completed`, `no_show`, ...).
    pub status: String,
}

/// API response carrying one booking after a write.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookingResponse {
    /// The booking after the operation.
    pub booking: BookingInfo,
    /// A success message.
    pub message: String,
}

/// The recurrence pattern inside a recurring-booking request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecurrenceRuleRequest {
    /// `weekly`, `biweekly`, or `monthly`.
    pub frequency: String,
    /// Multiplier on the cadence (every N weeks/fortnights/months).
    pub interval_value: u32,
    /// Stop after this many occurrences (including the first).
    pub max_occurrences: Option<u32>,
    /// Stop after this date (`YYYY-MM-DD`, inclusive).
    pub end_date: Option<String>,
    /// `skip`, `reschedule`, or `fail`.
    pub conflict_strategy: String,
    /// ISO days (1 = Monday .. 7 = Sunday); weekly/biweekly only.
    pub days_of_week: Option<Vec<u8>>,
    /// Day of month for monthly rules.
    pub day_of_month: Option<u8>,
}

/// API request to create a recurring series of bookings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateRecurringBookingRequest {
    /// The business the series belongs to.
    pub business_id: i64,
    /// The location where the bookings take place.
    pub location_id: i64,
    /// The customer, when known.
    pub client_id: Option<i64>,
    /// The first occurrence's segments; later occurrences copy their
    /// time-of-day and duration.
    pub items: Vec<BookingItemRequest>,
    /// Free-form operator notes, copied to every occurrence.
    pub notes: Option<String>,
    /// The repetition pattern.
    pub recurrence: RecurrenceRuleRequest,
}

/// What happened to one occurrence of a recurring series.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OccurrenceOutcomeInfo {
    /// 0-based ordinal within the series.
    pub index: i32,
    /// The occurrence's planned date (`YYYY-MM-DD`).
    pub date: String,
    /// `created`, `skipped`, or `rescheduled`.
    pub outcome: String,
    /// The booking written for this occurrence, when one was.
    pub booking_id: Option<i64>,
    /// The booked start (`YYYY-MM-DD HH:MM:SS`); differs from the
    /// planned date when the occurrence was rescheduled.
    pub start_time: Option<String>,
}

/// API response for a recurring-booking expansion.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateRecurringBookingResponse {
    /// The persisted recurrence rule.
    pub rule_id: i64,
    /// One outcome per occurrence, in series order.
    pub outcomes: Vec<OccurrenceOutcomeInfo>,
    /// A success message.
    pub message: String,
}

/// One previewed occurrence: the date and whether it would conflict.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OccurrencePreviewInfo {
    /// 0-based ordinal within the series.
    pub index: i32,
    /// The occurrence's date (`YYYY-MM-DD`).
    pub date: String,
    /// Whether booking this occurrence as planned would conflict.
    pub conflicts: bool,
}

/// API response for a recurring-booking preview. Nothing is written.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PreviewRecurringBookingResponse {
    /// One entry per occurrence, in series order.
    pub occurrences: Vec<OccurrencePreviewInfo>,
}

/// API request to cancel part or all of a recurring series.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CancelSeriesRequest {
    /// `occurrence`, `from_index`, or `whole`.
    pub scope: String,
    /// The occurrence index; required unless the scope is `whole`.
    pub index: Option<i32>,
}

/// API response for a series cancellation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CancelSeriesResponse {
    /// How many bookings were cancelled.
    pub cancelled: usize,
    /// A success message.
    pub message: String,
}

/// One audit trail entry for a booking.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditEventInfo {
    /// The id assigned at append time.
    pub event_id: i64,
    /// Who initiated the change.
    pub actor_id: String,
    /// What was done.
    pub action_name: String,
}

/// API response carrying a booking's audit trail, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditTrailResponse {
    /// The booking the trail belongs to.
    pub booking_id: i64,
    /// The trail entries.
    pub events: Vec<AuditEventInfo>,
}

/// API request to claim a seat on a class event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClassBookRequest {
    /// The customer claiming a seat.
    pub customer_id: i64,
}

/// API response for a class booking.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClassBookingResponse {
    /// The persisted claim id.
    pub class_booking_id: i64,
    /// The event.
    pub class_event_id: i64,
    /// The customer.
    pub customer_id: i64,
    /// `CONFIRMED` or `WAITLISTED`.
    pub status: String,
    /// 1-based queue rank; present only while waitlisted.
    pub waitlist_position: Option<i32>,
    /// A success message.
    pub message: String,
}

impl ClassBookingResponse {
    /// Renders a domain class booking for the wire.
    #[must_use]
    pub fn of(claim: &ClassBooking, message: String) -> Self {
        Self {
            class_booking_id: claim.class_booking_id.unwrap_or_default(),
            class_event_id: claim.class_event_id,
            customer_id: claim.customer_id,
            status: claim.status.as_str().to_string(),
            waitlist_position: claim.waitlist_position,
            message,
        }
    }
}

/// API request to cancel a claim on a class event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClassCancelRequest {
    /// The customer giving up their claim.
    pub customer_id: i64,
}

/// API response for a class-booking cancellation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ClassCancelResponse {
    /// `false` when the customer held no active claim.
    pub cancelled: bool,
    /// A success message.
    pub message: String,
}
