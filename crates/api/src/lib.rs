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
#![allow(clippy::multiple_crate_versions)]

//! Transport-agnostic operations over the booking engine.
//!
//! Handlers take plain request structs and a [`Persistence`] handle,
//! run validation and the pure engines, and return response structs.
//! The HTTP layer is a thin shell over this crate.
//!
//! [`Persistence`]: agenda_persistence::Persistence

mod error;
mod handlers;
mod notify;
mod request_response;

#[cfg(test)]
mod tests;

pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    RESCHEDULE_LOOKAHEAD_DAYS, booking_audit_trail, cancel_booking, cancel_series, class_book,
    class_cancel, create_booking, create_recurring_booking, get_availability, get_booking,
    preview_recurring_booking, reschedule_booking, transition_booking,
};
pub use notify::{NotificationEvent, NotificationQueue, NullNotifier};
pub use request_response::{
    AuditEventInfo, AuditTrailResponse, AvailabilityRequest, AvailabilityResponse, BookingInfo,
    BookingItemInfo, BookingItemRequest, BookingResponse, CancelSeriesRequest,
    CancelSeriesResponse, ClassBookRequest, ClassBookingResponse, ClassCancelRequest,
    ClassCancelResponse, ConflictingItemInfo, CreateBookingRequest, CreateBookingResponse,
    CreateRecurringBookingRequest, CreateRecurringBookingResponse, OccurrenceOutcomeInfo,
    OccurrencePreviewInfo, PreviewRecurringBookingResponse, RecurrenceRuleRequest,
    RescheduleBookingRequest, TransitionBookingRequest,
};
