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

mod booking;
mod catalog;
mod class_event;
mod error;
mod recurrence;
mod schedule;
mod validation;

#[cfg(test)]
mod tests;

pub use booking::{Booking, BookingItem, BookingStatus};
pub use catalog::{Resource, ResourceRequirement, Service, Staff};
pub use class_event::{ClassBooking, ClassBookingStatus, ClassEvent, ClassEventStatus};
pub use error::DomainError;
pub use recurrence::{ConflictStrategy, Frequency, RecurrenceRule};
pub use schedule::{
    ClosurePeriod, ClosureScope, ExceptionKind, PlanType, ScheduleException, StaffPlan, WeekLabel,
    WorkingInterval,
};
pub use validation::{validate_booking_items, validate_idempotency_key, validate_recurrence_rule};
