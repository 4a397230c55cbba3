// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Class event and class booking reads.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::{ClassBookingRow, ClassEventRow};
use crate::diesel_schema::{class_bookings, class_events};
use crate::error::PersistenceError;
use agenda_domain::{ClassBooking, ClassEvent};

/// Fetches one class event with its counters.
///
/// # Errors
///
/// Returns `ClassEventNotFound` if no such event exists.
pub fn get_class_event(
    conn: &mut SqliteConnection,
    class_event_id: i64,
) -> Result<ClassEvent, PersistenceError> {
    let row: ClassEventRow = class_events::table
        .filter(class_events::class_event_id.eq(class_event_id))
        .first::<ClassEventRow>(conn)
        .optional()?
        .ok_or(PersistenceError::ClassEventNotFound(class_event_id))?;
    row.into_domain()
}

/// Finds the customer's non-cancelled claim on an event, if any.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn active_class_booking(
    conn: &mut SqliteConnection,
    class_event_id: i64,
    customer_id: i64,
) -> Result<Option<ClassBooking>, PersistenceError> {
    let row: Option<ClassBookingRow> = class_bookings::table
        .filter(class_bookings::class_event_id.eq(class_event_id))
        .filter(class_bookings::customer_id.eq(customer_id))
        .filter(class_bookings::status.ne("CANCELLED_BY_CUSTOMER"))
        .first::<ClassBookingRow>(conn)
        .optional()?;
    row.map(ClassBookingRow::into_domain).transpose()
}

/// Lists an event's waitlisted claims in promotion order: position,
/// then booking time, then id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn waitlist_in_order(
    conn: &mut SqliteConnection,
    class_event_id: i64,
) -> Result<Vec<ClassBooking>, PersistenceError> {
    let rows: Vec<ClassBookingRow> = class_bookings::table
        .filter(class_bookings::class_event_id.eq(class_event_id))
        .filter(class_bookings::status.eq("WAITLISTED"))
        .order((
            class_bookings::waitlist_position.asc(),
            class_bookings::booked_at.asc(),
            class_bookings::class_booking_id.asc(),
        ))
        .load::<ClassBookingRow>(conn)?;
    rows.into_iter().map(ClassBookingRow::into_domain).collect()
}

/// Lists every claim on an event, cancelled rows included.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_class_bookings(
    conn: &mut SqliteConnection,
    class_event_id: i64,
) -> Result<Vec<ClassBooking>, PersistenceError> {
    let rows: Vec<ClassBookingRow> = class_bookings::table
        .filter(class_bookings::class_event_id.eq(class_event_id))
        .order(class_bookings::class_booking_id.asc())
        .load::<ClassBookingRow>(conn)?;
    rows.into_iter().map(ClassBookingRow::into_domain).collect()
}
