// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking reads: container reassembly, idempotency lookup, and the
//! conflict scan shared by the write paths.

use diesel::prelude::*;
use diesel::SqliteConnection;
use time::PrimitiveDateTime;

use crate::data_models::{BookingItemRow, BookingRow, encode_datetime};
use crate::diesel_schema::{booking_items, bookings};
use crate::error::{ConflictingItem, PersistenceError};
use agenda_domain::{Booking, BookingStatus};

/// Statuses that occupy staff time.
pub(crate) const ACTIVE_STATUSES: [&str; 2] = ["pending", "confirmed"];

/// Fetches a booking container with its items.
///
/// # Errors
///
/// Returns `BookingNotFound` if no such booking exists.
pub fn get_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Booking, PersistenceError> {
    let row: BookingRow = bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .first::<BookingRow>(conn)
        .optional()?
        .ok_or(PersistenceError::BookingNotFound(booking_id))?;

    let item_rows: Vec<BookingItemRow> = booking_items::table
        .filter(booking_items::booking_id.eq(booking_id))
        .order(booking_items::start_time.asc())
        .load::<BookingItemRow>(conn)?;

    row.into_domain(item_rows)
}

/// Looks up an unexpired booking created with the same idempotency
/// key for this business.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_by_idempotency_key(
    conn: &mut SqliteConnection,
    business_id: i64,
    key: &str,
    now: PrimitiveDateTime,
) -> Result<Option<Booking>, PersistenceError> {
    let now_text: String = encode_datetime(now)?;
    let row: Option<BookingRow> = bookings::table
        .filter(bookings::business_id.eq(business_id))
        .filter(bookings::idempotency_key.eq(key))
        .filter(bookings::idempotency_expires_at.gt(now_text))
        .order(bookings::booking_id.desc())
        .first::<BookingRow>(conn)
        .optional()?;

    match row {
        Some(row) => {
            let booking_id: i64 = row.booking_id;
            let item_rows: Vec<BookingItemRow> = booking_items::table
                .filter(booking_items::booking_id.eq(booking_id))
                .order(booking_items::start_time.asc())
                .load::<BookingItemRow>(conn)?;
            Ok(Some(row.into_domain(item_rows)?))
        }
        None => Ok(None),
    }
}

/// Finds the active items of one staff member at one location that
/// overlap `[start, end)`, half-open.
///
/// This is the write-time conflict scan; it runs inside the booking
/// transactions, after the write lock is taken.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn conflicting_items(
    conn: &mut SqliteConnection,
    location_id: i64,
    staff_id: i64,
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
    exclude_booking_id: Option<i64>,
) -> Result<Vec<ConflictingItem>, PersistenceError> {
    let start_text: String = encode_datetime(start)?;
    let end_text: String = encode_datetime(end)?;

    let mut query = booking_items::table
        .inner_join(bookings::table)
        .filter(bookings::location_id.eq(location_id))
        .filter(bookings::status.eq_any(ACTIVE_STATUSES))
        .filter(booking_items::staff_id.eq(staff_id))
        .filter(booking_items::start_time.lt(end_text))
        .filter(booking_items::end_time.gt(start_text))
        .into_boxed();
    if let Some(exclude) = exclude_booking_id {
        query = query.filter(bookings::booking_id.ne(exclude));
    }

    let rows: Vec<BookingItemRow> = query
        .select(booking_items::all_columns)
        .order(booking_items::start_time.asc())
        .load::<BookingItemRow>(conn)?;

    let mut conflicts: Vec<ConflictingItem> = Vec::with_capacity(rows.len());
    for row in rows {
        let item = row.into_domain()?;
        conflicts.push(ConflictingItem {
            item_id: item.item_id.unwrap_or_default(),
            staff_id: item.staff_id,
            start_time: item.start_time,
            end_time: item.end_time,
        });
    }
    Ok(conflicts)
}

/// Loads the active occupied windows for one staff member at one
/// location inside `[window_start, window_end)`.
///
/// Used by the availability engine; it is a pure read and takes no
/// locks.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn occupied_windows(
    conn: &mut SqliteConnection,
    location_id: i64,
    staff_id: i64,
    window_start: PrimitiveDateTime,
    window_end: PrimitiveDateTime,
) -> Result<Vec<(PrimitiveDateTime, PrimitiveDateTime)>, PersistenceError> {
    let rows: Vec<ConflictingItem> = conflicting_items(
        conn,
        location_id,
        staff_id,
        window_start,
        window_end,
        None,
    )?;
    Ok(rows
        .into_iter()
        .map(|item| (item.start_time, item.end_time))
        .collect())
}

/// Loads the resource units claimed by active bookings that overlap
/// `[start, end)` at a location, for one resource.
///
/// Each entry pairs the claiming item's window with the units its
/// service requires of the resource.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn resource_claims(
    conn: &mut SqliteConnection,
    location_id: i64,
    resource_id: i64,
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
) -> Result<Vec<(PrimitiveDateTime, PrimitiveDateTime, i32)>, PersistenceError> {
    use crate::diesel_schema::service_resources;

    let start_text: String = encode_datetime(start)?;
    let end_text: String = encode_datetime(end)?;

    let item_rows: Vec<BookingItemRow> = booking_items::table
        .inner_join(bookings::table)
        .filter(bookings::location_id.eq(location_id))
        .filter(bookings::status.eq_any(ACTIVE_STATUSES))
        .filter(booking_items::start_time.lt(end_text))
        .filter(booking_items::end_time.gt(start_text))
        .select(booking_items::all_columns)
        .load::<BookingItemRow>(conn)?;

    let mut claims: Vec<(PrimitiveDateTime, PrimitiveDateTime, i32)> = Vec::new();
    for row in item_rows {
        let quantity: Option<i32> = service_resources::table
            .filter(service_resources::service_id.eq(row.service_id))
            .filter(service_resources::resource_id.eq(resource_id))
            .select(service_resources::quantity)
            .first::<i32>(conn)
            .optional()?;
        if let Some(quantity) = quantity {
            let item = row.into_domain()?;
            claims.push((item.start_time, item.end_time, quantity));
        }
    }
    Ok(claims)
}

/// Lists the bookings belonging to a recurring series, ordered by
/// occurrence index.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn bookings_for_rule(
    conn: &mut SqliteConnection,
    rule_id: i64,
) -> Result<Vec<Booking>, PersistenceError> {
    let rows: Vec<BookingRow> = bookings::table
        .filter(bookings::recurrence_rule_id.eq(rule_id))
        .order(bookings::recurrence_index.asc())
        .load::<BookingRow>(conn)?;

    let mut result: Vec<Booking> = Vec::with_capacity(rows.len());
    for row in rows {
        let booking_id: i64 = row.booking_id;
        let item_rows: Vec<BookingItemRow> = booking_items::table
            .filter(booking_items::booking_id.eq(booking_id))
            .order(booking_items::start_time.asc())
            .load::<BookingItemRow>(conn)?;
        result.push(row.into_domain(item_rows)?);
    }
    Ok(result)
}

/// Fetches just the lifecycle status of a booking.
///
/// # Errors
///
/// Returns `BookingNotFound` if no such booking exists.
pub fn booking_status(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<BookingStatus, PersistenceError> {
    use std::str::FromStr;
    let status: Option<String> = bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(bookings::status)
        .first::<String>(conn)
        .optional()?;
    let status: String = status.ok_or(PersistenceError::BookingNotFound(booking_id))?;
    Ok(BookingStatus::from_str(&status)?)
}
