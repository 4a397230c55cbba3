// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking write paths.
//!
//! All of these run inside `immediate_transaction` so the conflict
//! scan happens under the writer lock (lock-then-check). A conflict
//! rolls the whole transaction back and surfaces the colliding items.

use diesel::prelude::*;
use diesel::SqliteConnection;
use time::{Duration, PrimitiveDateTime};
use tracing::{debug, info};

use crate::data_models::{NewBooking, NewBookingItem, NewRecurrenceRule, encode_date, encode_datetime};
use crate::diesel_schema::{booking_items, bookings, recurrence_rules};
use crate::error::{ConflictingItem, PersistenceError};
use crate::queries;
use crate::sqlite::get_last_insert_rowid;
use agenda_domain::{Booking, BookingStatus, RecurrenceRule};

/// How long an idempotency key shields retries, from first use.
pub const IDEMPOTENCY_TTL_HOURS: i64 = 24;

/// The result of a create-booking call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBookingOutcome {
    /// The booking, freshly created or replayed.
    pub booking: Booking,
    /// `false` when an unexpired idempotency key replayed an earlier
    /// booking instead of writing a new one.
    pub created: bool,
}

/// Which part of a recurring series a bulk cancellation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesCancelScope {
    /// One occurrence, by index.
    Occurrence(i32),
    /// This occurrence and everything after it.
    FromIndex(i32),
    /// The whole series.
    Whole,
}

/// Creates a booking, conflict-checked and idempotent.
///
/// Inside one immediate transaction:
/// 1. An unexpired `(business_id, idempotency_key)` match replays the
///    earlier booking unchanged.
/// 2. Every item is scanned for active overlapping items on its
///    staff member at this location; any hit aborts with
///    [`PersistenceError::BookingConflict`].
/// 3. Otherwise the container and items are inserted and committed.
///
/// # Errors
///
/// Returns `BookingConflict` when a requested window is taken, or a
/// database error.
pub fn create_booking(
    conn: &mut SqliteConnection,
    request: &Booking,
    now: PrimitiveDateTime,
) -> Result<CreateBookingOutcome, PersistenceError> {
    conn.immediate_transaction(|conn| {
        if let Some(key) = &request.idempotency_key
            && let Some(existing) =
                queries::bookings::find_by_idempotency_key(conn, request.business_id, key, now)?
        {
            debug!(
                "Idempotency key replay for business {}: returning booking {:?}",
                request.business_id, existing.booking_id
            );
            return Ok(CreateBookingOutcome {
                booking: existing,
                created: false,
            });
        }

        let conflicts: Vec<ConflictingItem> = scan_conflicts(conn, request, None)?;
        if !conflicts.is_empty() {
            return Err(PersistenceError::BookingConflict { conflicts });
        }

        let booking_id: i64 = insert_booking_rows(conn, request, now)?;
        info!("Created booking {booking_id} with {} item(s)", request.items.len());
        let booking: Booking = queries::bookings::get_booking(conn, booking_id)?;
        Ok(CreateBookingOutcome {
            booking,
            created: true,
        })
    })
}

/// Moves every item of a booking by the same offset, conflict-checked
/// against everything except the booking itself.
///
/// The offset is `new_first_start` minus the start of the earliest
/// item, so multi-item visits keep their internal spacing.
///
/// # Errors
///
/// Returns `BookingNotFound`, `BookingNotActive`, `BookingConflict`,
/// or a database error.
pub fn reschedule_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
    new_first_start: PrimitiveDateTime,
) -> Result<Booking, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let booking: Booking = queries::bookings::get_booking(conn, booking_id)?;
        let shifted: Booking = shifted_copy(&booking, new_first_start)?;

        let conflicts: Vec<ConflictingItem> = scan_conflicts(conn, &shifted, Some(booking_id))?;
        if !conflicts.is_empty() {
            return Err(PersistenceError::BookingConflict { conflicts });
        }

        for (old, new) in booking.items.iter().zip(&shifted.items) {
            diesel::update(
                booking_items::table.filter(booking_items::item_id.eq(old.item_id.unwrap_or_default())),
            )
            .set((
                booking_items::start_time.eq(encode_datetime(new.start_time)?),
                booking_items::end_time.eq(encode_datetime(new.end_time)?),
            ))
            .execute(conn)?;
        }
        info!("Rescheduled booking {booking_id} to {new_first_start}");
        queries::bookings::get_booking(conn, booking_id)
    })
}

/// Reschedule-as-replacement: books the shifted items as a brand new
/// booking, marks the old one `replaced`, and links the two.
///
/// The replacement inherits the original's customer, notes, and
/// lifecycle status.
///
/// # Errors
///
/// Returns `BookingNotFound`, `BookingNotActive`, `BookingConflict`,
/// or a database error.
pub fn replace_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
    new_first_start: PrimitiveDateTime,
    now: PrimitiveDateTime,
) -> Result<Booking, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let original: Booking = queries::bookings::get_booking(conn, booking_id)?;
        let mut replacement: Booking = shifted_copy(&original, new_first_start)?;
        replacement.replaces_booking_id = Some(booking_id);
        replacement.idempotency_key = None;

        let conflicts: Vec<ConflictingItem> = scan_conflicts(conn, &replacement, Some(booking_id))?;
        if !conflicts.is_empty() {
            return Err(PersistenceError::BookingConflict { conflicts });
        }

        let new_id: i64 = insert_booking_rows(conn, &replacement, now)?;
        diesel::update(bookings::table.filter(bookings::booking_id.eq(booking_id)))
            .set((
                bookings::status.eq(BookingStatus::Replaced.as_str()),
                bookings::replaced_by_booking_id.eq(new_id),
            ))
            .execute(conn)?;
        info!("Replaced booking {booking_id} with {new_id}");
        queries::bookings::get_booking(conn, new_id)
    })
}

/// Applies a lifecycle status transition, validated by the domain
/// state machine. Never a delete.
///
/// # Errors
///
/// Returns `BookingNotFound`, a `DomainViolation` for a forbidden
/// transition, or a database error.
pub fn transition_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
    target: BookingStatus,
) -> Result<Booking, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let mut booking: Booking = queries::bookings::get_booking(conn, booking_id)?;
        booking.transition_to(target)?;
        diesel::update(bookings::table.filter(bookings::booking_id.eq(booking_id)))
            .set(bookings::status.eq(target.as_str()))
            .execute(conn)?;
        debug!("Booking {booking_id} transitioned to {target}");
        Ok(booking)
    })
}

/// Persists a recurrence rule, returning its assigned id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_recurrence_rule(
    conn: &mut SqliteConnection,
    rule: &RecurrenceRule,
) -> Result<i64, PersistenceError> {
    let days_of_week: Option<String> = rule
        .days_of_week
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let end_date: Option<String> = rule.end_date.map(encode_date).transpose()?;
    let record: NewRecurrenceRule = NewRecurrenceRule {
        business_id: rule.business_id,
        frequency: rule.frequency.as_str().to_string(),
        interval_value: i32::try_from(rule.interval_value)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?,
        max_occurrences: rule
            .max_occurrences
            .map(i32::try_from)
            .transpose()
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?,
        end_date,
        conflict_strategy: rule.conflict_strategy.as_str().to_string(),
        days_of_week,
        day_of_month: rule.day_of_month.map(i32::from),
    };
    diesel::insert_into(recurrence_rules::table)
        .values(&record)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Fetches a recurrence rule.
///
/// # Errors
///
/// Returns `RuleNotFound` if no such rule exists.
pub fn get_recurrence_rule(
    conn: &mut SqliteConnection,
    rule_id: i64,
) -> Result<RecurrenceRule, PersistenceError> {
    use crate::data_models::RecurrenceRuleRow;
    let row: Option<RecurrenceRuleRow> = recurrence_rules::table
        .filter(recurrence_rules::rule_id.eq(rule_id))
        .first::<RecurrenceRuleRow>(conn)
        .optional()?;
    row.ok_or(PersistenceError::RuleNotFound(rule_id))?.into_domain()
}

/// Cancels part or all of a recurring series with one bulk status
/// update. Only active occurrences are touched.
///
/// Returns the number of bookings cancelled.
///
/// # Errors
///
/// Returns `RuleNotFound` if the rule does not exist, or a database
/// error.
pub fn cancel_series(
    conn: &mut SqliteConnection,
    rule_id: i64,
    scope: SeriesCancelScope,
) -> Result<usize, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let _rule = get_recurrence_rule(conn, rule_id)?;

        let mut update = diesel::update(bookings::table)
            .filter(bookings::recurrence_rule_id.eq(rule_id))
            .filter(bookings::status.eq_any(queries::bookings::ACTIVE_STATUSES))
            .into_boxed();
        update = match scope {
            SeriesCancelScope::Occurrence(index) => {
                update.filter(bookings::recurrence_index.eq(index))
            }
            SeriesCancelScope::FromIndex(index) => {
                update.filter(bookings::recurrence_index.ge(index))
            }
            SeriesCancelScope::Whole => update,
        };
        let cancelled: usize = update
            .set(bookings::status.eq(BookingStatus::Cancelled.as_str()))
            .execute(conn)?;
        info!("Cancelled {cancelled} booking(s) of series {rule_id} ({scope:?})");
        Ok(cancelled)
    })
}

/// Runs the per-item conflict scan for a whole request.
fn scan_conflicts(
    conn: &mut SqliteConnection,
    request: &Booking,
    exclude_booking_id: Option<i64>,
) -> Result<Vec<ConflictingItem>, PersistenceError> {
    let mut conflicts: Vec<ConflictingItem> = Vec::new();
    for item in &request.items {
        conflicts.extend(queries::bookings::conflicting_items(
            conn,
            request.location_id,
            item.staff_id,
            item.start_time,
            item.end_time,
            exclude_booking_id,
        )?);
    }
    conflicts.sort_by_key(|c| (c.start_time, c.item_id));
    conflicts.dedup();
    Ok(conflicts)
}

/// Inserts the container and item rows; returns the new booking id.
fn insert_booking_rows(
    conn: &mut SqliteConnection,
    request: &Booking,
    now: PrimitiveDateTime,
) -> Result<i64, PersistenceError> {
    let idempotency_expires_at: Option<String> = match &request.idempotency_key {
        Some(_) => Some(encode_datetime(now + Duration::hours(IDEMPOTENCY_TTL_HOURS))?),
        None => None,
    };
    let record: NewBooking = NewBooking {
        business_id: request.business_id,
        location_id: request.location_id,
        client_id: request.client_id,
        status: request.status.as_str().to_string(),
        notes: request.notes.clone(),
        idempotency_key: request.idempotency_key.clone(),
        idempotency_expires_at,
        recurrence_rule_id: request.recurrence_rule_id,
        recurrence_index: request.recurrence_index,
        replaces_booking_id: request.replaces_booking_id,
        created_at: encode_datetime(now)?,
    };
    diesel::insert_into(bookings::table)
        .values(&record)
        .execute(conn)?;
    let booking_id: i64 = get_last_insert_rowid(conn)?;

    for item in &request.items {
        let item_record: NewBookingItem = NewBookingItem {
            booking_id,
            staff_id: item.staff_id,
            service_id: item.service_id,
            start_time: encode_datetime(item.start_time)?,
            end_time: encode_datetime(item.end_time)?,
            price_cents: item.price_cents,
        };
        diesel::insert_into(booking_items::table)
            .values(&item_record)
            .execute(conn)?;
    }
    Ok(booking_id)
}

/// Builds an in-memory copy of `booking` with every item shifted so
/// the earliest one starts at `new_first_start`.
fn shifted_copy(
    booking: &Booking,
    new_first_start: PrimitiveDateTime,
) -> Result<Booking, PersistenceError> {
    if !booking.status.is_active() {
        return Err(PersistenceError::BookingNotActive {
            booking_id: booking.booking_id.unwrap_or_default(),
            status: booking.status,
        });
    }
    let first_start: PrimitiveDateTime =
        booking
            .first_start()
            .ok_or_else(|| PersistenceError::DomainViolation(
                agenda_domain::DomainError::EmptyBookingItems,
            ))?;
    let offset: Duration = new_first_start - first_start;

    let mut shifted: Booking = booking.clone();
    for item in &mut shifted.items {
        item.item_id = None;
        item.start_time += offset;
        item.end_time += offset;
    }
    Ok(shifted)
}
