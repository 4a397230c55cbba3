// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Class event seat state machine.
//!
//! Booking and cancellation each run inside one immediate
//! transaction; the event row's counters are read and updated under
//! the writer lock so the capacity check is race-free.

use diesel::prelude::*;
use diesel::SqliteConnection;
use time::PrimitiveDateTime;
use tracing::{debug, info};

use crate::data_models::{NewClassBooking, encode_datetime};
use crate::diesel_schema::{class_bookings, class_events};
use crate::error::PersistenceError;
use crate::queries;
use crate::sqlite::get_last_insert_rowid;
use agenda_domain::{ClassBooking, ClassBookingStatus, ClassEvent, ClassEventStatus};

/// Books a seat on a class event, or queues the customer when full.
///
/// Inside one immediate transaction:
/// - the event must exist and be `SCHEDULED`;
/// - an existing non-cancelled claim by this customer is returned
///   unchanged (idempotent re-book);
/// - with seats left, the claim is `CONFIRMED` and `confirmed_count`
///   incremented;
/// - otherwise, with the waitlist enabled, the claim is `WAITLISTED`
///   at position `waitlist_count + 1`;
/// - otherwise the booking is refused with `CapacityExhausted`.
///
/// # Errors
///
/// Returns `ClassEventNotFound`, `ClassEventNotBookable`,
/// `CapacityExhausted`, or a database error.
pub fn class_book(
    conn: &mut SqliteConnection,
    class_event_id: i64,
    customer_id: i64,
    now: PrimitiveDateTime,
) -> Result<ClassBooking, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let event: ClassEvent = queries::class_events::get_class_event(conn, class_event_id)?;
        if event.status != ClassEventStatus::Scheduled {
            return Err(PersistenceError::ClassEventNotBookable(class_event_id));
        }

        if let Some(existing) =
            queries::class_events::active_class_booking(conn, class_event_id, customer_id)?
        {
            debug!(
                "Customer {customer_id} already holds a claim on event {class_event_id}; replaying"
            );
            return Ok(existing);
        }

        let (status, position) = if event.seats_left() > 0 {
            (ClassBookingStatus::Confirmed, None)
        } else if event.waitlist_enabled {
            (ClassBookingStatus::Waitlisted, Some(event.waitlist_count + 1))
        } else {
            return Err(PersistenceError::CapacityExhausted { class_event_id });
        };

        let record: NewClassBooking = NewClassBooking {
            class_event_id,
            customer_id,
            status: status.as_str().to_string(),
            waitlist_position: position,
            booked_at: encode_datetime(now)?,
        };
        diesel::insert_into(class_bookings::table)
            .values(&record)
            .execute(conn)?;
        let class_booking_id: i64 = get_last_insert_rowid(conn)?;

        match status {
            ClassBookingStatus::Confirmed => {
                diesel::update(
                    class_events::table.filter(class_events::class_event_id.eq(class_event_id)),
                )
                .set(class_events::confirmed_count.eq(class_events::confirmed_count + 1))
                .execute(conn)?;
            }
            ClassBookingStatus::Waitlisted => {
                diesel::update(
                    class_events::table.filter(class_events::class_event_id.eq(class_event_id)),
                )
                .set(class_events::waitlist_count.eq(class_events::waitlist_count + 1))
                .execute(conn)?;
            }
            ClassBookingStatus::CancelledByCustomer => {}
        }

        info!(
            "Customer {customer_id} booked event {class_event_id} as {} (position {position:?})",
            status.as_str()
        );
        Ok(ClassBooking {
            class_booking_id: Some(class_booking_id),
            class_event_id,
            customer_id,
            status,
            waitlist_position: position,
            booked_at: now,
            cancelled_at: None,
        })
    })
}

/// Cancels a customer's claim on a class event.
///
/// A confirmed cancellation frees a seat and promotes the head of the
/// waitlist (position, then booking time, then id); a waitlisted
/// cancellation just leaves the queue. Either way the remaining
/// waitlist positions are re-packed dense `1..N`.
///
/// Returns `false` when the customer held no active claim.
///
/// # Errors
///
/// Returns `ClassEventNotFound` or a database error.
pub fn class_cancel(
    conn: &mut SqliteConnection,
    class_event_id: i64,
    customer_id: i64,
    now: PrimitiveDateTime,
) -> Result<bool, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let _event: ClassEvent = queries::class_events::get_class_event(conn, class_event_id)?;
        let Some(claim) =
            queries::class_events::active_class_booking(conn, class_event_id, customer_id)?
        else {
            return Ok(false);
        };
        let claim_id: i64 = claim.class_booking_id.unwrap_or_default();
        let now_text: String = encode_datetime(now)?;

        diesel::update(class_bookings::table.filter(class_bookings::class_booking_id.eq(claim_id)))
            .set((
                class_bookings::status.eq(ClassBookingStatus::CancelledByCustomer.as_str()),
                class_bookings::waitlist_position.eq(None::<i32>),
                class_bookings::cancelled_at.eq(now_text),
            ))
            .execute(conn)?;

        match claim.status {
            ClassBookingStatus::Confirmed => {
                diesel::update(
                    class_events::table.filter(class_events::class_event_id.eq(class_event_id)),
                )
                .set(class_events::confirmed_count.eq(class_events::confirmed_count - 1))
                .execute(conn)?;
                promote_waitlist_head(conn, class_event_id)?;
            }
            ClassBookingStatus::Waitlisted => {
                diesel::update(
                    class_events::table.filter(class_events::class_event_id.eq(class_event_id)),
                )
                .set(class_events::waitlist_count.eq(class_events::waitlist_count - 1))
                .execute(conn)?;
            }
            ClassBookingStatus::CancelledByCustomer => {}
        }

        repack_waitlist(conn, class_event_id)?;
        info!("Customer {customer_id} cancelled their claim on event {class_event_id}");
        Ok(true)
    })
}

/// Promotes the earliest waitlisted claim into the freed seat.
fn promote_waitlist_head(
    conn: &mut SqliteConnection,
    class_event_id: i64,
) -> Result<(), PersistenceError> {
    let queue: Vec<ClassBooking> = queries::class_events::waitlist_in_order(conn, class_event_id)?;
    let Some(head) = queue.first() else {
        return Ok(());
    };
    let head_id: i64 = head.class_booking_id.unwrap_or_default();

    diesel::update(class_bookings::table.filter(class_bookings::class_booking_id.eq(head_id)))
        .set((
            class_bookings::status.eq(ClassBookingStatus::Confirmed.as_str()),
            class_bookings::waitlist_position.eq(None::<i32>),
        ))
        .execute(conn)?;
    diesel::update(class_events::table.filter(class_events::class_event_id.eq(class_event_id)))
        .set((
            class_events::confirmed_count.eq(class_events::confirmed_count + 1),
            class_events::waitlist_count.eq(class_events::waitlist_count - 1),
        ))
        .execute(conn)?;
    debug!("Promoted class booking {head_id} on event {class_event_id}");
    Ok(())
}

/// Rewrites the remaining waitlist positions as dense `1..N`.
fn repack_waitlist(
    conn: &mut SqliteConnection,
    class_event_id: i64,
) -> Result<(), PersistenceError> {
    let queue: Vec<ClassBooking> = queries::class_events::waitlist_in_order(conn, class_event_id)?;
    for (index, claim) in queue.iter().enumerate() {
        let position: i32 = i32::try_from(index + 1)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        if claim.waitlist_position != Some(position) {
            diesel::update(
                class_bookings::table
                    .filter(class_bookings::class_booking_id.eq(claim.class_booking_id.unwrap_or_default())),
            )
            .set(class_bookings::waitlist_position.eq(position))
            .execute(conn)?;
        }
    }
    Ok(())
}
