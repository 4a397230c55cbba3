// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit trail persistence tests.

use super::{booking_request, persistence, seed_staff_and_service};
use crate::{AuditEventSummary, Persistence};
use agenda_audit::{Action, Actor, AuditEvent, BookingSnapshot, Cause};
use agenda_domain::{Booking, BookingStatus};
use time::macros::datetime;

fn event_for(booking: &Booking, action: &str) -> AuditEvent {
    AuditEvent::new(
        Actor::new(String::from("op-3"), String::from("operator")),
        Cause::new(String::from("req-123"), String::from("HTTP request")),
        Action::new(String::from(action), None),
        None,
        BookingSnapshot::of(booking),
    )
}

#[test]
fn audit_trail_returns_events_for_one_booking_in_order() {
    let mut store: Persistence = persistence();
    let (staff_id, service_id) = seed_staff_and_service(&mut store);

    let request: Booking = booking_request(
        staff_id,
        service_id,
        datetime!(2025-03-10 10:00:00),
        datetime!(2025-03-10 11:00:00),
    );
    let created: Booking = store.create_booking(&request).expect("created").booking;
    let booking_id: i64 = created.booking_id.expect("id");

    store
        .persist_audit_event(&event_for(&created, "CreateBooking"))
        .expect("first event");

    let mut cancelled: Booking = created.clone();
    cancelled.status = BookingStatus::Cancelled;
    store
        .persist_audit_event(&event_for(&cancelled, "CancelBooking"))
        .expect("second event");

    // An event for some other booking must stay out of the trail.
    let mut other: Booking = created;
    other.booking_id = Some(booking_id + 1);
    store
        .persist_audit_event(&event_for(&other, "CreateBooking"))
        .expect("foreign event");

    let trail: Vec<AuditEventSummary> = store
        .audit_trail_for_booking(booking_id)
        .expect("trail");
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0].action_name, "CreateBooking");
    assert_eq!(trail[1].action_name, "CancelBooking");
    assert_eq!(trail[0].actor_id, "op-3");
}

#[test]
fn persisted_event_ids_increase() {
    let mut store: Persistence = persistence();
    let (staff_id, service_id) = seed_staff_and_service(&mut store);

    let request: Booking = booking_request(
        staff_id,
        service_id,
        datetime!(2025-03-10 10:00:00),
        datetime!(2025-03-10 11:00:00),
    );
    let created: Booking = store.create_booking(&request).expect("created").booking;

    let first: i64 = store
        .persist_audit_event(&event_for(&created, "CreateBooking"))
        .expect("first");
    let second: i64 = store
        .persist_audit_event(&event_for(&created, "ConfirmBooking"))
        .expect("second");
    assert!(second > first);
}
