// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod audit_tests;
mod initialization_tests;
mod schedule_tests;

use crate::Persistence;
use agenda_domain::{Booking, BookingItem, ClassEvent, Service, Staff};
use time::PrimitiveDateTime;

pub fn persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

/// Seeds one staff member who can perform one 60-minute service.
/// Returns `(staff_id, service_id)`.
pub fn seed_staff_and_service(store: &mut Persistence) -> (i64, i64) {
    let member: Staff = store
        .create_staff(&Staff {
            staff_id: None,
            business_id: 1,
            location_id: 1,
            display_name: String::from("Dana"),
        })
        .expect("staff");
    let service: Service = store
        .create_service(
            &Service::new(1, 1, String::from("Consultation"), 60, 0, 5000).expect("service"),
        )
        .expect("service row");
    let staff_id: i64 = member.staff_id.expect("staff id");
    let service_id: i64 = service.service_id.expect("service id");
    store
        .assign_service_to_staff(staff_id, service_id)
        .expect("assignment");
    (staff_id, service_id)
}

/// Builds a single-item pending booking request for the seeded staff
/// member and service.
pub fn booking_request(
    staff_id: i64,
    service_id: i64,
    start: PrimitiveDateTime,
    end: PrimitiveDateTime,
) -> Booking {
    let item: BookingItem = BookingItem::new(staff_id, service_id, start, end, 5000).expect("item");
    Booking::new(1, 1, Some(7), vec![item]).expect("booking")
}

/// A scheduled class event at location 1 with the given capacity.
pub fn class_event(capacity_total: i32, waitlist_enabled: bool) -> ClassEvent {
    ClassEvent::new(
        1,
        1,
        String::from("Morning Yoga"),
        time::macros::datetime!(2025-03-10 09:00:00),
        time::macros::datetime!(2025-03-10 10:00:00),
        capacity_total,
        0,
        waitlist_enabled,
    )
    .expect("class event")
}
