// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod availability_tests;

use std::cell::RefCell;

use agenda_audit::{Actor, Cause};
use agenda_domain::{PlanType, Service, Staff, StaffPlan, WeekLabel, WorkingInterval};
use agenda_persistence::Persistence;
use time::macros::{date, time};

use crate::notify::{NotificationEvent, NotificationQueue};
use crate::request_response::{BookingItemRequest, CreateBookingRequest};

pub fn persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn actor() -> Actor {
    Actor::new(String::from("op-1"), String::from("operator"))
}

pub fn cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("test request"))
}

/// Seeds one staff member with a 60-minute service and a weekly plan
/// of Monday through Friday, 09:00 to 17:00, open-ended from
/// 2025-01-06. Returns `(staff_id, service_id)`.
pub fn seed_weekday_staff(store: &mut Persistence) -> (i64, i64) {
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

    let intervals: Vec<(WeekLabel, WorkingInterval)> = (1..=5)
        .map(|day| {
            (
                WeekLabel::A,
                WorkingInterval::new(day, time!(09:00), time!(17:00)).expect("interval"),
            )
        })
        .collect();
    store
        .create_staff_plan(&StaffPlan {
            plan_id: None,
            staff_id,
            plan_type: PlanType::Weekly,
            valid_from: date!(2025-01-06),
            valid_to: None,
            intervals,
        })
        .expect("plan");

    (staff_id, service_id)
}

/// A single-item creation request starting at the given datetime text.
pub fn create_request(staff_id: i64, service_id: i64, start: &str) -> CreateBookingRequest {
    CreateBookingRequest {
        business_id: 1,
        location_id: 1,
        client_id: Some(7),
        items: vec![BookingItemRequest {
            service_id,
            staff_id,
            start_time: String::from(start),
        }],
        notes: None,
        idempotency_key: None,
    }
}

/// Captures enqueued notifications for assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub events: RefCell<Vec<NotificationEvent>>,
}

impl NotificationQueue for RecordingNotifier {
    fn enqueue(&self, event: NotificationEvent) {
        self.events.borrow_mut().push(event);
    }
}
