// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Availability handler tests.
//!
//! 2025-03-10 is a Monday inside the seeded weekday plan.

use super::{actor, cause, create_request, persistence, seed_weekday_staff};
use crate::error::ApiError;
use crate::handlers::{create_booking, get_availability};
use crate::notify::NullNotifier;
use crate::request_response::{AvailabilityRequest, AvailabilityResponse};
use agenda_domain::{ClosurePeriod, ClosureScope, Resource, Staff};
use agenda_persistence::Persistence;
use time::macros::date;

fn request(service_id: i64, date_from: &str, date_to: &str) -> AvailabilityRequest {
    AvailabilityRequest {
        location_id: 1,
        service_ids: vec![service_id],
        date_from: String::from(date_from),
        date_to: String::from(date_to),
        staff_id: None,
    }
}

#[test]
fn slots_follow_the_grid_inside_working_hours() {
    let mut store: Persistence = persistence();
    let (_, service_id) = seed_weekday_staff(&mut store);

    let response: AvailabilityResponse = get_availability(
        &mut store,
        &request(service_id, "2025-03-10", "2025-03-10"),
        date!(2025-03-10),
    )
    .expect("availability");

    let slots: &Vec<String> = response.days.get("2025-03-10").expect("monday entry");
    // 09:00 through 16:00 on a 15-minute grid for a 60-minute service.
    assert_eq!(slots.len(), 29);
    assert_eq!(slots.first().map(String::as_str), Some("09:00"));
    assert_eq!(slots.last().map(String::as_str), Some("16:00"));
    assert!(!slots.iter().any(|s| s == "16:15"));
}

#[test]
fn existing_booking_carves_out_overlapping_starts() {
    let mut store: Persistence = persistence();
    let (staff_id, service_id) = seed_weekday_staff(&mut store);
    create_booking(
        &mut store,
        &create_request(staff_id, service_id, "2025-03-10 10:00:00"),
        &actor(),
        cause(),
        &NullNotifier,
    )
    .expect("booking");

    let response: AvailabilityResponse = get_availability(
        &mut store,
        &request(service_id, "2025-03-10", "2025-03-10"),
        date!(2025-03-10),
    )
    .expect("availability");

    let slots: &Vec<String> = response.days.get("2025-03-10").expect("monday entry");
    assert!(slots.iter().any(|s| s == "09:00"));
    assert!(slots.iter().any(|s| s == "11:00"));
    for blocked in ["09:15", "09:30", "10:00", "10:45"] {
        assert!(!slots.iter().any(|s| s == blocked), "{blocked} should be taken");
    }
}

#[test]
fn unplanned_and_past_dates_yield_empty_lists() {
    let mut store: Persistence = persistence();
    let (_, service_id) = seed_weekday_staff(&mut store);

    // Saturday 2025-03-15 is outside the weekday template; Sunday too.
    let response: AvailabilityResponse = get_availability(
        &mut store,
        &request(service_id, "2025-03-15", "2025-03-16"),
        date!(2025-03-10),
    )
    .expect("availability");
    assert_eq!(response.days.get("2025-03-15").map(Vec::len), Some(0));
    assert_eq!(response.days.get("2025-03-16").map(Vec::len), Some(0));

    // Yesterday is inside the plan but behind the horizon.
    let past: AvailabilityResponse = get_availability(
        &mut store,
        &request(service_id, "2025-03-07", "2025-03-07"),
        date!(2025-03-10),
    )
    .expect("availability");
    assert_eq!(past.days.get("2025-03-07").map(Vec::len), Some(0));
}

#[test]
fn dates_beyond_the_horizon_yield_empty_lists() {
    let mut store: Persistence = persistence();
    let (_, service_id) = seed_weekday_staff(&mut store);

    // 2025-06-02 is a Monday 84 days out, past the 60-day horizon.
    let response: AvailabilityResponse = get_availability(
        &mut store,
        &request(service_id, "2025-06-02", "2025-06-02"),
        date!(2025-03-10),
    )
    .expect("availability");
    assert_eq!(response.days.get("2025-06-02").map(Vec::len), Some(0));
}

#[test]
fn closures_blank_out_the_day() {
    let mut store: Persistence = persistence();
    let (_, service_id) = seed_weekday_staff(&mut store);
    let closure: ClosurePeriod = ClosurePeriod::new(
        ClosureScope::Location,
        date!(2025-03-10),
        date!(2025-03-10),
        Some(String::from("maintenance")),
    )
    .expect("closure");
    store.create_closure(&closure, 1, Some(1)).expect("stored");

    let response: AvailabilityResponse = get_availability(
        &mut store,
        &request(service_id, "2025-03-10", "2025-03-11"),
        date!(2025-03-10),
    )
    .expect("availability");
    assert_eq!(response.days.get("2025-03-10").map(Vec::len), Some(0));
    assert!(response.days.get("2025-03-11").is_some_and(|s| !s.is_empty()));
}

#[test]
fn resource_at_capacity_excludes_the_window_for_other_staff() {
    let mut store: Persistence = persistence();
    let (staff_id, service_id) = seed_weekday_staff(&mut store);

    let colleague: Staff = store
        .create_staff(&Staff {
            staff_id: None,
            business_id: 1,
            location_id: 1,
            display_name: String::from("Evan"),
        })
        .expect("staff");
    let colleague_id: i64 = colleague.staff_id.expect("id");
    store
        .assign_service_to_staff(colleague_id, service_id)
        .expect("assignment");

    let room: Resource = store
        .create_resource(&Resource {
            resource_id: None,
            location_id: 1,
            name: String::from("Treatment room"),
            capacity: 1,
        })
        .expect("resource");
    store
        .set_resource_requirement(service_id, room.resource_id.expect("id"), 1)
        .expect("requirement");

    create_booking(
        &mut store,
        &create_request(staff_id, service_id, "2025-03-10 10:00:00"),
        &actor(),
        cause(),
        &NullNotifier,
    )
    .expect("booking");

    // Colleague follows the same template.
    let mut plan = store.staff_plans(staff_id).expect("plans").remove(0);
    plan.plan_id = None;
    plan.staff_id = colleague_id;
    store.create_staff_plan(&plan).expect("colleague plan");

    let mut colleague_only: AvailabilityRequest =
        request(service_id, "2025-03-10", "2025-03-10");
    colleague_only.staff_id = Some(colleague_id);

    let response: AvailabilityResponse =
        get_availability(&mut store, &colleague_only, date!(2025-03-10))
            .expect("availability");
    let slots: &Vec<String> = response.days.get("2025-03-10").expect("monday entry");
    // The colleague is free at 10:00 but the only room is claimed.
    assert!(!slots.iter().any(|s| s == "10:00"));
    assert!(slots.iter().any(|s| s == "11:00"));
}

#[test]
fn inverted_range_is_rejected() {
    let mut store: Persistence = persistence();
    let (_, service_id) = seed_weekday_staff(&mut store);

    let err: ApiError = get_availability(
        &mut store,
        &request(service_id, "2025-03-12", "2025-03-10"),
        date!(2025-03-10),
    )
    .expect_err("inverted range");
    assert!(matches!(err, ApiError::Validation { ref field, .. } if field == "date_to"));
}

#[test]
fn location_without_staff_yields_empty_lists() {
    let mut store: Persistence = persistence();
    let (_, service_id) = seed_weekday_staff(&mut store);

    let mut req: AvailabilityRequest = request(service_id, "2025-03-10", "2025-03-10");
    req.location_id = 9;
    let response: AvailabilityResponse =
        get_availability(&mut store, &req, date!(2025-03-10)).expect("availability");
    assert_eq!(response.days["2025-03-10"], Vec::<String>::new());
}

#[test]
fn staff_from_another_location_is_rejected() {
    let mut store: Persistence = persistence();
    let (_, service_id) = seed_weekday_staff(&mut store);
    let remote: Staff = store
        .create_staff(&Staff {
            staff_id: None,
            business_id: 1,
            location_id: 2,
            display_name: String::from("Remote"),
        })
        .expect("staff");

    let mut req: AvailabilityRequest = request(service_id, "2025-03-10", "2025-03-10");
    req.staff_id = remote.staff_id;
    let err: ApiError =
        get_availability(&mut store, &req, date!(2025-03-10)).expect_err("wrong location");
    assert!(matches!(err, ApiError::Validation { ref field, .. } if field == "staff_id"));
}
