// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog and schedule storage tests.

use super::{persistence, seed_staff_and_service};
use crate::Persistence;
use agenda_domain::{
    ClosurePeriod, ClosureScope, ExceptionKind, PlanType, ScheduleException, Staff, StaffPlan,
    WeekLabel, WorkingInterval,
};
use time::macros::{date, time};

#[test]
fn staff_plan_round_trips_with_intervals() {
    let mut store: Persistence = persistence();
    let (staff_id, _) = seed_staff_and_service(&mut store);

    let plan: StaffPlan = StaffPlan {
        plan_id: None,
        staff_id,
        plan_type: PlanType::Biweekly,
        valid_from: date!(2025-01-06),
        valid_to: Some(date!(2025-06-29)),
        intervals: vec![
            (
                WeekLabel::A,
                WorkingInterval::new(1, time!(09:00), time!(18:00)).expect("interval"),
            ),
            (
                WeekLabel::B,
                WorkingInterval::new(2, time!(12:00), time!(20:00)).expect("interval"),
            ),
        ],
    };
    let created: StaffPlan = store.create_staff_plan(&plan).expect("plan");
    assert!(created.plan_id.is_some());

    let plans: Vec<StaffPlan> = store.staff_plans(staff_id).expect("plans");
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].plan_type, PlanType::Biweekly);
    assert_eq!(plans[0].valid_to, Some(date!(2025-06-29)));
    assert_eq!(plans[0].intervals.len(), 2);
    assert_eq!(plans[0].intervals[0].0, WeekLabel::A);
    assert_eq!(plans[0].intervals[1].1.start(), time!(12:00));
}

#[test]
fn exceptions_query_is_bounded_by_date_range() {
    let mut store: Persistence = persistence();
    let (staff_id, _) = seed_staff_and_service(&mut store);

    let vacation: ScheduleException = ScheduleException::new(
        staff_id,
        date!(2025-03-12),
        None,
        None,
        ExceptionKind::Unavailable,
        Some(String::from("vacation")),
    )
    .expect("exception");
    store.create_schedule_exception(&vacation).expect("stored");

    let training: ScheduleException = ScheduleException::new(
        staff_id,
        date!(2025-04-02),
        Some(time!(09:00)),
        Some(time!(12:00)),
        ExceptionKind::Unavailable,
        Some(String::from("training")),
    )
    .expect("exception");
    store.create_schedule_exception(&training).expect("stored");

    let march: Vec<ScheduleException> = store
        .exceptions_in_range(staff_id, date!(2025-03-01), date!(2025-03-31))
        .expect("march");
    assert_eq!(march.len(), 1);
    assert_eq!(march[0].date, date!(2025-03-12));
    assert_eq!(march[0].start, None);

    let spring: Vec<ScheduleException> = store
        .exceptions_in_range(staff_id, date!(2025-03-01), date!(2025-04-30))
        .expect("spring");
    assert_eq!(spring.len(), 2);
}

#[test]
fn closures_include_business_wide_and_own_location_only() {
    let mut store: Persistence = persistence();

    let business_wide: ClosurePeriod = ClosurePeriod::new(
        ClosureScope::Business,
        date!(2025-12-24),
        date!(2025-12-26),
        Some(String::from("holidays")),
    )
    .expect("closure");
    store
        .create_closure(&business_wide, 1, None)
        .expect("stored");

    let here: ClosurePeriod = ClosurePeriod::new(
        ClosureScope::Location,
        date!(2025-07-01),
        date!(2025-07-14),
        Some(String::from("renovation")),
    )
    .expect("closure");
    store.create_closure(&here, 1, Some(1)).expect("stored");

    let elsewhere: ClosurePeriod = ClosurePeriod::new(
        ClosureScope::Location,
        date!(2025-08-01),
        date!(2025-08-07),
        None,
    )
    .expect("closure");
    store.create_closure(&elsewhere, 1, Some(2)).expect("stored");

    let visible: Vec<ClosurePeriod> = store
        .closures_for_location(1, 1)
        .expect("closures");
    assert_eq!(visible.len(), 2);
    assert!(visible.iter().any(|c| c.scope == ClosureScope::Business));
    assert!(
        visible
            .iter()
            .all(|c| c.start_date != date!(2025-08-01))
    );
}

#[test]
fn capable_staff_requires_every_service() {
    let mut store: Persistence = persistence();
    let (staff_id, service_id) = seed_staff_and_service(&mut store);

    let second: Staff = store
        .create_staff(&Staff {
            staff_id: None,
            business_id: 1,
            location_id: 1,
            display_name: String::from("Evan"),
        })
        .expect("staff");
    let second_id: i64 = second.staff_id.expect("id");

    let extra = store
        .create_service(
            &agenda_domain::Service::new(1, 1, String::from("Color"), 90, 15, 9000)
                .expect("service"),
        )
        .expect("service row");
    let extra_id: i64 = extra.service_id.expect("id");

    store
        .assign_service_to_staff(staff_id, extra_id)
        .expect("first does both");
    store
        .assign_service_to_staff(second_id, extra_id)
        .expect("second does one");

    let both: Vec<Staff> = store
        .list_capable_staff(1, &[service_id, extra_id])
        .expect("capable");
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].staff_id, Some(staff_id));

    let one: Vec<Staff> = store.list_capable_staff(1, &[extra_id]).expect("capable");
    assert_eq!(one.len(), 2);
}

#[test]
fn resource_requirements_round_trip() {
    let mut store: Persistence = persistence();
    let (_, service_id) = seed_staff_and_service(&mut store);

    let chair = store
        .create_resource(&agenda_domain::Resource {
            resource_id: None,
            location_id: 1,
            name: String::from("Treatment chair"),
            capacity: 2,
        })
        .expect("resource");
    let resource_id: i64 = chair.resource_id.expect("id");

    store
        .set_resource_requirement(service_id, resource_id, 1)
        .expect("requirement");

    let needs = store
        .resource_requirements(service_id)
        .expect("requirements");
    assert_eq!(needs.len(), 1);
    assert_eq!(needs[0].0.name, "Treatment chair");
    assert_eq!(needs[0].1, 1);
}
