// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{interval, weekday_plan, working};
use crate::error::CoreError;
use crate::schedule::slots_for_date;
use agenda_domain::{
    ClosurePeriod, ClosureScope, ExceptionKind, PlanType, ScheduleException, StaffPlan, WeekLabel,
};
use time::macros::{date, time};

#[test]
fn no_covering_plan_is_distinct_from_empty_day() {
    let plan = weekday_plan(1, date!(2025 - 01 - 06));
    let result = slots_for_date(&[plan], &[], &[], date!(2025 - 01 - 05)).unwrap();
    assert_eq!(result, None);
}

#[test]
fn covered_weekend_day_is_empty_not_none() {
    // Plan covers the date but the template has no Sunday intervals.
    let plan = weekday_plan(1, date!(2025 - 01 - 06));
    let result = slots_for_date(&[plan], &[], &[], date!(2025 - 01 - 12)).unwrap();
    assert_eq!(result, Some(Vec::new()));
}

#[test]
fn weekday_template_resolves() {
    let plan = weekday_plan(1, date!(2025 - 01 - 06));
    let result = slots_for_date(&[plan], &[], &[], date!(2025 - 01 - 06)).unwrap();
    assert_eq!(result, Some(vec![interval(540, 1080)]));
}

#[test]
fn two_covering_plans_are_a_consistency_violation() {
    let first = weekday_plan(1, date!(2025 - 01 - 06));
    let second = weekday_plan(1, date!(2025 - 01 - 01));
    let err = slots_for_date(&[first, second], &[], &[], date!(2025 - 01 - 08)).unwrap_err();
    assert_eq!(
        err,
        CoreError::OverlappingPlans {
            staff_id: 1,
            date: date!(2025 - 01 - 08),
        }
    );
}

#[test]
fn adjoining_plan_validity_ranges_do_not_overlap() {
    let mut first = weekday_plan(1, date!(2025 - 01 - 06));
    first.valid_to = Some(date!(2025 - 01 - 31));
    let second = weekday_plan(1, date!(2025 - 02 - 01));
    let result = slots_for_date(&[first, second], &[], &[], date!(2025 - 02 - 03)).unwrap();
    assert_eq!(result, Some(vec![interval(540, 1080)]));
}

#[test]
fn whole_day_unavailable_exception_clears_the_day() {
    let plan = weekday_plan(1, date!(2025 - 01 - 06));
    let exc = ScheduleException::new(
        1,
        date!(2025 - 01 - 06),
        None,
        None,
        ExceptionKind::Unavailable,
        Some(String::from("vacation")),
    )
    .unwrap();
    let result = slots_for_date(&[plan], &[exc], &[], date!(2025 - 01 - 06)).unwrap();
    assert_eq!(result, Some(Vec::new()));
}

#[test]
fn timed_unavailable_exception_splits_the_shift() {
    let plan = weekday_plan(1, date!(2025 - 01 - 06));
    let exc = ScheduleException::new(
        1,
        date!(2025 - 01 - 06),
        Some(time!(12:00)),
        Some(time!(13:00)),
        ExceptionKind::Unavailable,
        None,
    )
    .unwrap();
    let result = slots_for_date(&[plan], &[exc], &[], date!(2025 - 01 - 06)).unwrap();
    assert_eq!(result, Some(vec![interval(540, 720), interval(780, 1080)]));
}

#[test]
fn edge_unavailable_exception_truncates() {
    let plan = weekday_plan(1, date!(2025 - 01 - 06));
    let exc = ScheduleException::new(
        1,
        date!(2025 - 01 - 06),
        Some(time!(8:00)),
        Some(time!(10:00)),
        ExceptionKind::Unavailable,
        None,
    )
    .unwrap();
    let result = slots_for_date(&[plan], &[exc], &[], date!(2025 - 01 - 06)).unwrap();
    assert_eq!(result, Some(vec![interval(600, 1080)]));
}

#[test]
fn timed_available_exception_extends_the_day() {
    let plan = weekday_plan(1, date!(2025 - 01 - 06));
    let exc = ScheduleException::new(
        1,
        date!(2025 - 01 - 06),
        Some(time!(18:00)),
        Some(time!(20:00)),
        ExceptionKind::Available,
        None,
    )
    .unwrap();
    let result = slots_for_date(&[plan], &[exc], &[], date!(2025 - 01 - 06)).unwrap();
    // Touching the template window, so the two merge.
    assert_eq!(result, Some(vec![interval(540, 1200)]));
}

#[test]
fn whole_day_available_exception_is_a_no_op() {
    let plan = weekday_plan(1, date!(2025 - 01 - 06));
    let exc = ScheduleException::new(
        1,
        date!(2025 - 01 - 06),
        None,
        None,
        ExceptionKind::Available,
        None,
    )
    .unwrap();
    let result = slots_for_date(&[plan], &[exc], &[], date!(2025 - 01 - 06)).unwrap();
    assert_eq!(result, Some(vec![interval(540, 1080)]));
}

#[test]
fn exceptions_for_other_dates_are_ignored() {
    let plan = weekday_plan(1, date!(2025 - 01 - 06));
    let exc = ScheduleException::new(
        1,
        date!(2025 - 01 - 07),
        None,
        None,
        ExceptionKind::Unavailable,
        None,
    )
    .unwrap();
    let result = slots_for_date(&[plan], &[exc], &[], date!(2025 - 01 - 06)).unwrap();
    assert_eq!(result, Some(vec![interval(540, 1080)]));
}

#[test]
fn closure_empties_the_day() {
    let plan = weekday_plan(1, date!(2025 - 01 - 06));
    let closure = ClosurePeriod::new(
        ClosureScope::Location,
        date!(2025 - 01 - 06),
        date!(2025 - 01 - 10),
        Some(String::from("renovation")),
    )
    .unwrap();
    let result = slots_for_date(&[plan], &[], &[closure], date!(2025 - 01 - 08)).unwrap();
    assert_eq!(result, Some(Vec::new()));
}

#[test]
fn closure_beats_an_available_exception() {
    let plan = weekday_plan(1, date!(2025 - 01 - 06));
    let exc = ScheduleException::new(
        1,
        date!(2025 - 01 - 06),
        Some(time!(18:00)),
        Some(time!(20:00)),
        ExceptionKind::Available,
        None,
    )
    .unwrap();
    let closure = ClosurePeriod::new(
        ClosureScope::Business,
        date!(2025 - 01 - 06),
        date!(2025 - 01 - 06),
        None,
    )
    .unwrap();
    let result = slots_for_date(&[plan], &[exc], &[closure], date!(2025 - 01 - 06)).unwrap();
    assert_eq!(result, Some(Vec::new()));
}

#[test]
fn biweekly_plan_alternates_week_labels() {
    // Week A: Monday mornings. Week B: Monday afternoons.
    let plan = StaffPlan {
        plan_id: Some(7),
        staff_id: 1,
        plan_type: PlanType::Biweekly,
        valid_from: date!(2025 - 01 - 06),
        valid_to: None,
        intervals: vec![
            (WeekLabel::A, working(1, time!(9:00), time!(12:00))),
            (WeekLabel::B, working(1, time!(13:00), time!(17:00))),
        ],
    };
    let week_a = slots_for_date(std::slice::from_ref(&plan), &[], &[], date!(2025 - 01 - 06))
        .unwrap()
        .unwrap();
    assert_eq!(week_a, vec![interval(540, 720)]);

    // Seven days later: one whole week elapsed, odd, label B.
    let week_b = slots_for_date(std::slice::from_ref(&plan), &[], &[], date!(2025 - 01 - 13))
        .unwrap()
        .unwrap();
    assert_eq!(week_b, vec![interval(780, 1020)]);

    // Fourteen days later: two whole weeks, even, back to label A.
    let again_a = slots_for_date(&[plan], &[], &[], date!(2025 - 01 - 20))
        .unwrap()
        .unwrap();
    assert_eq!(again_a, vec![interval(540, 720)]);
}
