// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{ClassBookingStatus, ClassEvent, ClassEventStatus, DomainError};
use time::macros::datetime;

fn create_test_event(capacity_total: i32, capacity_reserved: i32) -> Result<ClassEvent, DomainError> {
    ClassEvent::new(
        1,
        1,
        String::from("Yoga 101"),
        datetime!(2026-03-02 18:00),
        datetime!(2026-03-02 19:00),
        capacity_total,
        capacity_reserved,
        true,
    )
}

#[test]
fn test_event_rejects_zero_capacity() {
    assert!(matches!(
        create_test_event(0, 0),
        Err(DomainError::InvalidCapacity(_))
    ));
}

#[test]
fn test_event_rejects_reserve_exceeding_total() {
    assert!(create_test_event(5, 6).is_err());
    assert!(create_test_event(5, -1).is_err());
}

#[test]
fn test_event_rejects_inverted_time_range() {
    let result = ClassEvent::new(
        1,
        1,
        String::from("Yoga 101"),
        datetime!(2026-03-02 19:00),
        datetime!(2026-03-02 18:00),
        5,
        0,
        true,
    );
    assert!(matches!(result, Err(DomainError::InvalidTimeRange { .. })));
}

#[test]
fn test_seats_left_accounts_for_reserve() {
    let mut event: ClassEvent = create_test_event(10, 2).unwrap();
    assert_eq!(event.seats_left(), 8);
    event.confirmed_count = 8;
    assert_eq!(event.seats_left(), 0);
}

#[test]
fn test_new_event_is_scheduled() {
    let event: ClassEvent = create_test_event(5, 0).unwrap();
    assert_eq!(event.status, ClassEventStatus::Scheduled);
    assert_eq!(event.confirmed_count, 0);
    assert_eq!(event.waitlist_count, 0);
}

#[test]
fn test_class_booking_transition_matrix() {
    // Promotion and cancellation.
    assert!(ClassBookingStatus::Waitlisted.can_transition_to(ClassBookingStatus::Confirmed));
    assert!(
        ClassBookingStatus::Confirmed.can_transition_to(ClassBookingStatus::CancelledByCustomer)
    );
    assert!(
        ClassBookingStatus::Waitlisted.can_transition_to(ClassBookingStatus::CancelledByCustomer)
    );

    // Cancellation is terminal; confirmed seats are never demoted.
    assert!(
        !ClassBookingStatus::CancelledByCustomer.can_transition_to(ClassBookingStatus::Confirmed)
    );
    assert!(!ClassBookingStatus::Confirmed.can_transition_to(ClassBookingStatus::Waitlisted));
}

#[test]
fn test_class_booking_status_round_trip() {
    for status in [
        ClassBookingStatus::Confirmed,
        ClassBookingStatus::Waitlisted,
        ClassBookingStatus::CancelledByCustomer,
    ] {
        let parsed: ClassBookingStatus = status.as_str().parse().unwrap();
        assert_eq!(parsed, status);
    }
    assert!("EXPIRED".parse::<ClassBookingStatus>().is_err());
}
