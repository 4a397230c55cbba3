// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    BookingItem, ConflictStrategy, DomainError, Frequency, RecurrenceRule,
    validate_booking_items, validate_idempotency_key, validate_recurrence_rule,
};
use time::macros::datetime;

#[test]
fn test_empty_item_list_is_rejected() {
    assert!(matches!(
        validate_booking_items(&[]),
        Err(DomainError::EmptyBookingItems)
    ));
}

#[test]
fn test_self_overlapping_request_is_rejected() {
    let items = [
        BookingItem::new(
            1,
            10,
            datetime!(2026-03-02 10:00),
            datetime!(2026-03-02 11:00),
            0,
        )
        .unwrap(),
        BookingItem::new(
            1,
            11,
            datetime!(2026-03-02 10:30),
            datetime!(2026-03-02 11:30),
            0,
        )
        .unwrap(),
    ];
    assert!(validate_booking_items(&items).is_err());
}

#[test]
fn test_same_times_different_staff_are_fine() {
    let items = [
        BookingItem::new(
            1,
            10,
            datetime!(2026-03-02 10:00),
            datetime!(2026-03-02 11:00),
            0,
        )
        .unwrap(),
        BookingItem::new(
            2,
            11,
            datetime!(2026-03-02 10:00),
            datetime!(2026-03-02 11:00),
            0,
        )
        .unwrap(),
    ];
    assert!(validate_booking_items(&items).is_ok());
}

#[test]
fn test_adjacent_items_same_staff_are_fine() {
    let items = [
        BookingItem::new(
            1,
            10,
            datetime!(2026-03-02 10:00),
            datetime!(2026-03-02 11:00),
            0,
        )
        .unwrap(),
        BookingItem::new(
            1,
            11,
            datetime!(2026-03-02 11:00),
            datetime!(2026-03-02 12:00),
            0,
        )
        .unwrap(),
    ];
    assert!(validate_booking_items(&items).is_ok());
}

#[test]
fn test_unbounded_fail_strategy_is_rejected() {
    let rule: RecurrenceRule = RecurrenceRule::new(
        1,
        Frequency::Weekly,
        1,
        None,
        None,
        ConflictStrategy::Fail,
        None,
        None,
    )
    .unwrap();
    assert!(validate_recurrence_rule(&rule).is_err());
}

#[test]
fn test_unbounded_skip_strategy_is_allowed() {
    let rule: RecurrenceRule = RecurrenceRule::new(
        1,
        Frequency::Weekly,
        1,
        None,
        None,
        ConflictStrategy::Skip,
        None,
        None,
    )
    .unwrap();
    assert!(validate_recurrence_rule(&rule).is_ok());
}

#[test]
fn test_idempotency_key_bounds() {
    assert!(validate_idempotency_key("retry-abc-123").is_ok());
    assert!(validate_idempotency_key("").is_err());
    assert!(validate_idempotency_key(&"x".repeat(256)).is_err());
    assert!(validate_idempotency_key(&"x".repeat(255)).is_ok());
}
