// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{ConflictStrategy, DomainError, Frequency, RecurrenceRule};
use time::macros::date;

#[test]
fn test_rule_rejects_zero_interval() {
    let result = RecurrenceRule::new(
        1,
        Frequency::Weekly,
        0,
        Some(5),
        None,
        ConflictStrategy::Skip,
        None,
        None,
    );
    assert!(matches!(
        result,
        Err(DomainError::InvalidRecurrenceRule(_))
    ));
}

#[test]
fn test_rule_rejects_zero_max_occurrences() {
    let result = RecurrenceRule::new(
        1,
        Frequency::Weekly,
        1,
        Some(0),
        None,
        ConflictStrategy::Skip,
        None,
        None,
    );
    assert!(result.is_err());
}

#[test]
fn test_days_of_week_only_for_weekly_rules() {
    let result = RecurrenceRule::new(
        1,
        Frequency::Monthly,
        1,
        Some(6),
        None,
        ConflictStrategy::Skip,
        Some(vec![1, 3]),
        Some(15),
    );
    assert!(result.is_err());

    let ok = RecurrenceRule::new(
        1,
        Frequency::Biweekly,
        1,
        Some(6),
        None,
        ConflictStrategy::Skip,
        Some(vec![1, 3]),
        None,
    );
    assert!(ok.is_ok());
}

#[test]
fn test_days_of_week_entries_must_be_iso() {
    let result = RecurrenceRule::new(
        1,
        Frequency::Weekly,
        1,
        Some(4),
        None,
        ConflictStrategy::Skip,
        Some(vec![1, 8]),
        None,
    );
    assert!(result.is_err());

    let empty = RecurrenceRule::new(
        1,
        Frequency::Weekly,
        1,
        Some(4),
        None,
        ConflictStrategy::Skip,
        Some(vec![]),
        None,
    );
    assert!(empty.is_err());
}

#[test]
fn test_day_of_month_only_for_monthly_rules() {
    let result = RecurrenceRule::new(
        1,
        Frequency::Weekly,
        1,
        Some(4),
        None,
        ConflictStrategy::Skip,
        None,
        Some(15),
    );
    assert!(result.is_err());

    let out_of_range = RecurrenceRule::new(
        1,
        Frequency::Monthly,
        1,
        Some(4),
        None,
        ConflictStrategy::Skip,
        None,
        Some(32),
    );
    assert!(out_of_range.is_err());
}

#[test]
fn test_valid_monthly_rule() {
    let rule = RecurrenceRule::new(
        1,
        Frequency::Monthly,
        1,
        None,
        Some(date!(2026 - 12 - 31)),
        ConflictStrategy::Reschedule,
        None,
        Some(31),
    )
    .unwrap();
    assert_eq!(rule.frequency, Frequency::Monthly);
    assert_eq!(rule.day_of_month, Some(31));
}

#[test]
fn test_strategy_string_round_trip() {
    for strategy in [
        ConflictStrategy::Skip,
        ConflictStrategy::Reschedule,
        ConflictStrategy::Fail,
    ] {
        let parsed: ConflictStrategy = strategy.as_str().parse().unwrap();
        assert_eq!(parsed, strategy);
    }
    assert!("force".parse::<ConflictStrategy>().is_err());
}

#[test]
fn test_frequency_string_round_trip() {
    for frequency in [Frequency::Weekly, Frequency::Biweekly, Frequency::Monthly] {
        let parsed: Frequency = frequency.as_str().parse().unwrap();
        assert_eq!(parsed, frequency);
    }
    assert!("daily".parse::<Frequency>().is_err());
}
