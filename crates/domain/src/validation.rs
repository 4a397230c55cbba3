// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::booking::BookingItem;
use crate::error::DomainError;
use crate::recurrence::RecurrenceRule;

/// Longest idempotency key accepted from clients.
const MAX_IDEMPOTENCY_KEY_LEN: usize = 255;

/// Validates the item list of a create-booking request.
///
/// This rejects malformed input before any transaction opens. It does
/// NOT check for conflicts with existing bookings — that is the
/// booking transaction's job, under its lock.
///
/// # Arguments
///
/// * `items` - The requested booking items
///
/// # Errors
///
/// Returns an error if:
/// - The item list is empty
/// - Two items for the same staff member overlap each other
pub fn validate_booking_items(items: &[BookingItem]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::EmptyBookingItems);
    }

    // Rule: a request must not conflict with itself.
    for (i, a) in items.iter().enumerate() {
        for b in items.iter().skip(i + 1) {
            if a.staff_id == b.staff_id && a.overlaps(b.start_time, b.end_time) {
                return Err(DomainError::InvalidTimeRange {
                    detail: format!(
                        "items {} .. {} and {} .. {} overlap for staff {}",
                        a.start_time, a.end_time, b.start_time, b.end_time, a.staff_id
                    ),
                });
            }
        }
    }

    Ok(())
}

/// Validates a recurrence rule beyond its constructor invariants.
///
/// # Errors
///
/// Returns `DomainError::InvalidRecurrenceRule` if the rule has neither
/// `max_occurrences` nor `end_date` and would rely solely on the
/// safety horizon, while requesting the `fail` strategy — an unbounded
/// fail-fast series is always a caller mistake.
pub fn validate_recurrence_rule(rule: &RecurrenceRule) -> Result<(), DomainError> {
    if rule.max_occurrences.is_none()
        && rule.end_date.is_none()
        && rule.conflict_strategy == crate::recurrence::ConflictStrategy::Fail
    {
        return Err(DomainError::InvalidRecurrenceRule(String::from(
            "fail strategy requires max_occurrences or end_date",
        )));
    }
    Ok(())
}

/// Validates a client-supplied idempotency key.
///
/// # Errors
///
/// Returns `DomainError::InvalidIdempotencyKey` if the key is empty or
/// longer than 255 bytes.
pub fn validate_idempotency_key(key: &str) -> Result<(), DomainError> {
    if key.is_empty() {
        return Err(DomainError::InvalidIdempotencyKey(String::from(
            "key must not be empty",
        )));
    }
    if key.len() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(DomainError::InvalidIdempotencyKey(format!(
            "key exceeds {MAX_IDEMPOTENCY_KEY_LEN} bytes"
        )));
    }
    Ok(())
}
