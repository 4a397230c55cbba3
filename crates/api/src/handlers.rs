// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for the booking engine's operations.
//!
//! Each handler validates its request, runs the pure engines, applies
//! the persistence transaction, and finishes with the side effects:
//! audit append and notification enqueue. Both side effects are
//! best-effort; a failed append is logged and the operation still
//! succeeds.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use time::{Date, Duration, PrimitiveDateTime, Time};
use tracing::{info, warn};

use agenda_audit::{Action, Actor, AuditEvent, BookingSnapshot, Cause};
use agenda_core::{
    TimeInterval, minute_of_day, occurrence_dates, resource_capacity_allows, slot_starts,
    slots_for_date, time_at_minute, within_horizon,
};
use agenda_domain::{
    Booking, BookingItem, BookingStatus, ClosurePeriod, ConflictStrategy, Frequency,
    RecurrenceRule, ScheduleException, Service, Staff, StaffPlan, validate_booking_items,
    validate_idempotency_key, validate_recurrence_rule,
};
use agenda_persistence::{CreateBookingOutcome, Persistence, PersistenceError, SeriesCancelScope};

use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::notify::{NotificationEvent, NotificationQueue};
use crate::request_response::{
    AuditEventInfo, AuditTrailResponse, AvailabilityRequest, AvailabilityResponse,
    BookingInfo, BookingItemRequest, BookingResponse, CancelSeriesRequest, CancelSeriesResponse,
    ClassBookRequest, ClassBookingResponse, ClassCancelRequest, ClassCancelResponse,
    CreateBookingRequest, CreateBookingResponse, CreateRecurringBookingRequest,
    CreateRecurringBookingResponse, OccurrenceOutcomeInfo, OccurrencePreviewInfo,
    PreviewRecurringBookingResponse, RescheduleBookingRequest, TransitionBookingRequest,
    format_clock, format_date, format_datetime, parse_date, parse_datetime,
};

/// How many days past a conflicted occurrence the `reschedule`
/// strategy searches before giving up and skipping.
pub const RESCHEDULE_LOOKAHEAD_DAYS: i64 = 7;

/// Template intervals, overrides, and identity for one staff member,
/// fetched once per availability request.
struct StaffContext {
    staff_id: i64,
    plans: Vec<StaffPlan>,
    exceptions: Vec<ScheduleException>,
}

/// Computes bookable slot starts per date for a location and service
/// combination.
///
/// `today` anchors the booking horizon; the server passes the current
/// date. Dates in the past or beyond the horizon produce empty lists,
/// never an error. This is a pure read: results are advisory and
/// re-validated at booking time.
///
/// # Errors
///
/// Returns `Validation` for malformed input, `NotFound` for unknown
/// services or staff, and `Consistency` when a staff member has
/// overlapping working plans.
pub fn get_availability(
    persistence: &mut Persistence,
    request: &AvailabilityRequest,
    today: Date,
) -> Result<AvailabilityResponse, ApiError> {
    if request.service_ids.is_empty() {
        return Err(ApiError::Validation {
            field: String::from("service_ids"),
            message: String::from("at least one service is required"),
        });
    }
    let date_from: Date = parse_date("date_from", &request.date_from)?;
    let date_to: Date = parse_date("date_to", &request.date_to)?;
    if date_to < date_from {
        return Err(ApiError::Validation {
            field: String::from("date_to"),
            message: format!("range {date_from} .. {date_to} is inverted"),
        });
    }

    let services: Vec<Service> = persistence
        .list_services(&request.service_ids)
        .map_err(translate_persistence_error)?;
    let duration: i32 = services.iter().map(Service::occupied_minutes).sum();

    let staff: Vec<Staff> = match request.staff_id {
        Some(staff_id) => {
            let member: Staff = persistence
                .get_staff(staff_id)
                .map_err(translate_persistence_error)?;
            if member.location_id != request.location_id {
                return Err(ApiError::Validation {
                    field: String::from("staff_id"),
                    message: format!(
                        "staff {staff_id} does not work at location {}",
                        request.location_id
                    ),
                });
            }
            vec![member]
        }
        None => persistence
            .list_capable_staff(request.location_id, &request.service_ids)
            .map_err(translate_persistence_error)?,
    };

    // The business scope comes from the staff roster; with no staff
    // there is nothing a closure could subtract from.
    let closures: Vec<ClosurePeriod> = match staff.first() {
        Some(member) => persistence
            .closures_for_location(member.business_id, request.location_id)
            .map_err(translate_persistence_error)?,
        None => Vec::new(),
    };

    let mut contexts: Vec<StaffContext> = Vec::with_capacity(staff.len());
    for member in &staff {
        let staff_id: i64 = member.staff_id.unwrap_or_default();
        contexts.push(StaffContext {
            staff_id,
            plans: persistence
                .staff_plans(staff_id)
                .map_err(translate_persistence_error)?,
            exceptions: persistence
                .exceptions_in_range(staff_id, date_from, date_to)
                .map_err(translate_persistence_error)?,
        });
    }

    // Aggregate resource demand over the requested services:
    // resource id -> (capacity, total units this appointment needs).
    let mut required: BTreeMap<i64, (i32, i32)> = BTreeMap::new();
    for service_id in &request.service_ids {
        for (resource, quantity) in persistence
            .resource_requirements(*service_id)
            .map_err(translate_persistence_error)?
        {
            let entry = required
                .entry(resource.resource_id.unwrap_or_default())
                .or_insert((resource.capacity, 0));
            entry.1 += quantity;
        }
    }

    let mut days: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut date: Date = date_from;
    while date <= date_to {
        let Some(next_date) = date.next_day() else {
            break;
        };
        let day_start: PrimitiveDateTime = PrimitiveDateTime::new(date, Time::MIDNIGHT);
        let day_end: PrimitiveDateTime = PrimitiveDateTime::new(next_date, Time::MIDNIGHT);

        let mut minutes: BTreeSet<i32> = BTreeSet::new();
        if within_horizon(today, date) {
            for ctx in &contexts {
                let Some(working) =
                    slots_for_date(&ctx.plans, &ctx.exceptions, &closures, date)
                        .map_err(translate_core_error)?
                else {
                    continue;
                };
                if working.is_empty() {
                    continue;
                }
                let windows: Vec<(PrimitiveDateTime, PrimitiveDateTime)> = persistence
                    .occupied_windows(request.location_id, ctx.staff_id, day_start, day_end)
                    .map_err(translate_persistence_error)?;
                let occupied: Vec<TimeInterval> = clamp_windows(&windows, date);
                minutes.extend(slot_starts(&working, &occupied, duration));
            }

            if !minutes.is_empty() && !required.is_empty() {
                minutes = filter_by_resources(
                    persistence,
                    request.location_id,
                    &required,
                    minutes,
                    duration,
                    date,
                    day_start,
                    day_end,
                )?;
            }
        }

        days.insert(
            format_date(date),
            minutes
                .iter()
                .map(|&minute| format_clock(time_at_minute(minute)))
                .collect(),
        );
        date = next_date;
    }

    Ok(AvailabilityResponse { days })
}

/// Drops candidate starts whose occupied window would overdraw any
/// required resource.
#[allow(clippy::too_many_arguments)]
fn filter_by_resources(
    persistence: &mut Persistence,
    location_id: i64,
    required: &BTreeMap<i64, (i32, i32)>,
    minutes: BTreeSet<i32>,
    duration: i32,
    date: Date,
    day_start: PrimitiveDateTime,
    day_end: PrimitiveDateTime,
) -> Result<BTreeSet<i32>, ApiError> {
    let mut constraints: Vec<(i32, i32, Vec<(TimeInterval, i32)>)> =
        Vec::with_capacity(required.len());
    for (resource_id, (capacity, quantity)) in required {
        let claims: Vec<(PrimitiveDateTime, PrimitiveDateTime, i32)> = persistence
            .resource_claims(location_id, *resource_id, day_start, day_end)
            .map_err(translate_persistence_error)?;
        let clamped: Vec<(TimeInterval, i32)> = claims
            .iter()
            .filter_map(|(start, end, units)| {
                clamp_window(*start, *end, date).map(|interval| (interval, *units))
            })
            .collect();
        constraints.push((*capacity, *quantity, clamped));
    }

    Ok(minutes
        .into_iter()
        .filter(|&minute| {
            let Ok(window) = TimeInterval::new(minute, minute + duration) else {
                return false;
            };
            constraints.iter().all(|(capacity, quantity, claims)| {
                resource_capacity_allows(*capacity, claims, &window, *quantity)
            })
        })
        .collect())
}

/// Projects one occupied window onto a date as a minute interval.
///
/// Windows spilling over midnight are clamped to the date's edges;
/// windows not touching the date yield `None`.
fn clamp_window(start: PrimitiveDateTime, end: PrimitiveDateTime, date: Date) -> Option<TimeInterval> {
    if start.date() > date || end.date() < date {
        return None;
    }
    let start_minute: i32 = if start.date() < date {
        0
    } else {
        minute_of_day(start.time())
    };
    let end_minute: i32 = if end.date() > date {
        24 * 60
    } else {
        minute_of_day(end.time())
    };
    TimeInterval::new(start_minute, end_minute).ok()
}

fn clamp_windows(
    windows: &[(PrimitiveDateTime, PrimitiveDateTime)],
    date: Date,
) -> Vec<TimeInterval> {
    windows
        .iter()
        .filter_map(|(start, end)| clamp_window(*start, *end, date))
        .collect()
}

/// Creates a conflict-checked booking.
///
/// Validation happens before any transaction opens; the conflict scan
/// and insert run inside one write-locked transaction in persistence.
/// An unexpired idempotency key replays the earlier booking and skips
/// the side effects.
///
/// # Errors
///
/// Returns `Validation` for malformed input, `Conflict` when a
/// requested window is taken, or `Internal` for storage faults.
pub fn create_booking(
    persistence: &mut Persistence,
    request: &CreateBookingRequest,
    actor: &Actor,
    cause: Cause,
    notifier: &dyn NotificationQueue,
) -> Result<CreateBookingResponse, ApiError> {
    let items: Vec<BookingItem> = build_items(persistence, &request.items)?;
    validate_booking_items(&items).map_err(translate_domain_error)?;
    if let Some(key) = &request.idempotency_key {
        validate_idempotency_key(key).map_err(translate_domain_error)?;
    }

    let mut booking: Booking = Booking::new(
        request.business_id,
        request.location_id,
        request.client_id,
        items,
    )
    .map_err(translate_domain_error)?;
    booking.notes = request.notes.clone();
    booking.idempotency_key = request.idempotency_key.clone();

    let outcome: CreateBookingOutcome = persistence
        .create_booking(&booking)
        .map_err(translate_persistence_error)?;
    let booking_id: i64 = outcome.booking.booking_id.unwrap_or_default();

    if outcome.created {
        record_audit(
            persistence,
            actor,
            &cause,
            "CreateBooking",
            None,
            None,
            &outcome.booking,
        );
        notifier.enqueue(NotificationEvent::BookingCreated { booking_id });
    }

    let message: String = if outcome.created {
        format!("Created booking {booking_id}")
    } else {
        format!("Replayed booking {booking_id} for idempotency key")
    };
    info!(booking_id, created = outcome.created, "create_booking");

    Ok(CreateBookingResponse {
        booking: BookingInfo::of(&outcome.booking),
        created: outcome.created,
        message,
    })
}

/// Retrieves a booking with its items.
///
/// # Errors
///
/// Returns `NotFound` or `Internal`.
pub fn get_booking(
    persistence: &mut Persistence,
    booking_id: i64,
) -> Result<BookingInfo, ApiError> {
    let booking: Booking = persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?;
    Ok(BookingInfo::of(&booking))
}

/// Cancels a booking, releasing its time.
///
/// # Errors
///
/// Returns `Validation` when the booking is already terminal,
/// `NotFound`, or `Internal`.
pub fn cancel_booking(
    persistence: &mut Persistence,
    booking_id: i64,
    actor: &Actor,
    cause: Cause,
    notifier: &dyn NotificationQueue,
) -> Result<BookingResponse, ApiError> {
    let before: Booking = persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?;
    let after: Booking = persistence
        .transition_booking(booking_id, BookingStatus::Cancelled)
        .map_err(translate_persistence_error)?;

    record_audit(
        persistence,
        actor,
        &cause,
        "CancelBooking",
        None,
        Some(&before),
        &after,
    );
    notifier.enqueue(NotificationEvent::BookingCancelled { booking_id });
    info!(booking_id, "cancel_booking");

    Ok(BookingResponse {
        booking: BookingInfo::of(&after),
        message: format!("Cancelled booking {booking_id}"),
    })
}

/// Applies a lifecycle transition (`confirmed`, `completed`,
/// `no_show`, ...) to a booking.
///
/// # Errors
///
/// Returns `Validation` for an unknown status or an illegal
/// transition, `NotFound`, or `Internal`.
pub fn transition_booking(
    persistence: &mut Persistence,
    booking_id: i64,
    request: &TransitionBookingRequest,
    actor: &Actor,
    cause: Cause,
) -> Result<BookingResponse, ApiError> {
    let target: BookingStatus =
        BookingStatus::from_str(&request.status).map_err(translate_domain_error)?;
    let before: Booking = persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?;
    let after: Booking = persistence
        .transition_booking(booking_id, target)
        .map_err(translate_persistence_error)?;

    record_audit(
        persistence,
        actor,
        &cause,
        "TransitionBooking",
        Some(target.as_str().to_string()),
        Some(&before),
        &after,
    );
    info!(booking_id, status = target.as_str(), "transition_booking");

    Ok(BookingResponse {
        booking: BookingInfo::of(&after),
        message: format!("Booking {booking_id} is now {}", target.as_str()),
    })
}

/// Moves a booking to a new start, either in place or as a
/// replacement booking linked to the retired original.
///
/// Every item shifts by the offset between the first item's old and
/// new starts.
///
/// # Errors
///
/// Returns `Conflict` when the target window is taken, `Validation`
/// when the booking no longer occupies time, `NotFound`, or
/// `Internal`.
pub fn reschedule_booking(
    persistence: &mut Persistence,
    booking_id: i64,
    request: &RescheduleBookingRequest,
    actor: &Actor,
    cause: Cause,
    notifier: &dyn NotificationQueue,
) -> Result<BookingResponse, ApiError> {
    let new_start: PrimitiveDateTime = parse_datetime("new_start_time", &request.new_start_time)?;
    let before: Booking = persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?;

    let (after, action): (Booking, &str) = if request.as_replacement {
        let replacement: Booking = persistence
            .replace_booking(booking_id, new_start)
            .map_err(translate_persistence_error)?;
        (replacement, "ReplaceBooking")
    } else {
        let moved: Booking = persistence
            .reschedule_booking(booking_id, new_start)
            .map_err(translate_persistence_error)?;
        (moved, "RescheduleBooking")
    };
    let moved_id: i64 = after.booking_id.unwrap_or_default();

    record_audit(
        persistence,
        actor,
        &cause,
        action,
        Some(request.new_start_time.clone()),
        Some(&before),
        &after,
    );
    notifier.enqueue(NotificationEvent::BookingRescheduled {
        booking_id: moved_id,
    });
    info!(booking_id, moved_id, action, "reschedule_booking");

    Ok(BookingResponse {
        booking: BookingInfo::of(&after),
        message: format!("Moved booking {booking_id} to {}", request.new_start_time),
    })
}

/// Expands a recurrence rule and books each occurrence independently,
/// applying the rule's conflict strategy.
///
/// Each occurrence is its own transaction; there is no enclosing
/// transaction across the series. The `fail` strategy compensates by
/// cancelling the occurrences already created.
///
/// # Errors
///
/// Returns `Validation` for a malformed rule or items, `Conflict`
/// under the `fail` strategy, or `Internal` for storage faults.
pub fn create_recurring_booking(
    persistence: &mut Persistence,
    request: &CreateRecurringBookingRequest,
    actor: &Actor,
    cause: Cause,
    notifier: &dyn NotificationQueue,
) -> Result<CreateRecurringBookingResponse, ApiError> {
    let rule: RecurrenceRule = build_rule(request.business_id, request)?;
    let anchor_items: Vec<BookingItem> = build_items(persistence, &request.items)?;
    validate_booking_items(&anchor_items).map_err(translate_domain_error)?;
    let anchor_start: PrimitiveDateTime = first_start(&anchor_items)?;
    let anchor_date: Date = anchor_start.date();

    let dates: Vec<Date> = occurrence_dates(&rule, anchor_date);
    let rule_id: i64 = persistence
        .create_recurrence_rule(&rule)
        .map_err(translate_persistence_error)?;

    let mut outcomes: Vec<OccurrenceOutcomeInfo> = Vec::with_capacity(dates.len());
    let mut created_ids: Vec<i64> = Vec::new();

    for (position, date) in dates.iter().enumerate() {
        let index: i32 = occurrence_index(position)?;
        let offset: Duration =
            Duration::days(i64::from(date.to_julian_day() - anchor_date.to_julian_day()));
        let occurrence: Booking =
            occurrence_booking(request, &anchor_items, offset, rule_id, index)?;

        match persistence.create_booking(&occurrence) {
            Ok(outcome) => {
                let booking_id: i64 = outcome.booking.booking_id.unwrap_or_default();
                created_ids.push(booking_id);
                record_audit(
                    persistence,
                    actor,
                    &cause,
                    "CreateBooking",
                    Some(format!("series {rule_id} occurrence {index}")),
                    None,
                    &outcome.booking,
                );
                notifier.enqueue(NotificationEvent::BookingCreated { booking_id });
                outcomes.push(OccurrenceOutcomeInfo {
                    index,
                    date: format_date(*date),
                    outcome: String::from("created"),
                    booking_id: Some(booking_id),
                    start_time: outcome.booking.first_start().map(format_datetime),
                });
            }
            Err(PersistenceError::BookingConflict { conflicts }) => {
                match rule.conflict_strategy {
                    ConflictStrategy::Skip => {
                        outcomes.push(skipped_outcome(index, *date));
                    }
                    ConflictStrategy::Reschedule => {
                        if let Some(outcome) = reschedule_occurrence(
                            persistence,
                            request,
                            &anchor_items,
                            anchor_start,
                            *date,
                            rule_id,
                            index,
                        )? {
                            let booking_id: i64 = outcome.booking.booking_id.unwrap_or_default();
                            created_ids.push(booking_id);
                            record_audit(
                                persistence,
                                actor,
                                &cause,
                                "CreateBooking",
                                Some(format!("series {rule_id} occurrence {index} rescheduled")),
                                None,
                                &outcome.booking,
                            );
                            notifier.enqueue(NotificationEvent::BookingCreated { booking_id });
                            outcomes.push(OccurrenceOutcomeInfo {
                                index,
                                date: format_date(*date),
                                outcome: String::from("rescheduled"),
                                booking_id: Some(booking_id),
                                start_time: outcome.booking.first_start().map(format_datetime),
                            });
                        } else {
                            outcomes.push(skipped_outcome(index, *date));
                        }
                    }
                    ConflictStrategy::Fail => {
                        unwind_created(persistence, actor, &cause, notifier, &created_ids);
                        return Err(ApiError::Conflict { conflicts });
                    }
                }
            }
            Err(other) => return Err(translate_persistence_error(other)),
        }
    }

    let created: usize = outcomes
        .iter()
        .filter(|o| o.booking_id.is_some())
        .count();
    info!(rule_id, total = outcomes.len(), created, "create_recurring_booking");

    Ok(CreateRecurringBookingResponse {
        rule_id,
        outcomes,
        message: format!(
            "Series {rule_id}: booked {created} of {} occurrences",
            dates.len()
        ),
    })
}

/// Computes a series' occurrence dates and flags the ones that would
/// conflict, writing nothing.
///
/// # Errors
///
/// Returns `Validation` for a malformed rule or items, or `Internal`.
pub fn preview_recurring_booking(
    persistence: &mut Persistence,
    request: &CreateRecurringBookingRequest,
) -> Result<PreviewRecurringBookingResponse, ApiError> {
    let rule: RecurrenceRule = build_rule(request.business_id, request)?;
    let anchor_items: Vec<BookingItem> = build_items(persistence, &request.items)?;
    validate_booking_items(&anchor_items).map_err(translate_domain_error)?;
    let anchor_date: Date = first_start(&anchor_items)?.date();

    let dates: Vec<Date> = occurrence_dates(&rule, anchor_date);
    let mut occurrences: Vec<OccurrencePreviewInfo> = Vec::with_capacity(dates.len());
    for (position, date) in dates.iter().enumerate() {
        let index: i32 = occurrence_index(position)?;
        let offset: Duration =
            Duration::days(i64::from(date.to_julian_day() - anchor_date.to_julian_day()));
        let mut conflicts: bool = false;
        for item in &anchor_items {
            let windows: Vec<(PrimitiveDateTime, PrimitiveDateTime)> = persistence
                .occupied_windows(
                    request.location_id,
                    item.staff_id,
                    item.start_time + offset,
                    item.end_time + offset,
                )
                .map_err(translate_persistence_error)?;
            if !windows.is_empty() {
                conflicts = true;
                break;
            }
        }
        occurrences.push(OccurrencePreviewInfo {
            index,
            date: format_date(*date),
            conflicts,
        });
    }

    Ok(PreviewRecurringBookingResponse { occurrences })
}

/// Cancels part or all of a recurring series: one occurrence, an
/// occurrence and everything after it, or the whole series.
///
/// # Errors
///
/// Returns `Validation` for a bad scope, `NotFound` for an unknown
/// rule, or `Internal`.
pub fn cancel_series(
    persistence: &mut Persistence,
    rule_id: i64,
    request: &CancelSeriesRequest,
    actor: &Actor,
    cause: Cause,
    notifier: &dyn NotificationQueue,
) -> Result<CancelSeriesResponse, ApiError> {
    let scope: SeriesCancelScope = match request.scope.as_str() {
        "whole" => SeriesCancelScope::Whole,
        "occurrence" => SeriesCancelScope::Occurrence(require_index(request)?),
        "from_index" => SeriesCancelScope::FromIndex(require_index(request)?),
        other => {
            return Err(ApiError::Validation {
                field: String::from("scope"),
                message: format!("unknown scope {other:?}; expected occurrence, from_index, or whole"),
            });
        }
    };

    let before: Vec<Booking> = persistence
        .bookings_for_rule(rule_id)
        .map_err(translate_persistence_error)?;
    let cancelled: usize = persistence
        .cancel_series(rule_id, scope)
        .map_err(translate_persistence_error)?;
    let after: Vec<Booking> = persistence
        .bookings_for_rule(rule_id)
        .map_err(translate_persistence_error)?;

    // Audit and notify per booking that actually changed state.
    for updated in &after {
        let previous: Option<&Booking> = before
            .iter()
            .find(|b| b.booking_id == updated.booking_id);
        if previous.is_some_and(|b| b.status != updated.status) {
            record_audit(
                persistence,
                actor,
                &cause,
                "CancelBooking",
                Some(format!("series {rule_id} cancellation")),
                previous,
                updated,
            );
            notifier.enqueue(NotificationEvent::BookingCancelled {
                booking_id: updated.booking_id.unwrap_or_default(),
            });
        }
    }
    info!(rule_id, cancelled, "cancel_series");

    Ok(CancelSeriesResponse {
        cancelled,
        message: format!("Cancelled {cancelled} booking(s) in series {rule_id}"),
    })
}

/// Claims a seat on a class event, queueing the customer when the
/// event is full and has a waitlist.
///
/// # Errors
///
/// Returns `NotFound` for an unknown event, `Validation` when the
/// event is not bookable, `CapacityExhausted` when it is full with no
/// waitlist, or `Internal`.
pub fn class_book(
    persistence: &mut Persistence,
    class_event_id: i64,
    request: &ClassBookRequest,
    actor: &Actor,
    cause: Cause,
) -> Result<ClassBookingResponse, ApiError> {
    let claim = persistence
        .class_book(class_event_id, request.customer_id)
        .map_err(translate_persistence_error)?;

    let event: AuditEvent = AuditEvent::new(
        actor.clone(),
        cause,
        Action::new(
            String::from("ClassBook"),
            Some(claim.status.as_str().to_string()),
        ),
        None,
        BookingSnapshot::of_class_booking(&claim),
    );
    if let Err(err) = persistence.persist_audit_event(&event) {
        warn!(error = %err, class_event_id, "Audit append failed; continuing");
    }

    let message: String = match claim.waitlist_position {
        Some(position) => format!(
            "Event {class_event_id} is full; customer {} waitlisted at position {position}",
            request.customer_id
        ),
        None => format!(
            "Confirmed customer {} on event {class_event_id}",
            request.customer_id
        ),
    };
    info!(class_event_id, customer_id = request.customer_id, status = claim.status.as_str(), "class_book");

    Ok(ClassBookingResponse::of(&claim, message))
}

/// Cancels a customer's claim on a class event, promoting the head of
/// the waitlist when a confirmed seat frees up.
///
/// # Errors
///
/// Returns `NotFound` for an unknown event, or `Internal`.
pub fn class_cancel(
    persistence: &mut Persistence,
    class_event_id: i64,
    request: &ClassCancelRequest,
    actor: &Actor,
    cause: Cause,
) -> Result<ClassCancelResponse, ApiError> {
    let cancelled: bool = persistence
        .class_cancel(class_event_id, request.customer_id)
        .map_err(translate_persistence_error)?;

    if cancelled {
        let claim = persistence
            .list_class_bookings(class_event_id)
            .map_err(translate_persistence_error)?
            .into_iter()
            .filter(|c| c.customer_id == request.customer_id && c.cancelled_at.is_some())
            .max_by_key(|c| c.class_booking_id);
        if let Some(claim) = claim {
            let event: AuditEvent = AuditEvent::new(
                actor.clone(),
                cause,
                Action::new(String::from("ClassCancel"), None),
                None,
                BookingSnapshot::of_class_booking(&claim),
            );
            if let Err(err) = persistence.persist_audit_event(&event) {
                warn!(error = %err, class_event_id, "Audit append failed; continuing");
            }
        }
    }
    info!(class_event_id, customer_id = request.customer_id, cancelled, "class_cancel");

    let message: String = if cancelled {
        format!(
            "Cancelled customer {}'s claim on event {class_event_id}",
            request.customer_id
        )
    } else {
        format!(
            "Customer {} holds no active claim on event {class_event_id}",
            request.customer_id
        )
    };
    Ok(ClassCancelResponse { cancelled, message })
}

/// Retrieves a booking's audit trail, oldest first.
///
/// # Errors
///
/// Returns `NotFound` for an unknown booking, or `Internal`.
pub fn booking_audit_trail(
    persistence: &mut Persistence,
    booking_id: i64,
) -> Result<AuditTrailResponse, ApiError> {
    // Surface the 404 before an empty trail.
    persistence
        .booking_status(booking_id)
        .map_err(translate_persistence_error)?;
    let events: Vec<AuditEventInfo> = persistence
        .audit_trail_for_booking(booking_id)
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|summary| AuditEventInfo {
            event_id: summary.event_id,
            actor_id: summary.actor_id,
            action_name: summary.action_name,
        })
        .collect();
    Ok(AuditTrailResponse { booking_id, events })
}

// ============================================================================
// Internals
// ============================================================================

/// Resolves each requested segment against its service: the end is the
/// start plus the service's duration and buffer, the price is the
/// listed price.
fn build_items(
    persistence: &mut Persistence,
    requests: &[BookingItemRequest],
) -> Result<Vec<BookingItem>, ApiError> {
    let mut items: Vec<BookingItem> = Vec::with_capacity(requests.len());
    for request in requests {
        let service: Service = persistence
            .get_service(request.service_id)
            .map_err(translate_persistence_error)?;
        let start: PrimitiveDateTime = parse_datetime("items.start_time", &request.start_time)?;
        let end: PrimitiveDateTime =
            start + Duration::minutes(i64::from(service.occupied_minutes()));
        items.push(
            BookingItem::new(
                request.staff_id,
                request.service_id,
                start,
                end,
                service.price_cents,
            )
            .map_err(translate_domain_error)?,
        );
    }
    Ok(items)
}

fn build_rule(
    business_id: i64,
    request: &CreateRecurringBookingRequest,
) -> Result<RecurrenceRule, ApiError> {
    let pattern = &request.recurrence;
    let frequency: Frequency =
        Frequency::from_str(&pattern.frequency).map_err(translate_domain_error)?;
    let strategy: ConflictStrategy =
        ConflictStrategy::from_str(&pattern.conflict_strategy).map_err(translate_domain_error)?;
    let end_date: Option<Date> = pattern
        .end_date
        .as_deref()
        .map(|text| parse_date("recurrence.end_date", text))
        .transpose()?;
    let rule: RecurrenceRule = RecurrenceRule::new(
        business_id,
        frequency,
        pattern.interval_value,
        pattern.max_occurrences,
        end_date,
        strategy,
        pattern.days_of_week.clone(),
        pattern.day_of_month,
    )
    .map_err(translate_domain_error)?;
    validate_recurrence_rule(&rule).map_err(translate_domain_error)?;
    Ok(rule)
}

/// Builds one occurrence's booking: the anchor items shifted by
/// `offset`, tagged with the series identity.
fn occurrence_booking(
    request: &CreateRecurringBookingRequest,
    anchor_items: &[BookingItem],
    offset: Duration,
    rule_id: i64,
    index: i32,
) -> Result<Booking, ApiError> {
    let mut items: Vec<BookingItem> = Vec::with_capacity(anchor_items.len());
    for item in anchor_items {
        items.push(
            BookingItem::new(
                item.staff_id,
                item.service_id,
                item.start_time + offset,
                item.end_time + offset,
                item.price_cents,
            )
            .map_err(translate_domain_error)?,
        );
    }
    let mut booking: Booking = Booking::new(
        request.business_id,
        request.location_id,
        request.client_id,
        items,
    )
    .map_err(translate_domain_error)?;
    booking.notes = request.notes.clone();
    booking.recurrence_rule_id = Some(rule_id);
    booking.recurrence_index = Some(index);
    Ok(booking)
}

/// Searches forward from a conflicted occurrence date for the first
/// free slot on the first item's staff, and books the occurrence
/// there.
///
/// Day zero only considers slots after the occurrence's own start (a
/// conflicted afternoon appointment never moves to that morning).
/// Returns `None` when the look-ahead window holds no free slot.
fn reschedule_occurrence(
    persistence: &mut Persistence,
    request: &CreateRecurringBookingRequest,
    anchor_items: &[BookingItem],
    anchor_start: PrimitiveDateTime,
    planned: Date,
    rule_id: i64,
    index: i32,
) -> Result<Option<CreateBookingOutcome>, ApiError> {
    let Some(first) = anchor_items.first() else {
        return Ok(None);
    };
    let staff_id: i64 = first.staff_id;
    let span_end: PrimitiveDateTime = anchor_items
        .iter()
        .map(|item| item.end_time)
        .max()
        .unwrap_or(first.end_time);
    let span_minutes: i32 =
        i32::try_from((span_end - anchor_start).whole_minutes()).map_err(|_| {
            ApiError::Validation {
                field: String::from("items"),
                message: String::from("booking span exceeds one day"),
            }
        })?;
    let original_minute: i32 = minute_of_day(anchor_start.time());

    let plans: Vec<StaffPlan> = persistence
        .staff_plans(staff_id)
        .map_err(translate_persistence_error)?;
    let closures: Vec<ClosurePeriod> = persistence
        .closures_for_location(request.business_id, request.location_id)
        .map_err(translate_persistence_error)?;

    for day_offset in 0..RESCHEDULE_LOOKAHEAD_DAYS {
        let date: Date = planned.saturating_add(Duration::days(day_offset));
        let Some(next_date) = date.next_day() else {
            continue;
        };
        let exceptions: Vec<ScheduleException> = persistence
            .exceptions_in_range(staff_id, date, date)
            .map_err(translate_persistence_error)?;
        let Some(working) = slots_for_date(&plans, &exceptions, &closures, date)
            .map_err(translate_core_error)?
        else {
            continue;
        };
        if working.is_empty() {
            continue;
        }
        let day_start: PrimitiveDateTime = PrimitiveDateTime::new(date, Time::MIDNIGHT);
        let day_end: PrimitiveDateTime = PrimitiveDateTime::new(next_date, Time::MIDNIGHT);
        let windows: Vec<(PrimitiveDateTime, PrimitiveDateTime)> = persistence
            .occupied_windows(request.location_id, staff_id, day_start, day_end)
            .map_err(translate_persistence_error)?;
        let occupied: Vec<TimeInterval> = clamp_windows(&windows, date);

        for minute in slot_starts(&working, &occupied, span_minutes) {
            if day_offset == 0 && minute <= original_minute {
                continue;
            }
            let target: PrimitiveDateTime = PrimitiveDateTime::new(date, time_at_minute(minute));
            let offset: Duration = target - anchor_start;
            let occurrence: Booking =
                occurrence_booking(request, anchor_items, offset, rule_id, index)?;
            match persistence.create_booking(&occurrence) {
                Ok(outcome) => return Ok(Some(outcome)),
                // Lost a race or a later item's staff collided; the
                // next candidate may still fit.
                Err(PersistenceError::BookingConflict { .. }) => {}
                Err(other) => return Err(translate_persistence_error(other)),
            }
        }
    }
    Ok(None)
}

/// Compensates a failed `fail`-strategy expansion by cancelling the
/// occurrences it already committed. Best effort: a booking that
/// cannot be cancelled is logged and left for the operator.
fn unwind_created(
    persistence: &mut Persistence,
    actor: &Actor,
    cause: &Cause,
    notifier: &dyn NotificationQueue,
    created: &[i64],
) {
    for &booking_id in created {
        let before: Option<Booking> = persistence.get_booking(booking_id).ok();
        match persistence.transition_booking(booking_id, BookingStatus::Cancelled) {
            Ok(after) => {
                record_audit(
                    persistence,
                    actor,
                    cause,
                    "CancelBooking",
                    Some(String::from("series unwound after conflict")),
                    before.as_ref(),
                    &after,
                );
                notifier.enqueue(NotificationEvent::BookingCancelled { booking_id });
            }
            Err(err) => {
                warn!(error = %err, booking_id, "Series unwind failed to cancel booking");
            }
        }
    }
}

/// Appends an audit event, logging and swallowing any failure. The
/// state change the event describes has already committed.
fn record_audit(
    persistence: &mut Persistence,
    actor: &Actor,
    cause: &Cause,
    action: &str,
    details: Option<String>,
    before: Option<&Booking>,
    after: &Booking,
) {
    let event: AuditEvent = AuditEvent::new(
        actor.clone(),
        cause.clone(),
        Action::new(action.to_string(), details),
        before.map(BookingSnapshot::of),
        BookingSnapshot::of(after),
    );
    if let Err(err) = persistence.persist_audit_event(&event) {
        warn!(error = %err, action, "Audit append failed; continuing");
    }
}

fn first_start(items: &[BookingItem]) -> Result<PrimitiveDateTime, ApiError> {
    items
        .iter()
        .map(|item| item.start_time)
        .min()
        .ok_or_else(|| ApiError::Validation {
            field: String::from("items"),
            message: String::from("at least one item is required"),
        })
}

fn occurrence_index(position: usize) -> Result<i32, ApiError> {
    i32::try_from(position).map_err(|_| ApiError::Internal {
        message: format!("occurrence index {position} out of range"),
    })
}

fn skipped_outcome(index: i32, date: Date) -> OccurrenceOutcomeInfo {
    OccurrenceOutcomeInfo {
        index,
        date: format_date(date),
        outcome: String::from("skipped"),
        booking_id: None,
        start_time: None,
    }
}

fn require_index(request: &CancelSeriesRequest) -> Result<i32, ApiError> {
    request.index.ok_or_else(|| ApiError::Validation {
        field: String::from("index"),
        message: format!("scope {:?} requires an index", request.scope),
    })
}
