// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs and text codecs for the `SQLite` schema.
//!
//! Dates and times are stored as fixed-width ISO text
//! (`YYYY-MM-DD` / `HH:MM:SS` / `YYYY-MM-DD HH:MM:SS`) so that
//! lexicographic comparison in SQL matches chronological order.

use std::str::FromStr;

use diesel::prelude::*;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime, Time};

use crate::diesel_schema::{
    audit_events, booking_items, bookings, class_bookings, class_events, closures, plan_intervals,
    recurrence_rules, resources, schedule_exceptions, service_resources, services, staff,
    staff_plans,
};
use crate::error::PersistenceError;
use agenda_domain::{
    Booking, BookingItem, BookingStatus, ClassBooking, ClassBookingStatus, ClassEvent,
    ClassEventStatus, ClosurePeriod, ClosureScope, ConflictStrategy, ExceptionKind, Frequency,
    RecurrenceRule, Resource, ScheduleException, Service, Staff,
};

const DATE_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]:[second]");
const DATETIME_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Encodes a date as `YYYY-MM-DD`.
pub(crate) fn encode_date(value: Date) -> Result<String, PersistenceError> {
    value
        .format(&DATE_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Decodes a `YYYY-MM-DD` date.
pub(crate) fn decode_date(text: &str) -> Result<Date, PersistenceError> {
    Date::parse(text, &DATE_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(format!("date {text:?}: {e}")))
}

/// Encodes a time of day as `HH:MM:SS`.
pub(crate) fn encode_time(value: Time) -> Result<String, PersistenceError> {
    value
        .format(&TIME_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Decodes an `HH:MM:SS` time of day.
pub(crate) fn decode_time(text: &str) -> Result<Time, PersistenceError> {
    Time::parse(text, &TIME_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(format!("time {text:?}: {e}")))
}

/// Encodes a date-time as `YYYY-MM-DD HH:MM:SS`.
pub(crate) fn encode_datetime(value: PrimitiveDateTime) -> Result<String, PersistenceError> {
    value
        .format(&DATETIME_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Decodes a `YYYY-MM-DD HH:MM:SS` date-time.
pub(crate) fn decode_datetime(text: &str) -> Result<PrimitiveDateTime, PersistenceError> {
    PrimitiveDateTime::parse(text, &DATETIME_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(format!("datetime {text:?}: {e}")))
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Clone, Queryable)]
pub(crate) struct BookingRow {
    pub booking_id: i64,
    pub business_id: i64,
    pub location_id: i64,
    pub client_id: Option<i64>,
    pub status: String,
    pub notes: Option<String>,
    pub idempotency_key: Option<String>,
    pub idempotency_expires_at: Option<String>,
    pub recurrence_rule_id: Option<i64>,
    pub recurrence_index: Option<i32>,
    pub replaces_booking_id: Option<i64>,
    pub replaced_by_booking_id: Option<i64>,
    pub created_at: String,
}

impl BookingRow {
    /// Reassembles the domain booking from this row and its item rows.
    pub(crate) fn into_domain(
        self,
        item_rows: Vec<BookingItemRow>,
    ) -> Result<Booking, PersistenceError> {
        let mut items: Vec<BookingItem> = Vec::with_capacity(item_rows.len());
        for row in item_rows {
            items.push(row.into_domain()?);
        }
        let mut booking: Booking =
            Booking::new(self.business_id, self.location_id, self.client_id, items)?;
        booking.booking_id = Some(self.booking_id);
        booking.status = BookingStatus::from_str(&self.status)?;
        booking.notes = self.notes;
        booking.idempotency_key = self.idempotency_key;
        booking.recurrence_rule_id = self.recurrence_rule_id;
        booking.recurrence_index = self.recurrence_index;
        booking.replaces_booking_id = self.replaces_booking_id;
        booking.replaced_by_booking_id = self.replaced_by_booking_id;
        Ok(booking)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub(crate) struct NewBooking {
    pub business_id: i64,
    pub location_id: i64,
    pub client_id: Option<i64>,
    pub status: String,
    pub notes: Option<String>,
    pub idempotency_key: Option<String>,
    pub idempotency_expires_at: Option<String>,
    pub recurrence_rule_id: Option<i64>,
    pub recurrence_index: Option<i32>,
    pub replaces_booking_id: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, Queryable)]
pub(crate) struct BookingItemRow {
    pub item_id: i64,
    pub booking_id: i64,
    pub staff_id: i64,
    pub service_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub price_cents: i64,
}

impl BookingItemRow {
    pub(crate) fn into_domain(self) -> Result<BookingItem, PersistenceError> {
        Ok(BookingItem::with_id(
            self.item_id,
            self.staff_id,
            self.service_id,
            decode_datetime(&self.start_time)?,
            decode_datetime(&self.end_time)?,
            self.price_cents,
        )?)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = booking_items)]
pub(crate) struct NewBookingItem {
    pub booking_id: i64,
    pub staff_id: i64,
    pub service_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub price_cents: i64,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, Queryable)]
pub(crate) struct StaffRow {
    pub staff_id: i64,
    pub business_id: i64,
    pub location_id: i64,
    pub display_name: String,
}

impl StaffRow {
    pub(crate) fn into_domain(self) -> Staff {
        Staff {
            staff_id: Some(self.staff_id),
            business_id: self.business_id,
            location_id: self.location_id,
            display_name: self.display_name,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = staff)]
pub(crate) struct NewStaff {
    pub business_id: i64,
    pub location_id: i64,
    pub display_name: String,
}

#[derive(Debug, Clone, Queryable)]
pub(crate) struct ServiceRow {
    pub service_id: i64,
    pub business_id: i64,
    pub location_id: i64,
    pub name: String,
    pub duration_minutes: i32,
    pub buffer_minutes: i32,
    pub price_cents: i64,
}

impl ServiceRow {
    pub(crate) fn into_domain(self) -> Result<Service, PersistenceError> {
        let mut service: Service = Service::new(
            self.business_id,
            self.location_id,
            self.name,
            self.duration_minutes,
            self.buffer_minutes,
            self.price_cents,
        )?;
        service.service_id = Some(self.service_id);
        Ok(service)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = services)]
pub(crate) struct NewService {
    pub business_id: i64,
    pub location_id: i64,
    pub name: String,
    pub duration_minutes: i32,
    pub buffer_minutes: i32,
    pub price_cents: i64,
}

#[derive(Debug, Clone, Queryable)]
pub(crate) struct ResourceRow {
    pub resource_id: i64,
    pub location_id: i64,
    pub name: String,
    pub capacity: i32,
}

impl ResourceRow {
    pub(crate) fn into_domain(self) -> Resource {
        Resource {
            resource_id: Some(self.resource_id),
            location_id: self.location_id,
            name: self.name,
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = resources)]
pub(crate) struct NewResource {
    pub location_id: i64,
    pub name: String,
    pub capacity: i32,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = service_resources)]
pub(crate) struct ServiceResourceRow {
    pub service_id: i64,
    pub resource_id: i64,
    pub quantity: i32,
}

// ============================================================================
// Schedules
// ============================================================================

#[derive(Debug, Clone, Queryable)]
pub(crate) struct StaffPlanRow {
    pub plan_id: i64,
    pub staff_id: i64,
    pub plan_type: String,
    pub valid_from: String,
    pub valid_to: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = staff_plans)]
pub(crate) struct NewStaffPlan {
    pub staff_id: i64,
    pub plan_type: String,
    pub valid_from: String,
    pub valid_to: Option<String>,
}

#[derive(Debug, Clone, Queryable)]
pub(crate) struct PlanIntervalRow {
    pub interval_id: i64,
    pub plan_id: i64,
    pub week_label: String,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plan_intervals)]
pub(crate) struct NewPlanInterval {
    pub plan_id: i64,
    pub week_label: String,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Queryable)]
pub(crate) struct ScheduleExceptionRow {
    pub exception_id: i64,
    pub staff_id: i64,
    pub exception_date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub kind: String,
    pub reason: Option<String>,
}

impl ScheduleExceptionRow {
    pub(crate) fn into_domain(self) -> Result<ScheduleException, PersistenceError> {
        let start: Option<Time> = self.start_time.as_deref().map(decode_time).transpose()?;
        let end: Option<Time> = self.end_time.as_deref().map(decode_time).transpose()?;
        Ok(ScheduleException::new(
            self.staff_id,
            decode_date(&self.exception_date)?,
            start,
            end,
            ExceptionKind::from_str(&self.kind)?,
            self.reason,
        )?)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schedule_exceptions)]
pub(crate) struct NewScheduleException {
    pub staff_id: i64,
    pub exception_date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub kind: String,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Queryable)]
pub(crate) struct ClosureRow {
    pub closure_id: i64,
    pub business_id: i64,
    pub location_id: Option<i64>,
    pub scope: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: Option<String>,
}

impl ClosureRow {
    pub(crate) fn into_domain(self) -> Result<ClosurePeriod, PersistenceError> {
        let scope: ClosureScope = match self.scope.as_str() {
            "business" => ClosureScope::Business,
            _ => ClosureScope::Location,
        };
        Ok(ClosurePeriod::new(
            scope,
            decode_date(&self.start_date)?,
            decode_date(&self.end_date)?,
            self.reason,
        )?)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = closures)]
pub(crate) struct NewClosure {
    pub business_id: i64,
    pub location_id: Option<i64>,
    pub scope: String,
    pub start_date: String,
    pub end_date: String,
    pub reason: Option<String>,
}

// ============================================================================
// Recurrence
// ============================================================================

#[derive(Debug, Clone, Queryable)]
pub(crate) struct RecurrenceRuleRow {
    pub rule_id: i64,
    pub business_id: i64,
    pub frequency: String,
    pub interval_value: i32,
    pub max_occurrences: Option<i32>,
    pub end_date: Option<String>,
    pub conflict_strategy: String,
    pub days_of_week: Option<String>,
    pub day_of_month: Option<i32>,
}

impl RecurrenceRuleRow {
    pub(crate) fn into_domain(self) -> Result<RecurrenceRule, PersistenceError> {
        let days_of_week: Option<Vec<u8>> = self
            .days_of_week
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let end_date: Option<Date> = self.end_date.as_deref().map(decode_date).transpose()?;
        let interval_value: u32 = u32::try_from(self.interval_value)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        let max_occurrences: Option<u32> = self
            .max_occurrences
            .map(u32::try_from)
            .transpose()
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        let day_of_month: Option<u8> = self
            .day_of_month
            .map(u8::try_from)
            .transpose()
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        let mut rule: RecurrenceRule = RecurrenceRule::new(
            self.business_id,
            Frequency::from_str(&self.frequency)?,
            interval_value,
            max_occurrences,
            end_date,
            ConflictStrategy::from_str(&self.conflict_strategy)?,
            days_of_week,
            day_of_month,
        )?;
        rule.rule_id = Some(self.rule_id);
        Ok(rule)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = recurrence_rules)]
pub(crate) struct NewRecurrenceRule {
    pub business_id: i64,
    pub frequency: String,
    pub interval_value: i32,
    pub max_occurrences: Option<i32>,
    pub end_date: Option<String>,
    pub conflict_strategy: String,
    pub days_of_week: Option<String>,
    pub day_of_month: Option<i32>,
}

// ============================================================================
// Class events
// ============================================================================

#[derive(Debug, Clone, Queryable)]
pub(crate) struct ClassEventRow {
    pub class_event_id: i64,
    pub business_id: i64,
    pub location_id: i64,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub capacity_total: i32,
    pub capacity_reserved: i32,
    pub confirmed_count: i32,
    pub waitlist_count: i32,
    pub waitlist_enabled: i32,
    pub status: String,
}

impl ClassEventRow {
    pub(crate) fn into_domain(self) -> Result<ClassEvent, PersistenceError> {
        let mut event: ClassEvent = ClassEvent::new(
            self.business_id,
            self.location_id,
            self.name,
            decode_datetime(&self.start_time)?,
            decode_datetime(&self.end_time)?,
            self.capacity_total,
            self.capacity_reserved,
            self.waitlist_enabled != 0,
        )?;
        event.class_event_id = Some(self.class_event_id);
        event.confirmed_count = self.confirmed_count;
        event.waitlist_count = self.waitlist_count;
        event.status = ClassEventStatus::from_str(&self.status)?;
        Ok(event)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = class_events)]
pub(crate) struct NewClassEvent {
    pub business_id: i64,
    pub location_id: i64,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub capacity_total: i32,
    pub capacity_reserved: i32,
    pub waitlist_enabled: i32,
    pub status: String,
}

#[derive(Debug, Clone, Queryable)]
pub(crate) struct ClassBookingRow {
    pub class_booking_id: i64,
    pub class_event_id: i64,
    pub customer_id: i64,
    pub status: String,
    pub waitlist_position: Option<i32>,
    pub booked_at: String,
    pub cancelled_at: Option<String>,
}

impl ClassBookingRow {
    pub(crate) fn into_domain(self) -> Result<ClassBooking, PersistenceError> {
        Ok(ClassBooking {
            class_booking_id: Some(self.class_booking_id),
            class_event_id: self.class_event_id,
            customer_id: self.customer_id,
            status: ClassBookingStatus::from_str(&self.status)?,
            waitlist_position: self.waitlist_position,
            booked_at: decode_datetime(&self.booked_at)?,
            cancelled_at: self
                .cancelled_at
                .as_deref()
                .map(decode_datetime)
                .transpose()?,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = class_bookings)]
pub(crate) struct NewClassBooking {
    pub class_event_id: i64,
    pub customer_id: i64,
    pub status: String,
    pub waitlist_position: Option<i32>,
    pub booked_at: String,
}

// ============================================================================
// Audit
// ============================================================================

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_events)]
pub(crate) struct NewAuditEvent {
    pub booking_id: Option<i64>,
    pub actor_id: String,
    pub actor_type: String,
    pub cause_id: String,
    pub cause_description: String,
    pub action_name: String,
    pub action_details: Option<String>,
    pub before_snapshot_json: Option<String>,
    pub after_snapshot_json: String,
    pub created_at: String,
}
