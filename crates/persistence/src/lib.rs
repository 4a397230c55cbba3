// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the agenda booking engine.
//!
//! This crate stores the catalog, schedules, bookings, class events,
//! and the audit trail. It is built on Diesel over `SQLite`.
//!
//! ## Concurrency model
//!
//! All writes that read-then-decide (conflict scans, idempotency
//! replay, seat counting) run inside `BEGIN IMMEDIATE` transactions
//! via [`diesel::connection::Connection::immediate_transaction`], so
//! the `SQLite` writer lock is taken before the check. Two racing
//! requests serialize; the loser re-reads state the winner committed.
//!
//! ## Time representation
//!
//! Dates and times are stored as fixed-width ISO text (`YYYY-MM-DD`,
//! `HH:MM:SS`, `YYYY-MM-DD HH:MM:SS`), so lexicographic comparison in
//! SQL matches chronological order. All stamps are naive UTC.
//!
//! ## Testing
//!
//! Standard tests run against unique shared in-memory `SQLite`
//! databases, named by an atomic counter for deterministic isolation.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::{Date, OffsetDateTime, PrimitiveDateTime};

use agenda_audit::AuditEvent;
use agenda_domain::{
    Booking, BookingStatus, ClassBooking, ClassEvent, ClosurePeriod, RecurrenceRule, Resource,
    ScheduleException, Service, Staff, StaffPlan,
};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID, so
/// parallel tests never share a database.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;
mod sqlite;

#[cfg(test)]
mod tests;

pub use error::{ConflictingItem, PersistenceError};
pub use mutations::{CreateBookingOutcome, IDEMPOTENCY_TTL_HOURS, SeriesCancelScope};
pub use queries::audit::AuditEventSummary;

/// Returns the current wall clock as a naive UTC stamp.
fn now_utc() -> PrimitiveDateTime {
    let now: OffsetDateTime = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Persistence adapter for the booking engine.
///
/// Owns one `SQLite` connection; callers serialize access (the server
/// wraps this in a mutex). All mutating methods stamp rows with the
/// current UTC time.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite`
    /// database.
    ///
    /// Each call receives a unique database instance via atomic
    /// counter, ensuring deterministic test isolation without
    /// time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_test_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = sqlite::initialize_database(&shared_memory_url)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite`
    /// database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = sqlite::initialize_database(path_str)?;

        // WAL mode for better read concurrency on file databases
        sqlite::enable_wal_mode(&mut conn)?;
        sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// This is a startup-time check required to ensure referential
    /// integrity constraints are enforced.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Inserts a staff member.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_staff(&mut self, member: &Staff) -> Result<Staff, PersistenceError> {
        mutations::catalog::create_staff(&mut self.conn, member)
    }

    /// Retrieves a staff member by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the staff member does not exist.
    pub fn get_staff(&mut self, staff_id: i64) -> Result<Staff, PersistenceError> {
        queries::catalog::get_staff(&mut self.conn, staff_id)
    }

    /// Lists the staff at a location able to perform every one of the
    /// given services.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_capable_staff(
        &mut self,
        location_id: i64,
        service_ids: &[i64],
    ) -> Result<Vec<Staff>, PersistenceError> {
        queries::catalog::list_capable_staff(&mut self.conn, location_id, service_ids)
    }

    /// Inserts a service.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_service(&mut self, service: &Service) -> Result<Service, PersistenceError> {
        mutations::catalog::create_service(&mut self.conn, service)
    }

    /// Retrieves a service by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the service does not exist.
    pub fn get_service(&mut self, service_id: i64) -> Result<Service, PersistenceError> {
        queries::catalog::get_service(&mut self.conn, service_id)
    }

    /// Retrieves several services, preserving the requested order.
    ///
    /// # Errors
    ///
    /// Returns an error if any service does not exist.
    pub fn list_services(&mut self, service_ids: &[i64]) -> Result<Vec<Service>, PersistenceError> {
        queries::catalog::list_services(&mut self.conn, service_ids)
    }

    /// Marks a staff member as capable of performing a service.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn assign_service_to_staff(
        &mut self,
        staff_id: i64,
        service_id: i64,
    ) -> Result<(), PersistenceError> {
        mutations::catalog::assign_service_to_staff(&mut self.conn, staff_id, service_id)
    }

    /// Inserts a resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_resource(&mut self, resource: &Resource) -> Result<Resource, PersistenceError> {
        mutations::catalog::create_resource(&mut self.conn, resource)
    }

    /// Records how many units of a resource a service occupies.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn set_resource_requirement(
        &mut self,
        service_id: i64,
        resource_id: i64,
        quantity: i32,
    ) -> Result<(), PersistenceError> {
        mutations::catalog::set_resource_requirement(&mut self.conn, service_id, resource_id, quantity)
    }

    /// Retrieves the resources a service occupies with their
    /// quantities.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn resource_requirements(
        &mut self,
        service_id: i64,
    ) -> Result<Vec<(Resource, i32)>, PersistenceError> {
        queries::catalog::resource_requirements(&mut self.conn, service_id)
    }

    // ========================================================================
    // Schedules
    // ========================================================================

    /// Inserts a working plan together with its template intervals.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_staff_plan(&mut self, plan: &StaffPlan) -> Result<StaffPlan, PersistenceError> {
        mutations::catalog::create_staff_plan(&mut self.conn, plan)
    }

    /// Retrieves every working plan for a staff member.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn staff_plans(&mut self, staff_id: i64) -> Result<Vec<StaffPlan>, PersistenceError> {
        queries::schedule::staff_plans(&mut self.conn, staff_id)
    }

    /// Inserts a one-date schedule override.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_schedule_exception(
        &mut self,
        exception: &ScheduleException,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_schedule_exception(&mut self.conn, exception)
    }

    /// Retrieves a staff member's schedule exceptions in an inclusive
    /// date range.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn exceptions_in_range(
        &mut self,
        staff_id: i64,
        from: Date,
        to: Date,
    ) -> Result<Vec<ScheduleException>, PersistenceError> {
        queries::schedule::exceptions_in_range(&mut self.conn, staff_id, from, to)
    }

    /// Inserts a closure period.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_closure(
        &mut self,
        closure: &ClosurePeriod,
        business_id: i64,
        location_id: Option<i64>,
    ) -> Result<i64, PersistenceError> {
        mutations::catalog::create_closure(&mut self.conn, closure, business_id, location_id)
    }

    /// Retrieves the closures affecting a location, including
    /// business-wide ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn closures_for_location(
        &mut self,
        business_id: i64,
        location_id: i64,
    ) -> Result<Vec<ClosurePeriod>, PersistenceError> {
        queries::schedule::closures_for_location(&mut self.conn, business_id, location_id)
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    /// Creates a booking after a conflict scan, replaying an earlier
    /// result when its idempotency key is still live.
    ///
    /// # Errors
    ///
    /// Returns `BookingConflict` when a requested window collides with
    /// an active booking item, or a database error.
    pub fn create_booking(
        &mut self,
        request: &Booking,
    ) -> Result<CreateBookingOutcome, PersistenceError> {
        mutations::bookings::create_booking(&mut self.conn, request, now_utc())
    }

    /// Retrieves a booking with its items.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` or a database error.
    pub fn get_booking(&mut self, booking_id: i64) -> Result<Booking, PersistenceError> {
        queries::bookings::get_booking(&mut self.conn, booking_id)
    }

    /// Fetches just the lifecycle status of a booking.
    ///
    /// # Errors
    ///
    /// Returns `BookingNotFound` or a database error.
    pub fn booking_status(&mut self, booking_id: i64) -> Result<BookingStatus, PersistenceError> {
        queries::bookings::booking_status(&mut self.conn, booking_id)
    }

    /// Moves a booking's items in place, keeping its identity.
    ///
    /// # Errors
    ///
    /// Returns `BookingConflict`, `BookingNotActive`, `BookingNotFound`,
    /// or a database error.
    pub fn reschedule_booking(
        &mut self,
        booking_id: i64,
        new_first_start: PrimitiveDateTime,
    ) -> Result<Booking, PersistenceError> {
        mutations::bookings::reschedule_booking(&mut self.conn, booking_id, new_first_start)
    }

    /// Creates a replacement booking and retires the original,
    /// linking the two.
    ///
    /// # Errors
    ///
    /// Returns `BookingConflict`, `BookingNotActive`, `BookingNotFound`,
    /// or a database error.
    pub fn replace_booking(
        &mut self,
        booking_id: i64,
        new_first_start: PrimitiveDateTime,
    ) -> Result<Booking, PersistenceError> {
        mutations::bookings::replace_booking(&mut self.conn, booking_id, new_first_start, now_utc())
    }

    /// Applies a lifecycle transition to a booking.
    ///
    /// # Errors
    ///
    /// Returns a domain violation for an illegal transition,
    /// `BookingNotFound`, or a database error.
    pub fn transition_booking(
        &mut self,
        booking_id: i64,
        target: BookingStatus,
    ) -> Result<Booking, PersistenceError> {
        mutations::bookings::transition_booking(&mut self.conn, booking_id, target)
    }

    /// Retrieves the occupied windows for a staff member inside a
    /// date-time range, from active bookings only.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn occupied_windows(
        &mut self,
        location_id: i64,
        staff_id: i64,
        window_start: PrimitiveDateTime,
        window_end: PrimitiveDateTime,
    ) -> Result<Vec<(PrimitiveDateTime, PrimitiveDateTime)>, PersistenceError> {
        queries::bookings::occupied_windows(
            &mut self.conn,
            location_id,
            staff_id,
            window_start,
            window_end,
        )
    }

    /// Retrieves the active claims on a resource overlapping a window,
    /// as `(start, end, quantity)` triples.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn resource_claims(
        &mut self,
        location_id: i64,
        resource_id: i64,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
    ) -> Result<Vec<(PrimitiveDateTime, PrimitiveDateTime, i32)>, PersistenceError> {
        queries::bookings::resource_claims(&mut self.conn, location_id, resource_id, start, end)
    }

    // ========================================================================
    // Recurrence
    // ========================================================================

    /// Persists a recurrence rule and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_recurrence_rule(
        &mut self,
        rule: &RecurrenceRule,
    ) -> Result<i64, PersistenceError> {
        mutations::bookings::create_recurrence_rule(&mut self.conn, rule)
    }

    /// Retrieves a recurrence rule by id.
    ///
    /// # Errors
    ///
    /// Returns `RuleNotFound` or a database error.
    pub fn get_recurrence_rule(
        &mut self,
        rule_id: i64,
    ) -> Result<RecurrenceRule, PersistenceError> {
        mutations::bookings::get_recurrence_rule(&mut self.conn, rule_id)
    }

    /// Retrieves every booking generated from a rule, in occurrence
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn bookings_for_rule(&mut self, rule_id: i64) -> Result<Vec<Booking>, PersistenceError> {
        queries::bookings::bookings_for_rule(&mut self.conn, rule_id)
    }

    /// Cancels the active bookings of a series, scoped to one
    /// occurrence, a tail, or the whole series. Returns how many
    /// bookings were cancelled.
    ///
    /// # Errors
    ///
    /// Returns `RuleNotFound` or a database error.
    pub fn cancel_series(
        &mut self,
        rule_id: i64,
        scope: SeriesCancelScope,
    ) -> Result<usize, PersistenceError> {
        mutations::bookings::cancel_series(&mut self.conn, rule_id, scope)
    }

    // ========================================================================
    // Class events
    // ========================================================================

    /// Inserts a class event.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_class_event(
        &mut self,
        event: &ClassEvent,
    ) -> Result<ClassEvent, PersistenceError> {
        mutations::catalog::create_class_event(&mut self.conn, event)
    }

    /// Retrieves a class event with its live counters.
    ///
    /// # Errors
    ///
    /// Returns `ClassEventNotFound` or a database error.
    pub fn get_class_event(
        &mut self,
        class_event_id: i64,
    ) -> Result<ClassEvent, PersistenceError> {
        queries::class_events::get_class_event(&mut self.conn, class_event_id)
    }

    /// Books a seat on a class event, or queues the customer when the
    /// event is full and has a waitlist.
    ///
    /// Re-booking by a customer with an active claim returns that
    /// claim unchanged.
    ///
    /// # Errors
    ///
    /// Returns `ClassEventNotFound`, `ClassEventNotBookable`,
    /// `CapacityExhausted`, or a database error.
    pub fn class_book(
        &mut self,
        class_event_id: i64,
        customer_id: i64,
    ) -> Result<ClassBooking, PersistenceError> {
        mutations::class_events::class_book(&mut self.conn, class_event_id, customer_id, now_utc())
    }

    /// Cancels a customer's claim on a class event, promoting the head
    /// of the waitlist when a confirmed seat frees up.
    ///
    /// Returns `false` when the customer held no active claim.
    ///
    /// # Errors
    ///
    /// Returns `ClassEventNotFound` or a database error.
    pub fn class_cancel(
        &mut self,
        class_event_id: i64,
        customer_id: i64,
    ) -> Result<bool, PersistenceError> {
        mutations::class_events::class_cancel(&mut self.conn, class_event_id, customer_id, now_utc())
    }

    /// Lists every claim ever made on a class event.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn list_class_bookings(
        &mut self,
        class_event_id: i64,
    ) -> Result<Vec<ClassBooking>, PersistenceError> {
        queries::class_events::list_class_bookings(&mut self.conn, class_event_id)
    }

    // ========================================================================
    // Audit
    // ========================================================================

    /// Appends an audit event and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        mutations::audit::persist_audit_event(&mut self.conn, event, now_utc())
    }

    /// Retrieves the audit trail for a booking, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be queried.
    pub fn audit_trail_for_booking(
        &mut self,
        booking_id: i64,
    ) -> Result<Vec<AuditEventSummary>, PersistenceError> {
        queries::audit::audit_trail_for_booking(&mut self.conn, booking_id)
    }
}
