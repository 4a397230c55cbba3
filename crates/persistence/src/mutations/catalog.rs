// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog and schedule setup writes.
//!
//! These back the administrative endpoints that seed a business:
//! staff, services, resources, working plans, exceptions, closures,
//! and class events.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::{
    NewClassEvent, NewClosure, NewPlanInterval, NewResource, NewScheduleException, NewService,
    NewStaff, NewStaffPlan, ServiceResourceRow, encode_date, encode_datetime, encode_time,
};
use crate::diesel_schema::{
    class_events, closures, plan_intervals, resources, schedule_exceptions, service_resources,
    services, staff, staff_plans, staff_services,
};
use crate::error::PersistenceError;
use crate::sqlite::get_last_insert_rowid;
use agenda_domain::{
    ClassEvent, ClosurePeriod, ClosureScope, Resource, ScheduleException, Service, Staff,
    StaffPlan,
};

/// Inserts a staff member and returns it with its assigned id.
///
/// # Errors
///
/// Returns a database error.
pub fn create_staff(
    conn: &mut SqliteConnection,
    member: &Staff,
) -> Result<Staff, PersistenceError> {
    let record: NewStaff = NewStaff {
        business_id: member.business_id,
        location_id: member.location_id,
        display_name: member.display_name.clone(),
    };
    diesel::insert_into(staff::table).values(&record).execute(conn)?;
    let staff_id: i64 = get_last_insert_rowid(conn)?;
    let mut created: Staff = member.clone();
    created.staff_id = Some(staff_id);
    Ok(created)
}

/// Inserts a service and returns it with its assigned id.
///
/// # Errors
///
/// Returns a database error.
pub fn create_service(
    conn: &mut SqliteConnection,
    service: &Service,
) -> Result<Service, PersistenceError> {
    let record: NewService = NewService {
        business_id: service.business_id,
        location_id: service.location_id,
        name: service.name.clone(),
        duration_minutes: service.duration_minutes,
        buffer_minutes: service.buffer_minutes,
        price_cents: service.price_cents,
    };
    diesel::insert_into(services::table)
        .values(&record)
        .execute(conn)?;
    let service_id: i64 = get_last_insert_rowid(conn)?;
    let mut created: Service = service.clone();
    created.service_id = Some(service_id);
    Ok(created)
}

/// Marks a staff member as capable of performing a service.
///
/// # Errors
///
/// Returns a database error.
pub fn assign_service_to_staff(
    conn: &mut SqliteConnection,
    staff_id: i64,
    service_id: i64,
) -> Result<(), PersistenceError> {
    diesel::insert_into(staff_services::table)
        .values((
            staff_services::staff_id.eq(staff_id),
            staff_services::service_id.eq(service_id),
        ))
        .execute(conn)?;
    Ok(())
}

/// Inserts a resource and returns it with its assigned id.
///
/// # Errors
///
/// Returns a database error.
pub fn create_resource(
    conn: &mut SqliteConnection,
    resource: &Resource,
) -> Result<Resource, PersistenceError> {
    let record: NewResource = NewResource {
        location_id: resource.location_id,
        name: resource.name.clone(),
        capacity: resource.capacity,
    };
    diesel::insert_into(resources::table)
        .values(&record)
        .execute(conn)?;
    let resource_id: i64 = get_last_insert_rowid(conn)?;
    let mut created: Resource = resource.clone();
    created.resource_id = Some(resource_id);
    Ok(created)
}

/// Records how many units of a resource a service occupies.
///
/// # Errors
///
/// Returns a database error.
pub fn set_resource_requirement(
    conn: &mut SqliteConnection,
    service_id: i64,
    resource_id: i64,
    quantity: i32,
) -> Result<(), PersistenceError> {
    let record: ServiceResourceRow = ServiceResourceRow {
        service_id,
        resource_id,
        quantity,
    };
    diesel::insert_into(service_resources::table)
        .values(&record)
        .execute(conn)?;
    Ok(())
}

/// Inserts a working plan together with its template intervals.
///
/// # Errors
///
/// Returns a database or serialization error.
pub fn create_staff_plan(
    conn: &mut SqliteConnection,
    plan: &StaffPlan,
) -> Result<StaffPlan, PersistenceError> {
    conn.immediate_transaction(|conn| {
        let record: NewStaffPlan = NewStaffPlan {
            staff_id: plan.staff_id,
            plan_type: plan.plan_type.as_str().to_string(),
            valid_from: encode_date(plan.valid_from)?,
            valid_to: plan.valid_to.map(encode_date).transpose()?,
        };
        diesel::insert_into(staff_plans::table)
            .values(&record)
            .execute(conn)?;
        let plan_id: i64 = get_last_insert_rowid(conn)?;

        for (label, interval) in &plan.intervals {
            let row: NewPlanInterval = NewPlanInterval {
                plan_id,
                week_label: label.as_str().to_string(),
                day_of_week: i32::from(interval.day_of_week()),
                start_time: encode_time(interval.start())?,
                end_time: encode_time(interval.end())?,
            };
            diesel::insert_into(plan_intervals::table)
                .values(&row)
                .execute(conn)?;
        }

        let mut created: StaffPlan = plan.clone();
        created.plan_id = Some(plan_id);
        Ok(created)
    })
}

/// Inserts a one-date schedule override.
///
/// # Errors
///
/// Returns a database or serialization error.
pub fn create_schedule_exception(
    conn: &mut SqliteConnection,
    exception: &ScheduleException,
) -> Result<i64, PersistenceError> {
    let record: NewScheduleException = NewScheduleException {
        staff_id: exception.staff_id,
        exception_date: encode_date(exception.date)?,
        start_time: exception.start.map(encode_time).transpose()?,
        end_time: exception.end.map(encode_time).transpose()?,
        kind: exception.kind.as_str().to_string(),
        reason: exception.reason.clone(),
    };
    diesel::insert_into(schedule_exceptions::table)
        .values(&record)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Inserts a closure period.
///
/// Location-scoped closures must carry a `location_id`.
///
/// # Errors
///
/// Returns a database or serialization error.
pub fn create_closure(
    conn: &mut SqliteConnection,
    closure: &ClosurePeriod,
    business_id: i64,
    location_id: Option<i64>,
) -> Result<i64, PersistenceError> {
    let scope: &str = match closure.scope {
        ClosureScope::Business => "business",
        ClosureScope::Location => "location",
    };
    let record: NewClosure = NewClosure {
        business_id,
        location_id,
        scope: scope.to_string(),
        start_date: encode_date(closure.start_date)?,
        end_date: encode_date(closure.end_date)?,
        reason: closure.reason.clone(),
    };
    diesel::insert_into(closures::table)
        .values(&record)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Inserts a class event and returns it with its assigned id.
///
/// # Errors
///
/// Returns a database or serialization error.
pub fn create_class_event(
    conn: &mut SqliteConnection,
    event: &ClassEvent,
) -> Result<ClassEvent, PersistenceError> {
    let record: NewClassEvent = NewClassEvent {
        business_id: event.business_id,
        location_id: event.location_id,
        name: event.name.clone(),
        start_time: encode_datetime(event.start_time)?,
        end_time: encode_datetime(event.end_time)?,
        capacity_total: event.capacity_total,
        capacity_reserved: event.capacity_reserved,
        waitlist_enabled: i32::from(event.waitlist_enabled),
        status: event.status.as_str().to_string(),
    };
    diesel::insert_into(class_events::table)
        .values(&record)
        .execute(conn)?;
    let class_event_id: i64 = get_last_insert_rowid(conn)?;
    let mut created: ClassEvent = event.clone();
    created.class_event_id = Some(class_event_id);
    Ok(created)
}
