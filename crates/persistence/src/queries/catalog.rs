// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog lookups: staff, services, resources.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::{ResourceRow, ServiceRow, StaffRow};
use crate::diesel_schema::{resources, service_resources, services, staff, staff_services};
use crate::error::PersistenceError;
use agenda_domain::{Resource, Service, Staff};

/// Fetches one staff member.
///
/// # Errors
///
/// Returns `NotFound` if no such staff member exists.
pub fn get_staff(conn: &mut SqliteConnection, staff_id: i64) -> Result<Staff, PersistenceError> {
    let row: StaffRow = staff::table
        .filter(staff::staff_id.eq(staff_id))
        .first::<StaffRow>(conn)?;
    Ok(row.into_domain())
}

/// Lists the staff at a location who are able to perform every one of
/// the given services.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_capable_staff(
    conn: &mut SqliteConnection,
    location_id: i64,
    service_ids: &[i64],
) -> Result<Vec<Staff>, PersistenceError> {
    let rows: Vec<StaffRow> = staff::table
        .filter(staff::location_id.eq(location_id))
        .load::<StaffRow>(conn)?;

    let mut capable: Vec<Staff> = Vec::new();
    for row in rows {
        let assigned: i64 = staff_services::table
            .filter(staff_services::staff_id.eq(row.staff_id))
            .filter(staff_services::service_id.eq_any(service_ids))
            .count()
            .get_result(conn)?;
        if assigned == i64::try_from(service_ids.len()).unwrap_or(i64::MAX) {
            capable.push(row.into_domain());
        }
    }
    Ok(capable)
}

/// Fetches one service.
///
/// # Errors
///
/// Returns `NotFound` if no such service exists.
pub fn get_service(
    conn: &mut SqliteConnection,
    service_id: i64,
) -> Result<Service, PersistenceError> {
    let row: ServiceRow = services::table
        .filter(services::service_id.eq(service_id))
        .first::<ServiceRow>(conn)?;
    row.into_domain()
}

/// Fetches several services, preserving the requested order.
///
/// # Errors
///
/// Returns `NotFound` if any of the ids is unknown.
pub fn list_services(
    conn: &mut SqliteConnection,
    service_ids: &[i64],
) -> Result<Vec<Service>, PersistenceError> {
    let mut result: Vec<Service> = Vec::with_capacity(service_ids.len());
    for service_id in service_ids {
        result.push(get_service(conn, *service_id)?);
    }
    Ok(result)
}

/// Returns the resources a service occupies while running, with the
/// units it claims of each.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn resource_requirements(
    conn: &mut SqliteConnection,
    service_id: i64,
) -> Result<Vec<(Resource, i32)>, PersistenceError> {
    let rows: Vec<(i64, i32)> = service_resources::table
        .filter(service_resources::service_id.eq(service_id))
        .select((service_resources::resource_id, service_resources::quantity))
        .load::<(i64, i32)>(conn)?;

    let mut result: Vec<(Resource, i32)> = Vec::with_capacity(rows.len());
    for (resource_id, quantity) in rows {
        let row: ResourceRow = resources::table
            .filter(resources::resource_id.eq(resource_id))
            .first::<ResourceRow>(conn)?;
        result.push((row.into_domain(), quantity));
    }
    Ok(result)
}
