// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Append-only persistence of audit events.

use diesel::prelude::*;
use diesel::SqliteConnection;
use time::PrimitiveDateTime;

use crate::data_models::{NewAuditEvent, encode_datetime};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;
use crate::sqlite::get_last_insert_rowid;
use agenda_audit::AuditEvent;

/// Appends one audit event and returns its row id.
///
/// Snapshots are flattened into columns plus their JSON payloads so
/// the trail stays readable even after the live schema moves on.
///
/// # Errors
///
/// Returns a database or serialization error.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
    now: PrimitiveDateTime,
) -> Result<i64, PersistenceError> {
    let record: NewAuditEvent = NewAuditEvent {
        booking_id: event.booking_id(),
        actor_id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
        cause_id: event.cause.id.clone(),
        cause_description: event.cause.description.clone(),
        action_name: event.action.name.clone(),
        action_details: event.action.details.clone(),
        before_snapshot_json: event.before.as_ref().map(|s| s.payload.clone()),
        after_snapshot_json: event.after.payload.clone(),
        created_at: encode_datetime(now)?,
    };
    diesel::insert_into(audit_events::table)
        .values(&record)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}
