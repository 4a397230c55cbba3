// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit log reads.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// One appended audit row, summarized for inspection.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct AuditEventSummary {
    /// The id assigned at append time.
    pub event_id: i64,
    /// The booking the event is keyed by.
    pub booking_id: Option<i64>,
    /// Who initiated the change.
    pub actor_id: String,
    /// What was done.
    pub action_name: String,
}

/// Lists the audit trail for a booking, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn audit_trail_for_booking(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Vec<AuditEventSummary>, PersistenceError> {
    Ok(audit_events::table
        .filter(audit_events::booking_id.eq(booking_id))
        .select((
            audit_events::event_id,
            audit_events::booking_id,
            audit_events::actor_id,
            audit_events::action_name,
        ))
        .order(audit_events::event_id.asc())
        .load::<AuditEventSummary>(conn)?)
}
