// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use agenda_domain::DomainError;
use time::PrimitiveDateTime;

/// One already-booked item that collided with a requested window.
///
/// Returned inside [`PersistenceError::BookingConflict`] so callers can
/// show the customer exactly what is in the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictingItem {
    /// The persisted id of the existing item.
    pub item_id: i64,
    /// The staff member both sides want.
    pub staff_id: i64,
    /// Start of the existing occupied window.
    pub start_time: PrimitiveDateTime,
    /// End of the existing occupied window.
    pub end_time: PrimitiveDateTime,
}

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// A domain rule was violated while applying a mutation.
    DomainViolation(DomainError),
    /// A requested booking window collided with existing items.
    /// The transaction was rolled back; nothing was written.
    BookingConflict {
        /// The existing items in the way, one entry per collision.
        conflicts: Vec<ConflictingItem>,
    },
    /// A class event is full and has no waitlist.
    CapacityExhausted {
        /// The full event.
        class_event_id: i64,
    },
    /// A class event exists but is not open for booking.
    ClassEventNotBookable(i64),
    /// A reschedule or replacement was attempted on a booking that no
    /// longer occupies time.
    BookingNotActive {
        /// The booking that was targeted.
        booking_id: i64,
        /// Its current status.
        status: agenda_domain::BookingStatus,
    },
    /// The requested booking was not found.
    BookingNotFound(i64),
    /// The requested class event was not found.
    ClassEventNotFound(i64),
    /// The requested recurrence rule was not found.
    RuleNotFound(i64),
    /// The requested resource was not found.
    NotFound(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::BookingConflict { conflicts } => {
                write!(
                    f,
                    "Booking conflict: {} existing item(s) overlap the requested window",
                    conflicts.len()
                )
            }
            Self::CapacityExhausted { class_event_id } => {
                write!(
                    f,
                    "Class event {class_event_id} is full and has no waitlist"
                )
            }
            Self::ClassEventNotBookable(id) => {
                write!(f, "Class event {id} is not open for booking")
            }
            Self::BookingNotActive { booking_id, status } => {
                write!(f, "Booking {booking_id} is {status} and cannot be moved")
            }
            Self::BookingNotFound(id) => write!(f, "Booking not found: {id}"),
            Self::ClassEventNotFound(id) => write!(f, "Class event not found: {id}"),
            Self::RuleNotFound(id) => write!(f, "Recurrence rule not found: {id}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

impl From<DomainError> for PersistenceError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
