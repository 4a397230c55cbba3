// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use agenda_core::CoreError;
use agenda_domain::DomainError;
use agenda_persistence::{ConflictingItem, PersistenceError};

/// API-level errors.
///
/// These are distinct from domain/core/persistence errors and
/// represent the API contract. Every lower-layer error crossing the
/// boundary is translated explicitly, never leaked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid input, rejected before any transaction was started.
    Validation {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested window collided with existing bookings. The
    /// transaction rolled back cleanly; the caller may retry.
    Conflict {
        /// The items the request collided with.
        conflicts: Vec<ConflictingItem>,
    },
    /// A requested resource was not found.
    NotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// Stored data violates an invariant (e.g. overlapping working
    /// plans). Surfaced loudly; never silently resolved.
    Consistency {
        /// A description of the violated invariant.
        message: String,
    },
    /// A class event is full and has no waitlist.
    CapacityExhausted {
        /// The event that is full.
        class_event_id: i64,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::Conflict { conflicts } => {
                write!(f, "Booking conflict with {} existing item(s)", conflicts.len())
            }
            Self::NotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Consistency { message } => {
                write!(f, "Data consistency violation: {message}")
            }
            Self::CapacityExhausted { class_event_id } => {
                write!(f, "Class event {class_event_id} is full")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// Domain errors are input or state-machine violations, so they all
/// land on the validation side of the contract.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let field: &str = match &err {
        DomainError::InvalidTimeRange { .. } => "time_range",
        DomainError::InvalidDayOfWeek(_) => "day_of_week",
        DomainError::InvalidBookingStatus(_) | DomainError::InvalidStatusTransition { .. } => {
            "status"
        }
        DomainError::EmptyBookingItems => "items",
        DomainError::InvalidFrequency(_) => "frequency",
        DomainError::InvalidConflictStrategy(_) => "conflict_strategy",
        DomainError::InvalidRecurrenceRule(_) => "recurrence",
        DomainError::InvalidExceptionKind(_) | DomainError::PartialExceptionWindow => "exception",
        DomainError::InvalidClosurePeriod { .. } => "closure",
        DomainError::InvalidPlanType(_) | DomainError::InvalidWeekLabel(_) => "plan",
        DomainError::InvalidCapacity(_) => "capacity",
        DomainError::InvalidClassBookingStatus(_)
        | DomainError::InvalidClassTransition { .. }
        | DomainError::InvalidClassEventStatus(_) => "class_booking",
        DomainError::InvalidServiceDuration(_) => "duration_minutes",
        DomainError::InvalidIdempotencyKey(_) => "idempotency_key",
    };
    ApiError::Validation {
        field: field.to_string(),
        message: err.to_string(),
    }
}

/// Translates a core error into an API error.
///
/// Overlapping plans are a stored-data fault, not a user mistake, and
/// must surface as a consistency failure.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::OverlappingPlans { staff_id, date } => ApiError::Consistency {
            message: format!("staff {staff_id} has more than one working plan covering {date}"),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::BookingConflict { conflicts } => ApiError::Conflict { conflicts },
        PersistenceError::CapacityExhausted { class_event_id } => {
            ApiError::CapacityExhausted { class_event_id }
        }
        PersistenceError::BookingNotFound(id) => ApiError::NotFound {
            resource_type: String::from("Booking"),
            message: format!("Booking {id} does not exist"),
        },
        PersistenceError::ClassEventNotFound(id) => ApiError::NotFound {
            resource_type: String::from("Class event"),
            message: format!("Class event {id} does not exist"),
        },
        PersistenceError::RuleNotFound(id) => ApiError::NotFound {
            resource_type: String::from("Recurrence rule"),
            message: format!("Recurrence rule {id} does not exist"),
        },
        PersistenceError::NotFound(message) => ApiError::NotFound {
            resource_type: String::from("Record"),
            message,
        },
        PersistenceError::ClassEventNotBookable(id) => ApiError::Validation {
            field: String::from("class_event_id"),
            message: format!("Class event {id} is not accepting bookings"),
        },
        PersistenceError::BookingNotActive { booking_id, status } => ApiError::Validation {
            field: String::from("booking_id"),
            message: format!(
                "Booking {booking_id} is {} and cannot be moved",
                status.as_str()
            ),
        },
        PersistenceError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
