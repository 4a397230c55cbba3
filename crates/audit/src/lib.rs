// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use agenda_domain::{Booking, ClassBooking};

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change.
/// This could be a customer, an operator, or an automated trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "customer", "operator", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// The anonymous system actor used when no caller identity is
    /// available.
    #[must_use]
    pub fn system() -> Self {
        Self::new(String::from("system"), String::from("system"))
    }
}

/// Represents the reason or trigger for an action.
///
/// A cause describes why a state change was initiated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID, rule ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
///
/// An action describes what state change occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`CreateBooking`", "`CancelBooking`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A point-in-time capture of one booking, stored alongside the event.
///
/// The payload is the JSON rendering of the booking at capture time,
/// so later schema changes cannot rewrite history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSnapshot {
    /// The booking's persisted identifier, if it had one.
    pub booking_id: Option<i64>,
    /// The lifecycle state at capture time, as stored text.
    pub status: String,
    /// JSON rendering of the full booking.
    pub payload: String,
}

impl BookingSnapshot {
    /// Captures a snapshot of `booking` as it stands right now.
    #[must_use]
    pub fn of(booking: &Booking) -> Self {
        Self {
            booking_id: booking.booking_id,
            status: booking.status.as_str().to_string(),
            payload: serde_json::to_string(booking).unwrap_or_default(),
        }
    }

    /// Captures a snapshot of a class booking.
    #[must_use]
    pub fn of_class_booking(class_booking: &ClassBooking) -> Self {
        Self {
            booking_id: class_booking.class_booking_id,
            status: class_booking.status.as_str().to_string(),
            payload: serde_json::to_string(class_booking).unwrap_or_default(),
        }
    }
}

/// An immutable audit event representing a state transition.
///
/// Every successful booking state change must produce exactly one
/// audit event. Audit events are immutable once created and capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - The booking before the transition (before), absent on creation
/// - The booking after the transition (after)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The booking before the transition; `None` for creations.
    pub before: Option<BookingSnapshot>,
    /// The booking after the transition.
    pub after: BookingSnapshot,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    ///
    /// Once created, an audit event is immutable.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `before` - The booking before the transition, if it existed
    /// * `after` - The booking after the transition
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: Option<BookingSnapshot>,
        after: BookingSnapshot,
    ) -> Self {
        Self {
            actor,
            cause,
            action,
            before,
            after,
        }
    }

    /// Returns the booking id the event is keyed by.
    #[must_use]
    pub const fn booking_id(&self) -> Option<i64> {
        self.after.booking_id
    }
}
