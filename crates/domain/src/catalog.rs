// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only collaborator records the engine consumes: staff,
//! services, and bookable resources. Their CRUD lives outside the
//! core; here they are plain typed lookups.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// A staff member at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    /// Canonical identifier assigned by the database.
    pub staff_id: Option<i64>,
    /// The business the staff member works for.
    pub business_id: i64,
    /// The location the staff member works at.
    pub location_id: i64,
    /// Display name.
    pub display_name: String,
}

/// A bookable service offered at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Canonical identifier assigned by the database.
    pub service_id: Option<i64>,
    /// The business offering the service.
    pub business_id: i64,
    /// The location the service is offered at.
    pub location_id: i64,
    /// Display name.
    pub name: String,
    /// Visible appointment length in minutes.
    pub duration_minutes: i32,
    /// Extra blocked minutes after the appointment (processing,
    /// cleanup). Counted toward the occupied window but not shown to
    /// the customer.
    pub buffer_minutes: i32,
    /// Listed price in cents.
    pub price_cents: i64,
}

impl Service {
    /// Creates a new `Service`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidServiceDuration` if
    /// `duration_minutes < 1` or `buffer_minutes < 0`.
    pub fn new(
        business_id: i64,
        location_id: i64,
        name: String,
        duration_minutes: i32,
        buffer_minutes: i32,
        price_cents: i64,
    ) -> Result<Self, DomainError> {
        if duration_minutes < 1 {
            return Err(DomainError::InvalidServiceDuration(duration_minutes));
        }
        if buffer_minutes < 0 {
            return Err(DomainError::InvalidServiceDuration(buffer_minutes));
        }
        Ok(Self {
            service_id: None,
            business_id,
            location_id,
            name,
            duration_minutes,
            buffer_minutes,
            price_cents,
        })
    }

    /// Returns the total occupied window in minutes.
    #[must_use]
    pub const fn occupied_minutes(&self) -> i32 {
        self.duration_minutes + self.buffer_minutes
    }
}

/// A countable resource at a location (chairs, rooms, machines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Canonical identifier assigned by the database.
    pub resource_id: Option<i64>,
    /// The location that owns the resource.
    pub location_id: i64,
    /// Display name.
    pub name: String,
    /// Units available concurrently.
    pub capacity: i32,
}

/// How many units of a resource one service occupies while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequirement {
    /// The service that needs the resource.
    pub service_id: i64,
    /// The resource needed.
    pub resource_id: i64,
    /// Units occupied for the duration of the booking.
    pub quantity: i32,
}
