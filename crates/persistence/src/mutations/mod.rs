// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Every mutation that touches booking or seat state runs inside
//! `immediate_transaction` (`BEGIN IMMEDIATE`), which takes the
//! `SQLite` writer lock before the first read. Lock-then-check: the
//! conflict and capacity scans always see the final pre-commit state,
//! so two racing requests for the same slot cannot both pass.
//!
//! ## Module Organization
//!
//! - `audit` — Append-only audit log writes
//! - `bookings` — Conflict-checked booking creation, reschedule,
//!   replacement, status transitions, series bulk updates
//! - `catalog` — Seed helpers for staff, services, plans, resources
//! - `class_events` — Seat booking and cancellation with FIFO
//!   waitlist promotion

pub mod audit;
pub mod bookings;
pub mod catalog;
pub mod class_events;

pub use bookings::{CreateBookingOutcome, IDEMPOTENCY_TTL_HOURS, SeriesCancelScope};
