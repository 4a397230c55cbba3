// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only query modules.
//!
//! All queries use Diesel DSL against the `SQLite` connection. None of
//! them take locks; write-time re-validation happens inside the
//! mutations.

pub mod audit;
pub mod bookings;
pub mod catalog;
pub mod class_events;
pub mod schedule;
