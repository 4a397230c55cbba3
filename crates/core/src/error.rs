// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use agenda_domain::DomainError;
use time::Date;

/// Errors that can occur inside the pure scheduling engines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// More than one staff plan covers the same date. This is a data
    /// consistency violation and is never resolved by picking one.
    OverlappingPlans {
        /// The staff member whose plans overlap.
        staff_id: i64,
        /// The date covered by more than one plan.
        date: Date,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::OverlappingPlans { staff_id, date } => write!(
                f,
                "Multiple work plans for staff {staff_id} cover {date}; plan validity ranges must not overlap"
            ),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
