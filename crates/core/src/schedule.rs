// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use crate::interval::{TimeInterval, normalize};
use agenda_domain::{ClosurePeriod, ExceptionKind, ScheduleException, StaffPlan};
use time::Date;

/// Resolves one staff member's working intervals for a single date.
///
/// Layering order, first to last:
/// 1. Plan resolution: exactly one plan may cover the date. Zero
///    plans means the staff member has no schedule defined at all,
///    returned as `Ok(None)` so callers can tell it apart from a
///    covered but empty day.
/// 2. The plan template, filtered to the date's week label and day.
/// 3. Exceptions for that exact date. Timed `available` windows add;
///    timed `unavailable` windows subtract (splitting a covering
///    interval into up to two pieces); a whole-day `unavailable`
///    clears the day outright. A whole-day `available` carries no
///    times to add and is a no-op.
/// 4. Closures: a date inside any closure period yields an empty day
///    regardless of the above.
///
/// `plans` and `exceptions` must belong to a single staff member;
/// exceptions for other dates are ignored.
///
/// # Errors
///
/// Returns `CoreError::OverlappingPlans` if more than one plan covers
/// `date`, or a `DomainViolation` if a template or exception carries
/// an unrepresentable time window.
pub fn slots_for_date(
    plans: &[StaffPlan],
    exceptions: &[ScheduleException],
    closures: &[ClosurePeriod],
    date: Date,
) -> Result<Option<Vec<TimeInterval>>, CoreError> {
    let mut covering = plans.iter().filter(|plan| plan.covers(date));
    let Some(plan) = covering.next() else {
        return Ok(None);
    };
    if covering.next().is_some() {
        return Err(CoreError::OverlappingPlans {
            staff_id: plan.staff_id,
            date,
        });
    }

    let mut open: Vec<TimeInterval> = Vec::new();
    for template in plan.intervals_for(date) {
        open.push(TimeInterval::from_times(template.start(), template.end())?);
    }

    let todays: Vec<&ScheduleException> =
        exceptions.iter().filter(|exc| exc.date == date).collect();

    for exc in &todays {
        if exc.kind == ExceptionKind::Available
            && let (Some(start), Some(end)) = (exc.start, exc.end)
        {
            open.push(TimeInterval::from_times(start, end)?);
        }
    }
    open = normalize(open);

    for exc in &todays {
        if exc.kind != ExceptionKind::Unavailable {
            continue;
        }
        match (exc.start, exc.end) {
            (Some(start), Some(end)) => {
                let cut: TimeInterval = TimeInterval::from_times(start, end)?;
                open = open
                    .iter()
                    .flat_map(|interval| interval.subtract(&cut))
                    .collect();
            }
            _ => return Ok(Some(Vec::new())),
        }
    }

    if closures.iter().any(|closure| closure.contains(date)) {
        return Ok(Some(Vec::new()));
    }

    Ok(Some(open))
}
