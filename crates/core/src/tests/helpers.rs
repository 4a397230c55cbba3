// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::interval::TimeInterval;
use agenda_domain::{PlanType, StaffPlan, WeekLabel, WorkingInterval};
use time::{Date, Time};

/// Builds a `[start, end)` interval from minute-of-day bounds.
pub fn interval(start_minute: i32, end_minute: i32) -> TimeInterval {
    TimeInterval::new(start_minute, end_minute).unwrap()
}

/// Builds a template interval on `day` (ISO 1 = Monday).
pub fn working(day: u8, start: Time, end: Time) -> WorkingInterval {
    WorkingInterval::new(day, start, end).unwrap()
}

/// A weekly Mon-Fri 09:00-18:00 plan, open-ended from `valid_from`.
pub fn weekday_plan(staff_id: i64, valid_from: Date) -> StaffPlan {
    let nine: Time = Time::from_hms(9, 0, 0).unwrap();
    let eighteen: Time = Time::from_hms(18, 0, 0).unwrap();
    StaffPlan {
        plan_id: Some(1),
        staff_id,
        plan_type: PlanType::Weekly,
        valid_from,
        valid_to: None,
        intervals: (1..=5)
            .map(|day| (WeekLabel::A, working(day, nine, eighteen)))
            .collect(),
    }
}
