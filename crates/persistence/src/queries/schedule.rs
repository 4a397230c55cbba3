// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Schedule lookups: work plans, exceptions, closures.

use std::str::FromStr;

use diesel::prelude::*;
use diesel::SqliteConnection;
use time::Date;

use crate::data_models::{
    ClosureRow, PlanIntervalRow, ScheduleExceptionRow, StaffPlanRow, decode_date, decode_time,
};
use crate::diesel_schema::{closures, plan_intervals, schedule_exceptions, staff_plans};
use crate::error::PersistenceError;
use agenda_domain::{
    ClosurePeriod, PlanType, ScheduleException, StaffPlan, WeekLabel, WorkingInterval,
};

/// Loads every work plan for a staff member, template intervals
/// included.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row cannot be
/// decoded.
pub fn staff_plans(
    conn: &mut SqliteConnection,
    staff_id: i64,
) -> Result<Vec<StaffPlan>, PersistenceError> {
    let plan_rows: Vec<StaffPlanRow> = staff_plans::table
        .filter(staff_plans::staff_id.eq(staff_id))
        .order(staff_plans::valid_from.asc())
        .load::<StaffPlanRow>(conn)?;

    let mut plans: Vec<StaffPlan> = Vec::with_capacity(plan_rows.len());
    for plan_row in plan_rows {
        let interval_rows: Vec<PlanIntervalRow> = plan_intervals::table
            .filter(plan_intervals::plan_id.eq(plan_row.plan_id))
            .order(plan_intervals::interval_id.asc())
            .load::<PlanIntervalRow>(conn)?;

        let mut intervals: Vec<(WeekLabel, WorkingInterval)> =
            Vec::with_capacity(interval_rows.len());
        for row in interval_rows {
            let day: u8 = u8::try_from(row.day_of_week)
                .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
            intervals.push((
                WeekLabel::from_str(&row.week_label)?,
                WorkingInterval::new(day, decode_time(&row.start_time)?, decode_time(&row.end_time)?)?,
            ));
        }

        let valid_to: Option<Date> = plan_row.valid_to.as_deref().map(decode_date).transpose()?;
        plans.push(StaffPlan {
            plan_id: Some(plan_row.plan_id),
            staff_id: plan_row.staff_id,
            plan_type: PlanType::from_str(&plan_row.plan_type)?,
            valid_from: decode_date(&plan_row.valid_from)?,
            valid_to,
            intervals,
        });
    }
    Ok(plans)
}

/// Loads a staff member's schedule exceptions inside an inclusive date
/// range.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row cannot be
/// decoded.
pub fn exceptions_in_range(
    conn: &mut SqliteConnection,
    staff_id: i64,
    from: Date,
    to: Date,
) -> Result<Vec<ScheduleException>, PersistenceError> {
    let from_text: String = crate::data_models::encode_date(from)?;
    let to_text: String = crate::data_models::encode_date(to)?;
    let rows: Vec<ScheduleExceptionRow> = schedule_exceptions::table
        .filter(schedule_exceptions::staff_id.eq(staff_id))
        .filter(schedule_exceptions::exception_date.ge(from_text))
        .filter(schedule_exceptions::exception_date.le(to_text))
        .order(schedule_exceptions::exception_id.asc())
        .load::<ScheduleExceptionRow>(conn)?;

    rows.into_iter().map(ScheduleExceptionRow::into_domain).collect()
}

/// Loads the closure periods that apply at a location: business-wide
/// ones plus those scoped to this exact location.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row cannot be
/// decoded.
pub fn closures_for_location(
    conn: &mut SqliteConnection,
    business_id: i64,
    location_id: i64,
) -> Result<Vec<ClosurePeriod>, PersistenceError> {
    let rows: Vec<ClosureRow> = closures::table
        .filter(closures::business_id.eq(business_id))
        .filter(
            closures::scope
                .eq("business")
                .or(closures::location_id.eq(location_id)),
        )
        .order(closures::closure_id.asc())
        .load::<ClosureRow>(conn)?;

    rows.into_iter().map(ClosureRow::into_domain).collect()
}
