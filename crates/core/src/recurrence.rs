// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use agenda_domain::{Frequency, RecurrenceRule};
use time::{Date, Duration, Month};

/// Hard cap on the number of occurrences a single series may produce,
/// regardless of the rule's own end conditions.
pub const MAX_SERIES_OCCURRENCES: u32 = 52;

/// Expands a recurrence rule into concrete occurrence dates.
///
/// The anchor is occurrence 0. Weekly rules advance by
/// `7 * interval_value` days and biweekly by `14 * interval_value`,
/// intersected with `days_of_week` when present (the anchor date is
/// always included even if its weekday is not listed, matching the
/// booking the customer explicitly placed). Monthly rules land on
/// `day_of_month` (defaulting to the anchor's day), clamped to the
/// length of shorter months.
///
/// Expansion stops at whichever binds first: `max_occurrences`,
/// `end_date`, [`MAX_SERIES_OCCURRENCES`], or one year past the
/// anchor. Time-of-day and duration are not computed here; the
/// caller copies them from occurrence 0.
#[must_use]
pub fn occurrence_dates(rule: &RecurrenceRule, anchor: Date) -> Vec<Date> {
    let horizon: Date = one_year_after(anchor);
    let cap: u32 = rule
        .max_occurrences
        .map_or(MAX_SERIES_OCCURRENCES, |n| n.min(MAX_SERIES_OCCURRENCES));

    let mut dates: Vec<Date> = vec![anchor];
    let mut count: u32 = 1;
    let mut candidates: Box<dyn Iterator<Item = Date>> = match rule.frequency {
        Frequency::Weekly => stepped_dates(rule, anchor, 7),
        Frequency::Biweekly => stepped_dates(rule, anchor, 14),
        Frequency::Monthly => monthly_dates(rule, anchor),
    };

    while count < cap {
        let Some(date) = candidates.next() else { break };
        if date > horizon {
            break;
        }
        if let Some(end) = rule.end_date
            && date > end
        {
            break;
        }
        dates.push(date);
        count += 1;
    }
    dates
}

/// Occurrence dates for weekly and biweekly rules.
///
/// Without `days_of_week` the series is simply the anchor plus
/// multiples of the cycle. With it, each cycle window contributes the
/// listed weekdays of the anchor's week, shifted by whole cycles.
fn stepped_dates(
    rule: &RecurrenceRule,
    anchor: Date,
    cycle_days: i64,
) -> Box<dyn Iterator<Item = Date>> {
    let step: Duration = Duration::days(cycle_days * i64::from(rule.interval_value));

    let Some(days) = rule.days_of_week.clone() else {
        let mut current: Date = anchor;
        return Box::new(std::iter::from_fn(move || {
            current = current.saturating_add(step);
            Some(current)
        }));
    };

    let mut days: Vec<u8> = days;
    days.sort_unstable();
    days.dedup();
    let interval: i64 = i64::from(rule.interval_value);
    let week_start: Date = anchor.saturating_sub(Duration::days(i64::from(
        anchor.weekday().number_from_monday() - 1,
    )));

    let mut cycle: i64 = 0;
    let mut pending: Vec<Date> = Vec::new();
    Box::new(std::iter::from_fn(move || {
        loop {
            if let Some(date) = pending.pop() {
                return Some(date);
            }
            let base: Date =
                week_start.saturating_add(Duration::days(cycle * cycle_days * interval));
            cycle += 1;
            // Newest-first so pop() yields ascending order.
            pending = days
                .iter()
                .rev()
                .map(|day| base.saturating_add(Duration::days(i64::from(day - 1))))
                .filter(|date| *date > anchor)
                .collect();
        }
    }))
}

/// Occurrence dates for monthly rules: `day_of_month` (or the
/// anchor's day) every `interval_value` months, clamped to month
/// length.
fn monthly_dates(rule: &RecurrenceRule, anchor: Date) -> Box<dyn Iterator<Item = Date>> {
    let target_day: u8 = rule.day_of_month.unwrap_or(anchor.day());
    let interval: u32 = rule.interval_value;

    let mut months_ahead: u32 = 0;
    Box::new(std::iter::from_fn(move || {
        months_ahead += interval;
        add_months_clamped(anchor, months_ahead, target_day)
    }))
}

/// The date `months` months after `date`, on `day` clamped to the
/// target month's length.
fn add_months_clamped(date: Date, months: u32, day: u8) -> Option<Date> {
    let total: i64 =
        i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1 + i64::from(months);
    let year: i32 = i32::try_from(total.div_euclid(12)).ok()?;
    let month: Month = Month::try_from(u8::try_from(total.rem_euclid(12)).ok()? + 1).ok()?;
    let clamped: u8 = day.min(month.length(year));
    Date::from_calendar_date(year, month, clamped).ok()
}

/// One calendar year after `date`; Feb 29 anchors land on Feb 28.
fn one_year_after(date: Date) -> Date {
    add_months_clamped(date, 12, date.day()).unwrap_or(Date::MAX)
}
