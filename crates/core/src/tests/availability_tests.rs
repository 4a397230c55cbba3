// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::interval;
use crate::availability::{resource_capacity_allows, slot_starts, within_horizon};
use crate::interval::time_at_minute;
use time::Duration;
use time::macros::{date, time};

#[test]
fn open_day_yields_the_full_grid() {
    // 09:00-18:00, 30-minute service: 09:00 through 17:30.
    let starts = slot_starts(&[interval(540, 1080)], &[], 30);
    assert_eq!(starts.len(), 35);
    assert_eq!(starts.first(), Some(&540));
    assert_eq!(starts.last(), Some(&1050));
    assert_eq!(time_at_minute(540), time!(9:00));
    assert_eq!(time_at_minute(1050), time!(17:30));
}

#[test]
fn occupied_interval_excludes_overlapping_candidates() {
    // Existing 10:00-10:30 item: 09:45, 10:00 and 10:15 all collide
    // for a 30-minute request; 09:30 and 10:30 do not.
    let starts = slot_starts(&[interval(540, 1080)], &[interval(600, 630)], 30);
    assert!(starts.contains(&570));
    assert!(!starts.contains(&585));
    assert!(!starts.contains(&600));
    assert!(!starts.contains(&615));
    assert!(starts.contains(&630));
}

#[test]
fn window_must_fit_inside_one_working_interval() {
    // Split shift 09:00-12:00 / 13:00-17:00 with a 60-minute service:
    // nothing may straddle the lunch gap.
    let working = vec![interval(540, 720), interval(780, 1020)];
    let starts = slot_starts(&working, &[], 60);
    assert!(starts.contains(&660)); // 11:00 ends exactly at 12:00
    assert!(!starts.contains(&675));
    assert!(!starts.contains(&705));
    assert_eq!(starts.iter().filter(|m| **m < 720).count(), 9);
}

#[test]
fn grid_is_wall_clock_aligned() {
    // Interval starting 09:05: the first candidate is 09:15, not 09:05.
    let starts = slot_starts(&[interval(545, 720)], &[], 30);
    assert_eq!(starts.first(), Some(&555));
}

#[test]
fn zero_duration_yields_nothing() {
    assert!(slot_starts(&[interval(540, 1080)], &[], 0).is_empty());
}

#[test]
fn horizon_covers_today_through_sixty_days() {
    let today = date!(2025 - 03 - 01);
    assert!(within_horizon(today, today));
    assert!(within_horizon(today, today + Duration::days(60)));
    assert!(!within_horizon(today, today + Duration::days(61)));
    assert!(!within_horizon(today, today - Duration::days(1)));
}

#[test]
fn resource_capacity_counts_overlapping_claims() {
    let window = interval(600, 660);
    let claimed = vec![(interval(570, 630), 1), (interval(720, 780), 1)];
    // Capacity 2: one overlapping unit plus this request fits.
    assert!(resource_capacity_allows(2, &claimed, &window, 1));
    // Capacity 1: the overlapping claim exhausts it.
    assert!(!resource_capacity_allows(1, &claimed, &window, 1));
    // The 12:00 claim does not overlap and is ignored.
    assert!(resource_capacity_allows(1, &claimed, &interval(660, 720), 1));
}
