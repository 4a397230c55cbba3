// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::interval;
use crate::interval::{TimeInterval, minute_of_day, normalize, time_at_minute};
use time::macros::time;

#[test]
fn adjacent_intervals_do_not_overlap() {
    let morning = interval(540, 600);
    let next = interval(600, 660);
    assert!(!morning.overlaps(&next));
    assert!(!next.overlaps(&morning));
}

#[test]
fn one_shared_minute_overlaps() {
    let first = interval(540, 601);
    let second = interval(600, 660);
    assert!(first.overlaps(&second));
}

#[test]
fn subtract_interior_cut_splits_into_two() {
    let shift = interval(540, 1080);
    let lunch = interval(720, 780);
    let pieces = shift.subtract(&lunch);
    assert_eq!(pieces, vec![interval(540, 720), interval(780, 1080)]);
}

#[test]
fn subtract_leading_edge_truncates() {
    let shift = interval(540, 1080);
    let cut = interval(480, 600);
    assert_eq!(shift.subtract(&cut), vec![interval(600, 1080)]);
}

#[test]
fn subtract_trailing_edge_truncates() {
    let shift = interval(540, 1080);
    let cut = interval(1020, 1140);
    assert_eq!(shift.subtract(&cut), vec![interval(540, 1020)]);
}

#[test]
fn subtract_covering_cut_removes_everything() {
    let shift = interval(540, 1080);
    let cut = interval(480, 1140);
    assert!(shift.subtract(&cut).is_empty());
}

#[test]
fn subtract_disjoint_cut_is_a_no_op() {
    let shift = interval(540, 720);
    let cut = interval(780, 840);
    assert_eq!(shift.subtract(&cut), vec![shift]);
}

#[test]
fn normalize_merges_overlapping_and_touching() {
    let merged = normalize(vec![
        interval(780, 840),
        interval(540, 660),
        interval(660, 720),
        interval(800, 900),
    ]);
    assert_eq!(merged, vec![interval(540, 720), interval(780, 900)]);
}

#[test]
fn new_rejects_inverted_and_out_of_day_bounds() {
    assert!(TimeInterval::new(600, 600).is_err());
    assert!(TimeInterval::new(600, 540).is_err());
    assert!(TimeInterval::new(-10, 60).is_err());
    assert!(TimeInterval::new(1400, 1500).is_err());
}

#[test]
fn from_times_rejects_inverted_window() {
    assert!(TimeInterval::from_times(time!(17:00), time!(9:00)).is_err());
}

#[test]
fn minute_conversions_round_trip() {
    assert_eq!(minute_of_day(time!(9:15)), 555);
    assert_eq!(time_at_minute(555), time!(9:15));
    assert_eq!(minute_of_day(time!(0:00)), 0);
}
