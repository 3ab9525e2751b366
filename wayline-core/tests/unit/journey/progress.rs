use super::*;
use crate::journey::interval::{Interval, parse_local_timestamp};

fn ts(s: &str) -> NaiveDateTime {
    parse_local_timestamp(s).unwrap()
}

fn journey() -> Interval {
    Interval::new(ts("2024-01-01T10:00"), ts("2024-01-01T12:00")).unwrap()
}

#[test]
fn before_start_pins_to_zero() {
    let r = compute(ts("2024-01-01T09:00"), &journey());
    assert_eq!(r.percent, 0.0);
    assert_eq!(r.elapsed, "00:00");
    assert_eq!(r.remaining, "02:00");
    assert_eq!(r.start_label, "10:00");
    assert_eq!(r.end_label, "12:00");
}

#[test]
fn after_end_pins_to_hundred() {
    let r = compute(ts("2024-01-02T03:00"), &journey());
    assert_eq!(r.percent, 100.0);
    assert_eq!(r.elapsed, "02:00");
    assert_eq!(r.remaining, "00:00");
}

#[test]
fn midpoint_splits_the_interval_evenly() {
    let r = compute(ts("2024-01-01T11:00"), &journey());
    assert_eq!(r.percent, 50.0);
    assert_eq!(r.elapsed, "01:00");
    assert_eq!(r.remaining, "01:00");
    assert_eq!(r.start_label, "10:00");
    assert_eq!(r.end_label, "12:00");
}

#[test]
fn boundary_instants_are_exact() {
    let i = journey();
    assert_eq!(compute(i.start(), &i).percent, 0.0);
    assert_eq!(compute(i.end(), &i).percent, 100.0);
}

#[test]
fn percent_is_monotonic_and_bounded() {
    let i = journey();
    let mut now = ts("2024-01-01T09:30");
    let mut last = f64::MIN;
    while now <= ts("2024-01-01T12:30") {
        let r = compute(now, &i);
        assert!((0.0..=100.0).contains(&r.percent), "percent {}", r.percent);
        assert!(r.percent >= last, "{} < {last} at {now}", r.percent);
        last = r.percent;
        now += Duration::minutes(7);
    }
}

#[test]
fn format_hm_round_trips_whole_minutes() {
    assert_eq!(format_hm(Duration::minutes(90)), "01:30");
    assert_eq!(format_hm(Duration::zero()), "00:00");
    assert_eq!(format_hm(Duration::minutes(59)), "00:59");
    // Hours never roll over into days.
    assert_eq!(format_hm(Duration::hours(26)), "26:00");
    assert_eq!(format_hm(Duration::minutes(26 * 60 + 5)), "26:05");
}
