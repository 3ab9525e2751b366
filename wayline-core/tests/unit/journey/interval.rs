use super::*;

fn ts(s: &str) -> chrono::NaiveDateTime {
    parse_local_timestamp(s).unwrap()
}

#[test]
fn rejects_inverted_and_empty_intervals() {
    let a = ts("2024-01-01T10:00");
    let b = ts("2024-01-01T12:00");
    assert!(Interval::new(a, b).is_ok());
    assert!(Interval::new(b, a).is_err());
    assert!(Interval::new(a, a).is_err());
}

#[test]
fn total_is_end_minus_start() {
    let i = Interval::new(ts("2024-01-01T10:00"), ts("2024-01-01T12:30")).unwrap();
    assert_eq!(i.total(), chrono::Duration::minutes(150));
}

#[test]
fn accepts_common_timestamp_shapes() {
    for s in [
        "2024-01-01T10:00",
        "2024-01-01T10:00:30",
        "2024-01-01 10:00",
        " 2024-01-01 10:00:30 ",
    ] {
        assert!(parse_local_timestamp(s).is_ok(), "failed to parse '{s}'");
    }
    assert!(parse_local_timestamp("tomorrow").is_err());
    assert!(parse_local_timestamp("").is_err());
}
