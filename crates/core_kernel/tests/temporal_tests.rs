//! Temporal type tests

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::{DateRange, TemporalError, ValidPeriod};

#[test]
fn valid_period_rejects_inverted_bounds() {
    let start = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    let result = ValidPeriod::bounded(start, end);
    assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
}

#[test]
fn unbounded_period_contains_far_future() {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let period = ValidPeriod::from(start);

    assert!(period.is_unbounded());
    assert!(period.contains(Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap()));
}

#[test]
fn close_at_bounds_an_open_period() {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let mut period = ValidPeriod::from(start);

    let close = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
    period.close_at(close).unwrap();

    assert!(!period.contains(close));
    assert!(period.contains(Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap()));
}

#[test]
fn date_range_contains_is_inclusive() {
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
    )
    .unwrap();

    assert!(range.contains(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
    assert!(range.contains(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()));
    assert!(!range.contains(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
}

#[test]
fn date_range_rejects_inverted_bounds() {
    let result = DateRange::new(
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    );
    assert!(result.is_err());
}
