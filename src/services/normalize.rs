//! Turns a caller's filter request into the canonical filter the pipeline
//! applies.
//!
//! The normalizer prefers defaults over errors: a missing range becomes the
//! current week, reversed bounds are swapped, a single bound becomes a
//! one-day range. Only a bound that is present but not a date is rejected.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::errors::DashboardError;
use crate::models::filter::{CanonicalFilter, CompanyScope, DateRange, FilterRequest, NameSet};
use crate::services::clock::Clock;

/// Timestamp layouts accepted in addition to plain dates and RFC 3339.
const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Build the canonical filter for an already resolved company scope.
pub fn normalize(
    request: &FilterRequest,
    scope: CompanyScope,
    clock: &dyn Clock,
) -> Result<CanonicalFilter, DashboardError> {
    let (start, end) = match &request.date_range {
        Some(range) => (
            parse_bound("start", range.start.as_deref())?,
            parse_bound("end", range.end.as_deref())?,
        ),
        None => (None, None),
    };

    let date_range = match (start, end) {
        (Some(start), Some(end)) => DateRange::new(start, end),
        (Some(day), None) | (None, Some(day)) => DateRange::single_day(day),
        (None, None) => DateRange::week_of(clock.today()),
    };

    Ok(CanonicalFilter {
        date_range,
        closers: names(request.selected_closers.as_deref()),
        setters: names(request.selected_setters.as_deref()),
        company: scope,
    })
}

/// Parse a calendar date from the layouts the dashboard sends. The date is
/// taken as written; RFC 3339 offsets are not converted.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.date())
}

fn parse_bound(label: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, DashboardError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value).map(Some).ok_or_else(|| {
            DashboardError::Validation(format!("date range {label} is not a date: {value}"))
        }),
    }
}

fn names(list: Option<&[String]>) -> NameSet {
    NameSet::from_names(list.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::filter::RequestedRange;
    use crate::services::clock::FixedClock;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Thursday.
    fn clock() -> FixedClock {
        FixedClock(day(2026, 10, 15))
    }

    fn acme() -> CompanyScope {
        CompanyScope::Company("acme".to_string())
    }

    fn range(start: Option<&str>, end: Option<&str>) -> FilterRequest {
        FilterRequest {
            date_range: Some(RequestedRange {
                start: start.map(str::to_string),
                end: end.map(str::to_string),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn missing_range_defaults_to_current_week() {
        let filter = normalize(&FilterRequest::default(), acme(), &clock()).unwrap();
        assert_eq!(filter.date_range.start, day(2026, 10, 12));
        assert_eq!(filter.date_range.end, day(2026, 10, 18));
        assert!(filter.closers.is_empty());
        assert!(filter.setters.is_empty());
    }

    #[test]
    fn reversed_range_is_swapped() {
        let filter = normalize(&range(Some("2026-10-20"), Some("2026-10-01")), acme(), &clock()).unwrap();
        assert_eq!(filter.date_range, DateRange::new(day(2026, 10, 1), day(2026, 10, 20)));
    }

    #[test]
    fn single_bound_becomes_single_day() {
        let only_start = normalize(&range(Some("2026-09-03"), None), acme(), &clock()).unwrap();
        assert_eq!(only_start.date_range, DateRange::single_day(day(2026, 9, 3)));

        let only_end = normalize(&range(Some(""), Some("2026-09-04")), acme(), &clock()).unwrap();
        assert_eq!(only_end.date_range, DateRange::single_day(day(2026, 9, 4)));
    }

    #[test]
    fn blank_bounds_fall_back_to_week() {
        let filter = normalize(&range(Some(" "), None), acme(), &clock()).unwrap();
        assert_eq!(filter.date_range, DateRange::week_of(day(2026, 10, 15)));
    }

    #[test]
    fn malformed_bound_is_validation_error() {
        let err = normalize(&range(Some("next tuesday"), Some("2026-10-01")), acme(), &clock()).unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
    }

    #[test]
    fn accepts_timestamp_layouts() {
        assert_eq!(parse_date("2026-10-12 23:59:59"), Some(day(2026, 10, 12)));
        assert_eq!(parse_date("2026-10-12T08:00:00"), Some(day(2026, 10, 12)));
        assert_eq!(parse_date("2026-10-12T08:00:00.250"), Some(day(2026, 10, 12)));
        assert_eq!(parse_date("2026-10-12T23:30:00-05:00"), Some(day(2026, 10, 12)));
        assert_eq!(parse_date("12/10/2026"), None);
    }

    #[test]
    fn names_are_deduplicated_in_input_order() {
        let request = FilterRequest::default()
            .with_closers(["Mike Chen", "Emma Williams", "Mike Chen", ""])
            .with_setters(["Lisa Brown", "Lisa Brown"]);
        let filter = normalize(&request, acme(), &clock()).unwrap();
        assert_eq!(
            filter.closers.as_slice(),
            &["Mike Chen".to_string(), "Emma Williams".to_string()]
        );
        assert_eq!(filter.setters.len(), 1);
    }

    #[test]
    fn closer_order_does_not_change_canonical_filter() {
        let a = FilterRequest::default().with_closers(["Mike", "Emma"]);
        let b = FilterRequest::default().with_closers(["Emma", "Mike", "Emma"]);
        assert_eq!(
            normalize(&a, acme(), &clock()).unwrap(),
            normalize(&b, acme(), &clock()).unwrap()
        );
    }

    #[test]
    fn scope_is_carried_through() {
        let filter = normalize(&FilterRequest::default(), CompanyScope::Unrestricted, &clock()).unwrap();
        assert_eq!(filter.company, CompanyScope::Unrestricted);
    }

    #[test]
    fn normalization_is_idempotent() {
        let requests = [
            FilterRequest::default(),
            range(Some("2026-10-20"), Some("2026-10-01")),
            range(None, Some("2026-02-28 10:00:00")),
            FilterRequest::default()
                .with_dates(day(2026, 1, 5), day(2026, 1, 11))
                .with_closers(["B", "A", "B"])
                .with_setters(["", "C"]),
        ];
        for request in requests {
            let once = normalize(&request, acme(), &clock()).unwrap();
            let twice = normalize(&once.to_request(), acme(), &clock()).unwrap();
            assert_eq!(once, twice);
            assert_eq!(once.closers.as_slice(), twice.closers.as_slice());
        }
    }
}
