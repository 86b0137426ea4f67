//! Applies a canonical filter to appointment records.

use crate::models::appointment::AppointmentRecord;
use crate::models::filter::CanonicalFilter;

/// Whether a single record passes every predicate of the filter.
///
/// Dates compare at calendar-day granularity: any time on the end day is in.
pub fn matches(record: &AppointmentRecord, filter: &CanonicalFilter) -> bool {
    filter.date_range.contains(record.booked_day())
        && filter.closers.admits(Some(&record.closer_name))
        && filter.setters.admits(record.setter_name.as_deref())
        && filter.company.admits(&record.company_id)
}

/// Matching records, in input order.
pub fn filter_records<'a>(
    records: &'a [AppointmentRecord],
    filter: &CanonicalFilter,
) -> Vec<&'a AppointmentRecord> {
    records.iter().filter(|r| matches(r, filter)).collect()
}

/// Owned variant for record batches fetched from a source.
pub fn retain_matching(
    mut records: Vec<AppointmentRecord>,
    filter: &CanonicalFilter,
) -> Vec<AppointmentRecord> {
    records.retain(|r| matches(r, filter));
    records
}
