//! Dense per-day series for the performance chart.

use crate::models::appointment::AppointmentRecord;
use crate::models::filter::DateRange;
use crate::models::metrics::DailyBucket;

/// One bucket per day of `range`, ascending, zero-filled.
///
/// Records are placed by the calendar day of `booked_for`. Records outside
/// the range are skipped.
pub fn bucketize<'a, I>(records: I, range: &DateRange) -> Vec<DailyBucket>
where
    I: IntoIterator<Item = &'a AppointmentRecord>,
{
    let mut buckets: Vec<DailyBucket> = range.days().map(DailyBucket::empty).collect();

    for record in records {
        let day = record.booked_day();
        if !range.contains(day) {
            tracing::trace!(record_id = %record.id, %day, "Record outside bucket range skipped");
            continue;
        }
        let index = (day - range.start).num_days() as usize;
        let bucket = &mut buckets[index];
        bucket.total += 1;
        bucket.counts.record(record.disposition);
    }

    buckets
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;
    use crate::models::appointment::Disposition;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 12).unwrap()
    }

    fn record(day: NaiveDate, hour: u32, disposition: Disposition) -> AppointmentRecord {
        AppointmentRecord::new("acme", "Mike", None, day.and_hms_opt(hour, 0, 0).unwrap(), disposition)
    }

    #[test]
    fn week_without_records_has_seven_empty_buckets() {
        let range = DateRange::new(monday(), monday() + Duration::days(6));
        let buckets = bucketize(&Vec::<AppointmentRecord>::new(), &range);
        assert_eq!(buckets.len(), 7);
        assert!(buckets.iter().all(|b| b.total == 0));
        assert_eq!(buckets[0].date, monday());
        assert_eq!(buckets[6].date, monday() + Duration::days(6));
    }

    #[test]
    fn buckets_are_ascending_and_dense() {
        let range = DateRange::new(monday(), monday() + Duration::days(30));
        let buckets = bucketize(&Vec::<AppointmentRecord>::new(), &range);
        assert_eq!(buckets.len(), 31);
        for pair in buckets.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[test]
    fn single_day_range_has_one_bucket() {
        let range = DateRange::single_day(monday());
        let records = vec![record(monday(), 23, Disposition::Sat)];
        let buckets = bucketize(&records, &range);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].total, 1);
    }

    #[test]
    fn records_land_on_their_calendar_day() {
        let tuesday = monday() + Duration::days(1);
        let records = vec![
            record(monday(), 0, Disposition::Sat),
            record(monday(), 23, Disposition::Closed),
            record(tuesday, 12, Disposition::NoShow),
        ];
        let range = DateRange::new(monday(), monday() + Duration::days(6));
        let buckets = bucketize(&records, &range);

        assert_eq!(buckets[0].total, 2);
        assert_eq!(buckets[0].counts.sat, 1);
        assert_eq!(buckets[0].counts.closed, 1);
        assert_eq!(buckets[1].total, 1);
        assert_eq!(buckets[1].counts.no_show, 1);
        assert!(buckets[2..].iter().all(|b| b.total == 0));
        assert!(buckets.iter().all(|b| b.counts.sum() == b.total));
    }

    #[test]
    fn out_of_range_records_are_skipped() {
        let records = vec![
            record(monday() - Duration::days(1), 12, Disposition::Sat),
            record(monday(), 12, Disposition::Sat),
            record(monday() + Duration::days(7), 12, Disposition::Sat),
        ];
        let range = DateRange::new(monday(), monday() + Duration::days(6));
        let buckets = bucketize(&records, &range);
        assert_eq!(buckets.iter().map(|b| b.total).sum::<u64>(), 1);
    }
}
