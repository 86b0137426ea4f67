//! KPI aggregation over a filtered appointment set.
//!
//! Sit rate is sits over all appointments. Close rate is closes over sits:
//! of the appointments that sat, how many closed. Both are percentages
//! rounded half-up to two decimals, and 0 when their denominator is 0.

use crate::models::appointment::AppointmentRecord;
use crate::models::metrics::{DispositionCounts, MetricsSummary};

/// Round half-up to two decimal places. Inputs are non-negative percentages.
pub fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// `100 * part / whole`, rounded, or 0 for an empty denominator.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(100.0 * part as f64 / whole as f64)
}

/// Single pass over the records.
pub fn aggregate<'a, I>(records: I) -> MetricsSummary
where
    I: IntoIterator<Item = &'a AppointmentRecord>,
{
    let mut counts = DispositionCounts::default();
    let mut total = 0u64;
    for record in records {
        counts.record(record.disposition);
        total += 1;
    }
    summarize(&counts, total)
}

/// Build the summary from already counted dispositions.
pub fn summarize(counts: &DispositionCounts, total: u64) -> MetricsSummary {
    MetricsSummary {
        total_appointments: total,
        total_sits: counts.sat,
        total_closes: counts.closed,
        no_shows: counts.no_show,
        rescheduled: counts.rescheduled,
        not_interested: counts.not_interested,
        disqualified: counts.disqualified,
        follow_up: counts.follow_up,
        pending: counts.pending,
        sit_rate: percentage(counts.sat, total),
        close_rate: percentage(counts.closed, counts.sat),
    }
}
