//! Attribute breakdowns shown under the KPI cards.

use crate::models::appointment::AppointmentRecord;
use crate::models::metrics::{AppointmentBreakdown, BreakdownEntry};

/// Credit score bands, inclusive on both ends. Scores outside every band
/// are not counted but still count towards the total.
const CREDIT_SCORE_BANDS: [(i32, i32); 4] = [(600, 650), (651, 700), (701, 750), (751, 800)];

const UNKNOWN: &str = "Unknown";

pub fn breakdown(records: &[AppointmentRecord]) -> AppointmentBreakdown {
    let total = records.len() as u64;

    let credit_score = CREDIT_SCORE_BANDS
        .iter()
        .map(|(low, high)| {
            let count = records
                .iter()
                .filter(|r| r.credit_score.is_some_and(|s| (*low..=*high).contains(&s)))
                .count() as u64;
            entry(format!("{low}-{high}"), count, total)
        })
        .collect();

    AppointmentBreakdown {
        credit_score,
        roof_type: tally(records, total, |r| label(r.roof_type.as_deref())),
        existing_solar: tally(records, total, |r| {
            if r.existing_solar.unwrap_or(false) { "Yes" } else { "No" }.to_string()
        }),
        shading: tally(records, total, |r| label(r.shading.as_deref())),
        appointment_type: tally(records, total, |r| label(r.appointment_type.as_deref())),
    }
}

/// Count records per category, categories in order of first appearance.
fn tally<F>(records: &[AppointmentRecord], total: u64, category: F) -> Vec<BreakdownEntry>
where
    F: Fn(&AppointmentRecord) -> String,
{
    let mut counts: Vec<(String, u64)> = Vec::new();
    for record in records {
        let key = category(record);
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, n)) => *n += 1,
            None => counts.push((key, 1)),
        }
    }
    counts
        .into_iter()
        .map(|(category, count)| entry(category, count, total))
        .collect()
}

fn entry(category: String, count: u64, total: u64) -> BreakdownEntry {
    let percentage = if total == 0 {
        0.0
    } else {
        (1000.0 * count as f64 / total as f64 + 0.5).floor() / 10.0
    };
    BreakdownEntry {
        category,
        count,
        percentage,
    }
}

fn label(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => UNKNOWN.to_string(),
    }
}
