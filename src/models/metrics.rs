//! Derived dashboard outputs: KPI summary, daily series, breakdowns.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::appointment::{AppointmentRecord, Disposition};
use crate::models::filter::CanonicalFilter;

/// Appointment counts per disposition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispositionCounts {
    pub sat: u64,
    pub rescheduled: u64,
    pub not_interested: u64,
    pub disqualified: u64,
    pub follow_up: u64,
    pub pending: u64,
    pub no_show: u64,
    pub closed: u64,
}

impl DispositionCounts {
    pub fn record(&mut self, disposition: Disposition) {
        *self.slot(disposition) += 1;
    }

    pub fn get(&self, disposition: Disposition) -> u64 {
        match disposition {
            Disposition::Sat => self.sat,
            Disposition::Rescheduled => self.rescheduled,
            Disposition::NotInterested => self.not_interested,
            Disposition::Disqualified => self.disqualified,
            Disposition::FollowUp => self.follow_up,
            Disposition::Pending => self.pending,
            Disposition::NoShow => self.no_show,
            Disposition::Closed => self.closed,
        }
    }

    pub fn sum(&self) -> u64 {
        Disposition::ALL.iter().map(|d| self.get(*d)).sum()
    }

    fn slot(&mut self, disposition: Disposition) -> &mut u64 {
        match disposition {
            Disposition::Sat => &mut self.sat,
            Disposition::Rescheduled => &mut self.rescheduled,
            Disposition::NotInterested => &mut self.not_interested,
            Disposition::Disqualified => &mut self.disqualified,
            Disposition::FollowUp => &mut self.follow_up,
            Disposition::Pending => &mut self.pending,
            Disposition::NoShow => &mut self.no_show,
            Disposition::Closed => &mut self.closed,
        }
    }
}

/// KPI set shown on the dashboard cards. Rates are percentages with two
/// decimals; `close_rate` is closes over sits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub total_appointments: u64,
    pub total_sits: u64,
    pub total_closes: u64,
    pub no_shows: u64,
    pub rescheduled: u64,
    pub not_interested: u64,
    pub disqualified: u64,
    pub follow_up: u64,
    pub pending: u64,
    pub sit_rate: f64,
    pub close_rate: f64,
}

impl MetricsSummary {
    pub fn count(&self, disposition: Disposition) -> u64 {
        match disposition {
            Disposition::Sat => self.total_sits,
            Disposition::Rescheduled => self.rescheduled,
            Disposition::NotInterested => self.not_interested,
            Disposition::Disqualified => self.disqualified,
            Disposition::FollowUp => self.follow_up,
            Disposition::Pending => self.pending,
            Disposition::NoShow => self.no_shows,
            Disposition::Closed => self.total_closes,
        }
    }

    /// Sum of all per-disposition counts.
    pub fn disposition_total(&self) -> u64 {
        Disposition::ALL.iter().map(|d| self.count(*d)).sum()
    }

    /// Percentage of all appointments with this disposition, one decimal.
    pub fn share_of_total(&self, disposition: Disposition) -> f64 {
        if self.total_appointments == 0 {
            return 0.0;
        }
        let pct = 100.0 * self.count(disposition) as f64 / self.total_appointments as f64;
        (pct * 10.0 + 0.5).floor() / 10.0
    }
}

/// One day of the time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub total: u64,
    #[serde(flatten)]
    pub counts: DispositionCounts,
}

impl DailyBucket {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            total: 0,
            counts: DispositionCounts::default(),
        }
    }
}

/// Count and share for one category of a breakdown chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub category: String,
    pub count: u64,
    pub percentage: f64,
}

/// Attribute breakdowns of the filtered appointments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentBreakdown {
    pub credit_score: Vec<BreakdownEntry>,
    pub roof_type: Vec<BreakdownEntry>,
    pub existing_solar: Vec<BreakdownEntry>,
    pub shading: Vec<BreakdownEntry>,
    pub appointment_type: Vec<BreakdownEntry>,
}

/// Closer and setter names available for the filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    pub closers: Vec<String>,
    pub setters: Vec<String>,
}

/// Everything one successful pipeline execution produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResult {
    pub filter: CanonicalFilter,
    pub appointments: Vec<AppointmentRecord>,
    pub metrics: MetricsSummary,
    pub daily: Vec<DailyBucket>,
    pub breakdown: AppointmentBreakdown,
    pub unique_closers: Vec<String>,
    pub unique_setters: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_record_and_sum() {
        let mut counts = DispositionCounts::default();
        counts.record(Disposition::Sat);
        counts.record(Disposition::Sat);
        counts.record(Disposition::NoShow);
        assert_eq!(counts.get(Disposition::Sat), 2);
        assert_eq!(counts.get(Disposition::NoShow), 1);
        assert_eq!(counts.sum(), 3);
    }

    #[test]
    fn share_of_total_rounds_to_one_decimal() {
        let summary = MetricsSummary {
            total_appointments: 3,
            no_shows: 1,
            ..Default::default()
        };
        assert_eq!(summary.share_of_total(Disposition::NoShow), 33.3);
        assert_eq!(summary.share_of_total(Disposition::Closed), 0.0);
        assert_eq!(MetricsSummary::default().share_of_total(Disposition::Sat), 0.0);
    }

    #[test]
    fn summary_serializes_with_contract_names() {
        let json = serde_json::to_value(MetricsSummary::default()).unwrap();
        assert!(json.get("totalAppointments").is_some());
        assert!(json.get("sitRate").is_some());
        assert!(json.get("closeRate").is_some());
    }

    #[test]
    fn daily_bucket_flattens_counts() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        let json = serde_json::to_value(DailyBucket::empty(date)).unwrap();
        assert_eq!(json["date"], "2026-10-12");
        assert_eq!(json["noShow"], 0);
    }
}
