//! Data-source seam for the dashboard pipeline.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::DashboardError;
use crate::models::appointment::AppointmentRecord;
use crate::models::filter::{CanonicalFilter, CompanyScope};
use crate::models::metrics::{MetricsSummary, Roster};
use crate::services::record_filter;
use crate::services::roster::build_roster;

/// Where appointment records come from.
///
/// Implementations may over-fetch; the pipeline re-applies the filter to
/// whatever comes back.
#[async_trait]
pub trait AppointmentSource: Send + Sync {
    /// Records matching the filter, newest first.
    async fn fetch_appointments(
        &self,
        filter: &CanonicalFilter,
    ) -> Result<Vec<AppointmentRecord>, DashboardError>;

    /// Server-side aggregate for the filter, when the source can compute one.
    async fn fetch_metrics(
        &self,
        _filter: &CanonicalFilter,
    ) -> Result<Option<MetricsSummary>, DashboardError> {
        Ok(None)
    }

    /// Every closer and setter visible in the scope, regardless of dates.
    async fn fetch_roster(&self, scope: &CompanyScope) -> Result<Roster, DashboardError>;
}

/// In-process source over a fixed record set.
#[derive(Debug, Clone, Default)]
pub struct MemoryAppointmentSource {
    records: Arc<Vec<AppointmentRecord>>,
}

impl MemoryAppointmentSource {
    pub fn new(records: Vec<AppointmentRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl AppointmentSource for MemoryAppointmentSource {
    async fn fetch_appointments(
        &self,
        filter: &CanonicalFilter,
    ) -> Result<Vec<AppointmentRecord>, DashboardError> {
        let mut rows: Vec<AppointmentRecord> = record_filter::filter_records(&self.records, filter)
            .into_iter()
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.booked_for.cmp(&a.booked_for));
        Ok(rows)
    }

    async fn fetch_roster(&self, scope: &CompanyScope) -> Result<Roster, DashboardError> {
        Ok(build_roster(
            self.records.iter().filter(|r| scope.admits(&r.company_id)),
        ))
    }
}
