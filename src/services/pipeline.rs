//! One execution of the dashboard query: scope, normalize, fetch, derive.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::DashboardError;
use crate::models::filter::{CanonicalFilter, FilterRequest};
use crate::models::metrics::DashboardResult;
use crate::models::user::Identity;
use crate::services::breakdown::breakdown;
use crate::services::clock::{Clock, SystemClock};
use crate::services::fingerprint::short_key;
use crate::services::metrics::aggregate;
use crate::services::normalize::normalize;
use crate::services::record_filter::retain_matching;
use crate::services::roster::tidy;
use crate::services::scope;
use crate::services::source::AppointmentSource;
use crate::services::timeseries::bucketize;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct DashboardPipeline {
    source: Arc<dyn AppointmentSource>,
    clock: Arc<dyn Clock>,
    fetch_timeout: Duration,
}

impl DashboardPipeline {
    pub fn new(source: Arc<dyn AppointmentSource>) -> Self {
        Self {
            source,
            clock: Arc::new(SystemClock),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Resolve the caller's scope and canonicalize the request. Pure apart
    /// from reading the clock.
    pub fn plan(
        &self,
        identity: &Identity,
        request: &FilterRequest,
    ) -> Result<CanonicalFilter, DashboardError> {
        let scope = scope::resolve_for(identity, request.selected_company.as_deref())?;
        normalize(request, scope, self.clock.as_ref())
    }

    /// Fetch and derive everything for an already canonical filter.
    ///
    /// The record, metrics and roster reads run concurrently and must all
    /// succeed.
    pub async fn execute(&self, filter: &CanonicalFilter) -> Result<DashboardResult, DashboardError> {
        let key = short_key(filter);
        tracing::debug!(filter_key = %key, "Executing dashboard query");

        let (records, server_metrics, roster) = tokio::try_join!(
            self.bounded("appointments", self.source.fetch_appointments(filter)),
            self.bounded("metrics", self.source.fetch_metrics(filter)),
            self.bounded("roster", self.source.fetch_roster(&filter.company)),
        )?;

        let records = retain_matching(records, filter);
        let metrics = match server_metrics {
            Some(m) => {
                if m.total_appointments != records.len() as u64 {
                    tracing::warn!(
                        filter_key = %key,
                        server_total = m.total_appointments,
                        records = records.len(),
                        "Server metrics disagree with fetched records"
                    );
                }
                m
            }
            None => aggregate(&records),
        };
        let daily = bucketize(&records, &filter.date_range);
        let breakdown = breakdown(&records);
        let roster = tidy(roster);

        tracing::info!(
            filter_key = %key,
            total = metrics.total_appointments,
            days = daily.len(),
            "Dashboard query complete"
        );

        Ok(DashboardResult {
            filter: filter.clone(),
            appointments: records,
            metrics,
            daily,
            breakdown,
            unique_closers: roster.closers,
            unique_setters: roster.setters,
        })
    }

    /// `plan` followed by `execute`.
    pub async fn run(
        &self,
        identity: &Identity,
        request: &FilterRequest,
    ) -> Result<DashboardResult, DashboardError> {
        let filter = self.plan(identity, request)?;
        self.execute(&filter).await
    }

    async fn bounded<T, F>(&self, what: &'static str, fut: F) -> Result<T, DashboardError>
    where
        F: Future<Output = Result<T, DashboardError>>,
    {
        tokio::time::timeout(self.fetch_timeout, fut)
            .await
            .map_err(|_| DashboardError::TransientFetch(format!("{what} request timed out")))?
    }
}
