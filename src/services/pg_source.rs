//! PostgreSQL-backed appointment source.

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, NaiveTime};
use sqlx::PgPool;

use crate::errors::DashboardError;
use crate::models::appointment::AppointmentRecord;
use crate::models::filter::{CanonicalFilter, CompanyScope, NameSet};
use crate::models::metrics::{DispositionCounts, MetricsSummary, Roster};
use crate::services::metrics::summarize;
use crate::services::roster::tidy;
use crate::services::source::AppointmentSource;

/// Reads the `appointments` table. Filtering happens in SQL so only the
/// matching rows cross the wire.
#[derive(Debug, Clone)]
pub struct PgAppointmentSource {
    pool: PgPool,
}

impl PgAppointmentSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// SQL parameters shared by the record and metrics queries.
struct FilterParams {
    from: NaiveDateTime,
    until: NaiveDateTime,
    closers: Option<Vec<String>>,
    setters: Option<Vec<String>>,
    company_id: Option<String>,
}

impl FilterParams {
    /// `[from, until)` covers every instant of the inclusive day range.
    fn from_filter(filter: &CanonicalFilter) -> Self {
        let list = |names: &NameSet| {
            (!names.is_empty()).then(|| names.as_slice().to_vec())
        };
        Self {
            from: filter.date_range.start.and_time(NaiveTime::MIN),
            until: (filter.date_range.end + Duration::days(1)).and_time(NaiveTime::MIN),
            closers: list(&filter.closers),
            setters: list(&filter.setters),
            company_id: filter.company.company_id().map(str::to_string),
        }
    }
}

const FILTER_CLAUSE: &str = r#"
    booked_for >= $1 AND booked_for < $2
    AND ($3::text[] IS NULL OR closer_name = ANY($3))
    AND ($4::text[] IS NULL OR setter_name = ANY($4))
    AND ($5::text IS NULL OR company_id = $5)
"#;

/// Intermediate row for disposition conditional aggregation.
#[derive(sqlx::FromRow)]
struct MetricsRow {
    total: i64,
    sat: i64,
    rescheduled: i64,
    not_interested: i64,
    disqualified: i64,
    follow_up: i64,
    pending: i64,
    no_show: i64,
    closed: i64,
}

#[async_trait]
impl AppointmentSource for PgAppointmentSource {
    async fn fetch_appointments(
        &self,
        filter: &CanonicalFilter,
    ) -> Result<Vec<AppointmentRecord>, DashboardError> {
        let params = FilterParams::from_filter(filter);
        let sql = format!(
            r#"
            SELECT id, company_id, name, closer_name, setter_name, booked_for,
                   confirmation_disposition, phone_number, email, address, note,
                   credit_score, m1_commission, m2_commission, roof_type,
                   existing_solar, shading, appointment_type, confirmed, created_at
            FROM appointments
            WHERE {FILTER_CLAUSE}
            ORDER BY booked_for DESC
            "#
        );
        let rows = sqlx::query_as::<_, AppointmentRecord>(&sql)
            .bind(params.from)
            .bind(params.until)
            .bind(params.closers)
            .bind(params.setters)
            .bind(params.company_id)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = rows.len(), "Fetched appointments");
        Ok(rows)
    }

    async fn fetch_metrics(
        &self,
        filter: &CanonicalFilter,
    ) -> Result<Option<MetricsSummary>, DashboardError> {
        let params = FilterParams::from_filter(filter);
        let sql = format!(
            r#"
            SELECT
                COUNT(*) AS total,
                COALESCE(SUM(CASE WHEN confirmation_disposition = 'Sat'            THEN 1 ELSE 0 END), 0) AS sat,
                COALESCE(SUM(CASE WHEN confirmation_disposition = 'Rescheduled'    THEN 1 ELSE 0 END), 0) AS rescheduled,
                COALESCE(SUM(CASE WHEN confirmation_disposition = 'Not Interested' THEN 1 ELSE 0 END), 0) AS not_interested,
                COALESCE(SUM(CASE WHEN confirmation_disposition = 'Disqualified'   THEN 1 ELSE 0 END), 0) AS disqualified,
                COALESCE(SUM(CASE WHEN confirmation_disposition = 'Follow-up'      THEN 1 ELSE 0 END), 0) AS follow_up,
                COALESCE(SUM(CASE WHEN confirmation_disposition = 'Pending'        THEN 1 ELSE 0 END), 0) AS pending,
                COALESCE(SUM(CASE WHEN confirmation_disposition = 'No Show'        THEN 1 ELSE 0 END), 0) AS no_show,
                COALESCE(SUM(CASE WHEN confirmation_disposition = 'Closed'         THEN 1 ELSE 0 END), 0) AS closed
            FROM appointments
            WHERE {FILTER_CLAUSE}
            "#
        );
        let row = sqlx::query_as::<_, MetricsRow>(&sql)
            .bind(params.from)
            .bind(params.until)
            .bind(params.closers)
            .bind(params.setters)
            .bind(params.company_id)
            .fetch_one(&self.pool)
            .await?;

        let counts = DispositionCounts {
            sat: row.sat as u64,
            rescheduled: row.rescheduled as u64,
            not_interested: row.not_interested as u64,
            disqualified: row.disqualified as u64,
            follow_up: row.follow_up as u64,
            pending: row.pending as u64,
            no_show: row.no_show as u64,
            closed: row.closed as u64,
        };
        Ok(Some(summarize(&counts, row.total as u64)))
    }

    async fn fetch_roster(&self, scope: &CompanyScope) -> Result<Roster, DashboardError> {
        let company_id = scope.company_id();
        let (closers, setters) = tokio::try_join!(
            sqlx::query_scalar::<_, String>(
                r#"
                SELECT DISTINCT closer_name FROM appointments
                WHERE ($1::text IS NULL OR company_id = $1)
                ORDER BY closer_name
                "#,
            )
            .bind(company_id)
            .fetch_all(&self.pool),
            sqlx::query_scalar::<_, String>(
                r#"
                SELECT DISTINCT setter_name FROM appointments
                WHERE setter_name IS NOT NULL AND setter_name <> ''
                  AND ($1::text IS NULL OR company_id = $1)
                ORDER BY setter_name
                "#,
            )
            .bind(company_id)
            .fetch_all(&self.pool),
        )?;

        // Database collation may differ from byte order; normalize here.
        Ok(tidy(Roster { closers, setters }))
    }
}
