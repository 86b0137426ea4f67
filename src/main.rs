//! One-shot dashboard report.
//!
//! Authenticates `DASHBOARD_TOKEN`, runs the dashboard query through the
//! controller for the filter described by `REPORT_*` variables and prints the
//! settled state as JSON.

use std::env;
use std::sync::Arc;

use anyhow::Context;
use appointment_insights::config::AppConfig;
use appointment_insights::models::appointment::AppointmentRecord;
use appointment_insights::models::company::Company;
use appointment_insights::models::filter::FilterRequest;
use appointment_insights::models::pagination::{PagedResult, Pagination};
use appointment_insights::models::user::UserRole;
use appointment_insights::services::controller::{QueryController, QueryState};
use appointment_insights::services::pg_source::PgAppointmentSource;
use appointment_insights::services::pipeline::DashboardPipeline;
use appointment_insights::services::table::{sort_appointments, SortDirection, SortField};
use appointment_insights::services::{auth, companies};
use mimalloc::MiMalloc;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Serialize)]
struct Report {
    state: QueryState,
    table: Option<PagedResult<AppointmentRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    companies: Option<Vec<Company>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "appointment_insights=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let token = env::var("DASHBOARD_TOKEN").context("DASHBOARD_TOKEN must be set")?;

    let pool = appointment_insights::db::create_pool(
        &config.database_url,
        config.database_max_connections,
    )
    .await?;

    let identity = auth::authenticate(&pool, &token, &config.jwt_secret).await?;
    tracing::info!(user_id = %identity.user_id, role = %identity.role, "Caller authenticated");

    let companies = match UserRole::parse(&identity.role) {
        Ok(role) if role.is_privileged() => Some(companies::list(&pool).await?),
        _ => None,
    };

    let controller_config = config.controller();
    let pipeline = DashboardPipeline::new(Arc::new(PgAppointmentSource::new(pool)))
        .with_fetch_timeout(controller_config.fetch_timeout);
    let controller = QueryController::spawn(pipeline, controller_config);
    // Filters first so the identity dispatch runs the requested range once.
    controller.set_filters(request_from_env());
    controller.set_identity(Some(identity));

    let state = controller.settled().await;

    let table = state.data.as_ref().map(|data| {
        let mut rows = data.appointments.clone();
        let field = env::var("REPORT_SORT")
            .ok()
            .and_then(|f| SortField::parse(&f))
            .unwrap_or_default();
        let direction = match env::var("REPORT_ORDER").as_deref() {
            Ok("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        };
        sort_appointments(&mut rows, field, direction);
        let pagination = Pagination {
            page: env::var("REPORT_PAGE").ok().and_then(|v| v.parse().ok()),
            per_page: env::var("REPORT_PER_PAGE").ok().and_then(|v| v.parse().ok()),
        };
        PagedResult::from_slice(&rows, &pagination)
    });

    let report = Report {
        state,
        table,
        companies,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(err) = &report.state.error {
        anyhow::bail!("{err}");
    }
    Ok(())
}

fn request_from_env() -> FilterRequest {
    let mut request = FilterRequest::default();
    let start = env::var("REPORT_START").ok();
    let end = env::var("REPORT_END").ok();
    if start.is_some() || end.is_some() {
        request.date_range = Some(appointment_insights::models::filter::RequestedRange { start, end });
    }
    if let Some(closers) = list_var("REPORT_CLOSERS") {
        request = request.with_closers(closers);
    }
    if let Some(setters) = list_var("REPORT_SETTERS") {
        request = request.with_setters(setters);
    }
    if let Ok(company) = env::var("REPORT_COMPANY") {
        request = request.with_company(company);
    }
    request
}

/// Comma-separated list variable.
fn list_var(key: &str) -> Option<Vec<String>> {
    env::var(key)
        .ok()
        .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
}
