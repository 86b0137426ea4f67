//! Company directory for the super-admin company picker.

use sqlx::PgPool;

use crate::errors::DashboardError;
use crate::models::company::Company;

/// All companies ordered by display name.
pub async fn list(pool: &PgPool) -> Result<Vec<Company>, DashboardError> {
    let companies = sqlx::query_as::<_, Company>(
        "SELECT id, company_id, company_name, created_at, updated_at FROM companies ORDER BY company_name",
    )
    .fetch_all(pool)
    .await?;
    Ok(companies)
}

/// Look up a company by its business code.
pub async fn find_by_code(pool: &PgPool, company_id: &str) -> Result<Company, DashboardError> {
    sqlx::query_as::<_, Company>(
        "SELECT id, company_id, company_name, created_at, updated_at FROM companies WHERE company_id = $1",
    )
    .bind(company_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DashboardError::NotFound(format!("Company {company_id} not found")))
}
