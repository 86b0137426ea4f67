//! Role-based company scoping.
//!
//! Standard users only ever see their own company, whatever the request
//! says. Super admins pick a company or see all of them.

use crate::errors::DashboardError;
use crate::models::filter::CompanyScope;
use crate::models::user::{Identity, UserRole};

/// Effective company scope for a caller.
pub fn resolve(
    role: &str,
    caller_company: Option<&str>,
    requested_company: Option<&str>,
) -> Result<CompanyScope, DashboardError> {
    let role = UserRole::parse(role)?;
    if role.is_privileged() {
        return Ok(match non_blank(requested_company) {
            Some(company) => CompanyScope::Company(company.to_string()),
            None => CompanyScope::Unrestricted,
        });
    }

    match non_blank(caller_company) {
        Some(company) => Ok(CompanyScope::Company(company.to_string())),
        None => Err(DashboardError::Configuration(
            "Standard user has no company affiliation".to_string(),
        )),
    }
}

/// Same as [`resolve`], reading role and company from an identity.
pub fn resolve_for(
    identity: &Identity,
    requested_company: Option<&str>,
) -> Result<CompanyScope, DashboardError> {
    resolve(
        &identity.role,
        identity.company_id.as_deref(),
        requested_company,
    )
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
