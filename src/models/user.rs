//! User profile model with role-based access control.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::DashboardError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    User,
}

impl UserRole {
    /// Parse the role string carried by a profile or token.
    pub fn parse(raw: &str) -> Result<Self, DashboardError> {
        match raw {
            "super_admin" => Ok(Self::SuperAdmin),
            "user" => Ok(Self::User),
            other => Err(DashboardError::Configuration(format!(
                "Unrecognized role: {other}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::User => "user",
        }
    }

    /// Privileged roles may look across companies.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

/// Profile row from the database. `role` stays raw text so an unexpected
/// value surfaces as a configuration error instead of a decode failure.
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub company_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who is asking: what the session provider knows about the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: String,
    pub company_id: Option<String>,
}

impl Identity {
    pub fn new(user_id: Uuid, role: UserRole, company_id: Option<&str>) -> Self {
        Self {
            user_id,
            role: role.as_str().to_string(),
            company_id: company_id.map(str::to_string),
        }
    }
}

impl From<Profile> for Identity {
    fn from(p: Profile) -> Self {
        Self {
            user_id: p.id,
            role: p.role,
            company_id: p.company_id,
        }
    }
}
