//! Unified error taxonomy with a consistent presentation envelope.

use serde::{Serialize, Serializer};

/// Error detail handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub code: String,
    pub message: String,
}

/// Coarse error category used by the retry policy and by consumers that need
/// to react to a failure (e.g. sign out on `Authorization`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Configuration,
    Validation,
    TransientFetch,
    Authorization,
    NotFound,
    Internal,
}

/// Dashboard error type. Cheap to clone so it can live inside `QueryState`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Fetch failed: {0}")]
    TransientFetch(String),

    #[error("Unauthorized: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DashboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Validation(_) => ErrorKind::Validation,
            Self::TransientFetch(_) => ErrorKind::TransientFetch,
            Self::Authorization(_) => ErrorKind::Authorization,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Only network/server failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientFetch(_))
    }

    /// Check if this error represents an auth failure.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Authorization(_))
    }

    /// Check if this error represents a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Stable machine-readable code for the envelope.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::TransientFetch(_) => "FETCH_ERROR",
            Self::Authorization(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

impl Serialize for DashboardError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.report().serialize(serializer)
    }
}

impl From<sqlx::Error> for DashboardError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Self::NotFound("Row not found".to_string()),
            other => {
                tracing::error!(error = %other, "Database error");
                Self::TransientFetch(format!("database: {other}"))
            }
        }
    }
}

impl From<jsonwebtoken::errors::Error> for DashboardError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Authorization(format!("invalid token: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_errors_retry() {
        assert!(DashboardError::TransientFetch("timeout".into()).is_retryable());
        assert!(!DashboardError::Authorization("403".into()).is_retryable());
        assert!(!DashboardError::Configuration("role".into()).is_retryable());
        assert!(!DashboardError::Validation("date".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = DashboardError::Validation("start is not a date".to_string());
        assert_eq!(err.to_string(), "Validation error: start is not a date");
    }

    #[test]
    fn serializes_as_envelope() {
        let err = DashboardError::Authorization("token expired".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "UNAUTHORIZED");
        assert_eq!(json["message"], "Unauthorized: token expired");
    }

    #[test]
    fn from_sqlx_row_not_found() {
        let err: DashboardError = sqlx::Error::RowNotFound.into();
        assert!(err.is_not_found());
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn from_sqlx_pool_timeout_is_transient() {
        let err: DashboardError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.kind(), ErrorKind::TransientFetch);
        assert!(err.is_retryable());
    }
}
