//! Session tokens and caller identity.
//!
//! A token only proves who the caller is. Role and company always come from
//! the caller's profile row, so a stale token cannot widen access.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::DashboardError;
use crate::models::user::{Identity, Profile};

/// JWT claims embedded in session tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub user_id: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

/// Sign an access token for a profile.
pub fn generate_token(
    profile: &Profile,
    jwt_secret: &str,
    expiry_secs: i64,
) -> Result<String, DashboardError> {
    let now = Utc::now();
    let claims = Claims {
        sub: profile.email.clone(),
        user_id: profile.id.to_string(),
        role: profile.role.clone(),
        company_id: profile.company_id.clone(),
        token_type: "access".to_string(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };
    let key = EncodingKey::from_secret(jwt_secret.as_bytes());
    jsonwebtoken::encode(&Header::default(), &claims, &key)
        .map_err(|e| DashboardError::Internal(format!("Token generation failed: {e}")))
}

/// Validate a JWT and return the claims.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims, DashboardError> {
    let key = DecodingKey::from_secret(jwt_secret.as_bytes());
    let claims = jsonwebtoken::decode::<Claims>(token, &key, &Validation::default())?.claims;
    if claims.token_type != "access" {
        return Err(DashboardError::Authorization(
            "not an access token".to_string(),
        ));
    }
    Ok(claims)
}

/// Identity as asserted by the token alone.
pub fn identity_from_claims(claims: &Claims) -> Result<Identity, DashboardError> {
    let user_id = Uuid::parse_str(&claims.user_id)
        .map_err(|_| DashboardError::Authorization("malformed user id in token".to_string()))?;
    Ok(Identity {
        user_id,
        role: claims.role.clone(),
        company_id: claims.company_id.clone(),
    })
}

/// Load the caller's profile. A missing profile means the session is no
/// longer valid.
pub async fn load_identity(pool: &PgPool, user_id: Uuid) -> Result<Identity, DashboardError> {
    let profile = sqlx::query_as::<_, Profile>(
        "SELECT id, email, role, company_id, created_at, updated_at FROM profiles WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DashboardError::Authorization("profile not found".to_string()))?;

    Ok(profile.into())
}

/// Validate the token, then resolve the authoritative identity.
pub async fn authenticate(
    pool: &PgPool,
    token: &str,
    jwt_secret: &str,
) -> Result<Identity, DashboardError> {
    let claims = validate_token(token, jwt_secret)?;
    let asserted = identity_from_claims(&claims)?;
    let identity = load_identity(pool, asserted.user_id).await?;
    if identity.role != asserted.role || identity.company_id != asserted.company_id {
        tracing::info!(user_id = %identity.user_id, "Token claims differ from profile, using profile");
    }
    Ok(identity)
}
