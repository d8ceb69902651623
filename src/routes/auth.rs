/**
 * Authentication Helpers
 * JWT issuance/verification and bcrypt password handling shared by the
 * subscriber, recipe-writer and admin login endpoints
 */
use axum::http::HeaderMap;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::premium::gate::ViewerRole;

// ============================================================================
// Configuration
// ============================================================================

lazy_static::lazy_static! {
    /// JWT secret key from environment
    pub static ref JWT_SECRET: String = std::env::var("JWT_SECRET")
        .unwrap_or_else(|_| "default-jwt-secret-change-in-production".to_string());
}

/// Access token expiry in hours
const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 24;

pub const ROLE_SUBSCRIBER: &str = "ROLE_SUBSCRIBER";
pub const ROLE_RECIPE_WRITER: &str = "ROLE_RECIPE_WRITER";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";

// ============================================================================
// Types
// ============================================================================

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,   // User ID
    pub email: String, // User email
    pub role: String,  // User role
    pub exp: i64,      // Expiry timestamp
    pub iat: i64,      // Issued at timestamp
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        self.sub.parse().ok()
    }

    pub fn viewer_role(&self) -> ViewerRole {
        match self.role.as_str() {
            ROLE_ADMIN => ViewerRole::Admin,
            ROLE_RECIPE_WRITER => ViewerRole::RecipeWriter,
            ROLE_SUBSCRIBER => ViewerRole::Subscriber,
            _ => ViewerRole::Anonymous,
        }
    }
}

/// Request body shared by the three login endpoints
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Account info returned to the frontend after login
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
}

/// Response body shared by the three login endpoints
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AccountInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<crate::db::models::Subscription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LoginResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        LoginResponse {
            success: false,
            token: None,
            user: None,
            subscription: None,
            error: Some(error.into()),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Create access token
pub fn create_access_token(
    user_id: &str,
    email: &str,
    role: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let exp = now + Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS);

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        role: role.to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
}

/// Verify and decode access token
pub fn verify_access_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|s| s.to_string())
}

/// Claims of the requester, when a valid bearer token is present.
/// Anonymous requests are legal on gated reads, so absence is not an error.
pub fn requester_claims(headers: &HeaderMap) -> Option<Claims> {
    extract_bearer_token(headers).and_then(|token| verify_access_token(&token).ok())
}

/// Hash a password - bcrypt is intentionally CPU-intensive; run it outside
/// the async executor so it doesn't block other in-flight tasks.
pub async fn hash_password(password: String) -> Result<String, bcrypt::BcryptError> {
    match tokio::task::spawn_blocking(move || hash(&password, DEFAULT_COST)).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!("spawn_blocking panic during hash: {}", e);
            Err(bcrypt::BcryptError::Io(std::io::Error::other(
                "hash task failed",
            )))
        }
    }
}

/// Verify a password against a bcrypt hash, off the async executor.
pub async fn verify_password(password: String, password_hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify(&password, &password_hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_access_token_invalid_returns_err() {
        let result = verify_access_token("invalid.jwt.token");
        assert!(result.is_err());
    }

    #[test]
    fn test_token_round_trip_preserves_claims() {
        let id = Uuid::new_v4();
        let token = create_access_token(&id.to_string(), "cook@example.com", ROLE_SUBSCRIBER)
            .expect("token creation");
        let claims = verify_access_token(&token).expect("token verification");
        assert_eq!(claims.user_id(), Some(id));
        assert_eq!(claims.email, "cook@example.com");
        assert_eq!(claims.viewer_role(), ViewerRole::Subscriber);
    }

    #[test]
    fn test_viewer_role_mapping() {
        let mut claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "a@b.c".to_string(),
            role: ROLE_ADMIN.to_string(),
            exp: 0,
            iat: 0,
        };
        assert_eq!(claims.viewer_role(), ViewerRole::Admin);
        claims.role = ROLE_RECIPE_WRITER.to_string();
        assert_eq!(claims.viewer_role(), ViewerRole::RecipeWriter);
        claims.role = "ROLE_UNKNOWN".to_string();
        assert_eq!(claims.viewer_role(), ViewerRole::Anonymous);
    }

    #[test]
    fn test_requester_claims_absent_without_header() {
        let headers = HeaderMap::new();
        assert!(requester_claims(&headers).is_none());
    }

    #[tokio::test]
    async fn test_password_hash_and_verify() {
        let hash = hash_password("hunter2hunter2".to_string()).await.unwrap();
        assert!(verify_password("hunter2hunter2".to_string(), hash.clone()).await);
        assert!(!verify_password("wrong".to_string(), hash).await);
    }
}
