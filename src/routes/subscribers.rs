/**
 * Subscriber Routes
 * Registration, login, account detail and favorites for subscribers
 */
use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{
    self,
    models::{Subscriber, Subscription},
};
use crate::premium::sweep;
use crate::routes::auth::{
    create_access_token, hash_password, verify_password, AccountInfo, LoginRequest, LoginResponse,
    ROLE_SUBSCRIBER,
};
use crate::routes::{db_unavailable, msg_response};

const SUBSCRIBER_COLUMNS: &str = "id, first_name, last_name, email, password_hash, \
     compensation_balance, dob, phone_number, city, state, zipcode, favorites, created_at";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/subscribers (register)
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSubscriberRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone_number: String,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub dob: String,
}

/// Account detail plus its subscription record, as the frontend expects
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberDetail {
    #[serde(flatten)]
    pub subscriber: Subscriber,
    pub subscription: Option<Subscription>,
}

/// Request body for PUT /api/subscribers/:id/favorites
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFavoritesRequest {
    pub favorites_list: Vec<Uuid>,
}

// ============================================================================
// Validation
// ============================================================================

pub(crate) fn validate_registration(
    email: &str,
    password: &str,
    required: &[(&str, &str)],
) -> Result<(), String> {
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(format!("{} is required", field));
        }
    }
    if !email.contains('@') {
        return Err("Invalid email format".to_string());
    }
    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/subscribers - Register a new subscriber
pub async fn register(Json(payload): Json<RegisterSubscriberRequest>) -> impl IntoResponse {
    if let Err(msg) = validate_registration(
        &payload.email,
        &payload.password,
        &[
            ("First name", &payload.first_name),
            ("Last name", &payload.last_name),
            ("Email", &payload.email),
            ("Password", &payload.password),
        ],
    ) {
        return msg_response(StatusCode::BAD_REQUEST, msg).into_response();
    }

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    let password_hash = match hash_password(payload.password).await {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Failed to hash password: {}", e);
            return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process password")
                .into_response();
        }
    };

    match sqlx::query_as::<_, Subscriber>(&format!(
        "INSERT INTO subscribers \
             (first_name, last_name, email, password_hash, dob, phone_number, city, state, zipcode) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {}",
        SUBSCRIBER_COLUMNS
    ))
    .bind(payload.first_name.trim())
    .bind(payload.last_name.trim())
    .bind(payload.email.trim().to_lowercase())
    .bind(&password_hash)
    .bind(&payload.dob)
    .bind(&payload.phone_number)
    .bind(&payload.city)
    .bind(&payload.state)
    .bind(&payload.zipcode)
    .fetch_one(pool.as_ref())
    .await
    {
        Ok(subscriber) => {
            tracing::info!("Subscriber registered: {}", subscriber.email);
            (StatusCode::CREATED, Json(subscriber)).into_response()
        }
        Err(e) if e.to_string().contains("unique") => {
            msg_response(StatusCode::BAD_REQUEST, "Subscriber already exists").into_response()
        }
        Err(e) => {
            tracing::error!("Failed to create subscriber: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create account")
                .into_response()
        }
    }
}

/// POST /api/subscribers/login
pub async fn login(Json(payload): Json<LoginRequest>) -> impl IntoResponse {
    if payload.email.is_empty() || payload.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(LoginResponse::failure("Email and password are required")),
        )
            .into_response();
    }

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    let subscriber = match sqlx::query_as::<_, Subscriber>(&format!(
        "SELECT {} FROM subscribers WHERE LOWER(email) = LOWER($1)",
        SUBSCRIBER_COLUMNS
    ))
    .bind(&payload.email)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(s)) => s,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(LoginResponse::failure("Invalid Credentials")),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Database error during subscriber login: {}", e);
            return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
                .into_response();
        }
    };

    if !verify_password(payload.password, subscriber.password_hash.clone()).await {
        tracing::warn!("Failed login attempt for subscriber: {}", subscriber.email);
        return (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse::failure("Invalid Credentials")),
        )
            .into_response();
    }

    let token = match create_access_token(
        &subscriber.id.to_string(),
        &subscriber.email,
        ROLE_SUBSCRIBER,
    ) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to create access token: {}", e);
            return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create token")
                .into_response();
        }
    };

    let subscription = sweep::subscription_for(pool.as_ref(), subscriber.id)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Subscription lookup failed during login: {}", e);
            None
        });

    tracing::info!("Successful login for subscriber: {}", subscriber.email);

    (
        StatusCode::OK,
        Json(LoginResponse {
            success: true,
            token: Some(token),
            user: Some(AccountInfo {
                user_id: subscriber.id,
                first_name: subscriber.first_name,
                last_name: subscriber.last_name,
                email: subscriber.email,
                role: ROLE_SUBSCRIBER.to_string(),
            }),
            subscription,
            error: None,
        }),
    )
        .into_response()
}

/// GET /api/subscribers/:id
pub async fn get_subscriber(Path(id): Path<Uuid>) -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    let subscriber = match sqlx::query_as::<_, Subscriber>(&format!(
        "SELECT {} FROM subscribers WHERE id = $1",
        SUBSCRIBER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(s)) => s,
        Ok(None) => {
            return msg_response(StatusCode::NOT_FOUND, "Subscriber not found").into_response();
        }
        Err(e) => {
            tracing::error!("Database error fetching subscriber: {}", e);
            return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
                .into_response();
        }
    };

    let subscription = sweep::subscription_for(pool.as_ref(), subscriber.id)
        .await
        .unwrap_or(None);

    (
        StatusCode::OK,
        Json(SubscriberDetail {
            subscriber,
            subscription,
        }),
    )
        .into_response()
}

/// PUT /api/subscribers/:id/favorites - Replace the favorites set
pub async fn update_favorites(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFavoritesRequest>,
) -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    match sqlx::query_as::<_, Subscriber>(&format!(
        "UPDATE subscribers SET favorites = $1 WHERE id = $2 RETURNING {}",
        SUBSCRIBER_COLUMNS
    ))
    .bind(&payload.favorites_list)
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(subscriber)) => (StatusCode::OK, Json(subscriber)).into_response(),
        Ok(None) => msg_response(StatusCode::NOT_FOUND, "Subscriber not found").into_response(),
        Err(e) => {
            tracing::error!("Database error updating favorites: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update favorites")
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, post, put};
    use axum::Router;
    use tower::ServiceExt;

    fn test_router() -> Router {
        Router::new()
            .route("/api/subscribers", post(register))
            .route("/api/subscribers/login", post(login))
            .route("/api/subscribers/{id}", get(get_subscriber))
            .route("/api/subscribers/{id}/favorites", put(update_favorites))
    }

    async fn post_json(uri: &str, json: &impl serde::Serialize) -> StatusCode {
        let req = Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap();
        test_router().oneshot(req).await.unwrap().status()
    }

    fn sample_registration() -> RegisterSubscriberRequest {
        RegisterSubscriberRequest {
            first_name: "Home".to_string(),
            last_name: "Cook".to_string(),
            email: "cook@example.com".to_string(),
            password: "longenough".to_string(),
            phone_number: "555-0100".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zipcode: "62704".to_string(),
            dob: "01-01-1990".to_string(),
        }
    }

    #[test]
    fn test_validate_registration_rules() {
        assert!(validate_registration("a@b.c", "longenough", &[]).is_ok());
        assert!(validate_registration("no-at-sign", "longenough", &[]).is_err());
        assert!(validate_registration("a@b.c", "short", &[]).is_err());
        assert!(validate_registration("a@b.c", "longenough", &[("Email", "  ")]).is_err());
    }

    #[tokio::test]
    async fn test_register_short_password_returns_bad_request() {
        let mut payload = sample_registration();
        payload.password = "short".to_string();
        assert_eq!(
            post_json("/api/subscribers", &payload).await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_register_invalid_email_returns_bad_request() {
        let mut payload = sample_registration();
        payload.email = "not-an-email".to_string();
        assert_eq!(
            post_json("/api/subscribers", &payload).await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_login_empty_email_returns_bad_request() {
        let payload = LoginRequest {
            email: "".to_string(),
            password: "whatever".to_string(),
        };
        assert_eq!(
            post_json("/api/subscribers/login", &payload).await,
            StatusCode::BAD_REQUEST
        );
    }
}
