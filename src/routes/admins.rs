/**
 * Admin Routes
 * First-admin bootstrap, login, and account detail (the platform ledger)
 */
use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{self, models::Admin};
use crate::routes::auth::{
    create_access_token, hash_password, verify_password, AccountInfo, LoginRequest, LoginResponse,
    ROLE_ADMIN,
};
use crate::routes::subscribers::validate_registration;
use crate::routes::{db_unavailable, msg_response};

const ADMIN_COLUMNS: &str =
    "id, first_name, last_name, email, password_hash, amount, created_at";

/// Request body for POST /api/admins/register
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAdminRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// POST /api/admins/register - Bootstrap the platform admin.
/// Only works while no admin exists; afterwards registration is closed.
pub async fn register(Json(payload): Json<RegisterAdminRequest>) -> impl IntoResponse {
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

    let existing_count: (i64,) = match sqlx::query_as("SELECT COUNT(*) FROM admins")
        .fetch_one(pool.as_ref())
        .await
    {
        Ok(count) => count,
        Err(e) => {
            tracing::error!("Failed to check existing admins: {}", e);
            return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
                .into_response();
        }
    };

    if existing_count.0 > 0 {
        return msg_response(
            StatusCode::FORBIDDEN,
            "Registration is closed. An admin account already exists.",
        )
        .into_response();
    }

    let password_hash = match hash_password(payload.password).await {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Failed to hash password: {}", e);
            return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to process password")
                .into_response();
        }
    };

    match sqlx::query_as::<_, Admin>(&format!(
        "INSERT INTO admins (first_name, last_name, email, password_hash) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {}",
        ADMIN_COLUMNS
    ))
    .bind(payload.first_name.trim())
    .bind(payload.last_name.trim())
    .bind(payload.email.trim().to_lowercase())
    .bind(&password_hash)
    .fetch_one(pool.as_ref())
    .await
    {
        Ok(admin) => {
            tracing::info!("Admin registered: {}", admin.email);
            (StatusCode::CREATED, Json(admin)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to create admin: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create account")
                .into_response()
        }
    }
}

/// POST /api/admins/login
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

    let admin = match sqlx::query_as::<_, Admin>(&format!(
        "SELECT {} FROM admins WHERE LOWER(email) = LOWER($1)",
        ADMIN_COLUMNS
    ))
    .bind(&payload.email)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(a)) => a,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(LoginResponse::failure("Invalid Credentials")),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Database error during admin login: {}", e);
            return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
                .into_response();
        }
    };

    if !verify_password(payload.password, admin.password_hash.clone()).await {
        tracing::warn!("Failed login attempt for admin: {}", admin.email);
        return (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse::failure("Invalid Credentials")),
        )
            .into_response();
    }

    let token = match create_access_token(&admin.id.to_string(), &admin.email, ROLE_ADMIN) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to create access token: {}", e);
            return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create token")
                .into_response();
        }
    };

    tracing::info!("Successful login for admin: {}", admin.email);

    (
        StatusCode::OK,
        Json(LoginResponse {
            success: true,
            token: Some(token),
            user: Some(AccountInfo {
                user_id: admin.id,
                first_name: admin.first_name,
                last_name: admin.last_name,
                email: admin.email,
                role: ROLE_ADMIN.to_string(),
            }),
            subscription: None,
            error: None,
        }),
    )
        .into_response()
}

/// GET /api/admins/:id - Platform ledger detail (revenue balance)
pub async fn get_admin(Path(id): Path<Uuid>) -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    match sqlx::query_as::<_, Admin>(&format!("SELECT {} FROM admins WHERE id = $1", ADMIN_COLUMNS))
        .bind(id)
        .fetch_optional(pool.as_ref())
        .await
    {
        Ok(Some(admin)) => (StatusCode::OK, Json(admin)).into_response(),
        Ok(None) => msg_response(StatusCode::NOT_FOUND, "Admin not found").into_response(),
        Err(e) => {
            tracing::error!("Database error fetching admin: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response()
        }
    }
}
