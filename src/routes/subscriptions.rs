/**
 * Subscription Routes
 * Status reads behind the expiry sweep, gating status checks, and the
 * purchase/renewal endpoint
 */
use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{
    self,
    models::{Subscription, SubscriptionStatus},
};
use crate::premium::sweep;
use crate::routes::payments::mask_card_number;
use crate::routes::{db_unavailable, msg_response};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/subscriptions (purchase or renewal)
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub user_id: Uuid,
    pub card_number: String,
    pub card_name: String,
    pub expiry_date: String,
    pub security_code: String,
    pub amount: f64,
}

// ============================================================================
// Validation
// ============================================================================

lazy_static::lazy_static! {
    /// 13-19 digits, spaces/dashes tolerated before stripping
    static ref CARD_NUMBER_REGEX: Regex = Regex::new(r"^\d{13,19}$").unwrap();
    /// MM/YY or MM/YYYY
    static ref EXPIRY_REGEX: Regex = Regex::new(r"^(0[1-9]|1[0-2])/(\d{2}|\d{4})$").unwrap();
}

fn validate_purchase(payload: &PurchaseRequest) -> Result<String, String> {
    let digits: String = payload
        .card_number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if !CARD_NUMBER_REGEX.is_match(&digits) {
        return Err("Card number must be 13-19 digits".to_string());
    }
    if payload.card_name.trim().is_empty() {
        return Err("Card name is required".to_string());
    }
    if !EXPIRY_REGEX.is_match(payload.expiry_date.trim()) {
        return Err("Expiry date must be MM/YY or MM/YYYY".to_string());
    }
    if payload.security_code.trim().len() < 3 {
        return Err("Security code is required".to_string());
    }
    if !payload.amount.is_finite() || payload.amount <= 0.0 {
        return Err("Amount must be positive".to_string());
    }
    Ok(digits)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/subscriptions - All subscriptions (sweep runs first via
/// middleware, so no row here claims Active past its end date)
pub async fn list_subscriptions() -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    match sqlx::query_as::<_, Subscription>(
        "SELECT id, user_id, start_date, end_date, status FROM subscriptions",
    )
    .fetch_all(pool.as_ref())
    .await
    {
        Ok(subscriptions) => (StatusCode::OK, Json(subscriptions)).into_response(),
        Err(e) => {
            tracing::error!("Database error listing subscriptions: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response()
        }
    }
}

/// GET /api/subscriptions/:id
pub async fn get_subscription(Path(id): Path<Uuid>) -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    match sqlx::query_as::<_, Subscription>(
        "SELECT id, user_id, start_date, end_date, status FROM subscriptions WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(subscription)) => (StatusCode::OK, Json(subscription)).into_response(),
        Ok(None) => msg_response(StatusCode::NOT_FOUND, "Subscription not found").into_response(),
        Err(e) => {
            tracing::error!("Database error fetching subscription: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response()
        }
    }
}

/// GET /api/subscriptions/check-subscription/:user_id - Gating status
/// check; responds with the Active subscription or an empty object
pub async fn check_subscription(Path(user_id): Path<Uuid>) -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    match sweep::is_active_for(pool.as_ref(), user_id).await {
        Ok(Some(subscription)) => (StatusCode::OK, Json(subscription)).into_response(),
        Ok(None) => (StatusCode::OK, Json(serde_json::json!({}))).into_response(),
        Err(e) => {
            tracing::error!("Database error checking subscription: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response()
        }
    }
}

/// POST /api/subscriptions - Purchase or renew, and log the payment, as
/// one transaction
pub async fn purchase(Json(payload): Json<PurchaseRequest>) -> impl IntoResponse {
    let card_digits = match validate_purchase(&payload) {
        Ok(digits) => digits,
        Err(msg) => return msg_response(StatusCode::BAD_REQUEST, msg).into_response(),
    };

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(e) => {
            tracing::error!("Failed to open purchase transaction: {}", e);
            return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
                .into_response();
        }
    };

    // Serialize concurrent renewals for the same user on the row lock.
    let existing = match sqlx::query_as::<_, Subscription>(
        "SELECT id, user_id, start_date, end_date, status \
         FROM subscriptions WHERE user_id = $1 FOR UPDATE",
    )
    .bind(payload.user_id)
    .fetch_optional(&mut *tx)
    .await
    {
        Ok(row) => row,
        Err(e) => {
            tracing::error!("Database error loading subscription: {}", e);
            return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
                .into_response();
        }
    };

    let today = sweep::today();
    let subscription_result = match existing {
        Some(sub) if sub.status == SubscriptionStatus::Active => {
            // Renewal while Active compounds from the stored end date.
            let new_end = sweep::renewal_end_date(sub.end_date);
            sqlx::query_as::<_, Subscription>(
                "UPDATE subscriptions SET end_date = $1 WHERE id = $2 \
                 RETURNING id, user_id, start_date, end_date, status",
            )
            .bind(new_end)
            .bind(sub.id)
            .fetch_one(&mut *tx)
            .await
        }
        Some(sub) => {
            // Lapsed record is reused as a fresh purchase.
            sqlx::query_as::<_, Subscription>(
                "UPDATE subscriptions \
                 SET start_date = $1, end_date = $2, status = 'Active' WHERE id = $3 \
                 RETURNING id, user_id, start_date, end_date, status",
            )
            .bind(today)
            .bind(sweep::one_year_from(today))
            .bind(sub.id)
            .fetch_one(&mut *tx)
            .await
        }
        None => {
            sqlx::query_as::<_, Subscription>(
                "INSERT INTO subscriptions (user_id, start_date, end_date, status) \
                 VALUES ($1, $2, $3, 'Active') \
                 RETURNING id, user_id, start_date, end_date, status",
            )
            .bind(payload.user_id)
            .bind(today)
            .bind(sweep::one_year_from(today))
            .fetch_one(&mut *tx)
            .await
        }
    };

    let subscription = match subscription_result {
        Ok(sub) => sub,
        Err(e) => {
            tracing::error!("Database error saving subscription: {}", e);
            return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
                .into_response();
        }
    };

    // No card processor is wired up; the payment is logged as successful
    // unconditionally. The raw PAN and security code are never stored.
    if let Err(e) = sqlx::query(
        "INSERT INTO payments \
             (subscriber_id, amount, card_number, card_name, expiry_date, payment_status) \
         VALUES ($1, $2, $3, $4, $5, 'Success')",
    )
    .bind(payload.user_id)
    .bind(payload.amount)
    .bind(mask_card_number(&card_digits))
    .bind(payload.card_name.trim())
    .bind(payload.expiry_date.trim())
    .execute(&mut *tx)
    .await
    {
        tracing::error!("Database error recording payment: {}", e);
        return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response();
    }

    if let Err(e) = tx.commit().await {
        tracing::error!("Failed to commit purchase transaction: {}", e);
        return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response();
    }

    tracing::info!(
        user_id = %payload.user_id,
        end_date = %subscription.end_date,
        "subscription purchased or renewed"
    );

    (StatusCode::OK, Json(subscription)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    fn test_router() -> Router {
        Router::new()
            .route(
                "/api/subscriptions",
                get(list_subscriptions).post(purchase),
            )
            .route(
                "/api/subscriptions/check-subscription/{user_id}",
                get(check_subscription),
            )
            .route("/api/subscriptions/{id}", get(get_subscription))
    }

    fn valid_purchase() -> PurchaseRequest {
        PurchaseRequest {
            user_id: Uuid::new_v4(),
            card_number: "4111 1111 1111 1111".to_string(),
            card_name: "Home Cook".to_string(),
            expiry_date: "09/27".to_string(),
            security_code: "123".to_string(),
            amount: 100.0,
        }
    }

    async fn post_purchase(body: &PurchaseRequest) -> StatusCode {
        let req = Request::post("/api/subscriptions")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap();
        test_router().oneshot(req).await.unwrap().status()
    }

    #[test]
    fn test_validate_purchase_strips_spacing_from_card() {
        let digits = validate_purchase(&valid_purchase()).unwrap();
        assert_eq!(digits, "4111111111111111");
    }

    #[test]
    fn test_validate_purchase_rejects_bad_expiry() {
        let mut payload = valid_purchase();
        payload.expiry_date = "13/27".to_string();
        assert!(validate_purchase(&payload).is_err());
        payload.expiry_date = "9/27".to_string();
        assert!(validate_purchase(&payload).is_err());
        payload.expiry_date = "09/2027".to_string();
        assert!(validate_purchase(&payload).is_ok());
    }

    #[test]
    fn test_validate_purchase_rejects_nonpositive_amount() {
        let mut payload = valid_purchase();
        payload.amount = 0.0;
        assert!(validate_purchase(&payload).is_err());
        payload.amount = -5.0;
        assert!(validate_purchase(&payload).is_err());
        payload.amount = f64::NAN;
        assert!(validate_purchase(&payload).is_err());
    }

    #[tokio::test]
    async fn test_purchase_short_card_number_returns_bad_request() {
        let mut payload = valid_purchase();
        payload.card_number = "1234".to_string();
        assert_eq!(post_purchase(&payload).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_purchase_without_pool_returns_service_unavailable() {
        assert_eq!(
            post_purchase(&valid_purchase()).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_check_subscription_without_pool_returns_service_unavailable() {
        let req = Request::get(format!(
            "/api/subscriptions/check-subscription/{}",
            Uuid::new_v4()
        ))
        .body(Body::empty())
        .unwrap();
        let res = test_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
