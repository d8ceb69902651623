/**
 * Payment Routes
 * Read access to recorded payments; rows are written by the subscription
 * purchase flow
 */
use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;

use crate::db::{self, models::Payment};
use crate::routes::{db_unavailable, msg_response};

/// Mask a card number down to its last four digits. Shorter inputs are
/// fully masked.
pub fn mask_card_number(digits: &str) -> String {
    let len = digits.chars().count();
    if len <= 4 {
        return "*".repeat(len);
    }
    let last_four: String = digits.chars().skip(len - 4).collect();
    format!("{}{}", "*".repeat(len - 4), last_four)
}

/// GET /api/payments
pub async fn list_payments() -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    match sqlx::query_as::<_, Payment>(
        "SELECT id, subscriber_id, amount, card_number, card_name, expiry_date, \
                payment_date, payment_status \
         FROM payments ORDER BY payment_date DESC",
    )
    .fetch_all(pool.as_ref())
    .await
    {
        Ok(payments) => (StatusCode::OK, Json(payments)).into_response(),
        Err(e) => {
            tracing::error!("Database error listing payments: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response()
        }
    }
}

/// GET /api/payments/:id
pub async fn get_payment(Path(id): Path<Uuid>) -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    match sqlx::query_as::<_, Payment>(
        "SELECT id, subscriber_id, amount, card_number, card_name, expiry_date, \
                payment_date, payment_status \
         FROM payments WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool.as_ref())
    .await
    {
        Ok(Some(payment)) => (StatusCode::OK, Json(payment)).into_response(),
        Ok(None) => msg_response(StatusCode::NOT_FOUND, "Payment not found").into_response(),
        Err(e) => {
            tracing::error!("Database error fetching payment: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    #[test]
    fn test_mask_card_number_keeps_last_four() {
        assert_eq!(mask_card_number("4111111111111111"), "************1111");
        assert_eq!(mask_card_number("30569309025904"), "**********5904");
    }

    #[test]
    fn test_mask_card_number_short_input_fully_masked() {
        assert_eq!(mask_card_number("123"), "***");
        assert_eq!(mask_card_number(""), "");
    }

    #[tokio::test]
    async fn test_list_payments_without_pool_returns_service_unavailable() {
        let app = Router::new().route("/api/payments", get(list_payments));
        let req = Request::get("/api/payments").body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
