/**
 * Subscription Expiry Sweep
 * Keeps subscription status consistent with elapsed time, evaluated lazily
 */
use axum::{extract::Request, middleware::Next, response::Response};
use chrono::{Local, Months, NaiveDate};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{self, models::Subscription};

/// The stored end date means "expires at the start of this date": a
/// subscription ending today is already expired.
pub fn is_expired(end_date: NaiveDate, today: NaiveDate) -> bool {
    end_date <= today
}

/// One year from an existing end date, for renewals of a still-Active
/// subscription. Measured from the existing end, not from now, so renewing
/// early compounds.
pub fn renewal_end_date(current_end: NaiveDate) -> NaiveDate {
    current_end
        .checked_add_months(Months::new(12))
        .unwrap_or(current_end)
}

/// One year from the given start, for fresh purchases.
pub fn one_year_from(start: NaiveDate) -> NaiveDate {
    start.checked_add_months(Months::new(12)).unwrap_or(start)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Transition every Active subscription whose end date has passed to
/// Inactive. Set-based and idempotent; returns the number of rows swept.
pub async fn sweep(pool: &PgPool) -> sqlx::Result<u64> {
    let result = sqlx::query(
        "UPDATE subscriptions SET status = 'Inactive' \
         WHERE status = 'Active' AND end_date <= $1",
    )
    .bind(today())
    .execute(pool)
    .await?;

    let swept = result.rows_affected();
    if swept > 0 {
        tracing::info!(swept, "expired subscriptions transitioned to Inactive");
    }
    Ok(swept)
}

/// Return the user's Active subscription, or None.
///
/// Gating reads must never observe stale Active state, so this path expires
/// the user's own rows first instead of trusting the last full sweep.
pub async fn is_active_for(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Option<Subscription>> {
    sqlx::query(
        "UPDATE subscriptions SET status = 'Inactive' \
         WHERE user_id = $1 AND status = 'Active' AND end_date <= $2",
    )
    .bind(user_id)
    .bind(today())
    .execute(pool)
    .await?;

    sqlx::query_as::<_, Subscription>(
        "SELECT id, user_id, start_date, end_date, status \
         FROM subscriptions WHERE user_id = $1 AND status = 'Active'",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Any subscription for the user, regardless of status. Used where the
/// record itself is wanted (login payloads, account detail).
pub async fn subscription_for(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>(
        "SELECT id, user_id, start_date, end_date, status \
         FROM subscriptions WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// "Check before serve" middleware: runs the sweep ahead of subscription
/// reads so no listed subscription claims Active past its end date.
pub async fn sweep_requests(request: Request, next: Next) -> Response {
    if let Some(pool) = db::get_pool() {
        if let Err(e) = sweep(pool.as_ref()).await {
            tracing::error!("subscription sweep failed: {}", e);
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_past_end_date_is_expired() {
        assert!(is_expired(date(2024, 1, 1), date(2024, 6, 1)));
    }

    #[test]
    fn test_end_date_today_is_expired() {
        // "Expires at the start of this date".
        assert!(is_expired(date(2024, 6, 1), date(2024, 6, 1)));
    }

    #[test]
    fn test_future_end_date_is_not_expired() {
        assert!(!is_expired(date(2024, 6, 2), date(2024, 6, 1)));
    }

    #[test]
    fn test_renewal_extends_existing_end_date_by_one_year() {
        assert_eq!(renewal_end_date(date(2025, 3, 15)), date(2026, 3, 15));
        // Renewal is measured from the stored end, not from today.
        assert_eq!(renewal_end_date(date(2030, 1, 1)), date(2031, 1, 1));
    }

    #[test]
    fn test_renewal_clamps_leap_day() {
        assert_eq!(renewal_end_date(date(2024, 2, 29)), date(2025, 2, 28));
    }

    #[test]
    fn test_fresh_purchase_runs_one_year_from_start() {
        assert_eq!(one_year_from(date(2024, 7, 4)), date(2025, 7, 4));
    }
}
