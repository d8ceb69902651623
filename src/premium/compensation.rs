/**
 * Compensation Transaction
 * Splits the fixed per-view price between the recipe's author and the
 * platform account, exactly once per distinct viewer
 */
use sqlx::{PgConnection, PgPool};
use std::fmt;
use uuid::Uuid;

use crate::premium::author;

/// Author's share of one compensable view.
pub const WRITER_SHARE: f64 = 0.90;
/// Platform's share of one compensable view.
pub const PLATFORM_SHARE: f64 = 0.10;
/// Fixed per-view unit price; the two shares always sum to this.
pub const VIEW_UNIT_PRICE: f64 = 1.00;

lazy_static::lazy_static! {
    /// Configured platform-ledger admin. When unset, the sole admin row is
    /// used; multiple admins without configuration is a resolution error.
    pub static ref PLATFORM_ACCOUNT_ID: Option<Uuid> = std::env::var("PLATFORM_ACCOUNT_ID")
        .ok()
        .and_then(|s| s.parse().ok());
}

/// Result of a qualifying view request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCredit {
    /// Balances moved and the viewer was recorded.
    Credited,
    /// A concurrent request already counted this viewer; nothing changed.
    AlreadyCounted,
}

#[derive(Debug)]
pub enum CompensationError {
    /// Payee or platform account could not be resolved; no mutation occurred.
    AccountsMissing,
    Db(sqlx::Error),
}

impl fmt::Display for CompensationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompensationError::AccountsMissing => write!(f, "Writer or Admin not found"),
            CompensationError::Db(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for CompensationError {}

impl From<sqlx::Error> for CompensationError {
    fn from(e: sqlx::Error) -> Self {
        CompensationError::Db(e)
    }
}

async fn resolve_platform_account(conn: &mut PgConnection) -> sqlx::Result<Option<Uuid>> {
    if let Some(id) = *PLATFORM_ACCOUNT_ID {
        return Ok(Some(id));
    }
    // LIMIT 2 distinguishes "exactly one" from "ambiguous".
    let admins: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM admins LIMIT 2")
        .fetch_all(conn)
        .await?;
    match admins.as_slice() {
        [(id,)] => Ok(Some(*id)),
        [] => Ok(None),
        _ => {
            tracing::error!(
                "multiple admin accounts and no PLATFORM_ACCOUNT_ID configured; \
                 refusing to guess the platform ledger"
            );
            Ok(None)
        }
    }
}

/// Record a compensable view in one all-or-nothing transaction.
///
/// The (recipe, viewer) pair is claimed first with an insert-if-absent on
/// the viewer set; losing that claim means another request already counted
/// this viewer and the whole operation is an idempotent no-op.
pub async fn record_view(
    pool: &PgPool,
    recipe_id: Uuid,
    recipe_writer_id: Uuid,
    viewer_id: Uuid,
) -> Result<ViewCredit, CompensationError> {
    let mut tx = pool.begin().await?;

    let claimed = sqlx::query(
        "INSERT INTO recipe_viewers (recipe_id, viewer_id) VALUES ($1, $2) \
         ON CONFLICT DO NOTHING",
    )
    .bind(recipe_id)
    .bind(viewer_id)
    .execute(&mut *tx)
    .await?;

    if claimed.rows_affected() == 0 {
        tx.rollback().await?;
        tracing::debug!(%recipe_id, %viewer_id, "viewer already counted, skipping credit");
        return Ok(ViewCredit::AlreadyCounted);
    }

    let Some(payee) = author::resolve(&mut tx, recipe_writer_id).await? else {
        tx.rollback().await?;
        tracing::error!(%recipe_id, %recipe_writer_id, "payee account not found");
        return Err(CompensationError::AccountsMissing);
    };

    let Some(platform_id) = resolve_platform_account(&mut tx).await? else {
        tx.rollback().await?;
        tracing::error!(%recipe_id, "platform account not found");
        return Err(CompensationError::AccountsMissing);
    };

    if !payee.credit(&mut tx, WRITER_SHARE).await? {
        tx.rollback().await?;
        return Err(CompensationError::AccountsMissing);
    }

    let platform = sqlx::query("UPDATE admins SET amount = amount + $1 WHERE id = $2")
        .bind(PLATFORM_SHARE)
        .bind(platform_id)
        .execute(&mut *tx)
        .await?;
    if platform.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(CompensationError::AccountsMissing);
    }

    sqlx::query("UPDATE recipes SET num_of_views = num_of_views + 1 WHERE id = $1")
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        %recipe_id,
        %viewer_id,
        payee = %payee.display_name(),
        writer_share = WRITER_SHARE,
        platform_share = PLATFORM_SHARE,
        "view credited"
    );

    Ok(ViewCredit::Credited)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shares_sum_to_unit_price() {
        assert!((WRITER_SHARE + PLATFORM_SHARE - VIEW_UNIT_PRICE).abs() < 1e-9);
    }

    #[test]
    fn test_accounts_missing_maps_to_contract_message() {
        let msg = CompensationError::AccountsMissing.to_string();
        assert_eq!(msg, "Writer or Admin not found");
    }
}
