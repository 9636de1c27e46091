//! Transaction log persistence: the transactional append-and-reconcile
//! unit, plus ordered reads for replay.

use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use crate::engine::reconciler;
use crate::error::LedgerError;
use crate::persistence::portfolio::{lock_position, seed_position_row, upsert_position};
use crate::types::position::PortfolioPosition;
use crate::types::transaction::{Action, NewTransaction, PositionKey, Side, Transaction};

#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub user_id: Uuid,
    pub trans_id: i64,
    pub datetime: chrono::DateTime<chrono::Utc>,
    pub ticker: String,
    pub position_type: i16,
    pub action: i16,
    pub no_shares: f64,
    pub at_price: f64,
}

pub fn transaction_row_to_transaction(row: &TransactionRow) -> Result<Transaction, LedgerError> {
    Ok(Transaction {
        user_id: row.user_id,
        transaction_id: row.trans_id,
        timestamp: row.datetime,
        ticker: row.ticker.clone(),
        side: Side::from_sign(row.position_type)?,
        action: Action::from_sign(row.action)?,
        quantity: row.no_shares,
        price: row.at_price,
    })
}

/// Append one transaction and reconcile its portfolio row in a single DB
/// transaction. The portfolio row is locked for the duration, the log row
/// is inserted with a store-assigned trans_id, and the reconciled position
/// is upserted; any failure rolls the whole unit back. This is the update
/// path that replaces the original trigger.
pub async fn append_transaction(
    pool: &PgPool,
    new: NewTransaction,
) -> Result<Transaction, LedgerError> {
    new.validate()?;

    let key = PositionKey {
        user_id: new.user_id,
        ticker: new.ticker.clone(),
        side: new.side,
    };

    let mut tx = pool.begin().await?;

    // Two concurrent first appends for the same key would otherwise both
    // see no row, lock nothing, and the later upsert would swallow the
    // earlier trade's aggregate.
    seed_position_row(&mut *tx, &key).await?;
    let current = lock_position(&mut *tx, &key)
        .await?
        .unwrap_or_else(PortfolioPosition::flat);

    let trans_id: i64 = sqlx::query_scalar(
        "INSERT INTO transaction_history (user_id, datetime, ticker, position_type, action, no_shares, at_price) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING trans_id",
    )
    .bind(new.user_id)
    .bind(new.timestamp)
    .bind(&new.ticker)
    .bind(new.side.sign())
    .bind(new.action.sign())
    .bind(new.quantity)
    .bind(new.price)
    .fetch_one(&mut *tx)
    .await?;

    let txn = new.with_id(trans_id);
    let updated = reconciler::apply(&current, &txn)?;

    upsert_position(&mut *tx, &key, &updated).await?;
    tx.commit().await?;

    debug!(user = %txn.user_id, ticker = %txn.ticker, id = trans_id, "appended transaction");
    Ok(txn)
}

const SELECT_COLUMNS: &str =
    "SELECT user_id, trans_id, datetime, ticker, position_type, action, no_shares, at_price \
     FROM transaction_history";

/// Full ordered log. trans_id order is the replay order.
pub async fn list_transactions(pool: &PgPool) -> Result<Vec<Transaction>, LedgerError> {
    let rows = sqlx::query_as::<_, TransactionRow>(&format!("{SELECT_COLUMNS} ORDER BY trans_id"))
        .fetch_all(pool)
        .await?;
    rows.iter().map(transaction_row_to_transaction).collect()
}

/// Ordered log for one (user, ticker, side) key.
pub async fn list_transactions_for_key(
    pool: &PgPool,
    key: &PositionKey,
) -> Result<Vec<Transaction>, LedgerError> {
    let rows = sqlx::query_as::<_, TransactionRow>(&format!(
        "{SELECT_COLUMNS} WHERE user_id = $1 AND ticker = $2 AND position_type = $3 ORDER BY trans_id"
    ))
    .bind(key.user_id)
    .bind(&key.ticker)
    .bind(key.side.sign())
    .fetch_all(pool)
    .await?;
    rows.iter().map(transaction_row_to_transaction).collect()
}
