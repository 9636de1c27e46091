//! Portfolio persistence: locked read, upsert, and full scan. Executors are
//! generic so the append path can run these inside its transaction.

use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

use crate::error::LedgerError;
use crate::types::position::PortfolioPosition;
use crate::types::transaction::{PositionKey, Side};

#[derive(Debug, FromRow)]
pub struct PositionRow {
    pub user_id: Uuid,
    pub ticker: String,
    pub position_type: i16,
    pub quantity: f64,
    pub last_price: f64,
    pub cost_basis: f64,
    pub total_invested: f64,
    pub current_value: f64,
    pub realized_profit: f64,
    pub gain: f64,
}

pub fn position_row_to_entry(
    row: &PositionRow,
) -> Result<(PositionKey, PortfolioPosition), LedgerError> {
    let key = PositionKey {
        user_id: row.user_id,
        ticker: row.ticker.clone(),
        side: Side::from_sign(row.position_type)?,
    };
    let position = PortfolioPosition {
        quantity: row.quantity,
        cost_basis: row.cost_basis,
        total_invested: row.total_invested,
        last_price: row.last_price,
        current_value: row.current_value,
        realized_profit: row.realized_profit,
        gain: row.gain,
    };
    Ok((key, position))
}

const COLUMNS: &str = "user_id, ticker, position_type, quantity, last_price, cost_basis, \
                       total_invested, current_value, realized_profit, gain";

/// Point lookup.
pub async fn get_position<'e, E: PgExecutor<'e>>(
    executor: E,
    key: &PositionKey,
) -> Result<Option<PortfolioPosition>, LedgerError> {
    let row = sqlx::query_as::<_, PositionRow>(&format!(
        "SELECT {COLUMNS} FROM portfolio WHERE user_id = $1 AND ticker = $2 AND position_type = $3"
    ))
    .bind(key.user_id)
    .bind(&key.ticker)
    .bind(key.side.sign())
    .fetch_optional(executor)
    .await?;
    row.map(|r| position_row_to_entry(&r).map(|(_, p)| p))
        .transpose()
}

/// Make sure the aggregate row for a key exists, without touching it if it
/// does. `FOR UPDATE` acquires nothing on zero rows, so the append path
/// seeds the flat row first to have something to lock on a key's very
/// first transaction.
pub async fn seed_position_row<'e, E: PgExecutor<'e>>(
    executor: E,
    key: &PositionKey,
) -> Result<(), LedgerError> {
    sqlx::query(
        "INSERT INTO portfolio (user_id, ticker, position_type, quantity) \
         VALUES ($1, $2, $3, 0) \
         ON CONFLICT (user_id, ticker, position_type) DO NOTHING",
    )
    .bind(key.user_id)
    .bind(&key.ticker)
    .bind(key.side.sign())
    .execute(executor)
    .await?;
    Ok(())
}

/// Point lookup that holds a row lock until the caller's transaction ends.
/// The row must already exist (see `seed_position_row`); only then does
/// this serialize writers on the same key.
pub async fn lock_position<'e, E: PgExecutor<'e>>(
    executor: E,
    key: &PositionKey,
) -> Result<Option<PortfolioPosition>, LedgerError> {
    let row = sqlx::query_as::<_, PositionRow>(&format!(
        "SELECT {COLUMNS} FROM portfolio \
         WHERE user_id = $1 AND ticker = $2 AND position_type = $3 FOR UPDATE"
    ))
    .bind(key.user_id)
    .bind(&key.ticker)
    .bind(key.side.sign())
    .fetch_optional(executor)
    .await?;
    row.map(|r| position_row_to_entry(&r).map(|(_, p)| p))
        .transpose()
}

/// Insert or update the aggregate row for a key.
pub async fn upsert_position<'e, E: PgExecutor<'e>>(
    executor: E,
    key: &PositionKey,
    position: &PortfolioPosition,
) -> Result<(), LedgerError> {
    sqlx::query(
        "INSERT INTO portfolio (user_id, ticker, position_type, quantity, last_price, cost_basis, \
                                total_invested, current_value, realized_profit, gain) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (user_id, ticker, position_type) DO UPDATE SET \
             quantity = EXCLUDED.quantity, \
             last_price = EXCLUDED.last_price, \
             cost_basis = EXCLUDED.cost_basis, \
             total_invested = EXCLUDED.total_invested, \
             current_value = EXCLUDED.current_value, \
             realized_profit = EXCLUDED.realized_profit, \
             gain = EXCLUDED.gain",
    )
    .bind(key.user_id)
    .bind(&key.ticker)
    .bind(key.side.sign())
    .bind(position.quantity)
    .bind(position.last_price)
    .bind(position.cost_basis)
    .bind(position.total_invested)
    .bind(position.current_value)
    .bind(position.realized_profit)
    .bind(position.gain)
    .execute(executor)
    .await?;
    Ok(())
}

/// Full scan, for validation and hydration.
pub async fn list_positions<'e, E: PgExecutor<'e>>(
    executor: E,
) -> Result<Vec<(PositionKey, PortfolioPosition)>, LedgerError> {
    let rows = sqlx::query_as::<_, PositionRow>(&format!("SELECT {COLUMNS} FROM portfolio"))
        .fetch_all(executor)
        .await?;
    rows.iter().map(position_row_to_entry).collect()
}
