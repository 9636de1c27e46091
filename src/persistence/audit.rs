//! DB-side drift check: load the ordered log and the portfolio table, then
//! run the same pure validator the in-memory ledger uses.

use std::collections::HashMap;

use sqlx::PgPool;

use crate::engine::validator;
use crate::engine::validator::DriftReport;
use crate::error::LedgerError;
use crate::persistence::portfolio::list_positions;
use crate::persistence::transactions::list_transactions;

/// Replay the stored log and report any key whose stored quantity no
/// longer matches. Read-only.
pub async fn validate_store(pool: &PgPool) -> Result<DriftReport, LedgerError> {
    let transactions = list_transactions(pool).await?;
    let stored: HashMap<_, _> = list_positions(pool).await?.into_iter().collect();
    Ok(validator::validate(&transactions, &stored))
}
