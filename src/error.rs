//! Error taxonomy for the ledger and its storage layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed transaction, rejected before touching any state.
    #[error("invalid transaction: {0}")]
    Validation(String),

    /// Attempt to close more than is currently open. State is unchanged;
    /// the caller decides whether to clamp or split the order.
    #[error("close of {requested} shares exceeds open quantity {open}")]
    OverClose { requested: f64, open: f64 },

    /// Storage failure. The append-then-reconcile unit rolls back fully.
    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}
