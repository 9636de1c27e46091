use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::LedgerError;

pub type Qty = f64;
pub type Price = f64;
pub type TransactionId = i64;

/// Position direction. Long profits when price rises, short when it falls.
/// Stored as 1 (long) / -1 (short) in the `position_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn sign(self) -> i16 {
        match self {
            Side::Long => 1,
            Side::Short => -1,
        }
    }

    pub fn from_sign(sign: i16) -> Result<Self, LedgerError> {
        match sign {
            1 => Ok(Side::Long),
            -1 => Ok(Side::Short),
            other => Err(LedgerError::Validation(format!(
                "unknown position_type {other}, expected 1 or -1"
            ))),
        }
    }
}

/// Whether the trade grows or shrinks the open position.
/// Open covers both a long buy and a short sell-to-open; close covers a
/// long sell and a short cover. Stored as 1 (open) / -1 (close).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Open,
    Close,
}

impl Action {
    pub fn sign(self) -> i16 {
        match self {
            Action::Open => 1,
            Action::Close => -1,
        }
    }

    pub fn from_sign(sign: i16) -> Result<Self, LedgerError> {
        match sign {
            1 => Ok(Action::Open),
            -1 => Ok(Action::Close),
            other => Err(LedgerError::Validation(format!(
                "unknown action {other}, expected 1 or -1"
            ))),
        }
    }
}

/// One trade as submitted by a caller; the ledger assigns the transaction id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub user_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub ticker: String,
    pub side: Side,
    pub action: Action,
    pub quantity: Qty,
    pub price: Price,
}

impl NewTransaction {
    /// Reject malformed input before it reaches any state.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if !(self.quantity > 0.0) {
            return Err(LedgerError::Validation(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        if !(self.price > 0.0) {
            return Err(LedgerError::Validation(format!(
                "price must be positive, got {}",
                self.price
            )));
        }
        if self.ticker.is_empty() {
            return Err(LedgerError::Validation("ticker must not be empty".into()));
        }
        Ok(())
    }

    pub fn with_id(self, transaction_id: TransactionId) -> Transaction {
        Transaction {
            user_id: self.user_id,
            transaction_id,
            timestamp: self.timestamp,
            ticker: self.ticker,
            side: self.side,
            action: self.action,
            quantity: self.quantity,
            price: self.price,
        }
    }
}

/// Immutable log entry. `transaction_id` is monotonically increasing in
/// insertion order and breaks ties between equal timestamps; replay depends
/// on that ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub user_id: Uuid,
    pub transaction_id: TransactionId,
    pub timestamp: DateTime<Utc>,
    pub ticker: String,
    pub side: Side,
    pub action: Action,
    pub quantity: Qty,
    pub price: Price,
}

impl Transaction {
    pub fn key(&self) -> PositionKey {
        PositionKey {
            user_id: self.user_id,
            ticker: self.ticker.clone(),
            side: self.side,
        }
    }
}

/// Aggregate key: one portfolio row per (user, ticker, side).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PositionKey {
    pub user_id: Uuid,
    pub ticker: String,
    pub side: Side,
}
