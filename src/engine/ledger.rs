//! In-memory transaction log and portfolio store.
//! Append is the one write path: validate, reconcile, then commit the log
//! row and the position together under a single write lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::engine::reconciler;
use crate::error::LedgerError;
use crate::types::position::PortfolioPosition;
use crate::types::transaction::{NewTransaction, PositionKey, Price, Transaction};

pub type SharedLedger = Arc<RwLock<Ledger>>;

/// Append-only log plus the aggregate it drives. Insertion order of `log`
/// is transaction_id order; replay depends on that.
#[derive(Debug)]
pub struct Ledger {
    log: Vec<Transaction>,
    positions: HashMap<PositionKey, PortfolioPosition>,
    next_id: i64,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            positions: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn shared() -> SharedLedger {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Append one transaction and update its position as one unit.
    /// On any error nothing is recorded.
    pub fn append(&mut self, new: NewTransaction) -> Result<Transaction, LedgerError> {
        new.validate()?;

        let txn = new.with_id(self.next_id);
        let key = txn.key();
        let current = self
            .positions
            .get(&key)
            .copied()
            .unwrap_or_else(PortfolioPosition::flat);
        let updated = reconciler::apply(&current, &txn)?;

        debug!(
            user = %txn.user_id,
            ticker = %txn.ticker,
            id = txn.transaction_id,
            quantity = updated.quantity,
            "appended transaction"
        );

        self.next_id += 1;
        self.log.push(txn.clone());
        self.positions.insert(key, updated);
        Ok(txn)
    }

    /// All transactions in transaction_id order, optionally restricted to
    /// one (user, ticker, side) key.
    pub fn transactions(&self, filter: Option<&PositionKey>) -> Vec<Transaction> {
        match filter {
            None => self.log.clone(),
            Some(key) => self
                .log
                .iter()
                .filter(|t| {
                    t.user_id == key.user_id && t.ticker == key.ticker && t.side == key.side
                })
                .cloned()
                .collect(),
        }
    }

    pub fn position(&self, key: &PositionKey) -> Option<PortfolioPosition> {
        self.positions.get(key).copied()
    }

    pub fn positions(&self) -> Vec<(PositionKey, PortfolioPosition)> {
        self.positions
            .iter()
            .map(|(k, p)| (k.clone(), *p))
            .collect()
    }

    /// Fold a fresh quote into every position on the ticker.
    pub fn mark(&mut self, ticker: &str, quote: Price) {
        for (key, position) in self.positions.iter_mut() {
            if key.ticker == ticker {
                *position = reconciler::mark(position, quote);
            }
        }
    }

    /// Consistent copy for validation to run against while writes continue.
    pub fn snapshot(&self) -> (Vec<Transaction>, HashMap<PositionKey, PortfolioPosition>) {
        (self.log.clone(), self.positions.clone())
    }

    /// Test hook: overwrite one stored position, bypassing the reconciler.
    pub fn corrupt_position(&mut self, key: &PositionKey, position: PortfolioPosition) {
        self.positions.insert(key.clone(), position);
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

/// Append through the shared handle; serializes writers per the lock.
pub async fn append(ledger: &SharedLedger, new: NewTransaction) -> Result<Transaction, LedgerError> {
    ledger.write().await.append(new)
}

pub async fn get_position(ledger: &SharedLedger, key: &PositionKey) -> Option<PortfolioPosition> {
    ledger.read().await.position(key)
}
