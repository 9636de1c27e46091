//! Replay validation: rebuild every position from the ordered log and diff
//! against the stored aggregates. Read-only; drift is reported as data,
//! never thrown. This is the guard against reconciliation defects such as
//! an update predicate that drops user_id and lets one user's close bleed
//! into another's aggregate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::reconciler;
use crate::types::position::PortfolioPosition;
use crate::types::transaction::{PositionKey, Side, Transaction};

/// One audited key and whether its stored quantity diverged from replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftEntry {
    pub key: PositionKey,
    pub drifted: bool,
}

/// Per-key drift flags plus long/short error counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DriftReport {
    pub entries: Vec<DriftEntry>,
    pub long_errors: usize,
    pub short_errors: usize,
}

impl DriftReport {
    pub fn is_clean(&self) -> bool {
        self.long_errors == 0 && self.short_errors == 0
    }

    pub fn drifted(&self, key: &PositionKey) -> Option<bool> {
        self.entries
            .iter()
            .find(|e| &e.key == key)
            .map(|e| e.drifted)
    }
}

/// Fold the reconciler over the full log, per key, from the flat state.
/// Transactions must arrive in transaction_id order. An over-close in the
/// log cannot happen through the append path; if one is present the entry
/// is skipped, matching what the store was allowed to record.
pub fn replay(transactions: &[Transaction]) -> HashMap<PositionKey, PortfolioPosition> {
    let mut positions: HashMap<PositionKey, PortfolioPosition> = HashMap::new();
    for txn in transactions {
        let key = txn.key();
        let current = positions
            .get(&key)
            .copied()
            .unwrap_or_else(PortfolioPosition::flat);
        match reconciler::apply(&current, txn) {
            Ok(updated) => {
                positions.insert(key, updated);
            }
            Err(err) => {
                warn!(id = txn.transaction_id, %err, "skipping unreplayable log entry");
            }
        }
    }
    positions
}

/// Compare replayed quantity against the stored quantity for every key seen
/// on either side. A key present in the store but absent from the log (or
/// vice versa) counts as drift.
pub fn validate(
    transactions: &[Transaction],
    stored: &HashMap<PositionKey, PortfolioPosition>,
) -> DriftReport {
    let replayed = replay(transactions);

    let mut report = DriftReport::default();
    let mut keys: Vec<&PositionKey> = replayed.keys().chain(stored.keys()).collect();
    keys.sort_by(|a, b| {
        (a.user_id, &a.ticker, a.side.sign()).cmp(&(b.user_id, &b.ticker, b.side.sign()))
    });
    keys.dedup();

    for key in keys {
        let expected = replayed.get(key).map(|p| p.quantity).unwrap_or(0.0);
        let actual = stored.get(key).map(|p| p.quantity).unwrap_or(0.0);
        let drifted = expected != actual;
        if drifted {
            match key.side {
                Side::Long => report.long_errors += 1,
                Side::Short => report.short_errors += 1,
            }
            warn!(
                user = %key.user_id,
                ticker = %key.ticker,
                side = ?key.side,
                expected,
                actual,
                "drift detected"
            );
        }
        report.entries.push(DriftEntry {
            key: key.clone(),
            drifted,
        });
    }

    info!(
        long_errors = report.long_errors,
        short_errors = report.short_errors,
        keys = report.entries.len(),
        "validation complete"
    );
    report
}
