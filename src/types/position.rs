use serde::{Deserialize, Serialize};

use crate::types::transaction::{Price, Qty};

/// Running aggregate per (user, ticker, side). Created flat on the first
/// transaction for its key and never deleted; a position that returns to
/// zero keeps its realized_profit and total_invested and can reopen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPosition {
    /// Open size in shares. Never negative; 0 means flat.
    pub quantity: Qty,
    /// Volume-weighted average entry price of the open portion.
    /// For shorts this is the average price the shares were sold at.
    pub cost_basis: Price,
    /// Cumulative capital committed by opening trades, across reopenings.
    pub total_invested: f64,
    /// Most recent market quote, supplied independently of trades.
    pub last_price: Price,
    /// last_price * quantity.
    pub current_value: f64,
    /// P&L crystallized by closing trades.
    pub realized_profit: f64,
    /// realized_profit / total_invested, 0 while nothing is invested.
    pub gain: f64,
}

impl PortfolioPosition {
    pub fn flat() -> Self {
        Self {
            quantity: 0.0,
            cost_basis: 0.0,
            total_invested: 0.0,
            last_price: 0.0,
            current_value: 0.0,
            realized_profit: 0.0,
            gain: 0.0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.quantity == 0.0
    }
}

impl Default for PortfolioPosition {
    fn default() -> Self {
        Self::flat()
    }
}
