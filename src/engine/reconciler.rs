//! The position update rule: one pure function from (old position, trade)
//! to the new position. The live append path and the replay validator both
//! fold this same function, which is what keeps them in agreement.

use crate::error::LedgerError;
use crate::types::position::PortfolioPosition;
use crate::types::transaction::{Action, Price, Side, Transaction};

/// Apply one transaction to the position for its (user, ticker, side) key.
///
/// Opening trades grow the position and fold the trade price into the
/// volume-weighted cost basis; the same recurrence holds for shorts, where
/// the basis tracks the average price the shares were sold at. Closing
/// trades shrink the position and crystallize profit against the basis,
/// leaving cost_basis and total_invested untouched.
pub fn apply(
    position: &PortfolioPosition,
    txn: &Transaction,
) -> Result<PortfolioPosition, LedgerError> {
    let mut next = *position;
    let s = txn.quantity;
    let p = txn.price;

    match txn.action {
        Action::Open => {
            let new_q = position.quantity + s;
            next.cost_basis = (position.quantity * position.cost_basis + s * p) / new_q;
            next.total_invested = position.total_invested + s * p;
            next.quantity = new_q;
        }
        Action::Close => {
            if s > position.quantity {
                return Err(LedgerError::OverClose {
                    requested: s,
                    open: position.quantity,
                });
            }
            next.quantity = position.quantity - s;
            let per_share = match txn.side {
                Side::Long => p - position.cost_basis,
                Side::Short => position.cost_basis - p,
            };
            next.realized_profit = position.realized_profit + per_share * s;
        }
    }

    next.gain = if next.total_invested == 0.0 {
        0.0
    } else {
        next.realized_profit / next.total_invested
    };
    next.current_value = next.last_price * next.quantity;

    Ok(next)
}

/// Fold a fresh market quote into the position. Independent of trades: a
/// quote only moves last_price and the mark-to-market value.
pub fn mark(position: &PortfolioPosition, quote: Price) -> PortfolioPosition {
    let mut next = *position;
    next.last_price = quote;
    next.current_value = quote * next.quantity;
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::NewTransaction;
    use chrono::Utc;
    use uuid::Uuid;

    fn txn(side: Side, action: Action, quantity: f64, price: f64) -> Transaction {
        NewTransaction {
            user_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            ticker: "SPY".into(),
            side,
            action,
            quantity,
            price,
        }
        .with_id(1)
    }

    #[test]
    fn open_then_close_round_numbers() {
        let p0 = PortfolioPosition::flat();
        let p1 = apply(&p0, &txn(Side::Long, Action::Open, 10.0, 10.0)).unwrap();
        assert_eq!(p1.quantity, 10.0);
        assert_eq!(p1.cost_basis, 10.0);
        assert_eq!(p1.total_invested, 100.0);

        let p2 = apply(&p1, &txn(Side::Long, Action::Close, 10.0, 12.0)).unwrap();
        assert_eq!(p2.quantity, 0.0);
        assert_eq!(p2.realized_profit, 20.0);
        assert_eq!(p2.cost_basis, 10.0);
        assert_eq!(p2.total_invested, 100.0);
        assert_eq!(p2.gain, 0.2);
    }

    #[test]
    fn mark_only_moves_valuation() {
        let p0 = PortfolioPosition::flat();
        let p1 = apply(&p0, &txn(Side::Long, Action::Open, 4.0, 25.0)).unwrap();
        let p2 = mark(&p1, 30.0);
        assert_eq!(p2.last_price, 30.0);
        assert_eq!(p2.current_value, 120.0);
        assert_eq!(p2.quantity, p1.quantity);
        assert_eq!(p2.cost_basis, p1.cost_basis);
        assert_eq!(p2.realized_profit, p1.realized_profit);
    }
}
