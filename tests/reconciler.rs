//! Reconciler integration tests: the four transaction kinds, the guard
//! rails, and the worked numeric scenarios.

use chrono::Utc;
use uuid::Uuid;

use dbforge::engine::reconciler::{apply, mark};
use dbforge::error::LedgerError;
use dbforge::types::position::PortfolioPosition;
use dbforge::types::transaction::{Action, NewTransaction, Side, Transaction};

fn txn(side: Side, action: Action, quantity: f64, price: f64) -> Transaction {
    NewTransaction {
        user_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        ticker: "X".into(),
        side,
        action,
        quantity,
        price,
    }
    .with_id(1)
}

fn close_to(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "expected {b}, got {a}");
}

#[test]
fn long_open_sets_basis_and_invested() {
    // Scenario A: open LONG 10 @ $10.
    let p = apply(&PortfolioPosition::flat(), &txn(Side::Long, Action::Open, 10.0, 10.0)).unwrap();
    close_to(p.quantity, 10.0);
    close_to(p.cost_basis, 10.0);
    close_to(p.total_invested, 100.0);
    close_to(p.realized_profit, 0.0);
    close_to(p.gain, 0.0);
}

#[test]
fn long_add_reweights_basis() {
    // Scenario B: then open LONG 5 @ $20.
    let p = apply(&PortfolioPosition::flat(), &txn(Side::Long, Action::Open, 10.0, 10.0)).unwrap();
    let p = apply(&p, &txn(Side::Long, Action::Open, 5.0, 20.0)).unwrap();
    close_to(p.quantity, 15.0);
    close_to(p.cost_basis, 200.0 / 15.0);
    close_to(p.total_invested, 200.0);
}

#[test]
fn long_close_realizes_against_basis() {
    // Scenario C: then close LONG 5 @ $15.
    let p = apply(&PortfolioPosition::flat(), &txn(Side::Long, Action::Open, 10.0, 10.0)).unwrap();
    let p = apply(&p, &txn(Side::Long, Action::Open, 5.0, 20.0)).unwrap();
    let p = apply(&p, &txn(Side::Long, Action::Close, 5.0, 15.0)).unwrap();
    close_to(p.quantity, 10.0);
    close_to(p.realized_profit, (15.0 - 200.0 / 15.0) * 5.0);
    close_to(p.cost_basis, 200.0 / 15.0);
    close_to(p.total_invested, 200.0);
}

#[test]
fn short_open_and_cover() {
    // Scenario D: SHORT 10 @ $50, cover 10 @ $40.
    let p = apply(&PortfolioPosition::flat(), &txn(Side::Short, Action::Open, 10.0, 50.0)).unwrap();
    close_to(p.cost_basis, 50.0);
    close_to(p.total_invested, 500.0);

    let p = apply(&p, &txn(Side::Short, Action::Close, 10.0, 40.0)).unwrap();
    close_to(p.quantity, 0.0);
    close_to(p.realized_profit, 100.0);
    close_to(p.gain, 100.0 / 500.0);
}

#[test]
fn short_cover_above_basis_loses() {
    let p = apply(&PortfolioPosition::flat(), &txn(Side::Short, Action::Open, 10.0, 50.0)).unwrap();
    let p = apply(&p, &txn(Side::Short, Action::Close, 4.0, 60.0)).unwrap();
    close_to(p.realized_profit, -40.0);
    close_to(p.quantity, 6.0);
}

#[test]
fn over_close_rejected_state_untouched() {
    // Scenario E: close 20 when only 10 are open.
    let p = apply(&PortfolioPosition::flat(), &txn(Side::Long, Action::Open, 10.0, 10.0)).unwrap();
    let err = apply(&p, &txn(Side::Long, Action::Close, 20.0, 10.0)).unwrap_err();
    match err {
        LedgerError::OverClose { requested, open } => {
            close_to(requested, 20.0);
            close_to(open, 10.0);
        }
        other => panic!("expected OverClose, got {other}"),
    }
    // The input position is untouched; apply is pure.
    close_to(p.quantity, 10.0);
}

#[test]
fn closes_never_move_basis_or_invested() {
    let p = apply(&PortfolioPosition::flat(), &txn(Side::Long, Action::Open, 100.0, 12.0)).unwrap();
    let mut q = p;
    for _ in 0..10 {
        q = apply(&q, &txn(Side::Long, Action::Close, 5.0, 17.0)).unwrap();
        close_to(q.cost_basis, p.cost_basis);
        close_to(q.total_invested, p.total_invested);
    }
    close_to(q.quantity, 50.0);
}

#[test]
fn accumulates_across_flat_and_reopen() {
    // Perpetual accumulation: going flat does not reset rp or ti.
    let p = apply(&PortfolioPosition::flat(), &txn(Side::Long, Action::Open, 10.0, 10.0)).unwrap();
    assert!(!p.is_flat());
    let p = apply(&p, &txn(Side::Long, Action::Close, 10.0, 11.0)).unwrap();
    assert!(p.is_flat());
    close_to(p.realized_profit, 10.0);

    let p = apply(&p, &txn(Side::Long, Action::Open, 5.0, 30.0)).unwrap();
    assert!(!p.is_flat());
    close_to(p.quantity, 5.0);
    close_to(p.cost_basis, 30.0);
    close_to(p.total_invested, 250.0);
    close_to(p.realized_profit, 10.0);
    close_to(p.gain, 10.0 / 250.0);
}

#[test]
fn gain_guards_zero_invested() {
    let p = PortfolioPosition::flat();
    close_to(p.gain, 0.0);
    let p = apply(&p, &txn(Side::Long, Action::Open, 1.0, 1.0)).unwrap();
    close_to(p.gain, 0.0);
}

#[test]
fn mark_to_market_tracks_quote() {
    let p = apply(&PortfolioPosition::flat(), &txn(Side::Long, Action::Open, 8.0, 10.0)).unwrap();
    let p = mark(&p, 12.5);
    assert_eq!(p.last_price, 12.5);
    close_to(p.current_value, 100.0);

    // A later trade carries last_price through.
    let p = apply(&p, &txn(Side::Long, Action::Close, 4.0, 13.0)).unwrap();
    close_to(p.current_value, 12.5 * 4.0);
}
