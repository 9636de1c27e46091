//! Ledger integration tests: atomic append, ordering, isolation.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use dbforge::engine::{Ledger, ledger};
use dbforge::error::LedgerError;
use dbforge::types::transaction::{Action, NewTransaction, PositionKey, Side};

fn new_txn(user_id: Uuid, ticker: &str, side: Side, action: Action, quantity: f64, price: f64) -> NewTransaction {
    NewTransaction {
        user_id,
        timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
        ticker: ticker.into(),
        side,
        action,
        quantity,
        price,
    }
}

fn key(user_id: Uuid, ticker: &str, side: Side) -> PositionKey {
    PositionKey {
        user_id,
        ticker: ticker.into(),
        side,
    }
}

#[test]
fn append_assigns_increasing_ids() {
    let mut ledger = Ledger::new();
    let user = Uuid::new_v4();

    let a = ledger.append(new_txn(user, "SPY", Side::Long, Action::Open, 10.0, 10.0)).unwrap();
    let b = ledger.append(new_txn(user, "SPY", Side::Long, Action::Open, 5.0, 20.0)).unwrap();
    let c = ledger.append(new_txn(user, "QQQ", Side::Short, Action::Open, 3.0, 30.0)).unwrap();

    assert!(a.transaction_id < b.transaction_id);
    assert!(b.transaction_id < c.transaction_id);

    let log = ledger.transactions(None);
    let ids: Vec<i64> = log.iter().map(|t| t.transaction_id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[test]
fn filtered_read_only_returns_matching_key() {
    let mut ledger = Ledger::new();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    ledger.append(new_txn(alice, "SPY", Side::Long, Action::Open, 10.0, 10.0)).unwrap();
    ledger.append(new_txn(bob, "SPY", Side::Long, Action::Open, 7.0, 10.0)).unwrap();
    ledger.append(new_txn(alice, "SPY", Side::Short, Action::Open, 2.0, 10.0)).unwrap();

    let only = ledger.transactions(Some(&key(alice, "SPY", Side::Long)));
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].user_id, alice);
    assert_eq!(only[0].side, Side::Long);
}

#[test]
fn rejected_validation_leaves_no_trace() {
    let mut ledger = Ledger::new();
    let user = Uuid::new_v4();

    let err = ledger
        .append(new_txn(user, "SPY", Side::Long, Action::Open, -1.0, 10.0))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    let err = ledger
        .append(new_txn(user, "SPY", Side::Long, Action::Open, 1.0, 0.0))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));

    assert!(ledger.transactions(None).is_empty());
    assert!(ledger.position(&key(user, "SPY", Side::Long)).is_none());
}

#[test]
fn rejected_over_close_leaves_state_unchanged() {
    let mut ledger = Ledger::new();
    let user = Uuid::new_v4();
    let k = key(user, "SPY", Side::Long);

    ledger.append(new_txn(user, "SPY", Side::Long, Action::Open, 10.0, 10.0)).unwrap();
    let before = ledger.position(&k).unwrap();

    let err = ledger
        .append(new_txn(user, "SPY", Side::Long, Action::Close, 20.0, 10.0))
        .unwrap_err();
    assert!(matches!(err, LedgerError::OverClose { .. }));

    // Neither the log nor the position moved.
    assert_eq!(ledger.transactions(None).len(), 1);
    assert_eq!(ledger.position(&k).unwrap(), before);
}

#[test]
fn users_are_isolated() {
    let mut ledger = Ledger::new();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    ledger.append(new_txn(alice, "X", Side::Long, Action::Open, 10.0, 10.0)).unwrap();
    ledger.append(new_txn(bob, "X", Side::Long, Action::Open, 5.0, 5.0)).unwrap();
    let bob_before = ledger.position(&key(bob, "X", Side::Long)).unwrap();

    // Alice sells; Bob's aggregate must not move.
    ledger.append(new_txn(alice, "X", Side::Long, Action::Close, 5.0, 20.0)).unwrap();

    assert_eq!(ledger.position(&key(bob, "X", Side::Long)).unwrap(), bob_before);
    let alice_pos = ledger.position(&key(alice, "X", Side::Long)).unwrap();
    assert_eq!(alice_pos.quantity, 5.0);
    assert_eq!(alice_pos.realized_profit, 50.0);
}

#[test]
fn long_and_short_are_separate_rows() {
    let mut ledger = Ledger::new();
    let user = Uuid::new_v4();

    ledger.append(new_txn(user, "X", Side::Long, Action::Open, 10.0, 10.0)).unwrap();
    ledger.append(new_txn(user, "X", Side::Short, Action::Open, 4.0, 10.0)).unwrap();

    assert_eq!(ledger.position(&key(user, "X", Side::Long)).unwrap().quantity, 10.0);
    assert_eq!(ledger.position(&key(user, "X", Side::Short)).unwrap().quantity, 4.0);
    assert_eq!(ledger.positions().len(), 2);
}

#[test]
fn mark_updates_every_position_on_ticker() {
    let mut ledger = Ledger::new();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    ledger.append(new_txn(alice, "X", Side::Long, Action::Open, 10.0, 10.0)).unwrap();
    ledger.append(new_txn(bob, "X", Side::Short, Action::Open, 4.0, 10.0)).unwrap();
    ledger.append(new_txn(bob, "Y", Side::Long, Action::Open, 1.0, 50.0)).unwrap();

    ledger.mark("X", 12.0);

    assert_eq!(ledger.position(&key(alice, "X", Side::Long)).unwrap().current_value, 120.0);
    assert_eq!(ledger.position(&key(bob, "X", Side::Short)).unwrap().current_value, 48.0);
    // Other tickers untouched.
    assert_eq!(ledger.position(&key(bob, "Y", Side::Long)).unwrap().last_price, 0.0);
}

#[tokio::test]
async fn shared_handle_appends_and_reads() {
    let shared = Ledger::shared();
    let user = Uuid::new_v4();

    ledger::append(&shared, new_txn(user, "SPY", Side::Long, Action::Open, 2.0, 100.0))
        .await
        .unwrap();

    let position = ledger::get_position(&shared, &key(user, "SPY", Side::Long))
        .await
        .unwrap();
    assert_eq!(position.quantity, 2.0);
    assert_eq!(position.total_invested, 200.0);
}
