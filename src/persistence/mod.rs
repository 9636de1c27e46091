//! Database layer: pool, migrations, and access for the transaction log,
//! portfolio, OHLCV bars and demographic tables.

mod audit;
mod ohlcv;
mod people;
mod pool;
mod portfolio;
mod transactions;

pub use audit::validate_store;
pub use ohlcv::{insert_bars, latest_close, open_price_at};
pub use people::{insert_child, insert_parent};
pub use pool::{create_pool_and_migrate, run_migrations};
pub use portfolio::{
    PositionRow, get_position, list_positions, lock_position, position_row_to_entry,
    seed_position_row, upsert_position,
};
pub use sqlx::PgPool;
pub use transactions::{
    TransactionRow, append_transaction, list_transactions, list_transactions_for_key,
    transaction_row_to_transaction,
};
