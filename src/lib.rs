//! dbforge: synthetic market and demographic dataset generation backed by a
//! portfolio reconciliation engine. Every trade appended to the log updates
//! its (user, ticker, side) aggregate through one pure function, and the
//! validator can rebuild the whole portfolio from the log to prove the two
//! never drift.

pub mod datagen;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod types;
