//! Portfolio engine: the pure position update rule, the append-only ledger
//! that drives it, and the replay validator that audits it.

pub mod ledger;
pub mod reconciler;
pub mod validator;

pub use ledger::{Ledger, SharedLedger};
pub use reconciler::{apply, mark};
pub use validator::{DriftEntry, DriftReport, replay, validate};
