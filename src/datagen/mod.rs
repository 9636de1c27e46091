//! Seeded synthetic-data generators: OHLCV price series, investor trading
//! histories, and demographic records. All randomness flows from explicit
//! seeds through ChaCha8, so a dataset is reproducible from its seed.

pub mod chains;
pub mod investors;
pub mod people;
pub mod prices;

pub use chains::{ChainLeg, transaction_chain};
pub use investors::{InvestorConfig, generate_into_ledger};
pub use people::{Child, Parent, PersonSource, SeededPeople, generate_households};
pub use prices::{BarFeed, GbmParams, PriceFeed, generate_bars};

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

/// Standard normal sample via Box-Muller over the seeded uniforms.
pub(crate) fn standard_normal(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = 1.0 - rng.gen_range(0.0..1.0); // (0, 1], keeps ln finite
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Seed-reproducible id, unlike `Uuid::new_v4`.
pub(crate) fn deterministic_uuid(rng: &mut ChaCha8Rng) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    Uuid::from_bytes(bytes)
}
