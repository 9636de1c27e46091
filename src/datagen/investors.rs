//! Synthetic investor histories: per user and ticker, a long chain and a
//! short chain priced off the bar open at each leg's timestamp, appended
//! through the ledger so the portfolio is reconciled as the data is made.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use uuid::Uuid;

use crate::datagen::chains::transaction_chain;
use crate::datagen::deterministic_uuid;
use crate::datagen::prices::{BarFeed, PriceFeed};
use crate::engine::Ledger;
use crate::error::LedgerError;
use crate::types::transaction::{Action, NewTransaction, Side};

#[derive(Debug, Clone)]
pub struct InvestorConfig {
    pub investors: usize,
    /// Legs per long chain and per short chain, per ticker.
    pub long_legs: usize,
    pub short_legs: usize,
    pub seed: u64,
}

impl Default for InvestorConfig {
    fn default() -> Self {
        Self {
            investors: 5,
            long_legs: 3,
            short_legs: 2,
            seed: 0,
        }
    }
}

/// Deterministic user ids for a reproducible dataset.
pub fn investor_ids(count: usize, rng: &mut ChaCha8Rng) -> Vec<Uuid> {
    (0..count).map(|_| deterministic_uuid(rng)).collect()
}

/// Build every transaction for the configured investors and append each one
/// to the ledger. Returns the transactions in the order they were appended.
pub fn generate_into_ledger(
    ledger: &mut Ledger,
    feed: &BarFeed,
    tickers: &[String],
    config: &InvestorConfig,
) -> Result<usize, LedgerError> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let users = investor_ids(config.investors, &mut rng);
    let mut appended = 0;

    for side in [Side::Long, Side::Short] {
        let legs = match side {
            Side::Long => config.long_legs,
            Side::Short => config.short_legs,
        };
        for user_id in &users {
            for ticker in tickers {
                let times = feed.timestamps(ticker);
                for leg in transaction_chain(legs, &times, &mut rng) {
                    let price = feed
                        .price_at(ticker, leg.at)
                        .ok_or_else(|| {
                            LedgerError::Validation(format!("no quote for {ticker} at {}", leg.at))
                        })?;
                    ledger.append(NewTransaction {
                        user_id: *user_id,
                        timestamp: leg.at,
                        ticker: ticker.clone(),
                        side,
                        action: leg.action,
                        quantity: leg.quantity,
                        price,
                    })?;
                    appended += 1;
                }
            }
        }
    }

    // Mark every position to the freshest close so current_value is live.
    for ticker in tickers {
        if let Some(quote) = feed.last_price(ticker) {
            ledger.mark(ticker, quote);
        }
    }

    info!(
        investors = config.investors,
        tickers = tickers.len(),
        transactions = appended,
        "generated investor dataset"
    );
    Ok(appended)
}

/// Sanity helper used by the generator's own tests: a chain is only valid
/// if every close fits inside what is open at that point.
pub fn chain_is_consistent(legs: &[(Action, f64)]) -> bool {
    let mut open = 0.0;
    for (action, quantity) in legs {
        match action {
            Action::Open => open += quantity,
            Action::Close => {
                if *quantity > open {
                    return false;
                }
                open -= quantity;
            }
        }
    }
    true
}
