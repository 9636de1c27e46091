//! Synthetic per-minute OHLCV series via geometric Brownian motion, and the
//! price-feed lookup the reconciliation path consumes. Everything here is
//! deterministic for a given seed.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::datagen::standard_normal;
use crate::types::bar::OhlcvBar;

/// Quote lookups consumed by the core: an execution price for a transaction
/// timestamp and a latest price for mark-to-market.
pub trait PriceFeed {
    fn price_at(&self, ticker: &str, at: DateTime<Utc>) -> Option<f64>;
    fn last_price(&self, ticker: &str) -> Option<f64>;
}

/// GBM parameters per ticker. Drift and volatility are per-step (minute).
#[derive(Debug, Clone, Copy)]
pub struct GbmParams {
    pub s0: f64,
    pub mu: f64,
    pub sigma: f64,
}

impl Default for GbmParams {
    fn default() -> Self {
        Self {
            s0: 100.0,
            mu: 1e-5,
            sigma: 2e-3,
        }
    }
}

/// Generate `steps` one-minute bars per ticker starting at `start`.
pub fn generate_bars(
    tickers: &[(String, GbmParams)],
    start: DateTime<Utc>,
    steps: usize,
    seed: u64,
) -> Vec<OhlcvBar> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(tickers.len() * steps);

    for (ticker, params) in tickers {
        let mut price = params.s0;
        for i in 0..steps {
            let z = standard_normal(&mut rng);
            let next = price * ((params.mu - params.sigma * params.sigma / 2.0) + params.sigma * z).exp();

            let (open, close) = (price, next);
            let spread = price * params.sigma * rng.gen_range(0.1..1.0);
            let high = open.max(close) + spread;
            let low = (open.min(close) - spread).max(price * 1e-6);
            let volume = rng.gen_range(1.0e4..1.0e6_f64).round();

            bars.push(OhlcvBar {
                ticker: ticker.clone(),
                datetime: start + Duration::minutes(i as i64),
                open,
                high,
                low,
                close,
                volume,
            });
            price = next;
        }
    }

    info!(tickers = tickers.len(), steps, "generated ohlcv bars");
    bars
}

/// In-memory feed over generated bars. Resolves a timestamp to the open of
/// the latest bar at or before it, mirroring the open-price lookup the
/// dataset generator performs against the ohlcv table.
#[derive(Debug, Default)]
pub struct BarFeed {
    by_ticker: HashMap<String, Vec<OhlcvBar>>,
}

impl BarFeed {
    pub fn new(bars: Vec<OhlcvBar>) -> Self {
        let mut by_ticker: HashMap<String, Vec<OhlcvBar>> = HashMap::new();
        for bar in bars {
            by_ticker.entry(bar.ticker.clone()).or_default().push(bar);
        }
        for series in by_ticker.values_mut() {
            series.sort_by_key(|b| b.datetime);
        }
        Self { by_ticker }
    }

    pub fn timestamps(&self, ticker: &str) -> Vec<DateTime<Utc>> {
        self.by_ticker
            .get(ticker)
            .map(|series| series.iter().map(|b| b.datetime).collect())
            .unwrap_or_default()
    }
}

impl PriceFeed for BarFeed {
    fn price_at(&self, ticker: &str, at: DateTime<Utc>) -> Option<f64> {
        let series = self.by_ticker.get(ticker)?;
        let idx = series.partition_point(|b| b.datetime <= at);
        idx.checked_sub(1).map(|i| series[i].open)
    }

    fn last_price(&self, ticker: &str) -> Option<f64> {
        self.by_ticker
            .get(ticker)
            .and_then(|series| series.last())
            .map(|b| b.close)
    }
}
