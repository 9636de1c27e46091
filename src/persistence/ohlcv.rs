//! OHLCV persistence: bar inserts and the price lookups the dataset
//! generator and mark-to-market use.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::types::bar::OhlcvBar;

const INSERT_CHUNK: usize = 5_000;

/// Insert bars in bulk, one UNNEST statement per chunk. A generated run is
/// tens of thousands of bars; row-at-a-time round trips are far too slow.
pub async fn insert_bars(pool: &PgPool, bars: &[OhlcvBar]) -> Result<(), sqlx::Error> {
    for chunk in bars.chunks(INSERT_CHUNK) {
        let mut datetimes = Vec::with_capacity(chunk.len());
        let mut tickers = Vec::with_capacity(chunk.len());
        let mut opens = Vec::with_capacity(chunk.len());
        let mut highs = Vec::with_capacity(chunk.len());
        let mut lows = Vec::with_capacity(chunk.len());
        let mut closes = Vec::with_capacity(chunk.len());
        let mut volumes = Vec::with_capacity(chunk.len());
        for bar in chunk {
            datetimes.push(bar.datetime);
            tickers.push(bar.ticker.clone());
            opens.push(bar.open);
            highs.push(bar.high);
            lows.push(bar.low);
            closes.push(bar.close);
            volumes.push(bar.volume);
        }

        sqlx::query(
            "INSERT INTO ohlcv (datetime, ticker, open, high, low, close, volume) \
             SELECT * FROM UNNEST($1::timestamptz[], $2::text[], $3::float8[], \
                                  $4::float8[], $5::float8[], $6::float8[], $7::float8[])",
        )
        .bind(&datetimes)
        .bind(&tickers)
        .bind(&opens)
        .bind(&highs)
        .bind(&lows)
        .bind(&closes)
        .bind(&volumes)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Open price of the latest bar at or before `at`.
pub async fn open_price_at(
    pool: &PgPool,
    ticker: &str,
    at: DateTime<Utc>,
) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT open FROM ohlcv WHERE ticker = $1 AND datetime <= $2 \
         ORDER BY datetime DESC LIMIT 1",
    )
    .bind(ticker)
    .bind(at)
    .fetch_optional(pool)
    .await
}

/// Close of the most recent bar for a ticker.
pub async fn latest_close(pool: &PgPool, ticker: &str) -> Result<Option<f64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT close FROM ohlcv WHERE ticker = $1 ORDER BY datetime DESC LIMIT 1",
    )
    .bind(ticker)
    .fetch_optional(pool)
    .await
}
