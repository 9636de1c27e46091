use chrono::{Duration, Utc};
use tracing::info;

use dbforge::datagen::{self, BarFeed, GbmParams, InvestorConfig, generate_households};
use dbforge::engine::Ledger;
use dbforge::persistence;
use dbforge::types::transaction::NewTransaction;

const SEED: u64 = 0;
const TICKERS: [&str; 3] = ["SPY", "QQQ", "VTI"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dbforge=info")),
        )
        .init();

    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;
    let pool = persistence::create_pool_and_migrate(&database_url).await?;

    // Price history: 29 days of per-minute GBM bars per ticker.
    let start = Utc::now() - Duration::days(29);
    let tickers: Vec<(String, GbmParams)> = TICKERS
        .iter()
        .map(|t| (t.to_string(), GbmParams::default()))
        .collect();
    let bars = datagen::generate_bars(&tickers, start, 60 * 16 * 29, SEED);
    persistence::insert_bars(&pool, &bars).await?;
    let feed = BarFeed::new(bars);

    // Investor histories, reconciled in memory first so generation fails
    // fast, then replayed through the transactional append path.
    let ticker_names: Vec<String> = TICKERS.iter().map(|t| t.to_string()).collect();
    let mut ledger = Ledger::new();
    let appended = datagen::generate_into_ledger(
        &mut ledger,
        &feed,
        &ticker_names,
        &InvestorConfig {
            seed: SEED,
            ..InvestorConfig::default()
        },
    )?;

    for txn in ledger.transactions(None) {
        persistence::append_transaction(
            &pool,
            NewTransaction {
                user_id: txn.user_id,
                timestamp: txn.timestamp,
                ticker: txn.ticker,
                side: txn.side,
                action: txn.action,
                quantity: txn.quantity,
                price: txn.price,
            },
        )
        .await?;
    }
    info!(transactions = appended, "investor dataset stored");

    // Demographics.
    let (parents, children) = generate_households(50, SEED);
    for parent in &parents {
        persistence::insert_parent(&pool, parent).await?;
    }
    for child in &children {
        persistence::insert_child(&pool, child).await?;
    }
    info!(
        parents = parents.len(),
        children = children.len(),
        "demographic dataset stored"
    );

    // Audit: replay the stored log and diff against the portfolio table.
    let report = persistence::validate_store(&pool).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
