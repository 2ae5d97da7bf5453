// src/bin/probe_yahoo.rs
//! Usage: probe_yahoo <SYMBOL> [DAYS]
use anyhow::{bail, Context};
use dotenv::dotenv;
use log::{error, info};
use std::env;

use price_dashboard::config::AppConfig;
use price_dashboard::services::provider::PriceProvider;
use price_dashboard::services::yahoo::YahooProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let mut args = env::args().skip(1);
    let symbol = match args.next() {
        Some(s) => s,
        None => bail!("usage: probe_yahoo <SYMBOL> [DAYS]"),
    };
    let days: u32 = match args.next() {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("DAYS must be a number, got '{}'", raw))?,
        None => 30,
    };

    let config = AppConfig::from_env()?;
    let provider = YahooProvider::new(config.yahoo_base_url, config.http_timeout)?;

    info!("Probing {} for {} days...", symbol, days);
    match provider.fetch_close(&symbol, days).await {
        Ok(series) => {
            let missing = series.points.iter().filter(|p| p.close.is_none()).count();
            info!("SUCCESS: {} observations, {} missing closes", series.points.len(), missing);
            if let (Some(first), Some(last)) = (series.points.first(), series.points.last()) {
                info!("  first: {} {:?}", first.date, first.close);
                info!("  last:  {} {:?}", last.date, last.close);
            }
            Ok(())
        }
        Err(e) => {
            error!("ERROR: {}", e);
            Err(e.into())
        }
    }
}
