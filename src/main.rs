use anyhow::Result;
use dotenv::dotenv;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use price_dashboard::config::AppConfig;
use price_dashboard::routes;
use price_dashboard::services::dashboard::Dashboard;
use price_dashboard::services::fetcher::SeriesFetcher;
use price_dashboard::services::provider::PriceProvider;
use price_dashboard::services::yahoo::YahooProvider;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = AppConfig::from_env()?;
    info!(
        "Using PORT: {}, cache TTL: {}s, provider: {}",
        config.port,
        config.cache_ttl.as_secs(),
        config.yahoo_base_url
    );

    let provider = YahooProvider::new(config.yahoo_base_url.clone(), config.http_timeout)?;
    info!("Price provider: {}", provider.name());
    let fetcher = SeriesFetcher::new(Arc::new(provider), config.cache_ttl);
    let dashboard = Arc::new(Dashboard::new(fetcher));

    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET"]);

    let api = routes::routes(dashboard).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
