use anyhow::{Context, Result};
use fancy_weather::{AppConfig, web};
use tracing_subscriber::EnvFilter;

fn init_tracing(level: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("fancy_weather={level},tower_http={level}"))
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging.level);

    tracing::info!("FancyWeather {} starting", fancy_weather::VERSION);
    web::run(config).await
}
