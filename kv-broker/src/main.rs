use anyhow::Result;
use clap::Parser;
use kv_broker::api::{self, AppState};
use kv_broker::args::Args;
use kv_broker::catalog;
use kv_broker::config::BrokerConfig;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = BrokerConfig::load(&args)?;

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = config.log_level() {
        logger.filter_level(level);
    }
    logger.init();

    info!("=== KV Broker Starting ===");
    if config.disable_auth {
        info!("Auth checking is disabled");
    }

    let catalog = catalog::load(config.catalog.as_deref())?;
    let state = AppState::new(catalog, config.guard(), config.host_string.clone());

    api::serve(state, &config.listen_addr()).await
}
