use slp_validator::{
    api::Server,
    config::Config,
    ingest::{seed_checkpoints, SnapshotLoader},
    state::SharedValidator,
    validation::SlpValidator,
};
use tracing::info;

/// The main entry point for the validator service.
///
/// Initializes logging, loads the configuration, fills the store from the
/// configured snapshot, seeds checkpoints, and serves the JSON-RPC API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // The configuration path may be given as the first argument.
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/default.toml".to_string());
    let config = Config::load(&path)?;
    info!("SLP validator starting with config: {:?}", config);

    let validator = SharedValidator::new(SlpValidator::new(config.validator.clone()));

    // Fill the store before anything can ask about transactions in it
    let loader = SnapshotLoader::new(config.store.clone());
    loader.ingest(&validator).await?;
    seed_checkpoints(&config.checkpoints, &validator).await;

    let server = Server::new(config.api, validator);
    server.start().await?;

    Ok(())
}
