//! Greenlight server binary.

use greenlight_database::{establish_pool, PostgresRecordStore};
use greenlight_error::{ConfigError, GreenlightResult};
use greenlight_models::{FallbackChain, HttpModelDriver};
use greenlight_pipeline::{Orchestrator, PipelineConfig, StageRunner};
use greenlight_server::{create_router, init_tracing, AppState, ServerConfig};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> GreenlightResult<()> {
    // Local development convenience; real deployments set the environment.
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    init_tracing(&config.log_level, config.json_logs)?;

    let provider = config.provider_kind()?;
    let chain = FallbackChain::new(config.chain()?);
    info!(
        provider = provider.name(),
        models = chain.attempts().len(),
        "assembling pipeline"
    );

    let pool = establish_pool(config.db_pool_size)?;
    let store = Arc::new(PostgresRecordStore::new(pool));

    let driver = Arc::new(HttpModelDriver::new(
        provider,
        config.base_url.clone(),
        config.api_key.clone(),
    ));
    let runner = StageRunner::new(driver, chain);
    let orchestrator = Arc::new(Orchestrator::new(store, runner, PipelineConfig::default()));

    let router = create_router(AppState::new(orchestrator));
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| ConfigError::new(format!("failed to bind {}: {}", config.bind_addr, e)))?;
    info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| ConfigError::new(format!("server error: {}", e)))?;

    Ok(())
}
