// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use move_bridge_server::{
    api::router,
    balances::BalanceAggregator,
    blockchain::RpcBalanceReader,
    config::{AppConfig, LogFormat, DEFAULT_LOG_FILTER},
    registry::{ChainRegistry, TokenRegistry},
    state::AppState,
    storage::UserLedger,
};

type StartupError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    let _ = match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn run() -> Result<(), StartupError> {
    let tokens = Arc::new(TokenRegistry::builtin());
    let config = AppConfig::from_env(&tokens)?;
    init_tracing(config.log_format);

    let chains = Arc::new(ChainRegistry::with_supported(&config.supported_chain_ids)?);

    let ledger_path = config.ledger_path();
    let ledger = UserLedger::open(&ledger_path)?;
    tracing::info!(path = %ledger_path.display(), "User ledger opened");

    let reader = Arc::new(RpcBalanceReader::new(config.rpc_timeout));
    let aggregator = BalanceAggregator::new(
        tokens.clone(),
        chains.clone(),
        reader,
        Arc::new(ledger.clone()),
    )
    .with_overrides(config.overrides())
    .with_ledger_timeout(config.ledger_timeout);

    let state = AppState::new(aggregator, ledger, tokens, chains.clone(), config.app_env.clone());
    let app = router(state);

    let addr = config.bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        %addr,
        env = %config.app_env,
        chains = ?chains.list_supported_chain_ids(),
        rpc_override = config.rpc_url.is_some(),
        contract_overrides = config.contract_overrides.len(),
        "0xMove bridge server listening (docs at /docs)"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        // The subscriber may not be installed yet when configuration fails.
        eprintln!("move-bridge-server: {e}");
        tracing::error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}
