//! # Validator Analytics Server
//!
//! Serves the analytics endpoints over an in-memory state store seeded with
//! a genesis state.
//!
//! Environment:
//! - `QC_ANALYTICS_LISTEN` - bind address (default `127.0.0.1:5052`)
//! - `QC_ANALYTICS_GENESIS_VALIDATORS` - genesis registry size (default 64)
//! - `QC_ANALYTICS_FORK` - genesis fork name (default `deneb`)
//! - `QC_ANALYTICS_*` - see `AnalyticsConfig::from_env`
//! - `RUST_LOG` - log filter (default `info`)

use anyhow::{Context, Result};
use qc_18_validator_analytics::{
    router, AnalyticsConfig, AnalyticsService, ConsensusState, ForkVersion,
    InMemoryStateStore, PublicKey, Validator, GWEI_PER_ETH,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_LISTEN: &str = "127.0.0.1:5052";
const DEFAULT_GENESIS_VALIDATORS: u64 = 64;

fn genesis_state() -> Result<ConsensusState> {
    let count = match std::env::var("QC_ANALYTICS_GENESIS_VALIDATORS") {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("QC_ANALYTICS_GENESIS_VALIDATORS={raw:?}"))?,
        Err(_) => DEFAULT_GENESIS_VALIDATORS,
    };
    let fork = match std::env::var("QC_ANALYTICS_FORK") {
        Ok(raw) => ForkVersion::ALL
            .into_iter()
            .find(|f| f.name() == raw)
            .with_context(|| format!("unknown fork {raw:?}"))?,
        Err(_) => ForkVersion::Deneb,
    };

    let validators = (0..count)
        .map(|i| {
            let mut key = [0u8; 48];
            key[..8].copy_from_slice(&i.to_be_bytes());
            Validator::new(PublicKey(key), 32 * GWEI_PER_ETH)
        })
        .collect();
    Ok(ConsensusState::genesis(fork, validators)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = AnalyticsConfig::from_env()?;
    let listen: SocketAddr = std::env::var("QC_ANALYTICS_LISTEN")
        .unwrap_or_else(|_| DEFAULT_LISTEN.to_string())
        .parse()
        .context("QC_ANALYTICS_LISTEN")?;

    let store = Arc::new(InMemoryStateStore::new(&config)?);
    let genesis = genesis_state()?;
    info!(
        "[qc-18] Genesis: {} validators at {}",
        genesis.validators.len(),
        genesis.version()
    );
    store.publish([0u8; 32], genesis);

    let service = Arc::new(AnalyticsService::new(Arc::clone(&store), config)?);
    let app = router(service);

    let listener = TcpListener::bind(listen).await?;
    info!("[qc-18] Validator analytics listening on {}", listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("[qc-18] Failed to listen for ctrl-c: {}", e);
            }
            info!("[qc-18] Shutting down");
        })
        .await?;

    Ok(())
}
