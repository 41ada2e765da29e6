//! # qc-18-validator-analytics
//!
//! Validator analytics over beacon states: a fork-aware view of the state
//! shared with the state-transition pipeline, and an epoch engine that
//! summarizes it.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Versioned state view**: fork-gated, lock-bounded, copy-on-read access
//! - **Participation**: voted vs eligible stake, per-epoch attesting balances
//! - **Active set changes**: activations, exits, slashings, ejections
//! - **Performance**: per-validator vote correctness and balance movement
//!
//! ## Architecture
//!
//! ```text
//! HTTP ──→ gateway ──→ ValidatorAnalyticsApi (service)
//!                              │
//!                              ├── StateProvider ──→ BeaconStateView ──→ snapshot
//!                              │                          ↑
//!                              │              state-transition pipeline (writer)
//!                              │
//!                              └── EpochAnalyticsEngine(snapshot) ──→ reports
//! ```
//!
//! ## Fork Gating
//!
//! | Field | Forks |
//! |-------|-------|
//! | Previous/current epoch attestations | Phase0 |
//! | Previous/current epoch participation | Altair onwards |
//! | Inactivity scores | Altair onwards |
//!
//! ## Example
//!
//! ```rust,ignore
//! use qc_18_validator_analytics::{AnalyticsConfig, AnalyticsService, InMemoryStateStore};
//! use qc_18_validator_analytics::ports::inbound::{RequestContext, ValidatorAnalyticsApi};
//!
//! let config = AnalyticsConfig::default();
//! let store = Arc::new(InMemoryStateStore::new(&config)?);
//! store.publish(state_root, state);
//!
//! let service = AnalyticsService::new(store, config)?;
//! let report = service.participation(RequestContext::background(), "head").await?;
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::InMemoryStateStore;
pub use config::{AnalyticsConfig, ConfigError};
pub use domain::{
    ActiveSetChangeReport, BeaconStateView, ConsensusState, EpochAnalyticsEngine,
    EpochParticipation, ForkData, ForkVersion, ParticipationReport, PerformanceReport, PublicKey,
    SharedState, StateId, Validator, ValidatorGroup, ValidatorId, ValidatorPerformance,
    GWEI_PER_ETH,
};
pub use error::{AnalyticsError, AnalyticsResult, StateFetchError};
pub use gateway::{router, GatewayError};
pub use service::AnalyticsService;
