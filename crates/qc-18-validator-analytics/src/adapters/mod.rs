//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits.

mod state_store;

pub use state_store::InMemoryStateStore;
