//! Ports module for Validator Analytics

pub mod inbound;
pub mod outbound;

pub use inbound::{RequestContext, ValidatorAnalyticsApi};
pub use outbound::StateProvider;
