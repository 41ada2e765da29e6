//! # Integration Tests
//!
//! End-to-end validator analytics flows.

pub mod analytics_flows;
