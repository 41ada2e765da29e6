//! # Quantum-Chain Test Suite
//!
//! Integration flows for validator analytics: HTTP gateway, service, state
//! store and a simulated state-transition pipeline wired together.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Gateway → service → store → engine flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p qc-tests
//! cargo test -p qc-tests integration::
//! ```

pub mod integration;
