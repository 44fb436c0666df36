//! Integration tests for the Hue tracker
//!
//! This crate contains end-to-end tests that exercise the full stack:
//! - mock bridge REST API (axum)
//! - `hue-client` polling and merging
//! - `hue-api` store and dashboard endpoints
//!
//! # Running Tests
//!
//! ```sh
//! cargo test -p hue-tests
//! ```
//!
//! No real bridge is required; every test spins up its own mock servers
//! on ephemeral ports.
