//! Wavefront Server Library
//!
//! Session-based arcade shooter server. Clients create or join a six-letter
//! session over WebTransport, ready up, and fight scripted enemy waves
//! together; every session runs its own fixed-rate simulation.
//!
//! # Features
//!
//! - `input_validation` - Reject malformed session ids and mouse deltas (enabled by default)
//! - `metrics_endpoint` - Serve Prometheus/JSON metrics over HTTP (enabled by default)
//! - `minimal` - Build without optional features for testing/debugging

pub mod config;
pub mod game;
pub mod lobby;
pub mod metrics;
pub mod net;
pub mod util;
