//! Integration test crate for the Kestrel emissions module.
//!
//! This crate has no library code beyond a logging helper — it only
//! contains integration tests that exercise full block flows across the
//! workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p kestrel-integration-tests
//! ```

/// Install a subscriber printing `RUST_LOG`-filtered logs during tests.
/// Safe to call from every test; only the first call wins.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
