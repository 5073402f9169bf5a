//! # kestrel-types
//!
//! Shared domain types for the Kestrel emissions module.
//!
//! ## Modules
//!
//! - [`address`] — account addresses and module-account derivation
//! - [`ballot`] — finalized observer ballots and vote tallying
//! - [`events`] — emissions event payloads (write-only observability)

pub mod address;
pub mod ballot;
pub mod events;

/// Token amount in micro-KES.
pub type Amount = u64;

/// Block height.
pub type BlockHeight = u64;

/// Micro-KES per KES (1 KES = 1,000,000 micro-KES).
pub const MICRO_KES_PER_KES: u64 = 1_000_000;

/// Error types for shared domain types.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    /// The address string is not a valid account address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// Convenience result type for domain type operations.
pub type Result<T> = std::result::Result<T, TypesError>;
