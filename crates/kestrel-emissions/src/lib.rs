//! # kestrel-emissions
//!
//! Reward accounting for the Kestrel chain.
//!
//! Every block, a fixed reward budget is split three ways: validators (paid
//! through the fee collector), external-chain observers (paid into an
//! undistributed pool and allocated by ballot outcome), and TSS signers
//! (accumulated in their own pool). Observers accrue withdrawable balances
//! that they cash out through a one-shot withdraw/settlement flow.
//!
//! ## Modules
//!
//! - [`params`] — versioned module parameters with mandatory validation
//! - [`rewards`] — reward schedule and the per-block reward computer
//! - [`distribution`] — ballot-weighted observer reward/slash distribution
//! - [`withdrawable`] — per-observer accrued balance ledger
//! - [`settlement`] — withdraw request creation and end-of-block settlement
//! - [`tracker`] — per-category emission trackers (governance top-ups)
//! - [`msgs`] — authorized message handlers
//! - [`queries`] — read-only query surface
//! - [`genesis`] — genesis import/export
//! - [`migrations`] — parameter schema migrations (v3 through v7)
//! - [`accounts`] — module pool accounts and the governance authority
//! - [`ports`] — traits for the bank, ballot, and event collaborators
//! - [`keys`] — persisted state layout
//! - [`testing`] — in-memory collaborator doubles for tests

pub mod accounts;
pub mod distribution;
pub mod genesis;
pub mod keys;
pub mod migrations;
pub mod msgs;
pub mod params;
pub mod ports;
pub mod queries;
pub mod rewards;
pub mod settlement;
pub mod testing;
pub mod tracker;
pub mod withdrawable;

/// Error types for emissions operations.
#[derive(Debug, thiserror::Error)]
pub enum EmissionsError {
    /// Module params were never written by genesis or migration.
    #[error("emissions params not found")]
    ParamsNotFound,

    /// No withdrawable emissions record exists for the address.
    #[error("no withdrawable emissions for address {0}")]
    EmissionsNotFound(String),

    /// No emission tracker exists for the category.
    #[error("no emission tracker for category {0}")]
    TrackerNotFound(String),

    /// The address string is malformed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The amount is zero, negative, or otherwise out of range.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// The requested amount exceeds what is available to withdraw.
    #[error("not enough emissions available: requested {requested}, available {available}")]
    NotEnoughEmissionsAvailable {
        /// The requested amount.
        requested: u64,
        /// The available balance.
        available: u64,
    },

    /// A pool transfer could not be funded.
    #[error("rewards pool does not have enough balance: requested {requested}, available {available}")]
    RewardsPoolBalance {
        /// The transfer amount.
        requested: u64,
        /// The pool balance.
        available: u64,
    },

    /// Params failed validation and were not written.
    #[error("unable to set params: {0}")]
    UnableToSetParams(String),

    /// The message signer is not the governance authority.
    #[error("invalid signer: expected {expected}, got {actual}")]
    InvalidSigner {
        /// The configured governance authority.
        expected: String,
        /// The signer on the message.
        actual: String,
    },

    /// A schema migration could not complete; the upgrade must not proceed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Underlying store failure.
    #[error("store error: {0}")]
    Store(#[from] kestrel_store::StoreError),
}

/// Convenience result type for emissions operations.
pub type Result<T> = std::result::Result<T, EmissionsError>;
