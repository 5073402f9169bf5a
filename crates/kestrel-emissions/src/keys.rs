//! Persisted state layout.
//!
//! Four fixed regions of the module's key space: the params singleton, the
//! withdrawable-emissions records keyed by address, the pending withdraw
//! requests keyed by address, and the emission trackers keyed by category.

/// Store key for the [`crate::params::Params`] singleton.
pub const PARAMS_KEY: &[u8] = b"emissions/params";

/// Key prefix for withdrawable-emissions records.
pub const WITHDRAWABLE_PREFIX: &[u8] = b"emissions/withdrawable/";

/// Key prefix for pending withdraw requests.
pub const WITHDRAW_PREFIX: &[u8] = b"emissions/withdraw/";

/// Key prefix for emission trackers.
pub const TRACKER_PREFIX: &[u8] = b"emissions/tracker/";

/// Key of the withdrawable-emissions record for an address.
pub fn withdrawable_key(address: &str) -> Vec<u8> {
    let mut key = WITHDRAWABLE_PREFIX.to_vec();
    key.extend_from_slice(address.as_bytes());
    key
}

/// Key of the pending withdraw request for an address.
pub fn withdraw_key(address: &str) -> Vec<u8> {
    let mut key = WITHDRAW_PREFIX.to_vec();
    key.extend_from_slice(address.as_bytes());
    key
}

/// Key of the emission tracker for a category.
pub fn tracker_key(category: &str) -> Vec<u8> {
    let mut key = TRACKER_PREFIX.to_vec();
    key.extend_from_slice(category.as_bytes());
    key
}
