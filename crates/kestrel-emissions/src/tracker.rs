//! Emission trackers.
//!
//! A tracker is a simple incrementable ledger per reward category, topped
//! up by a governance message. Trackers are independent of the per-block
//! reward machinery; they must be seeded (at genesis) before they can be
//! incremented.

use serde::{Deserialize, Serialize};

use kestrel_store::StateStore;
use kestrel_types::Amount;

use crate::keys::{tracker_key, TRACKER_PREFIX};
use crate::{EmissionsError, Result};

/// Remaining top-up budget for one reward category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionTracker {
    pub category: String,
    pub amount_left: Amount,
}

/// The tracker for a category, if it exists.
pub fn get_tracker<S: StateStore + ?Sized>(
    store: &S,
    category: &str,
) -> Result<Option<EmissionTracker>> {
    Ok(kestrel_store::get_typed(store, &tracker_key(category))?)
}

/// Write a tracker, creating or replacing it.
pub fn set_tracker<S: StateStore + ?Sized>(store: &mut S, tracker: &EmissionTracker) -> Result<()> {
    Ok(kestrel_store::set_typed(
        store,
        &tracker_key(&tracker.category),
        tracker,
    )?)
}

/// All trackers, in category order.
pub fn all_trackers<S: StateStore + ?Sized>(store: &S) -> Result<Vec<EmissionTracker>> {
    store
        .iter_prefix(TRACKER_PREFIX)
        .into_iter()
        .map(|(key, bytes)| {
            serde_json::from_slice(&bytes).map_err(|e| {
                EmissionsError::Store(kestrel_store::StoreError::Codec {
                    key: String::from_utf8_lossy(&key).into_owned(),
                    reason: e.to_string(),
                })
            })
        })
        .collect()
}

/// Increment a category's remaining amount.
///
/// # Errors
///
/// - [`EmissionsError::TrackerNotFound`] if the category was never seeded
pub fn add_token_emission<S: StateStore + ?Sized>(
    store: &mut S,
    category: &str,
    amount: Amount,
) -> Result<Amount> {
    let mut tracker = get_tracker(store, category)?
        .ok_or_else(|| EmissionsError::TrackerNotFound(category.to_string()))?;
    tracker.amount_left = tracker.amount_left.saturating_add(amount);
    set_tracker(store, &tracker)?;
    tracing::info!(category, amount, amount_left = tracker.amount_left, "token emission added");
    Ok(tracker.amount_left)
}
