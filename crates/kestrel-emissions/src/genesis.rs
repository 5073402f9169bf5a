//! Genesis import and export.

use serde::{Deserialize, Serialize};

use kestrel_store::StateStore;

use crate::params::{set_params, Params};
use crate::tracker::{all_trackers, set_tracker, EmissionTracker};
use crate::withdrawable::{self, WithdrawableEmissions};
use crate::{EmissionsError, Result};

/// Initial module state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenesisState {
    pub params: Params,
    #[serde(default)]
    pub withdrawable_emissions: Vec<WithdrawableEmissions>,
    #[serde(default)]
    pub emission_trackers: Vec<EmissionTracker>,
}

impl GenesisState {
    /// Defaults: current params, empty ledgers, the three reward-category
    /// trackers seeded at zero. Trackers are listed in category order, the
    /// same order [`export_genesis`] reads them back in.
    pub fn new() -> Self {
        Self {
            params: Params::new(),
            withdrawable_emissions: Vec::new(),
            emission_trackers: ["observer", "tss", "validator"]
                .into_iter()
                .map(|category| EmissionTracker {
                    category: category.to_string(),
                    amount_left: 0,
                })
                .collect(),
        }
    }
}

impl Default for GenesisState {
    fn default() -> Self {
        Self::new()
    }
}

/// Write the genesis state. Params are validated; a failure aborts genesis
/// before anything else is written.
pub fn init_genesis<S: StateStore + ?Sized>(store: &mut S, state: &GenesisState) -> Result<()> {
    set_params(store, &state.params)?;
    for record in &state.withdrawable_emissions {
        let address = kestrel_types::address::Address::parse(&record.address)
            .map_err(|_| EmissionsError::InvalidAddress(record.address.clone()))?;
        withdrawable::add(store, &address, record.amount)?;
    }
    for tracker in &state.emission_trackers {
        set_tracker(store, tracker)?;
    }
    tracing::info!(
        balances = state.withdrawable_emissions.len(),
        trackers = state.emission_trackers.len(),
        "emissions genesis initialized"
    );
    Ok(())
}

/// Read the full module state back out.
pub fn export_genesis<S: StateStore + ?Sized>(store: &S) -> Result<GenesisState> {
    Ok(GenesisState {
        params: crate::params::get_params(store)?,
        withdrawable_emissions: withdrawable::all(store)?,
        emission_trackers: all_trackers(store)?,
    })
}
