//! Read-only query surface.

use serde::{Deserialize, Serialize};

use kestrel_store::StateStore;
use kestrel_types::address::Address;
use kestrel_types::{Amount, BlockHeight};

use crate::accounts::PoolAccount;
use crate::params::get_params;
use crate::ports::BankKeeper;
use crate::rewards::RewardSchedule;
use crate::tracker::{all_trackers, EmissionTracker};
use crate::{withdrawable, Result};

/// Legacy reward-formula factors. Retained as a diagnostic from the
/// dynamic-formula era; the bond and duration factors are zero once the
/// fixed schedule is active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmissionsFactors {
    pub reserves_factor: String,
    pub bond_factor: String,
    pub duration_factor: String,
}

/// A named module pool and its address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolAddress {
    pub name: String,
    pub address: String,
}

/// Pool balances plus the emission trackers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances {
    pub pools: Vec<PoolBalance>,
    pub trackers: Vec<EmissionTracker>,
}

/// Balance of one module pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolBalance {
    pub name: String,
    pub address: String,
    pub amount: Amount,
}

/// Current emissions factors at `height`.
pub fn get_emissions_factors<S, B>(store: &S, bank: &B, height: BlockHeight) -> Result<EmissionsFactors>
where
    S: StateStore + ?Sized,
    B: BankKeeper + ?Sized,
{
    let params = get_params(store)?;
    let schedule = RewardSchedule::from_params(&params);
    let reserves = bank.balance(&PoolAccount::Emissions.address());
    Ok(EmissionsFactors {
        reserves_factor: reserves.to_string(),
        bond_factor: format!("{:.6}", schedule.bond_factor()),
        duration_factor: format!("{:.6}", schedule.duration_factor(height)),
    })
}

/// Withdrawable balance for an address; zero if untracked.
pub fn show_available_emissions<S: StateStore + ?Sized>(
    store: &S,
    address: &Address,
) -> Result<Amount> {
    withdrawable::get(store, address)
}

/// The module's pool accounts.
pub fn list_pool_addresses() -> Vec<PoolAddress> {
    PoolAccount::all()
        .iter()
        .map(|pool| PoolAddress {
            name: pool.name().to_string(),
            address: pool.address().to_string(),
        })
        .collect()
}

/// Pool balances and emission trackers.
pub fn list_balances<S, B>(store: &S, bank: &B) -> Result<Balances>
where
    S: StateStore + ?Sized,
    B: BankKeeper + ?Sized,
{
    let pools = PoolAccount::all()
        .iter()
        .map(|pool| PoolBalance {
            name: pool.name().to_string(),
            address: pool.address().to_string(),
            amount: bank.balance(&pool.address()),
        })
        .collect();
    Ok(Balances {
        pools,
        trackers: all_trackers(store)?,
    })
}
