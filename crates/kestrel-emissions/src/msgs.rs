//! Authorized message handlers.
//!
//! Each handler validates its message and mutates state, returning an error
//! to revert the triggering transaction. Handler errors never have
//! chain-wide effect.

use serde::{Deserialize, Serialize};

use kestrel_store::StateStore;
use kestrel_types::address::Address;
use kestrel_types::Amount;

use crate::accounts::{governance_authority, PoolAccount};
use crate::params::{set_params, Params};
use crate::ports::BankKeeper;
use crate::settlement::create_withdraw_emissions;
use crate::tracker::add_token_emission;
use crate::{withdrawable, EmissionsError, Result};

/// Request to withdraw accrued observer emissions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgWithdrawEmission {
    pub creator: String,
    pub amount: Amount,
}

/// Governance update of the module params.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MsgUpdateParams {
    pub authority: String,
    pub params: Params,
}

/// Governance top-up of an emission tracker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgAddTokenEmission {
    pub creator: String,
    pub category: String,
    pub amount: Amount,
}

/// Handle [`MsgWithdrawEmission`]: schedule a (possibly capped) withdraw
/// for settlement at the end of the block.
///
/// The undistributed observer pool must already cover the capped amount.
/// Settlement itself never retries, so admitting a request the pool cannot
/// pay would debit the holder's balance and then consume the request
/// without a payout; the check here rejects that request up front instead.
///
/// # Errors
///
/// - [`EmissionsError::InvalidAddress`] for a malformed creator
/// - [`EmissionsError::InvalidAmount`] for a zero amount
/// - [`EmissionsError::RewardsPoolBalance`] if the undistributed observer
///   pool cannot cover the capped amount
/// - [`EmissionsError::EmissionsNotFound`] /
///   [`EmissionsError::NotEnoughEmissionsAvailable`] per
///   [`create_withdraw_emissions`]
pub fn handle_withdraw_emission<S, B>(
    store: &mut S,
    bank: &B,
    msg: &MsgWithdrawEmission,
) -> Result<Amount>
where
    S: StateStore + ?Sized,
    B: BankKeeper + ?Sized,
{
    let creator = Address::parse(&msg.creator)
        .map_err(|_| EmissionsError::InvalidAddress(msg.creator.clone()))?;
    if msg.amount == 0 {
        return Err(EmissionsError::InvalidAmount(
            "withdraw amount must be positive".to_string(),
        ));
    }
    let capped = msg.amount.min(withdrawable::get(store, &creator)?);
    let pool_balance = bank.balance(&PoolAccount::UndistributedObserverRewards.address());
    if capped > 0 && pool_balance < capped {
        return Err(EmissionsError::RewardsPoolBalance {
            requested: capped,
            available: pool_balance,
        });
    }
    create_withdraw_emissions(store, &creator, msg.amount)
}

/// Handle [`MsgUpdateParams`]: replace the module params.
///
/// # Errors
///
/// - [`EmissionsError::InvalidSigner`] if the authority is not the
///   governance authority
/// - [`EmissionsError::UnableToSetParams`] if the new params fail
///   validation (the store is left untouched)
pub fn handle_update_params<S: StateStore + ?Sized>(
    store: &mut S,
    msg: &MsgUpdateParams,
) -> Result<()> {
    let expected = governance_authority();
    if msg.authority != expected.as_str() {
        return Err(EmissionsError::InvalidSigner {
            expected: expected.to_string(),
            actual: msg.authority.clone(),
        });
    }
    set_params(store, &msg.params)
}

/// Handle [`MsgAddTokenEmission`]: top up a seeded emission tracker.
///
/// # Errors
///
/// - [`EmissionsError::InvalidAddress`] for a malformed creator
/// - [`EmissionsError::TrackerNotFound`] if the category was never seeded
pub fn handle_add_token_emission<S: StateStore + ?Sized>(
    store: &mut S,
    msg: &MsgAddTokenEmission,
) -> Result<Amount> {
    Address::parse(&msg.creator)
        .map_err(|_| EmissionsError::InvalidAddress(msg.creator.clone()))?;
    add_token_emission(store, &msg.category, msg.amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kestrel_store::memory::MemStore;

    use crate::params::get_params;
    use crate::settlement::get_pending;
    use crate::testing::{test_address, MemBank};
    use crate::tracker::{set_tracker, EmissionTracker};

    fn funded_pool_bank(amount: Amount) -> MemBank {
        let mut bank = MemBank::new();
        bank.mint(&PoolAccount::UndistributedObserverRewards.address(), amount);
        bank
    }

    #[test]
    fn test_withdraw_happy_path() {
        let addr = test_address(1);
        let mut store = MemStore::new();
        withdrawable::add(&mut store, &addr, 100).expect("seed");
        let bank = funded_pool_bank(500);

        let msg = MsgWithdrawEmission {
            creator: addr.to_string(),
            amount: 80,
        };
        let scheduled = handle_withdraw_emission(&mut store, &bank, &msg).expect("handle");
        assert_eq!(scheduled, 80);
        assert!(get_pending(&store, &addr).expect("get").is_some());
    }

    #[test]
    fn test_withdraw_malformed_creator() {
        let mut store = MemStore::new();
        let msg = MsgWithdrawEmission {
            creator: "nobody".to_string(),
            amount: 80,
        };
        assert!(matches!(
            handle_withdraw_emission(&mut store, &MemBank::new(), &msg),
            Err(EmissionsError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_withdraw_zero_amount() {
        let addr = test_address(1);
        let mut store = MemStore::new();
        withdrawable::add(&mut store, &addr, 100).expect("seed");
        let msg = MsgWithdrawEmission {
            creator: addr.to_string(),
            amount: 0,
        };
        assert!(matches!(
            handle_withdraw_emission(&mut store, &funded_pool_bank(500), &msg),
            Err(EmissionsError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_withdraw_never_credited_address() {
        let addr = test_address(1);
        let mut store = MemStore::new();
        let msg = MsgWithdrawEmission {
            creator: addr.to_string(),
            amount: 10,
        };
        assert!(matches!(
            handle_withdraw_emission(&mut store, &funded_pool_bank(500), &msg),
            Err(EmissionsError::EmissionsNotFound(_))
        ));
    }

    #[test]
    fn test_withdraw_rejected_when_pool_cannot_cover() {
        let addr = test_address(1);
        let mut store = MemStore::new();
        withdrawable::add(&mut store, &addr, 100).expect("seed");
        let bank = funded_pool_bank(40);

        let msg = MsgWithdrawEmission {
            creator: addr.to_string(),
            amount: 80,
        };
        assert!(matches!(
            handle_withdraw_emission(&mut store, &bank, &msg),
            Err(EmissionsError::RewardsPoolBalance {
                requested: 80,
                available: 40,
            })
        ));
        // Rejected up front: the holder's balance is untouched and nothing
        // is pending for settlement to consume.
        assert_eq!(withdrawable::get(&store, &addr).expect("get"), 100);
        assert!(get_pending(&store, &addr).expect("get").is_none());
    }

    #[test]
    fn test_withdraw_pool_check_uses_capped_amount() {
        let addr = test_address(1);
        let mut store = MemStore::new();
        withdrawable::add(&mut store, &addr, 100).expect("seed");
        // Pool covers the balance but not the over-request; the capped
        // amount is what settlement will pay, so the request is admitted.
        let bank = funded_pool_bank(100);

        let msg = MsgWithdrawEmission {
            creator: addr.to_string(),
            amount: 1_000_000,
        };
        let scheduled = handle_withdraw_emission(&mut store, &bank, &msg).expect("handle");
        assert_eq!(scheduled, 100);
    }

    #[test]
    fn test_update_params_requires_authority() {
        let mut store = MemStore::new();
        let msg = MsgUpdateParams {
            authority: test_address(9).to_string(),
            params: Params::new(),
        };
        assert!(matches!(
            handle_update_params(&mut store, &msg),
            Err(EmissionsError::InvalidSigner { .. })
        ));
    }

    #[test]
    fn test_update_params_applies() {
        let mut store = MemStore::new();
        let mut params = Params::new();
        params.observer_slash_amount = 7;
        let msg = MsgUpdateParams {
            authority: governance_authority().to_string(),
            params,
        };
        handle_update_params(&mut store, &msg).expect("handle");
        assert_eq!(get_params(&store).expect("get").observer_slash_amount, 7);
    }

    #[test]
    fn test_update_params_validates() {
        let mut store = MemStore::new();
        let mut params = Params::new();
        params.ballot_maturity_blocks = 0;
        let msg = MsgUpdateParams {
            authority: governance_authority().to_string(),
            params,
        };
        assert!(matches!(
            handle_update_params(&mut store, &msg),
            Err(EmissionsError::UnableToSetParams(_))
        ));
    }

    #[test]
    fn test_add_token_emission() {
        let mut store = MemStore::new();
        set_tracker(
            &mut store,
            &EmissionTracker {
                category: "observer".to_string(),
                amount_left: 10,
            },
        )
        .expect("seed");
        let msg = MsgAddTokenEmission {
            creator: test_address(1).to_string(),
            category: "observer".to_string(),
            amount: 5,
        };
        assert_eq!(handle_add_token_emission(&mut store, &msg).expect("handle"), 15);
    }

    #[test]
    fn test_add_token_emission_unknown_category() {
        let mut store = MemStore::new();
        let msg = MsgAddTokenEmission {
            creator: test_address(1).to_string(),
            category: "nonexistent".to_string(),
            amount: 5,
        };
        assert!(matches!(
            handle_add_token_emission(&mut store, &msg),
            Err(EmissionsError::TrackerNotFound(_))
        ));
    }
}
