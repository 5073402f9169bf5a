//! Withdraw requests and end-of-block settlement.
//!
//! A holder requests a withdraw through the message handler; the request is
//! capped to the available withdrawable balance, the balance is debited
//! immediately, and a single pending record is stored (a new request
//! overwrites any prior one). The settlement pass at the end of the block
//! attempts the pool payout once and deletes the record whether or not the
//! transfer succeeded — no retry, no queue, so settlement work per block is
//! bounded by the number of requests made in it.

use serde::{Deserialize, Serialize};

use kestrel_store::StateStore;
use kestrel_types::address::Address;
use kestrel_types::Amount;

use crate::accounts::PoolAccount;
use crate::keys::{withdraw_key, WITHDRAW_PREFIX};
use crate::ports::BankKeeper;
use crate::{withdrawable, EmissionsError, Result};

/// A pending withdraw request. At most one per address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawEmission {
    pub address: String,
    pub amount: Amount,
}

/// The pending withdraw request for an address, if any.
pub fn get_pending<S: StateStore + ?Sized>(
    store: &S,
    address: &Address,
) -> Result<Option<WithdrawEmission>> {
    Ok(kestrel_store::get_typed(
        store,
        &withdraw_key(address.as_str()),
    )?)
}

/// Create a withdraw request for `amount`, capped to the available balance.
///
/// The withdrawable balance is debited here, at request creation; the
/// payout itself happens in [`settle_withdrawals`]. Returns the amount
/// actually scheduled.
///
/// Unlike [`withdrawable::remove`], an over-request is not an error: it is
/// silently capped to the available balance.
///
/// # Errors
///
/// - [`EmissionsError::EmissionsNotFound`] if the address has no
///   withdrawable record
/// - [`EmissionsError::InvalidAmount`] if `amount` is zero
/// - [`EmissionsError::NotEnoughEmissionsAvailable`] if the available
///   balance is zero
pub fn create_withdraw_emissions<S: StateStore + ?Sized>(
    store: &mut S,
    address: &Address,
    amount: Amount,
) -> Result<Amount> {
    let record = withdrawable::get_record(store, address)?
        .ok_or_else(|| EmissionsError::EmissionsNotFound(address.to_string()))?;
    if amount == 0 {
        return Err(EmissionsError::InvalidAmount(
            "withdraw amount must be positive".to_string(),
        ));
    }
    if record.amount == 0 {
        return Err(EmissionsError::NotEnoughEmissionsAvailable {
            requested: amount,
            available: 0,
        });
    }

    let capped = amount.min(record.amount);
    withdrawable::remove(store, address, capped)?;

    let pending = WithdrawEmission {
        address: address.to_string(),
        amount: capped,
    };
    kestrel_store::set_typed(store, &withdraw_key(address.as_str()), &pending)?;
    tracing::info!(%address, requested = amount, scheduled = capped, "withdraw emission created");
    Ok(capped)
}

/// Settle every pending withdraw request. Runs after transaction
/// processing.
///
/// Each record transitions pending → settled exactly once: the payout from
/// the undistributed observer pool is attempted, the outcome is logged, and
/// the record is deleted either way. A failed payout means the holder's
/// balance was already reduced at request time and the funds stay in the
/// pool.
pub fn settle_withdrawals<S, B>(store: &mut S, bank: &mut B)
where
    S: StateStore + ?Sized,
    B: BankKeeper + ?Sized,
{
    let pool = PoolAccount::UndistributedObserverRewards.address();
    for (key, bytes) in store.iter_prefix(WITHDRAW_PREFIX) {
        let pending: WithdrawEmission = match serde_json::from_slice(&bytes) {
            Ok(pending) => pending,
            Err(e) => {
                tracing::error!(error = %e, "dropping undecodable withdraw record");
                store.delete(&key);
                continue;
            }
        };
        match Address::parse(&pending.address) {
            Ok(address) => match bank.send(&pool, &address, pending.amount) {
                Ok(()) => {
                    tracing::info!(%address, amount = pending.amount, "withdraw emission settled");
                }
                Err(e) => {
                    tracing::error!(%address, amount = pending.amount, error = %e,
                        "withdraw payout failed, request consumed without retry");
                }
            },
            Err(e) => {
                tracing::error!(address = pending.address, error = %e,
                    "dropping withdraw record with malformed address");
            }
        }
        // Consumed unconditionally: settlement is exactly-once.
        store.delete(&key);
    }
}
