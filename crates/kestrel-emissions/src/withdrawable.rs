//! Withdrawable emissions ledger.
//!
//! One record per observer address holding the accrued-but-unpaid reward
//! balance. Records are created lazily on first credit (or first slash) and
//! never deleted; the balance is never negative.

use serde::{Deserialize, Serialize};

use kestrel_store::StateStore;
use kestrel_types::address::Address;
use kestrel_types::Amount;

use crate::keys::{withdrawable_key, WITHDRAWABLE_PREFIX};
use crate::{EmissionsError, Result};

/// Accrued reward balance for a single observer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawableEmissions {
    pub address: String,
    pub amount: Amount,
}

/// The record for an address, if one exists.
pub fn get_record<S: StateStore + ?Sized>(
    store: &S,
    address: &Address,
) -> Result<Option<WithdrawableEmissions>> {
    Ok(kestrel_store::get_typed(
        store,
        &withdrawable_key(address.as_str()),
    )?)
}

/// Current balance for an address; zero if untracked.
pub fn get<S: StateStore + ?Sized>(store: &S, address: &Address) -> Result<Amount> {
    Ok(get_record(store, address)?.map_or(0, |r| r.amount))
}

/// All ledger records, in address order.
pub fn all<S: StateStore + ?Sized>(store: &S) -> Result<Vec<WithdrawableEmissions>> {
    store
        .iter_prefix(WITHDRAWABLE_PREFIX)
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

/// Credit an address, creating the record if absent.
pub fn add<S: StateStore + ?Sized>(store: &mut S, address: &Address, amount: Amount) -> Result<()> {
    let balance = get(store, address)?;
    write(store, address, balance.saturating_add(amount))?;
    tracing::debug!(%address, amount, "credited withdrawable emissions");
    Ok(())
}

/// Debit an address by exactly `amount`.
///
/// # Errors
///
/// - [`EmissionsError::EmissionsNotFound`] if the address has no record
/// - [`EmissionsError::InvalidAmount`] if `amount` is zero or exceeds the
///   balance — there is no partial or clamped removal
pub fn remove<S: StateStore + ?Sized>(
    store: &mut S,
    address: &Address,
    amount: Amount,
) -> Result<()> {
    let record = get_record(store, address)?
        .ok_or_else(|| EmissionsError::EmissionsNotFound(address.to_string()))?;
    if amount == 0 {
        return Err(EmissionsError::InvalidAmount(
            "removal amount must be positive".to_string(),
        ));
    }
    if amount > record.amount {
        return Err(EmissionsError::InvalidAmount(format!(
            "removal amount {amount} exceeds balance {}",
            record.amount
        )));
    }
    write(store, address, record.amount - amount)?;
    tracing::debug!(%address, amount, "removed withdrawable emissions");
    Ok(())
}

/// Slash an address, flooring the balance at zero.
///
/// An untracked address gets a zero-balance record so the slash is still
/// visible in the ledger.
pub fn slash<S: StateStore + ?Sized>(
    store: &mut S,
    address: &Address,
    amount: Amount,
) -> Result<()> {
    let balance = get(store, address)?;
    write(store, address, balance.saturating_sub(amount))?;
    tracing::debug!(%address, amount, "slashed withdrawable emissions");
    Ok(())
}

fn write<S: StateStore + ?Sized>(store: &mut S, address: &Address, amount: Amount) -> Result<()> {
    let record = WithdrawableEmissions {
        address: address.to_string(),
        amount,
    };
    Ok(kestrel_store::set_typed(
        store,
        &withdrawable_key(address.as_str()),
        &record,
    )?)
}
