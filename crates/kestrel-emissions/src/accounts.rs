//! Module pool accounts.
//!
//! The module owns three pools: the emissions pool funded at genesis with
//! the emission schedule's supply, and the two undistributed-rewards pools
//! rewards sit in until claimed. Validator rewards flow straight to the fee
//! collector, which the distribution mechanism of the host chain drains.

use kestrel_types::address::Address;

/// The named accounts the emissions module transfers between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolAccount {
    /// Source pool holding the undistributed emission supply.
    Emissions,
    /// Destination for validator rewards.
    FeeCollector,
    /// Holds observer rewards until withdrawn.
    UndistributedObserverRewards,
    /// Holds TSS signer rewards.
    UndistributedTssRewards,
}

impl PoolAccount {
    /// The account's stable name.
    pub fn name(self) -> &'static str {
        match self {
            PoolAccount::Emissions => "emissions",
            PoolAccount::FeeCollector => "fee_collector",
            PoolAccount::UndistributedObserverRewards => "undistributed_observer_rewards",
            PoolAccount::UndistributedTssRewards => "undistributed_tss_rewards",
        }
    }

    /// The account's derived address.
    pub fn address(self) -> Address {
        Address::derive_module(self.name())
    }

    /// All pool accounts, in display order.
    pub fn all() -> [PoolAccount; 4] {
        [
            PoolAccount::Emissions,
            PoolAccount::FeeCollector,
            PoolAccount::UndistributedObserverRewards,
            PoolAccount::UndistributedTssRewards,
        ]
    }
}

/// The governance authority allowed to update module params.
pub fn governance_authority() -> Address {
    Address::derive_module("governance")
}
