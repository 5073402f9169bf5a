//! In-memory doubles for the module's collaborator ports.
//!
//! Shared by the unit tests in this crate and by the workspace integration
//! tests; not intended for production hosts.

use std::collections::BTreeMap;

use kestrel_types::address::Address;
use kestrel_types::ballot::Ballot;
use kestrel_types::events::EmissionsEvent;
use kestrel_types::{Amount, BlockHeight};

use crate::ports::{BallotProvider, BankKeeper, EventSink};
use crate::{EmissionsError, Result};

/// Deterministic test address: 20 repeated bytes, hex encoded.
pub fn test_address(byte: u8) -> Address {
    Address::parse(&hex::encode([byte; 20])).expect("repeated-byte address is valid hex")
}

/// Account-balance map implementing [`BankKeeper`].
#[derive(Clone, Debug, Default)]
pub struct MemBank {
    balances: BTreeMap<Address, Amount>,
}

impl MemBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit an account out of thin air.
    pub fn mint(&mut self, account: &Address, amount: Amount) {
        *self.balances.entry(account.clone()).or_default() += amount;
    }
}

impl BankKeeper for MemBank {
    fn balance(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn send(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let available = self.balance(from);
        if amount > available {
            return Err(EmissionsError::RewardsPoolBalance {
                requested: amount,
                available,
            });
        }
        *self.balances.entry(from.clone()).or_default() -= amount;
        *self.balances.entry(to.clone()).or_default() += amount;
        Ok(())
    }
}

/// Fixed ballot set implementing [`BallotProvider`], recording purge calls.
#[derive(Clone, Debug, Default)]
pub struct StaticBallots {
    pub ballots: Vec<Ballot>,
    /// `(height, maturity_blocks, delete_all)` per purge call.
    pub purge_calls: Vec<(BlockHeight, u64, bool)>,
}

impl StaticBallots {
    pub fn new(ballots: Vec<Ballot>) -> Self {
        Self {
            ballots,
            purge_calls: Vec::new(),
        }
    }
}

impl BallotProvider for StaticBallots {
    fn matured_ballots(&self, _height: BlockHeight, _maturity_blocks: u64) -> Vec<Ballot> {
        self.ballots.clone()
    }

    fn clear_matured_ballots(
        &mut self,
        height: BlockHeight,
        maturity_blocks: u64,
        delete_all: bool,
    ) {
        self.purge_calls.push((height, maturity_blocks, delete_all));
    }
}

/// Buffering [`EventSink`].
#[derive(Clone, Debug, Default)]
pub struct BufferSink {
    pub events: Vec<EmissionsEvent>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for BufferSink {
    fn emit(&mut self, event: EmissionsEvent) {
        self.events.push(event);
    }
}
