//! Collaborator traits.
//!
//! The bank, the observer ballot subsystem, and the event channel are all
//! owned by other parts of the host chain; the emissions module talks to
//! them through these traits. [`crate::testing`] provides in-memory
//! implementations.

use kestrel_types::address::Address;
use kestrel_types::ballot::Ballot;
use kestrel_types::events::EmissionsEvent;
use kestrel_types::{Amount, BlockHeight};

use crate::Result;

/// Token transfers and balance lookups.
pub trait BankKeeper {
    /// Current balance of an account.
    fn balance(&self, account: &Address) -> Amount;

    /// Move `amount` from one account to another.
    ///
    /// # Errors
    ///
    /// - [`crate::EmissionsError::RewardsPoolBalance`] if `from` cannot
    ///   cover the transfer
    fn send(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()>;
}

/// Output surface of the external observer ballot subsystem.
pub trait BallotProvider {
    /// Ballots that matured at `height` given the configured maturity
    /// window. Includes still-pending ballots; callers filter on status.
    fn matured_ballots(&self, height: BlockHeight, maturity_blocks: u64) -> Vec<Ballot>;

    /// Purge ballots that matured at `height`. With `delete_all` false only
    /// finalized ballots are removed; with it true, pending ballots past the
    /// deletion buffer are removed as well.
    fn clear_matured_ballots(&mut self, height: BlockHeight, maturity_blocks: u64, delete_all: bool);
}

/// Write-only event channel. Never read back by the state machine.
pub trait EventSink {
    /// Emit a single event. Best effort; must not fail.
    fn emit(&mut self, event: EmissionsEvent);
}
