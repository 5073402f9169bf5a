//! Ballot-weighted observer reward distribution.
//!
//! Once per block the observer reward for that block is divided equally
//! among all matching votes on the ballots that matured this block. Votes
//! that disagree with a ballot's final status (including never-voted
//! entries) are slashed by the fixed per-vote penalty. The integer-division
//! remainder stays in the undistributed pool.

use std::collections::BTreeMap;

use kestrel_store::StateStore;
use kestrel_types::address::Address;
use kestrel_types::ballot::VoterTally;
use kestrel_types::events::{
    EmissionType, EmissionsEvent, ObserverEmission, ObserverEmissionsEvent,
};
use kestrel_types::{Amount, BlockHeight};

use crate::params::Params;
use crate::ports::{BallotProvider, EventSink};
use crate::withdrawable;

/// Distribute the block's observer reward over this block's matured ballots.
///
/// A fold over the ballots: tally matching and mismatched votes per
/// observer, divide the reward by total matching votes (floor), credit
/// matchers, slash mismatchers. Individual failures (malformed address,
/// store fault) are logged and skipped so one bad record can never stall
/// block production. Matured ballots are purged afterwards: finalized ones
/// at the maturity height, everything else once the deletion buffer has
/// also elapsed.
pub fn distribute_observer_rewards<S, P, E>(
    store: &mut S,
    ballots: &mut P,
    events: &mut E,
    params: &Params,
    observer_amount: Amount,
    height: BlockHeight,
) where
    S: StateStore + ?Sized,
    P: BallotProvider + ?Sized,
    E: EventSink + ?Sized,
{
    let maturity = params.ballot_maturity_blocks;
    let matured = ballots.matured_ballots(height, maturity);
    // Nothing matured: rewards simply accumulate in the undistributed pool.
    if matured.is_empty() {
        return;
    }

    let mut tallies: BTreeMap<String, VoterTally> = BTreeMap::new();
    for ballot in &matured {
        if !ballot.is_finalized() {
            tracing::debug!(ballot = %ballot.identifier, "skipping unfinalized matured ballot");
            continue;
        }
        ballot.tally_into(&mut tallies);
    }

    if !tallies.is_empty() {
        let deltas = apply_tallies(store, params, observer_amount, &tallies);
        if !deltas.is_empty() {
            events.emit(EmissionsEvent::ObserverEmissions(ObserverEmissionsEvent {
                height,
                emissions: deltas,
            }));
        }
    }

    // Finalized ballots are dropped at maturity; pending ones get the extra
    // deletion buffer to finalize before they are purged wholesale.
    ballots.clear_matured_ballots(height, maturity, false);
    ballots.clear_matured_ballots(
        height,
        maturity + params.pending_ballots_deletion_buffer_blocks,
        true,
    );
}

fn apply_tallies<S: StateStore + ?Sized>(
    store: &mut S,
    params: &Params,
    observer_amount: Amount,
    tallies: &BTreeMap<String, VoterTally>,
) -> Vec<ObserverEmission> {
    let total_reward_units: u64 = tallies.values().map(|t| t.matching_units).sum();
    // Floor division; the remainder is deliberately left undistributed.
    let reward_per_unit = if total_reward_units > 0 {
        observer_amount / total_reward_units
    } else {
        0
    };
    tracing::debug!(
        total_reward_units,
        reward_per_unit,
        ballot_voters = tallies.len(),
        "observer reward distribution"
    );

    let mut deltas = Vec::new();
    for (voter, tally) in tallies {
        let address = match Address::parse(voter) {
            Ok(address) => address,
            Err(e) => {
                tracing::error!(voter, error = %e, "skipping malformed observer address");
                continue;
            }
        };

        if tally.matching_units > 0 && reward_per_unit > 0 {
            let reward = reward_per_unit * tally.matching_units;
            match withdrawable::add(store, &address, reward) {
                Ok(()) => deltas.push(ObserverEmission {
                    emission_type: EmissionType::Reward,
                    observer_address: address.to_string(),
                    amount: reward,
                }),
                Err(e) => tracing::error!(%address, error = %e, "failed to credit observer"),
            }
        }

        if tally.mismatched_votes > 0 {
            let slash = params
                .observer_slash_amount
                .saturating_mul(tally.mismatched_votes);
            match withdrawable::slash(store, &address, slash) {
                Ok(()) => deltas.push(ObserverEmission {
                    emission_type: EmissionType::Slash,
                    observer_address: address.to_string(),
                    amount: slash,
                }),
                Err(e) => tracing::error!(%address, error = %e, "failed to slash observer"),
            }
        }
    }
    deltas
}
