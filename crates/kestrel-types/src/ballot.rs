//! Finalized observer ballots.
//!
//! A ballot is the tallied outcome of an external-chain observation: a list
//! of voters, the vote each voter cast, and the final status the network
//! agreed on. The emissions module only consumes finalized ballots; the
//! voting protocol itself lives in the observer subsystem.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The vote an individual observer cast on an observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    SuccessObservation,
    FailureObservation,
    /// The observer never voted before the ballot was finalized.
    NotYetVoted,
}

/// The finalization state of a ballot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallotStatus {
    FinalizedSuccess,
    FinalizedFailure,
    InProgress,
}

/// A ballot as produced by the observer subsystem.
///
/// `voter_list` and `votes` are parallel: `votes[i]` is the vote cast by
/// `voter_list[i]`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ballot {
    pub identifier: String,
    pub voter_list: Vec<String>,
    pub votes: Vec<VoteType>,
    pub ballot_status: BallotStatus,
}

/// Per-voter tally of matching reward units and mismatched votes across a
/// set of ballots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VoterTally {
    /// Number of votes that agreed with the final ballot status.
    pub matching_units: u64,
    /// Number of votes (including not-voted entries) that disagreed.
    pub mismatched_votes: u64,
}

impl Ballot {
    /// Whether this ballot has reached a final status.
    pub fn is_finalized(&self) -> bool {
        !matches!(self.ballot_status, BallotStatus::InProgress)
    }

    /// The vote that agrees with the final status, if the ballot is final.
    pub fn winning_vote(&self) -> Option<VoteType> {
        match self.ballot_status {
            BallotStatus::FinalizedSuccess => Some(VoteType::SuccessObservation),
            BallotStatus::FinalizedFailure => Some(VoteType::FailureObservation),
            BallotStatus::InProgress => None,
        }
    }

    /// Fold this ballot's votes into a per-voter tally map.
    ///
    /// Non-finalized ballots contribute nothing. A voter list longer or
    /// shorter than the vote list is tolerated; the excess entries are
    /// ignored with a warning.
    pub fn tally_into(&self, tallies: &mut BTreeMap<String, VoterTally>) {
        let Some(winning) = self.winning_vote() else {
            return;
        };
        if self.voter_list.len() != self.votes.len() {
            tracing::warn!(
                ballot = %self.identifier,
                voters = self.voter_list.len(),
                votes = self.votes.len(),
                "ballot voter/vote list length mismatch"
            );
        }
        for (voter, vote) in self.voter_list.iter().zip(self.votes.iter()) {
            let tally = tallies.entry(voter.clone()).or_default();
            if *vote == winning {
                tally.matching_units += 1;
            } else {
                tally.mismatched_votes += 1;
            }
        }
    }
}
