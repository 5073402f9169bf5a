//! Emissions event payloads.
//!
//! Events are a write-only observability channel: they are emitted during
//! block processing and never read back by the state machine.

use serde::{Deserialize, Serialize};

use crate::{Amount, BlockHeight};

/// All events emitted by the emissions module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionsEvent {
    BlockEmissions(BlockEmissionsEvent),
    ObserverEmissions(ObserverEmissionsEvent),
}

/// Per-block reward computation summary, emitted once per rewarded block.
///
/// The factor fields are populated only while the legacy dynamic formula is
/// active; under the fixed schedule they are empty strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockEmissionsEvent {
    /// Block the rewards were computed for.
    pub height: BlockHeight,
    /// Bond factor used by the legacy dynamic formula.
    pub bond_factor: String,
    /// Duration factor used by the legacy dynamic formula.
    pub duration_factor: String,
    /// Emission pool reserves the legacy dynamic formula scaled.
    pub reserves_factor: String,
    /// Amount sent to the fee collector for validators, in micro-KES.
    pub validator_rewards: Amount,
    /// Amount sent to the undistributed observer pool, in micro-KES.
    pub observer_rewards: Amount,
    /// Amount sent to the undistributed TSS pool, in micro-KES.
    pub tss_rewards: Amount,
}

/// Whether an observer delta was a reward or a slash.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionType {
    Reward,
    Slash,
}

/// A single observer's balance delta from a distribution pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverEmission {
    /// Whether the delta credited or slashed the observer.
    pub emission_type: EmissionType,
    /// The observer the delta applies to.
    pub observer_address: String,
    /// Magnitude of the delta, in micro-KES.
    pub amount: Amount,
}

/// Per-block observer distribution outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverEmissionsEvent {
    /// Block the distribution ran in.
    pub height: BlockHeight,
    /// One entry per observer whose balance changed.
    pub emissions: Vec<ObserverEmission>,
}
