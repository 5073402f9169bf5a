//! Parameter schema migrations.
//!
//! Forward-only chain keyed by the module's consensus version. Each step
//! reads the previous schema (raw JSON for the oldest step, since the
//! pre-v3 store was written by a different params subsystem), starts from
//! current-schema defaults, keeps only the legacy fields that are present
//! and valid, applies its own schema change, and validates before writing.
//! A validation failure aborts the upgrade; the store is never left holding
//! an unvalidated params value.
//!
//! Every step is idempotent: re-running it on data already at its target
//! shape writes back identical bytes.

use serde_json::Value;

use kestrel_store::StateStore;
use kestrel_types::Amount;

use crate::keys::PARAMS_KEY;
use crate::params::{
    parse_decimal, parse_fraction, Params, DEFAULT_BALLOT_MATURITY_BLOCKS,
    DEFAULT_OBSERVER_SLASH_AMOUNT, DEFAULT_PENDING_BALLOTS_DELETION_BUFFER_BLOCKS,
};
use crate::{EmissionsError, Result};

/// Current consensus version of the module.
pub const CONSENSUS_VERSION: u64 = 7;

/// Block reward constant introduced when the fixed schedule replaced the
/// dynamic formula.
pub const INITIAL_FIXED_BLOCK_REWARD: &str = "9620949.074074074074";

/// Block reward constant after the first scheduled decay. Matches the
/// current params default.
pub const DECAYED_FIXED_BLOCK_REWARD: &str = "8037522.569444444444";

/// Run every pending migration, from `from_version` up to
/// [`CONSENSUS_VERSION`].
///
/// # Errors
///
/// - [`EmissionsError::MigrationFailed`] if `from_version` is newer than
///   this binary supports, or if any step produces params that fail
///   validation — the upgrade must not proceed on either
pub fn migrate<S: StateStore + ?Sized>(store: &mut S, from_version: u64) -> Result<()> {
    if from_version > CONSENSUS_VERSION {
        return Err(EmissionsError::MigrationFailed(format!(
            "store version {from_version} is newer than supported {CONSENSUS_VERSION}"
        )));
    }
    for version in (from_version + 1)..=CONSENSUS_VERSION {
        tracing::info!(version, "running emissions migration");
        match version {
            3 => migrate_v3(store)?,
            4 => migrate_v4(store)?,
            5 => migrate_v5(store)?,
            6 => migrate_v6(store)?,
            7 => migrate_v7(store)?,
            // Versions 1 and 2 predate the module store; nothing to do.
            _ => {}
        }
    }
    Ok(())
}

/// v3: move params out of the legacy params subsystem into the module
/// store, recovering whatever legacy fields are still valid.
pub fn migrate_v3<S: StateStore + ?Sized>(store: &mut S) -> Result<()> {
    let params = recover_params(&read_raw(store));
    write_validated(store, params)
}

/// v4: a zero observer slash amount predates slashing and means "unset";
/// replace it with the default.
pub fn migrate_v4<S: StateStore + ?Sized>(store: &mut S) -> Result<()> {
    let mut params = recover_params(&read_raw(store));
    if params.observer_slash_amount == 0 {
        tracing::warn!("observer_slash_amount unset, applying default");
        params.observer_slash_amount = DEFAULT_OBSERVER_SLASH_AMOUNT;
    }
    write_validated(store, params)
}

/// v5: introduce the ballot maturity window, defaulting it when absent or
/// zero.
pub fn migrate_v5<S: StateStore + ?Sized>(store: &mut S) -> Result<()> {
    let mut params = recover_params(&read_raw(store));
    if params.ballot_maturity_blocks == 0 {
        params.ballot_maturity_blocks = DEFAULT_BALLOT_MATURITY_BLOCKS;
    }
    write_validated(store, params)
}

/// v6: switch from the dynamic formula to the fixed emission schedule. The
/// bond/duration fields stay in the schema but stop driving rewards.
pub fn migrate_v6<S: StateStore + ?Sized>(store: &mut S) -> Result<()> {
    let mut params = recover_params(&read_raw(store));
    let fixed_active = parse_decimal(&params.block_reward_amount).is_some_and(|v| v > 0.0);
    if !fixed_active {
        params.block_reward_amount = INITIAL_FIXED_BLOCK_REWARD.to_string();
    }
    write_validated(store, params)
}

/// v7: apply the scheduled block-reward decay and introduce the
/// pending-ballot deletion buffer.
pub fn migrate_v7<S: StateStore + ?Sized>(store: &mut S) -> Result<()> {
    let mut params = recover_params(&read_raw(store));
    params.block_reward_amount = DECAYED_FIXED_BLOCK_REWARD.to_string();
    if params.pending_ballots_deletion_buffer_blocks == 0 {
        params.pending_ballots_deletion_buffer_blocks =
            DEFAULT_PENDING_BALLOTS_DELETION_BUFFER_BLOCKS;
    }
    write_validated(store, params)
}

/// The raw params value currently in the store. Absent or undecodable data
/// degrades to an empty object, which recovers to full defaults.
fn read_raw<S: StateStore + ?Sized>(store: &S) -> Value {
    match store.get(PARAMS_KEY) {
        None => {
            tracing::warn!("no stored params found during migration, starting from defaults");
            Value::Object(serde_json::Map::new())
        }
        Some(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored params are not valid JSON, starting from defaults");
            Value::Object(serde_json::Map::new())
        }),
    }
}

/// Build a current-schema `Params` from whatever legacy fields are present
/// and valid; everything else keeps its default.
fn recover_params(legacy: &Value) -> Params {
    let mut params = Params::new();

    let fraction = |name: &str| string_field(legacy, name).filter(|s| parse_fraction(s).is_some());
    if let Some(s) = fraction("validator_emission_percentage") {
        params.validator_emission_percentage = s;
    }
    if let Some(s) = fraction("observer_emission_percentage") {
        params.observer_emission_percentage = s;
    }
    if let Some(s) = fraction("tss_signer_emission_percentage") {
        params.tss_signer_emission_percentage = s;
    }

    if let Some(v) = amount_field(legacy, "observer_slash_amount") {
        params.observer_slash_amount = v;
    }
    if let Some(v) = amount_field(legacy, "ballot_maturity_blocks").filter(|v| *v > 0) {
        params.ballot_maturity_blocks = v;
    }
    if let Some(v) = amount_field(legacy, "pending_ballots_deletion_buffer_blocks") {
        params.pending_ballots_deletion_buffer_blocks = v;
    }
    if let Some(s) = string_field(legacy, "block_reward_amount")
        .filter(|s| parse_decimal(s).is_some_and(|v| v >= 0.0))
    {
        params.block_reward_amount = s;
    }

    let decimal = |name: &str| string_field(legacy, name).filter(|s| parse_decimal(s).is_some());
    if let Some(s) = decimal("max_bond_factor") {
        params.max_bond_factor = s;
    }
    if let Some(s) = decimal("min_bond_factor") {
        params.min_bond_factor = s;
    }
    if let Some(s) = decimal("avg_block_time") {
        params.avg_block_time = s;
    }
    if let Some(s) = decimal("target_bond_ratio") {
        params.target_bond_ratio = s;
    }
    if let Some(s) = decimal("duration_factor_constant") {
        params.duration_factor_constant = s;
    }

    params
}

fn string_field(value: &Value, name: &str) -> Option<String> {
    value.get(name)?.as_str().map(str::to_string)
}

/// Integer field; the legacy encoder wrote big integers as strings, so both
/// forms are accepted.
fn amount_field(value: &Value, name: &str) -> Option<Amount> {
    match value.get(name)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn write_validated<S: StateStore + ?Sized>(store: &mut S, params: Params) -> Result<()> {
    params
        .validate()
        .map_err(|e| EmissionsError::MigrationFailed(e.to_string()))?;
    kestrel_store::set_typed(store, PARAMS_KEY, &params)?;
    Ok(())
}
