//! Module parameters.
//!
//! A single versioned `Params` value lives under [`crate::keys::PARAMS_KEY`].
//! It is written by genesis, by the governance `UpdateParams` message, and by
//! schema migrations — always through [`set_params`], which validates first,
//! so an invalid value is never observable in the store.
//!
//! Percentages and the block reward budget are decimal strings, parsed at
//! use time. The bond/duration-formula fields are deprecated: they fed the
//! dynamic reward formula that predates the fixed emission schedule and are
//! retained only as migration inputs and for the factors diagnostic query.

use serde::{Deserialize, Serialize};

use kestrel_store::StateStore;
use kestrel_types::Amount;

use crate::keys::PARAMS_KEY;
use crate::{EmissionsError, Result};

/// Default validator share of the block reward.
pub const DEFAULT_VALIDATOR_EMISSION_PERCENTAGE: &str = "0.50";
/// Default observer share of the block reward.
pub const DEFAULT_OBSERVER_EMISSION_PERCENTAGE: &str = "0.25";
/// Default TSS signer share of the block reward.
pub const DEFAULT_TSS_SIGNER_EMISSION_PERCENTAGE: &str = "0.25";
/// Default fixed penalty per non-matching vote, in micro-KES.
pub const DEFAULT_OBSERVER_SLASH_AMOUNT: Amount = 100_000;
/// Default number of blocks before a ballot matures.
pub const DEFAULT_BALLOT_MATURITY_BLOCKS: u64 = 100;
/// Default extra retention window for still-pending ballots.
pub const DEFAULT_PENDING_BALLOTS_DELETION_BUFFER_BLOCKS: u64 = 144_000;
/// Current fixed per-block reward budget, in micro-KES.
pub const DEFAULT_BLOCK_REWARD_AMOUNT: &str = "8037522.569444444444";

/// Emissions module parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Validator share of the block reward, a decimal fraction in `[0, 1]`.
    pub validator_emission_percentage: String,
    /// Observer share of the block reward, a decimal fraction in `[0, 1]`.
    pub observer_emission_percentage: String,
    /// TSS signer share of the block reward, a decimal fraction in `[0, 1]`.
    pub tss_signer_emission_percentage: String,
    /// Fixed penalty per non-matching ballot vote, in micro-KES.
    pub observer_slash_amount: Amount,
    /// Blocks between a ballot finalizing and its rewards being paid.
    pub ballot_maturity_blocks: u64,
    /// Extra blocks still-pending ballots are retained past maturity.
    pub pending_ballots_deletion_buffer_blocks: u64,
    /// Fixed per-block reward budget, a decimal in micro-KES.
    pub block_reward_amount: String,

    // Deprecated dynamic-formula fields, kept for migration compatibility.
    /// Upper clamp on the bond factor.
    pub max_bond_factor: String,
    /// Lower clamp on the bond factor.
    pub min_bond_factor: String,
    /// Average block time in seconds, feeding the duration factor.
    pub avg_block_time: String,
    /// Target fraction of supply bonded.
    pub target_bond_ratio: String,
    /// Constant in the duration factor denominator.
    pub duration_factor_constant: String,
}

impl Params {
    /// Current-schema defaults.
    pub fn new() -> Self {
        Self {
            validator_emission_percentage: DEFAULT_VALIDATOR_EMISSION_PERCENTAGE.to_string(),
            observer_emission_percentage: DEFAULT_OBSERVER_EMISSION_PERCENTAGE.to_string(),
            tss_signer_emission_percentage: DEFAULT_TSS_SIGNER_EMISSION_PERCENTAGE.to_string(),
            observer_slash_amount: DEFAULT_OBSERVER_SLASH_AMOUNT,
            ballot_maturity_blocks: DEFAULT_BALLOT_MATURITY_BLOCKS,
            pending_ballots_deletion_buffer_blocks:
                DEFAULT_PENDING_BALLOTS_DELETION_BUFFER_BLOCKS,
            block_reward_amount: DEFAULT_BLOCK_REWARD_AMOUNT.to_string(),
            max_bond_factor: "1.25".to_string(),
            min_bond_factor: "0.75".to_string(),
            avg_block_time: "6.00".to_string(),
            target_bond_ratio: "0.67".to_string(),
            duration_factor_constant: "0.1877876333".to_string(),
        }
    }

    /// Validate the parameter set.
    ///
    /// # Errors
    ///
    /// - [`EmissionsError::UnableToSetParams`] if any percentage is not a
    ///   decimal in `[0, 1]`, the maturity window is zero, or the block
    ///   reward is not a non-negative decimal
    pub fn validate(&self) -> Result<()> {
        validate_fraction(
            "validator_emission_percentage",
            &self.validator_emission_percentage,
        )?;
        validate_fraction(
            "observer_emission_percentage",
            &self.observer_emission_percentage,
        )?;
        validate_fraction(
            "tss_signer_emission_percentage",
            &self.tss_signer_emission_percentage,
        )?;
        if self.ballot_maturity_blocks == 0 {
            return Err(EmissionsError::UnableToSetParams(
                "ballot_maturity_blocks must be positive".to_string(),
            ));
        }
        match parse_decimal(&self.block_reward_amount) {
            Some(v) if v >= 0.0 => Ok(()),
            Some(v) => Err(EmissionsError::UnableToSetParams(format!(
                "block_reward_amount must be non-negative, got {v}"
            ))),
            None => Err(EmissionsError::UnableToSetParams(format!(
                "block_reward_amount is not a decimal: {:?}",
                self.block_reward_amount
            ))),
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a decimal string. Returns `None` for empty, non-numeric, or
/// non-finite input.
pub fn parse_decimal(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: f64 = trimmed.parse().ok()?;
    value.is_finite().then_some(value)
}

/// Parse a decimal fraction, accepting only values in `[0, 1]`.
pub fn parse_fraction(s: &str) -> Option<f64> {
    parse_decimal(s).filter(|v| (0.0..=1.0).contains(v))
}

fn validate_fraction(field: &str, value: &str) -> Result<()> {
    if parse_fraction(value).is_none() {
        return Err(EmissionsError::UnableToSetParams(format!(
            "{field} must be a decimal in [0, 1], got {value:?}"
        )));
    }
    Ok(())
}

/// Read the params singleton.
///
/// # Errors
///
/// - [`EmissionsError::ParamsNotFound`] if genesis or migration never wrote
///   params — callers must treat this as a precondition failure, never as
///   "zero rewards"
pub fn get_params<S: StateStore + ?Sized>(store: &S) -> Result<Params> {
    kestrel_store::get_typed(store, PARAMS_KEY)?.ok_or(EmissionsError::ParamsNotFound)
}

/// Validate and write the params singleton. On validation failure the store
/// is left untouched.
pub fn set_params<S: StateStore + ?Sized>(store: &mut S, params: &Params) -> Result<()> {
    params.validate()?;
    kestrel_store::set_typed(store, PARAMS_KEY, params)?;
    tracing::debug!("emissions params updated");
    Ok(())
}
