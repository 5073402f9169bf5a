//! Reward schedule and the per-block reward computer.
//!
//! The current schema pays a fixed per-block budget
//! (`Params::block_reward_amount`). The older dynamic formula — reserves x
//! bond factor x duration factor — survives as a schedule variant so that
//! pre-migration state and the factors diagnostic query keep working. Both
//! resolve to a single budget number; everything downstream is one code
//! path.

use kestrel_store::StateStore;
use kestrel_types::events::{BlockEmissionsEvent, EmissionsEvent};
use kestrel_types::{Amount, BlockHeight};

use crate::accounts::PoolAccount;
use crate::distribution;
use crate::params::{self, parse_decimal, parse_fraction, Params};
use crate::ports::{BallotProvider, BankKeeper, EventSink};

/// Seconds per 30-day month, used by the legacy duration factor.
const SECONDS_PER_MONTH: f64 = 30.0 * 24.0 * 60.0 * 60.0;

/// The active reward schedule, resolved once from [`Params`].
#[derive(Clone, Debug, PartialEq)]
pub enum RewardSchedule {
    /// Fixed per-block budget in micro-KES.
    Fixed { block_reward: f64 },
    /// Pre-schedule dynamic formula over the emission pool reserves.
    LegacyDynamic {
        max_bond_factor: f64,
        min_bond_factor: f64,
        avg_block_time: f64,
        target_bond_ratio: f64,
        duration_factor_constant: f64,
    },
}

impl RewardSchedule {
    /// Resolve the schedule from params: fixed if a positive block reward is
    /// configured, legacy-dynamic otherwise.
    pub fn from_params(params: &Params) -> Self {
        if let Some(block_reward) = parse_decimal(&params.block_reward_amount) {
            if block_reward > 0.0 {
                return RewardSchedule::Fixed { block_reward };
            }
        }
        RewardSchedule::LegacyDynamic {
            max_bond_factor: parse_decimal(&params.max_bond_factor).unwrap_or(0.0),
            min_bond_factor: parse_decimal(&params.min_bond_factor).unwrap_or(0.0),
            avg_block_time: parse_decimal(&params.avg_block_time).unwrap_or(0.0),
            target_bond_ratio: parse_fraction(&params.target_bond_ratio).unwrap_or(0.0),
            duration_factor_constant: parse_decimal(&params.duration_factor_constant)
                .unwrap_or(0.0),
        }
    }

    /// The bond factor: the bond ratio clamped to the configured band.
    /// Always zero under the fixed schedule.
    pub fn bond_factor(&self) -> f64 {
        match self {
            RewardSchedule::Fixed { .. } => 0.0,
            RewardSchedule::LegacyDynamic {
                max_bond_factor,
                min_bond_factor,
                target_bond_ratio,
                ..
            } => target_bond_ratio.clamp(*min_bond_factor, *max_bond_factor),
        }
    }

    /// The duration factor: months elapsed over the duration constant plus
    /// months elapsed, approaching one as the chain ages. Zero under the
    /// fixed schedule.
    pub fn duration_factor(&self, height: BlockHeight) -> f64 {
        match self {
            RewardSchedule::Fixed { .. } => 0.0,
            RewardSchedule::LegacyDynamic {
                avg_block_time,
                duration_factor_constant,
                ..
            } => {
                if *avg_block_time <= 0.0 {
                    return 0.0;
                }
                let months = height as f64 * avg_block_time / SECONDS_PER_MONTH;
                if duration_factor_constant + months <= 0.0 {
                    return 0.0;
                }
                months / (duration_factor_constant + months)
            }
        }
    }

    /// The block budget in micro-KES, floored to an integer amount.
    pub fn block_budget(&self, reserves: Amount, height: BlockHeight) -> Amount {
        match self {
            RewardSchedule::Fixed { block_reward } => *block_reward as Amount,
            RewardSchedule::LegacyDynamic { .. } => {
                (reserves as f64 * self.bond_factor() * self.duration_factor(height)) as Amount
            }
        }
    }
}

/// Split a block budget into validator, observer, and TSS amounts.
///
/// Each stream is `floor(percentage * budget)`; a missing or unparseable
/// percentage degrades that stream to zero rather than failing the block.
/// The three percentages are independent caps, so the sum of the three
/// amounts never exceeds the budget only when the percentages sum to at
/// most one — which validation does not require.
pub fn reward_distribution(params: &Params, budget: Amount) -> (Amount, Amount, Amount) {
    let stream = |pct: &str| -> Amount {
        match parse_fraction(pct) {
            Some(fraction) => (fraction * budget as f64) as Amount,
            None => {
                tracing::warn!(percentage = pct, "unparseable emission percentage, using zero");
                0
            }
        }
    };
    (
        stream(&params.validator_emission_percentage),
        stream(&params.observer_emission_percentage),
        stream(&params.tss_signer_emission_percentage),
    )
}

/// Per-block reward computation and pool funding. Runs before transaction
/// processing.
///
/// Never fails: every skip or partial failure is logged and the block
/// proceeds. The three pool transfers are attempted independently — one
/// underfunded stream does not block the others. The block emissions event
/// fires exactly once for every block that reaches the computation,
/// whatever the transfer outcomes.
pub fn begin_block<S, B, P, E>(
    store: &mut S,
    bank: &mut B,
    ballots: &mut P,
    events: &mut E,
    height: BlockHeight,
) where
    S: StateStore + ?Sized,
    B: BankKeeper + ?Sized,
    P: BallotProvider + ?Sized,
    E: EventSink + ?Sized,
{
    let reserves = bank.balance(&PoolAccount::Emissions.address());

    let params = match params::get_params(store) {
        Ok(params) => params,
        Err(e) => {
            tracing::error!(error = %e, "emissions params not available, skipping block rewards");
            return;
        }
    };

    let schedule = RewardSchedule::from_params(&params);
    let budget = schedule.block_budget(reserves, height);
    if budget == 0 {
        log_throttled(height, "block reward budget is zero, skipping");
        return;
    }
    if budget > reserves {
        log_throttled(
            height,
            &format!("block reward budget {budget} exceeds emission pool balance {reserves}"),
        );
        return;
    }

    let (validator_rewards, observer_rewards, tss_rewards) =
        reward_distribution(&params, budget);

    let emissions = PoolAccount::Emissions.address();
    let mut send = |to: PoolAccount, amount: Amount| -> bool {
        if amount == 0 {
            return true;
        }
        match bank.send(&emissions, &to.address(), amount) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(pool = to.name(), amount, error = %e, "pool funding transfer failed");
                false
            }
        }
    };

    send(PoolAccount::FeeCollector, validator_rewards);
    let observer_funded = send(PoolAccount::UndistributedObserverRewards, observer_rewards);
    send(PoolAccount::UndistributedTssRewards, tss_rewards);

    events.emit(EmissionsEvent::BlockEmissions(BlockEmissionsEvent {
        height,
        bond_factor: factor_string(schedule.bond_factor()),
        duration_factor: factor_string(schedule.duration_factor(height)),
        reserves_factor: match schedule {
            RewardSchedule::Fixed { .. } => String::new(),
            RewardSchedule::LegacyDynamic { .. } => format!("{reserves}"),
        },
        validator_rewards,
        observer_rewards,
        tss_rewards,
    }));

    // Ledger credits must be backed by pool funds, so distribution only
    // runs when the observer pool was actually funded.
    if observer_funded {
        distribution::distribute_observer_rewards(
            store,
            ballots,
            events,
            &params,
            observer_rewards,
            height,
        );
    }
}

fn factor_string(value: f64) -> String {
    if value == 0.0 {
        String::new()
    } else {
        format!("{value:.6}")
    }
}

fn log_throttled(height: BlockHeight, message: &str) {
    if height % 10 == 0 {
        tracing::info!(height, "{message}");
    } else {
        tracing::debug!(height, "{message}");
    }
}
