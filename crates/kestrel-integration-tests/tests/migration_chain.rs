//! Integration test: the full parameter migration chain against a
//! realistically aged legacy store, followed by a live block to prove the
//! migrated params actually drive rewards.

use serde_json::json;

use kestrel_emissions::accounts::PoolAccount;
use kestrel_emissions::keys::PARAMS_KEY;
use kestrel_emissions::migrations::{
    migrate, CONSENSUS_VERSION, DECAYED_FIXED_BLOCK_REWARD,
};
use kestrel_emissions::params::get_params;
use kestrel_emissions::rewards::begin_block;
use kestrel_emissions::testing::{BufferSink, MemBank, StaticBallots};
use kestrel_integration_tests::init_tracing;
use kestrel_store::memory::MemStore;
use kestrel_store::StateStore;
use kestrel_types::events::EmissionsEvent;

/// Params as a v2-era chain would have stored them: dynamic-formula fields
/// only, integers encoded as strings, no fixed block reward.
fn legacy_v2_store() -> MemStore {
    let raw = json!({
        "validator_emission_percentage": "0.50",
        "observer_emission_percentage": "0.25",
        "tss_signer_emission_percentage": "0.25",
        "observer_slash_amount": "0",
        "max_bond_factor": "1.25",
        "min_bond_factor": "0.75",
        "avg_block_time": "6.00",
        "target_bond_ratio": "0.67",
        "duration_factor_constant": "0.1877876333"
    });
    let mut store = MemStore::new();
    store.set(PARAMS_KEY, serde_json::to_vec(&raw).expect("encode"));
    store
}

#[test]
fn test_legacy_store_migrates_to_current_schema() {
    init_tracing();
    let mut store = legacy_v2_store();
    migrate(&mut store, 2).expect("migrate chain");

    let params = get_params(&store).expect("params");
    params.validate().expect("valid after migration");
    // Legacy splits survive, newer fields pick up their chain constants.
    assert_eq!(params.validator_emission_percentage, "0.50");
    assert_eq!(params.block_reward_amount, DECAYED_FIXED_BLOCK_REWARD);
    assert!(params.observer_slash_amount > 0);
    assert!(params.ballot_maturity_blocks > 0);
    assert!(params.pending_ballots_deletion_buffer_blocks > 0);
}

#[test]
fn test_migrated_params_drive_block_rewards() {
    init_tracing();
    let mut store = legacy_v2_store();
    migrate(&mut store, 2).expect("migrate chain");

    let mut bank = MemBank::new();
    bank.mint(&PoolAccount::Emissions.address(), u64::MAX / 2);
    let mut ballots = StaticBallots::new(vec![]);
    let mut sink = BufferSink::new();

    begin_block(&mut store, &mut bank, &mut ballots, &mut sink, 1);

    assert_eq!(sink.events.len(), 1);
    let EmissionsEvent::BlockEmissions(event) = &sink.events[0] else {
        unreachable!("expected a block emissions event")
    };
    // 8_037_522 micro-KES budget split 50/25/25
    assert_eq!(event.validator_rewards, 4_018_761);
    assert_eq!(event.observer_rewards, 2_009_380);
    assert_eq!(event.tss_rewards, 2_009_380);
    // Fixed schedule: the dynamic factors are not reported.
    assert!(event.bond_factor.is_empty());
    assert!(event.duration_factor.is_empty());
}

#[test]
fn test_rerunning_chain_is_byte_stable() {
    init_tracing();
    let mut store = legacy_v2_store();
    migrate(&mut store, 2).expect("first run");
    let first = store.get(PARAMS_KEY).expect("params bytes");
    migrate(&mut store, 2).expect("second run");
    assert_eq!(store.get(PARAMS_KEY).expect("params bytes"), first);

    // Catch-up from an intermediate version converges to the same bytes.
    migrate(&mut store, 5).expect("partial rerun");
    assert_eq!(store.get(PARAMS_KEY).expect("params bytes"), first);
}

#[test]
fn test_future_store_version_refuses_to_migrate() {
    init_tracing();
    let mut store = legacy_v2_store();
    let before = store.get(PARAMS_KEY).expect("params bytes");
    assert!(migrate(&mut store, CONSENSUS_VERSION + 1).is_err());
    // Nothing was rewritten.
    assert_eq!(store.get(PARAMS_KEY).expect("params bytes"), before);
}
