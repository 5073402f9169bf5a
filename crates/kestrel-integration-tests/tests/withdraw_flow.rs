//! Integration test: withdraw request and settlement lifecycle.
//!
//! Covers the asymmetric over-request behavior (capped withdraw vs erroring
//! removal), the up-front pool solvency check, overwrite-not-queue
//! semantics, and the exactly-once settlement guarantee across many holders.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use kestrel_emissions::accounts::PoolAccount;
use kestrel_emissions::msgs::{handle_withdraw_emission, MsgWithdrawEmission};
use kestrel_emissions::ports::BankKeeper;
use kestrel_emissions::settlement::{get_pending, settle_withdrawals};
use kestrel_emissions::testing::{test_address, MemBank};
use kestrel_emissions::withdrawable;
use kestrel_emissions::EmissionsError;
use kestrel_integration_tests::init_tracing;
use kestrel_store::memory::MemStore;
use kestrel_types::Amount;

fn funded_pool_bank(amount: Amount) -> MemBank {
    let mut bank = MemBank::new();
    bank.mint(&PoolAccount::UndistributedObserverRewards.address(), amount);
    bank
}

#[test]
fn test_over_request_is_capped_not_rejected() {
    init_tracing();
    let addr = test_address(1);
    let mut store = MemStore::new();
    let bank = funded_pool_bank(10_000);
    withdrawable::add(&mut store, &addr, 400).expect("seed");

    for extra in [1, 10, 1_000_000] {
        let msg = MsgWithdrawEmission {
            creator: addr.to_string(),
            amount: 400 + extra,
        };
        // Re-credit between attempts so the available balance is 400 again.
        let scheduled = handle_withdraw_emission(&mut store, &bank, &msg).expect("withdraw");
        assert_eq!(scheduled, 400);
        withdrawable::add(&mut store, &addr, 400).expect("re-credit");
    }
}

#[test]
fn test_remove_and_withdraw_disagree_on_over_request() {
    init_tracing();
    let addr = test_address(1);
    let mut store = MemStore::new();
    let bank = funded_pool_bank(10_000);
    withdrawable::add(&mut store, &addr, 100).expect("seed");

    // Direct ledger removal refuses an over-request outright...
    assert!(withdrawable::remove(&mut store, &addr, 150).is_err());
    assert_eq!(withdrawable::get(&store, &addr).expect("get"), 100);

    // ...while the withdraw path silently caps the same request.
    let msg = MsgWithdrawEmission {
        creator: addr.to_string(),
        amount: 150,
    };
    assert_eq!(
        handle_withdraw_emission(&mut store, &bank, &msg).expect("withdraw"),
        100
    );
    assert_eq!(withdrawable::get(&store, &addr).expect("get"), 0);
}

#[test]
fn test_second_request_replaces_first() {
    init_tracing();
    let addr = test_address(1);
    let mut store = MemStore::new();
    let bank = funded_pool_bank(10_000);
    withdrawable::add(&mut store, &addr, 500).expect("seed");

    for amount in [200u64, 100] {
        let msg = MsgWithdrawEmission {
            creator: addr.to_string(),
            amount,
        };
        handle_withdraw_emission(&mut store, &bank, &msg).expect("withdraw");
    }

    // Only the latest request is pending; both debits applied.
    assert_eq!(
        get_pending(&store, &addr).expect("get").expect("pending").amount,
        100
    );
    assert_eq!(withdrawable::get(&store, &addr).expect("get"), 200);
}

#[test]
fn test_settlement_is_exactly_once_for_many_holders() {
    init_tracing();
    let mut rng = StdRng::seed_from_u64(7);
    let mut store = MemStore::new();
    const POOL_FUNDING: Amount = 500_000;
    let mut bank = funded_pool_bank(POOL_FUNDING);

    let mut total_requested: Amount = 0;
    let holders: Vec<_> = (1..=20u8).map(test_address).collect();
    for addr in &holders {
        let balance = rng.gen_range(1..10_000u64);
        withdrawable::add(&mut store, addr, balance).expect("seed");
        let msg = MsgWithdrawEmission {
            creator: addr.to_string(),
            amount: balance,
        };
        total_requested += handle_withdraw_emission(&mut store, &bank, &msg).expect("withdraw");
    }

    settle_withdrawals(&mut store, &mut bank);

    let paid_out: Amount = holders.iter().map(|a| bank.balance(a)).sum();
    assert_eq!(paid_out, total_requested);
    assert_eq!(
        bank.balance(&PoolAccount::UndistributedObserverRewards.address()),
        POOL_FUNDING - total_requested
    );
    for addr in &holders {
        assert!(get_pending(&store, addr).expect("get").is_none());
    }

    // A second pass finds nothing to do and moves no funds.
    settle_withdrawals(&mut store, &mut bank);
    let paid_again: Amount = holders.iter().map(|a| bank.balance(a)).sum();
    assert_eq!(paid_again, total_requested);
}

#[test]
fn test_underfunded_pool_rejects_request_up_front() {
    init_tracing();
    let addr = test_address(1);
    let mut store = MemStore::new();
    let bank = funded_pool_bank(50);
    withdrawable::add(&mut store, &addr, 300).expect("seed");

    let msg = MsgWithdrawEmission {
        creator: addr.to_string(),
        amount: 300,
    };
    assert!(matches!(
        handle_withdraw_emission(&mut store, &bank, &msg),
        Err(EmissionsError::RewardsPoolBalance {
            requested: 300,
            available: 50,
        })
    ));
    // Nothing was debited and nothing is pending, so the holder keeps the
    // full accrued balance for a later attempt.
    assert_eq!(withdrawable::get(&store, &addr).expect("get"), 300);
    assert!(get_pending(&store, &addr).expect("get").is_none());
}

#[test]
fn test_pool_drained_after_request_consumes_without_retry() {
    init_tracing();
    let addr = test_address(1);
    let mut store = MemStore::new();
    let mut bank = funded_pool_bank(300);
    withdrawable::add(&mut store, &addr, 300).expect("seed");

    let msg = MsgWithdrawEmission {
        creator: addr.to_string(),
        amount: 300,
    };
    handle_withdraw_emission(&mut store, &bank, &msg).expect("withdraw");

    // The pool empties between request admission and settlement.
    let pool = PoolAccount::UndistributedObserverRewards.address();
    bank.send(&pool, &test_address(99), 300).expect("drain");

    settle_withdrawals(&mut store, &mut bank);
    assert_eq!(bank.balance(&addr), 0);
    assert!(get_pending(&store, &addr).expect("get").is_none());

    // Refunding the pool does not resurrect the consumed request.
    bank.mint(&pool, 1_000);
    settle_withdrawals(&mut store, &mut bank);
    assert_eq!(bank.balance(&addr), 0);
}
