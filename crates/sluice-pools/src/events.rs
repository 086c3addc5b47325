// crates/sluice-pools/src/events.rs
//
// Notifications emitted by the ledger, one or more per successful mutating
// call. The ledger buffers them; the host drains the buffer with
// `PoolLedger::take_events` and forwards them wherever it likes.

use serde::{Deserialize, Serialize};

use sluice_core::{AccountId, Amount, AssetId, PoolId, Tick};

/// Observable side effects of successful mutating calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    /// A new pool joined the registry.
    PoolRegistered {
        pool_id: PoolId,
        weight: u64,
        staked_asset: AssetId,
    },
    /// Stake entered a pool. `who` supplied the asset; `to` owns the
    /// credited position.
    Deposited {
        who: AccountId,
        pool_id: PoolId,
        amount: Amount,
        to: AccountId,
    },
    /// Stake left a pool without settling reward.
    Withdrawn {
        who: AccountId,
        pool_id: PoolId,
        amount: Amount,
        to: AccountId,
    },
    /// Accrued reward was paid out.
    Harvested {
        who: AccountId,
        pool_id: PoolId,
        amount: Amount,
        to: AccountId,
    },
    /// The circuit-breaker path returned a full stake, forfeiting reward.
    EmergencyWithdrawn {
        who: AccountId,
        pool_id: PoolId,
        amount: Amount,
        to: AccountId,
    },
    /// A pool's accumulator was brought current.
    PoolAdvanced {
        pool_id: PoolId,
        /// The tick the pool was advanced to.
        last_update_tick: Tick,
        total_staked: Amount,
        acc_reward_per_share: u128,
    },
    /// A pool's allocation weight changed; every pool's derived rate
    /// shifts from its next accrual because the denominator moved.
    PoolWeightChanged { pool_id: PoolId, new_weight: u64 },
    /// The global emission rate changed.
    GlobalRateChanged {
        /// Tick reading at the moment of the change; earlier accruals keep
        /// the old rate.
        effective_tick: Tick,
        new_rate: Amount,
    },
}
