// crates/sluice-pools/src/accrual.rs
//
// Lazy accumulator advancement: fold elapsed ticks into a pool's
// reward-per-share total.
//
// The accumulator is scaled by SCALE (10^12) so integer division by the
// staked total keeps twelve digits of per-share precision. All rounding is
// downward, so the engine can never pay out more than the emission
// schedule supplies.

use sluice_core::{Amount, Tick};

use crate::pool::Pool;

/// Fixed-point scale applied to `acc_reward_per_share` and `reward_debt`.
pub const SCALE: u128 = 1_000_000_000_000;

/// Fold the ticks elapsed since `pool.last_update_tick` into the pool's
/// accumulator, at `pool_rate` reward per tick.
///
/// Returns `false` (and touches nothing) when no tick has elapsed, making
/// repeated calls within the same tick idempotent. With nothing staked the
/// accumulator is left alone (emission for the gap is forgone) but the
/// update tick still moves forward.
pub fn accrue(pool: &mut Pool, now: Tick, pool_rate: Amount) -> bool {
    let elapsed = now.saturating_sub(pool.last_update_tick);
    if elapsed == 0 {
        return false;
    }
    if pool.total_staked > 0 {
        let earned_per_share = elapsed as u128 * pool_rate * SCALE / pool.total_staked;
        pool.acc_reward_per_share = pool.acc_reward_per_share.saturating_add(earned_per_share);
    }
    pool.last_update_tick = now;
    true
}

/// The accumulator value `accrue` would produce at `now`, without mutating
/// the pool. Backs the pending-reward view.
pub fn projected_reward_per_share(pool: &Pool, now: Tick, pool_rate: Amount) -> u128 {
    let elapsed = now.saturating_sub(pool.last_update_tick);
    if elapsed == 0 || pool.total_staked == 0 {
        return pool.acc_reward_per_share;
    }
    pool.acc_reward_per_share
        .saturating_add(elapsed as u128 * pool_rate * SCALE / pool.total_staked)
}
