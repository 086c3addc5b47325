// crates/sluice-pools/src/ledger.rs
//
// Settlement operations: the façade composing the registry, the emission
// clock, the accrual math, and the position book with the injected
// collaborators.
//
// The ledger is a deterministic single-writer state machine: every
// mutating operation takes `&mut self`, runs to completion, and either
// commits all of its effects or none of them. Operations that can fail
// after their accrual step snapshot the records they touch and restore
// them on any error, so a refused transfer never leaves a half-applied
// settlement behind.

use serde::{Deserialize, Serialize};

use sluice_core::{
    AccountId, Amount, AssetId, AssetLedger, PoolId, SluiceError, Tick, TickSource,
};

use crate::accrual;
use crate::emission::{self, EmissionClock};
use crate::events::PoolEvent;
use crate::pool::{Pool, PoolRegistry};
use crate::position::{scaled_share, Position, PositionBook};

/// Host-supplied construction parameters, wired in once at deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Handle of the reward asset paid out by harvests.
    pub reward_asset: AssetId,
    /// Initial global emission rate per tick.
    pub rate_per_tick: Amount,
}

/// Pre-operation snapshot of everything a settlement may mutate.
struct Checkpoint {
    pool: Pool,
    account: AccountId,
    position: Position,
    events_len: usize,
}

/// The reward accrual and settlement engine.
///
/// Generic over the injected tick counter and fungible-asset collaborator
/// so hosts and tests supply their own.
pub struct PoolLedger<T: TickSource, A: AssetLedger> {
    registry: PoolRegistry,
    clock: EmissionClock,
    book: PositionBook,
    reward_asset: AssetId,
    events: Vec<PoolEvent>,
    ticks: T,
    assets: A,
}

impl<T: TickSource, A: AssetLedger> PoolLedger<T, A> {
    /// Create an empty ledger around the injected collaborators.
    pub fn new(config: LedgerConfig, ticks: T, assets: A) -> Self {
        Self {
            registry: PoolRegistry::new(),
            clock: EmissionClock::new(config.rate_per_tick),
            book: PositionBook::new(),
            reward_asset: config.reward_asset,
            events: Vec::new(),
            ticks,
            assets,
        }
    }

    // -- administration ----------------------------------------------------

    /// Register a new pool accepting `staked_asset`, sharing in the global
    /// emission with `weight`. Returns the pool's dense id.
    pub fn register_pool(&mut self, weight: u64, staked_asset: AssetId) -> PoolId {
        let now = self.ticks.current_tick();
        let pool_id = self.registry.register(weight, staked_asset, now);
        tracing::info!(pool_id, weight, "pool registered");
        self.events.push(PoolEvent::PoolRegistered {
            pool_id,
            weight,
            staked_asset,
        });
        pool_id
    }

    /// Replace a pool's allocation weight. The pool is advanced first so
    /// its already-elapsed ticks accrue under the old weight; every pool's
    /// derived rate shifts from its next accrual because the denominator
    /// changed.
    pub fn set_pool_weight(&mut self, pool_id: PoolId, new_weight: u64) -> Result<(), SluiceError> {
        let now = self.ticks.current_tick();
        self.advance_at(pool_id, now)?;
        self.registry.set_weight(pool_id, new_weight)?;
        tracing::info!(pool_id, new_weight, "pool weight changed");
        self.events.push(PoolEvent::PoolWeightChanged {
            pool_id,
            new_weight,
        });
        Ok(())
    }

    /// Replace the global emission rate, effective from each pool's next
    /// accrual. Ticks already folded into accumulators keep the old rate.
    pub fn set_global_rate(&mut self, new_rate: Amount) {
        let effective_tick = self.ticks.current_tick();
        self.clock.set_rate(new_rate);
        tracing::info!(new_rate, effective_tick, "global rate changed");
        self.events.push(PoolEvent::GlobalRateChanged {
            effective_tick,
            new_rate,
        });
    }

    // -- accrual -----------------------------------------------------------

    /// Bring one pool's accumulator current as of the external tick.
    /// Idempotent within a tick. Returns the updated pool record.
    pub fn advance(&mut self, pool_id: PoolId) -> Result<Pool, SluiceError> {
        let now = self.ticks.current_tick();
        self.advance_at(pool_id, now)?;
        Ok(self.registry.get(pool_id)?.clone())
    }

    /// Bring every pool in `pool_ids` current. The whole list is validated
    /// before any pool is touched, so an unknown id fails the call with no
    /// partial application.
    pub fn advance_all(&mut self, pool_ids: &[PoolId]) -> Result<(), SluiceError> {
        for &id in pool_ids {
            self.registry.get(id)?;
        }
        let now = self.ticks.current_tick();
        for &id in pool_ids {
            self.advance_at(id, now)?;
        }
        Ok(())
    }

    fn advance_at(&mut self, pool_id: PoolId, now: Tick) -> Result<(), SluiceError> {
        let global = self.clock.rate();
        let total_weight = self.registry.total_weight();
        let pool = self.registry.get_mut(pool_id)?;
        let pool_rate = emission::derived_rate(global, pool.weight, total_weight);
        if accrual::accrue(pool, now, pool_rate) {
            let event = PoolEvent::PoolAdvanced {
                pool_id,
                last_update_tick: pool.last_update_tick,
                total_staked: pool.total_staked,
                acc_reward_per_share: pool.acc_reward_per_share,
            };
            tracing::debug!(pool_id, tick = now, "pool advanced");
            self.events.push(event);
        }
        Ok(())
    }

    // -- settlement --------------------------------------------------------

    /// Deposit `amount` of the pool's stake asset, pulled from `caller`,
    /// crediting `to`'s position. Reward accrued by `to` before this
    /// deposit stays owed; nothing is paid out here. Amount 0 is a valid
    /// no-op on balances that still advances the pool.
    pub fn deposit(
        &mut self,
        caller: &AccountId,
        pool_id: PoolId,
        amount: Amount,
        to: &AccountId,
    ) -> Result<(), SluiceError> {
        let frame = self.checkpoint(pool_id, to)?;
        let result = self.deposit_inner(caller, pool_id, amount, to);
        if result.is_err() {
            self.rollback(frame);
        }
        result
    }

    fn deposit_inner(
        &mut self,
        caller: &AccountId,
        pool_id: PoolId,
        amount: Amount,
        to: &AccountId,
    ) -> Result<(), SluiceError> {
        let now = self.ticks.current_tick();
        self.advance_at(pool_id, now)?;
        let (acc, staked_asset) = {
            let pool = self.registry.get(pool_id)?;
            (pool.acc_reward_per_share, pool.staked_asset)
        };

        let position = self.book.entry(pool_id, to);
        position.staked += amount;
        position.reward_debt += scaled_share(amount, acc);
        self.registry.get_mut(pool_id)?.total_staked += amount;

        if amount > 0 {
            self.assets.transfer_in(&staked_asset, caller, amount)?;
        }
        tracing::debug!(pool_id, amount, "deposit settled");
        self.events.push(PoolEvent::Deposited {
            who: *caller,
            pool_id,
            amount,
            to: *to,
        });
        Ok(())
    }

    /// Withdraw `amount` of stake from the caller's position, pushing it
    /// to `to`. Accrued reward stays owed (the debt goes negative after a
    /// full withdrawal) and is settled by a later harvest.
    pub fn withdraw(
        &mut self,
        caller: &AccountId,
        pool_id: PoolId,
        amount: Amount,
        to: &AccountId,
    ) -> Result<(), SluiceError> {
        let frame = self.checkpoint(pool_id, caller)?;
        let result = self.withdraw_inner(caller, pool_id, amount, to);
        if result.is_err() {
            self.rollback(frame);
        }
        result
    }

    fn withdraw_inner(
        &mut self,
        caller: &AccountId,
        pool_id: PoolId,
        amount: Amount,
        to: &AccountId,
    ) -> Result<(), SluiceError> {
        let now = self.ticks.current_tick();
        self.advance_at(pool_id, now)?;
        let (acc, staked_asset) = {
            let pool = self.registry.get(pool_id)?;
            (pool.acc_reward_per_share, pool.staked_asset)
        };

        let position = self.book.entry(pool_id, caller);
        if amount > position.staked {
            return Err(SluiceError::InsufficientBalance {
                requested: amount,
                available: position.staked,
            });
        }
        position.staked -= amount;
        position.reward_debt -= scaled_share(amount, acc);
        self.registry.get_mut(pool_id)?.total_staked -= amount;

        if amount > 0 {
            self.assets.transfer_out(&staked_asset, to, amount)?;
        }
        tracing::debug!(pool_id, amount, "withdraw settled");
        self.events.push(PoolEvent::Withdrawn {
            who: *caller,
            pool_id,
            amount,
            to: *to,
        });
        Ok(())
    }

    /// Settle the caller's accrued reward, pushing it to `to`. Returns the
    /// amount paid. A safe no-op (zero paid) with nothing staked and
    /// nothing owed.
    pub fn harvest(
        &mut self,
        caller: &AccountId,
        pool_id: PoolId,
        to: &AccountId,
    ) -> Result<Amount, SluiceError> {
        let frame = self.checkpoint(pool_id, caller)?;
        let result = self.harvest_inner(caller, pool_id, to);
        if result.is_err() {
            self.rollback(frame);
        }
        result
    }

    fn harvest_inner(
        &mut self,
        caller: &AccountId,
        pool_id: PoolId,
        to: &AccountId,
    ) -> Result<Amount, SluiceError> {
        let now = self.ticks.current_tick();
        self.advance_at(pool_id, now)?;
        let acc = self.registry.get(pool_id)?.acc_reward_per_share;

        let position = self.book.entry(pool_id, caller);
        let pending = position.pending(acc);
        position.reward_debt = scaled_share(position.staked, acc);

        if pending > 0 {
            self.assets.transfer_out(&self.reward_asset, to, pending)?;
        }
        tracing::debug!(pool_id, amount = pending, "harvest settled");
        self.events.push(PoolEvent::Harvested {
            who: *caller,
            pool_id,
            amount: pending,
            to: *to,
        });
        Ok(pending)
    }

    /// Harvest and withdraw in one settlement: advance once, pay the
    /// pending reward exactly as `harvest`, then apply the withdraw on the
    /// harvest-adjusted baseline. The two effects compose without double
    /// counting: the final debt equals `new_staked * acc / SCALE`. Returns
    /// the reward paid.
    pub fn withdraw_and_harvest(
        &mut self,
        caller: &AccountId,
        pool_id: PoolId,
        amount: Amount,
        to: &AccountId,
    ) -> Result<Amount, SluiceError> {
        let frame = self.checkpoint(pool_id, caller)?;
        let result = self.withdraw_and_harvest_inner(caller, pool_id, amount, to);
        if result.is_err() {
            self.rollback(frame);
        }
        result
    }

    fn withdraw_and_harvest_inner(
        &mut self,
        caller: &AccountId,
        pool_id: PoolId,
        amount: Amount,
        to: &AccountId,
    ) -> Result<Amount, SluiceError> {
        let now = self.ticks.current_tick();
        self.advance_at(pool_id, now)?;
        let (acc, staked_asset) = {
            let pool = self.registry.get(pool_id)?;
            (pool.acc_reward_per_share, pool.staked_asset)
        };

        let position = self.book.entry(pool_id, caller);
        let pending = position.pending(acc);
        if amount > position.staked {
            return Err(SluiceError::InsufficientBalance {
                requested: amount,
                available: position.staked,
            });
        }
        position.staked -= amount;
        // Harvest baseline plus the withdraw adjustment in one step: the
        // debt lands exactly on the remaining stake's accumulated share.
        position.reward_debt = scaled_share(position.staked, acc);
        self.registry.get_mut(pool_id)?.total_staked -= amount;

        if pending > 0 {
            self.assets.transfer_out(&self.reward_asset, to, pending)?;
        }
        if amount > 0 {
            self.assets.transfer_out(&staked_asset, to, amount)?;
        }
        tracing::debug!(pool_id, amount, reward = pending, "withdraw-and-harvest settled");
        self.events.push(PoolEvent::Harvested {
            who: *caller,
            pool_id,
            amount: pending,
            to: *to,
        });
        self.events.push(PoolEvent::Withdrawn {
            who: *caller,
            pool_id,
            amount,
            to: *to,
        });
        Ok(pending)
    }

    /// Circuit-breaker: return the caller's entire stake to `to`,
    /// forfeiting any accrued reward, and zero the debt. The payout never
    /// depends on reward arithmetic; the pool is still advanced first so
    /// its bookkeeping stays coherent for later queries. Returns the stake
    /// returned.
    pub fn emergency_withdraw(
        &mut self,
        caller: &AccountId,
        pool_id: PoolId,
        to: &AccountId,
    ) -> Result<Amount, SluiceError> {
        let frame = self.checkpoint(pool_id, caller)?;
        let result = self.emergency_withdraw_inner(caller, pool_id, to);
        if result.is_err() {
            self.rollback(frame);
        }
        result
    }

    fn emergency_withdraw_inner(
        &mut self,
        caller: &AccountId,
        pool_id: PoolId,
        to: &AccountId,
    ) -> Result<Amount, SluiceError> {
        let now = self.ticks.current_tick();
        self.advance_at(pool_id, now)?;
        let staked_asset = self.registry.get(pool_id)?.staked_asset;

        let position = self.book.entry(pool_id, caller);
        let amount = position.staked;
        position.staked = 0;
        position.reward_debt = 0;
        self.registry.get_mut(pool_id)?.total_staked -= amount;

        if amount > 0 {
            self.assets.transfer_out(&staked_asset, to, amount)?;
        }
        tracing::info!(pool_id, amount, "emergency withdraw settled");
        self.events.push(PoolEvent::EmergencyWithdrawn {
            who: *caller,
            pool_id,
            amount,
            to: *to,
        });
        Ok(amount)
    }

    // -- views -------------------------------------------------------------

    /// Number of registered pools.
    pub fn pool_count(&self) -> usize {
        self.registry.len()
    }

    /// The global emission rate per tick.
    pub fn global_rate(&self) -> Amount {
        self.clock.rate()
    }

    /// The slice of the global emission this pool earns per tick.
    pub fn derived_rate(&self, pool_id: PoolId) -> Result<Amount, SluiceError> {
        let pool = self.registry.get(pool_id)?;
        Ok(emission::derived_rate(
            self.clock.rate(),
            pool.weight,
            self.registry.total_weight(),
        ))
    }

    /// Reward the account could harvest right now, projecting the accrual
    /// to the current tick without committing it.
    pub fn pending_reward(
        &self,
        pool_id: PoolId,
        account: &AccountId,
    ) -> Result<Amount, SluiceError> {
        let pool = self.registry.get(pool_id)?;
        let rate = emission::derived_rate(
            self.clock.rate(),
            pool.weight,
            self.registry.total_weight(),
        );
        let now = self.ticks.current_tick();
        let acc = accrual::projected_reward_per_share(pool, now, rate);
        Ok(self.book.get(pool_id, account).pending(acc))
    }

    /// Copy of the account's position in the pool; zeroed if never
    /// touched.
    pub fn position(&self, pool_id: PoolId, account: &AccountId) -> Result<Position, SluiceError> {
        self.registry.get(pool_id)?;
        Ok(self.book.get(pool_id, account))
    }

    /// Copy of the pool record.
    pub fn pool(&self, pool_id: PoolId) -> Result<Pool, SluiceError> {
        Ok(self.registry.get(pool_id)?.clone())
    }

    /// Drain the notifications buffered by successful mutating calls since
    /// the last drain.
    pub fn take_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }

    /// Buffered notifications not yet drained.
    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    // -- atomicity ---------------------------------------------------------

    fn checkpoint(&self, pool_id: PoolId, account: &AccountId) -> Result<Checkpoint, SluiceError> {
        Ok(Checkpoint {
            pool: self.registry.get(pool_id)?.clone(),
            account: *account,
            position: self.book.get(pool_id, account),
            events_len: self.events.len(),
        })
    }

    fn rollback(&mut self, frame: Checkpoint) {
        let pool_id = frame.pool.id;
        self.registry.restore(frame.pool);
        self.book.restore(pool_id, &frame.account, frame.position);
        self.events.truncate(frame.events_len);
    }
}
