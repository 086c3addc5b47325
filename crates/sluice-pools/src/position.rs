// crates/sluice-pools/src/position.rs
//
// Per-(pool, account) stake and reward-debt records.
//
// The debt snapshot is what makes pending reward O(1): it records how much
// of `staked * acc_reward_per_share` was already settled (or predates the
// stake), so pending is a subtraction instead of a walk over history. Debt
// is signed: withdrawing principal before harvesting drives it negative,
// which keeps the earned reward claimable afterwards.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use sluice_core::{AccountId, Amount, PoolId};

use crate::accrual::SCALE;

/// A depositor's stake in one pool plus the settled-reward snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Currently staked amount.
    pub staked: Amount,
    /// Scaled settled-reward snapshot; see the module docs.
    pub reward_debt: i128,
}

impl Position {
    /// Reward accrued to this position and not yet settled, against the
    /// given accumulator reading.
    pub fn pending(&self, acc_reward_per_share: u128) -> Amount {
        let accumulated = scaled_share(self.staked, acc_reward_per_share);
        (accumulated - self.reward_debt).max(0) as Amount
    }
}

/// `amount * acc_reward_per_share / SCALE` as a signed debt quantity.
pub(crate) fn scaled_share(amount: Amount, acc_reward_per_share: u128) -> i128 {
    (amount * acc_reward_per_share / SCALE) as i128
}

/// All positions, keyed by (pool, account).
///
/// Records are created implicitly on first touch and never deleted; a
/// never-touched position reads as zeroed.
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    positions: HashMap<(PoolId, AccountId), Position>,
}

impl PositionBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the record for (pool, account); zeroed if never touched.
    pub fn get(&self, pool_id: PoolId, account: &AccountId) -> Position {
        self.positions
            .get(&(pool_id, *account))
            .copied()
            .unwrap_or_default()
    }

    /// Mutable record for (pool, account), created zeroed on first touch.
    pub fn entry(&mut self, pool_id: PoolId, account: &AccountId) -> &mut Position {
        self.positions.entry((pool_id, *account)).or_default()
    }

    /// Overwrite the record for (pool, account). Used by the settlement
    /// layer's rollback path.
    pub(crate) fn restore(&mut self, pool_id: PoolId, account: &AccountId, position: Position) {
        self.positions.insert((pool_id, *account), position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE: AccountId = [1u8; 32];

    #[test]
    fn test_untouched_position_is_zeroed() {
        let book = PositionBook::new();
        let position = book.get(0, &ALICE);
        assert_eq!(position.staked, 0);
        assert_eq!(position.reward_debt, 0);
    }

    #[test]
    fn test_entry_creates_then_persists() {
        let mut book = PositionBook::new();
        book.entry(0, &ALICE).staked = 100;
        assert_eq!(book.get(0, &ALICE).staked, 100);
    }

    #[test]
    fn test_pending_subtracts_debt() {
        let position = Position {
            staked: 100,
            reward_debt: scaled_share(40, 3 * SCALE),
        };
        // 100 * 3 - 40 * 3
        assert_eq!(position.pending(3 * SCALE), 180);
    }

    #[test]
    fn test_pending_with_negative_debt() {
        // A full withdrawal before harvest leaves a negative debt that
        // still backs the earned reward.
        let position = Position {
            staked: 0,
            reward_debt: -180,
        };
        assert_eq!(position.pending(3 * SCALE), 180);
    }

    #[test]
    fn test_pending_never_underflows() {
        let position = Position {
            staked: 0,
            reward_debt: 5,
        };
        assert_eq!(position.pending(SCALE), 0);
    }

    #[test]
    fn test_positions_are_per_pool() {
        let mut book = PositionBook::new();
        book.entry(0, &ALICE).staked = 1;
        book.entry(1, &ALICE).staked = 2;
        assert_eq!(book.get(0, &ALICE).staked, 1);
        assert_eq!(book.get(1, &ALICE).staked, 2);
    }
}
