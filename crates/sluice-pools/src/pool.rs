// crates/sluice-pools/src/pool.rs
//
// Pool records and the ordered registry that owns them.
//
// Pool ids are dense 0-based indices assigned in registration order. Pools
// are never removed; a pool's weight and staked total may drop to zero.

use serde::{Deserialize, Serialize};

use sluice_core::{Amount, AssetId, PoolId, SluiceError, Tick};

/// A weighted bucket accepting one stake asset and sharing in the global
/// emission proportionally to its allocation weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Dense index assigned at registration.
    pub id: PoolId,
    /// Handle of the stake asset this pool accepts (opaque to the engine).
    pub staked_asset: AssetId,
    /// Allocation weight; this pool's share of the global emission is
    /// `weight / total_weight`.
    pub weight: u64,
    /// Sum of all positions' staked amounts in this pool.
    pub total_staked: Amount,
    /// Reward earned per staked unit since pool inception, scaled by
    /// `accrual::SCALE`. Never decreases.
    pub acc_reward_per_share: u128,
    /// Tick at which the accumulator was last brought current.
    pub last_update_tick: Tick,
}

/// Ordered collection of pools plus the maintained weight denominator.
///
/// `total_weight` is kept in lockstep with registrations and weight
/// updates; every pool's derived rate divides by it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolRegistry {
    pools: Vec<Pool>,
    total_weight: u64,
}

impl PoolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new pool and return its id.
    pub fn register(&mut self, weight: u64, staked_asset: AssetId, now: Tick) -> PoolId {
        let id = self.pools.len() as PoolId;
        self.pools.push(Pool {
            id,
            staked_asset,
            weight,
            total_staked: 0,
            acc_reward_per_share: 0,
            last_update_tick: now,
        });
        self.total_weight += weight;
        id
    }

    /// Number of registered pools.
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Sum of all pools' allocation weights.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Look up a pool by id.
    ///
    /// # Errors
    /// Returns `SluiceError::PoolNotFound` for an unregistered id.
    pub fn get(&self, id: PoolId) -> Result<&Pool, SluiceError> {
        self.pools
            .get(id as usize)
            .ok_or(SluiceError::PoolNotFound(id))
    }

    /// Mutable lookup by id.
    ///
    /// # Errors
    /// Returns `SluiceError::PoolNotFound` for an unregistered id.
    pub fn get_mut(&mut self, id: PoolId) -> Result<&mut Pool, SluiceError> {
        self.pools
            .get_mut(id as usize)
            .ok_or(SluiceError::PoolNotFound(id))
    }

    /// Replace a pool's allocation weight, keeping the denominator in sync.
    ///
    /// # Errors
    /// Returns `SluiceError::PoolNotFound` for an unregistered id.
    pub fn set_weight(&mut self, id: PoolId, new_weight: u64) -> Result<(), SluiceError> {
        let pool = self
            .pools
            .get_mut(id as usize)
            .ok_or(SluiceError::PoolNotFound(id))?;
        let old_weight = pool.weight;
        pool.weight = new_weight;
        self.total_weight = self.total_weight - old_weight + new_weight;
        Ok(())
    }

    /// Overwrite the stored record for `pool.id`. Used by the settlement
    /// layer's rollback path; the id must already be registered.
    pub(crate) fn restore(&mut self, pool: Pool) {
        let idx = pool.id as usize;
        self.pools[idx] = pool;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LP_A: AssetId = [0xAA; 32];
    const LP_B: AssetId = [0xBB; 32];

    #[test]
    fn test_register_assigns_dense_ids() {
        let mut registry = PoolRegistry::new();
        assert_eq!(registry.register(10, LP_A, 0), 0);
        assert_eq!(registry.register(90, LP_B, 5), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(1).unwrap().staked_asset, LP_B);
        assert_eq!(registry.get(1).unwrap().last_update_tick, 5);
    }

    #[test]
    fn test_register_accumulates_total_weight() {
        let mut registry = PoolRegistry::new();
        registry.register(10, LP_A, 0);
        registry.register(90, LP_B, 0);
        assert_eq!(registry.total_weight(), 100);
    }

    #[test]
    fn test_new_pool_starts_zeroed() {
        let mut registry = PoolRegistry::new();
        let id = registry.register(10, LP_A, 42);
        let pool = registry.get(id).unwrap();
        assert_eq!(pool.total_staked, 0);
        assert_eq!(pool.acc_reward_per_share, 0);
        assert_eq!(pool.last_update_tick, 42);
    }

    #[test]
    fn test_get_unknown_id_fails() {
        let registry = PoolRegistry::new();
        assert!(matches!(
            registry.get(0),
            Err(SluiceError::PoolNotFound(0))
        ));
    }

    #[test]
    fn test_set_weight_adjusts_denominator() {
        let mut registry = PoolRegistry::new();
        registry.register(10, LP_A, 0);
        registry.register(90, LP_B, 0);
        registry.set_weight(1, 10).unwrap();
        assert_eq!(registry.total_weight(), 20);
        assert_eq!(registry.get(1).unwrap().weight, 10);
    }

    #[test]
    fn test_set_weight_to_zero() {
        let mut registry = PoolRegistry::new();
        registry.register(10, LP_A, 0);
        registry.set_weight(0, 0).unwrap();
        assert_eq!(registry.total_weight(), 0);
    }

    #[test]
    fn test_set_weight_unknown_id_fails() {
        let mut registry = PoolRegistry::new();
        assert!(registry.set_weight(7, 1).is_err());
    }
}
