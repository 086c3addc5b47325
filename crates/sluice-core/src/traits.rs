// crates/sluice-core/src/traits.rs

use crate::error::SluiceError;
use crate::types::{AccountId, Amount, AssetId, Tick};

/// Trait for the external tick counter that drives reward emission.
///
/// Readings must be monotonically non-decreasing, both across operations
/// and across calls within one operation. Implemented by the execution
/// environment; tests use a settable fake.
pub trait TickSource: Send + Sync {
    /// The current tick (e.g. a block height).
    fn current_tick(&self) -> Tick;
}

/// Trait for the external fungible-asset ledger holding stake and reward
/// balances.
///
/// The engine never implements token semantics itself; it only instructs
/// the collaborator to move amounts in and out of its custody. A refusal
/// (insufficient balance or allowance) surfaces as
/// `SluiceError::TransferFailed` and must leave the collaborator unchanged.
pub trait AssetLedger: Send + Sync {
    /// Pull `amount` of `asset` from `from` into the engine's custody.
    fn transfer_in(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        amount: Amount,
    ) -> Result<(), SluiceError>;

    /// Push `amount` of `asset` out of the engine's custody to `to`.
    fn transfer_out(
        &mut self,
        asset: &AssetId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), SluiceError>;

    /// Current balance of `account` in `asset`.
    fn balance_of(&self, asset: &AssetId, account: &AccountId) -> Amount;
}
