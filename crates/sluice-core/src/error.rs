use thiserror::Error;

use crate::types::{Amount, PoolId};

/// Ledger-wide error types for Sluice.
#[derive(Debug, Error)]
pub enum SluiceError {
    /// An operation referenced a pool id that was never registered.
    #[error("Pool not found: {0}")]
    PoolNotFound(PoolId),

    /// A withdrawal asked for more than the position holds.
    #[error("Insufficient staked balance: requested {requested} but only {available} staked")]
    InsufficientBalance {
        /// Amount the caller asked to withdraw.
        requested: Amount,
        /// Amount actually staked in the position.
        available: Amount,
    },

    /// The external asset ledger refused a transfer (insufficient balance
    /// or allowance on the caller's or the engine's side).
    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for SluiceError {
    fn from(e: serde_json::Error) -> Self {
        SluiceError::Serialization(e.to_string())
    }
}
