// crates/sluice-core/src/types.rs
//
// Shared scalar aliases for the Sluice ledger.
//
// All monetary quantities are integers in the asset's smallest unit; the
// engine performs no floating-point arithmetic anywhere.

/// Smallest-unit asset amount.
pub type Amount = u128;

/// External discrete time unit driving reward emission (e.g. a block height).
pub type Tick = u64;

/// Dense 0-based pool index, assigned at registration in creation order.
pub type PoolId = u32;

/// Opaque 32-byte account identifier, as issued by the host environment.
pub type AccountId = [u8; 32];

/// Opaque 32-byte handle naming a fungible asset held by the external
/// asset ledger. The engine never inspects it.
pub type AssetId = [u8; 32];
