// crates/sluice-pools/src/lib.rs
//
// sluice-pools: weighted pool registry, lazy reward accrual, and the
// settlement operations of the Sluice yield-distribution ledger.
//
// A global emission rate is split across pools in proportion to their
// allocation weights. Each pool keeps a running reward-per-share
// accumulator, advanced lazily from an external tick counter; each
// depositor keeps a signed debt snapshot against that accumulator. The
// pair makes every operation O(1) in the number of past operations and
// other depositors.
//
// All amounts are integers in the asset's smallest unit. The accumulator
// and debt values are fixed-point, scaled by `accrual::SCALE` (10^12).

pub mod accrual;
pub mod emission;
pub mod events;
pub mod ledger;
pub mod pool;
pub mod position;

// Re-export key types for ergonomic access from downstream crates.
pub use accrual::SCALE;
pub use emission::EmissionClock;
pub use events::PoolEvent;
pub use ledger::{LedgerConfig, PoolLedger};
pub use pool::{Pool, PoolRegistry};
pub use position::{Position, PositionBook};
