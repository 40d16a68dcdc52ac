//! Difficulty retargeting: compact-target arithmetic, the five historical
//! retarget algorithms this chain has used, and the selector that dispatches
//! between them by height.
//!
//! Every function here is pure with respect to the chain it is handed
//! through [`chain::ChainIndexView`] — no global state, no system clock
//! reads, no I/O. Callers own the block index and the wall-clock time.

pub mod algorithms;
pub mod chain;
pub mod compact;
pub mod selector;
pub mod verifier;

pub use chain::{chain_from_headers, BlockRef, ChainIndexView, ChainViewError, HeaderRecord};
pub use compact::{
    compact_to_target, compact_to_u256, hash_meets_target, target_to_compact, u256_to_compact,
    BigInt256, CompactError,
};
pub use selector::{next_work_required, select, Algorithm};
pub use verifier::{block_work, check_pow, equivalent_time, PowRejection};
