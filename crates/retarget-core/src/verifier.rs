//! Proof-of-work verification and per-block work accounting.

use retarget_params::{ChainParams, Hash256};

use crate::chain::ChainIndexView;
use crate::compact::{compact_to_u256, hash_meets_target, u256_to_hash, BigInt256, CompactError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowRejection {
    InvalidBits(CompactError),
    AboveLimit,
    HashExceedsTarget,
}

impl std::fmt::Display for PowRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PowRejection::InvalidBits(err) => write!(f, "invalid compact bits: {err}"),
            PowRejection::AboveLimit => write!(f, "target above pow limit"),
            PowRejection::HashExceedsTarget => write!(f, "hash does not meet target"),
        }
    }
}

impl std::error::Error for PowRejection {}

/// Validates that `hash` meets the target encoded by `bits`, and that `bits`
/// itself is within the network's pow limit. Never panics on attacker data;
/// every failure mode returns a typed reason.
pub fn check_pow(hash: &Hash256, bits: u32, params: &ChainParams) -> Result<(), PowRejection> {
    let target = compact_to_u256(bits).map_err(|err| {
        retarget_log::log_warn!("rejecting pow: bits {bits:#010x} failed to decode: {err}");
        PowRejection::InvalidBits(err)
    })?;
    if target.is_zero() {
        retarget_log::log_warn!("rejecting pow: bits {bits:#010x} decode to a zero target");
        return Err(PowRejection::InvalidBits(CompactError::Overflow));
    }

    let pow_limit = BigInt256::from_little_endian(&params.pow_limit);
    if target > pow_limit {
        retarget_log::log_warn!(
            "rejecting pow: bits {bits:#010x} target above pow limit on {}",
            params.network.as_str()
        );
        return Err(PowRejection::AboveLimit);
    }

    let target_bytes = u256_to_hash(target);
    if !hash_meets_target(hash, &target_bytes) {
        retarget_log::log_warn!("rejecting pow: hash does not meet target for bits {bits:#010x}");
        return Err(PowRejection::HashExceedsTarget);
    }

    Ok(())
}

/// `floor(2^256 / (target + 1))`, or zero if `bits` does not decode to a
/// usable target.
pub fn block_work(bits: u32) -> Option<BigInt256> {
    let target = compact_to_u256(bits).ok()?;
    if target.is_zero() {
        return Some(BigInt256::zero());
    }
    let one = BigInt256::from(1u64);
    Some((!target / (target + one)) + one)
}

/// Signed estimate, in seconds, of how much faster/slower `to` accumulated
/// work than `from` would have taken at `tip`'s difficulty. Saturates to
/// `i64::MAX`/`i64::MIN` rather than wrapping when the work delta exceeds 63
/// bits once scaled.
pub fn equivalent_time<C: ChainIndexView>(
    to: &C,
    from: &C,
    tip: &C,
    params: &ChainParams,
) -> i64 {
    let (delta, sign) = if to.chain_work() > from.chain_work() {
        (to.chain_work() - from.chain_work(), 1i64)
    } else {
        (from.chain_work() - to.chain_work(), -1i64)
    };

    let tip_work = block_work(tip.bits()).unwrap_or_else(BigInt256::zero);
    if tip_work.is_zero() {
        return 0;
    }

    let scaled = delta * BigInt256::from(params.pow_target_spacing.max(0) as u64) / tip_work;
    if scaled.bits() > 63 {
        return sign.saturating_mul(i64::MAX);
    }
    sign * (scaled.low_u64() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::BlockRef;
    use retarget_params::{consensus_params, Network};

    #[test]
    fn block_work_positive_for_pow_limit() {
        let params = consensus_params(Network::Main);
        let bits = crate::compact::target_to_compact(&params.pow_limit);
        let work = block_work(bits).expect("valid bits");
        assert!(work > BigInt256::zero());
    }

    #[test]
    fn block_work_zero_for_invalid_bits() {
        assert_eq!(block_work(0x0100_3456), Some(BigInt256::zero()));
        assert_eq!(block_work(0x0180_0000), None);
    }

    #[test]
    fn check_pow_accepts_hash_below_target() {
        let params = consensus_params(Network::Main);
        assert!(check_pow(&params.hash_genesis_block, params.genesis_bits, &params).is_ok());
    }

    #[test]
    fn check_pow_rejects_hash_above_target() {
        let params = consensus_params(Network::Main);
        let too_big = [0xffu8; 32];
        assert_eq!(
            check_pow(&too_big, params.genesis_bits, &params),
            Err(PowRejection::HashExceedsTarget)
        );
    }

    #[test]
    fn check_pow_rejects_bits_above_pow_limit() {
        let params = consensus_params(Network::Main);
        // A looser (larger) target than the mainnet pow limit.
        let looser_bits = 0x207f_ffff;
        let any_hash = [0u8; 32];
        assert_eq!(
            check_pow(&any_hash, looser_bits, &params),
            Err(PowRejection::AboveLimit)
        );
    }

    #[test]
    fn equivalent_time_sign_follows_chain_work_ordering() {
        let params = consensus_params(Network::Main);
        let genesis = BlockRef::genesis(params.genesis_time, params.genesis_bits, BigInt256::zero());
        let ahead = genesis.child(
            params.genesis_time + 40,
            params.genesis_bits,
            BigInt256::from(1_000_000u64),
        );
        let behind = genesis.child(
            params.genesis_time + 40,
            params.genesis_bits,
            BigInt256::from(10u64),
        );

        let forward = equivalent_time(&ahead, &behind, &ahead, &params);
        let backward = equivalent_time(&behind, &ahead, &ahead, &params);
        assert!(forward > 0);
        assert!(backward < 0);
        assert_eq!(forward, -backward);
    }
}
