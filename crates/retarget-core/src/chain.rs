//! Read-only projection of a header chain.
//!
//! The retarget algorithms only ever need four accessors per block plus a
//! backward pointer, so that is the entire surface a caller has to implement
//! — whatever block-index store the surrounding node uses stays out of this
//! crate entirely.

use crate::compact::BigInt256;

pub trait ChainIndexView: Clone {
    fn height(&self) -> i32;
    fn time(&self) -> i64;
    fn bits(&self) -> u32;
    fn chain_work(&self) -> BigInt256;
    fn parent(&self) -> Option<Self>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainViewError {
    EmptyChain,
    NonContiguous,
}

impl std::fmt::Display for ChainViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainViewError::EmptyChain => write!(f, "no headers available"),
            ChainViewError::NonContiguous => {
                write!(f, "header list must be contiguous by height")
            }
        }
    }
}

impl std::error::Error for ChainViewError {}

/// A simple `Arc`-linked chain node, suitable for building test fixtures and
/// for small in-process chains. Cloning is a refcount bump, matching the
/// cheap-pointer semantics the original `CBlockIndex*` walk relied on.
#[derive(Clone, Debug)]
pub struct BlockRef(std::sync::Arc<BlockRefInner>);

#[derive(Debug)]
struct BlockRefInner {
    height: i32,
    time: i64,
    bits: u32,
    chain_work: BigInt256,
    parent: Option<BlockRef>,
}

impl BlockRef {
    /// A root node with no parent, at an arbitrary height. `genesis` is the
    /// height-0 special case of this.
    pub fn root(height: i32, time: i64, bits: u32, chain_work: BigInt256) -> Self {
        BlockRef(std::sync::Arc::new(BlockRefInner {
            height,
            time,
            bits,
            chain_work,
            parent: None,
        }))
    }

    pub fn genesis(time: i64, bits: u32, chain_work: BigInt256) -> Self {
        BlockRef::root(0, time, bits, chain_work)
    }

    pub fn child(&self, time: i64, bits: u32, chain_work: BigInt256) -> Self {
        BlockRef(std::sync::Arc::new(BlockRefInner {
            height: self.height() + 1,
            time,
            bits,
            chain_work,
            parent: Some(self.clone()),
        }))
    }
}

/// Plain header data the way a caller's block-index store hands it over —
/// before it has been projected into a [`ChainIndexView`] walk at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderRecord {
    pub height: i32,
    pub time: i64,
    pub bits: u32,
}

/// Builds a [`BlockRef`] chain (returning the tip) from a slice of header
/// records, validating that heights are contiguous before touching any
/// retarget logic. `chain_work` is derived via [`crate::verifier::block_work`]
/// rather than trusted from the caller, matching how a freshly-loaded block
/// index would recompute it.
///
/// Mirrors the donor's `ensure_contiguous`/`chain.is_empty()` guards ahead of
/// its own retarget entry point: malformed input (an empty slice, or a slice
/// whose heights skip or repeat) is reported as a typed error rather than
/// handed to a retarget algorithm that assumes a well-formed walk.
pub fn chain_from_headers(headers: &[HeaderRecord]) -> Result<BlockRef, ChainViewError> {
    let Some(first) = headers.first() else {
        return Err(ChainViewError::EmptyChain);
    };
    for (idx, header) in headers.iter().enumerate() {
        if header.height != first.height + idx as i32 {
            return Err(ChainViewError::NonContiguous);
        }
    }

    let mut tip = BlockRef::root(first.height, first.time, first.bits, BigInt256::zero());
    for header in &headers[1..] {
        let work = crate::verifier::block_work(header.bits).unwrap_or_default();
        let chain_work = tip.chain_work() + work;
        tip = tip.child(header.time, header.bits, chain_work);
    }
    Ok(tip)
}

impl ChainIndexView for BlockRef {
    fn height(&self) -> i32 {
        self.0.height
    }

    fn time(&self) -> i64 {
        self.0.time
    }

    fn bits(&self) -> u32 {
        self.0.bits
    }

    fn chain_work(&self) -> BigInt256 {
        self.0.chain_work
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent.clone()
    }
}

/// Builds a chain of [`BlockRef`]s on top of `genesis`, one per `(time,
/// bits)` pair, accumulating `chain_work` via [`crate::verifier::block_work`]
/// as real chain-work would be. Test-only convenience, not part of the
/// retarget core's public surface used by production callers.
#[cfg(test)]
pub fn extend_chain(genesis: &BlockRef, blocks: &[(i64, u32)]) -> BlockRef {
    let mut tip = genesis.clone();
    for &(time, bits) in blocks {
        let work = crate::verifier::block_work(bits).unwrap_or_default();
        let chain_work = tip.chain_work() + work;
        tip = tip.child(time, bits, chain_work);
    }
    tip
}
