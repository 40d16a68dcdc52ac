//! Height- and network-keyed dispatch to one of the five retarget algorithms.

use retarget_params::{ChainParams, Network};

use crate::algorithms::{
    dgw_next_work, kgw_next_work, legacy_next_work, mue_next_work, muedgw_next_work,
};
use crate::chain::ChainIndexView;
use crate::compact::target_to_compact;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Btc,
    Kgw,
    Dgw,
    Muedgw,
    Mue,
}

/// Pure function of `(network, next_height)`. Total over every height,
/// including 0 — the caller-facing [`next_work_required`] special-cases
/// height 0 before ever consulting this function.
pub fn select(network: Network, next_height: i32) -> Algorithm {
    match network {
        Network::Main | Network::Regtest => {
            if next_height < 15_200 {
                Algorithm::Btc
            } else if next_height < 34_140 {
                Algorithm::Kgw
            } else if next_height < 45_000 {
                Algorithm::Dgw
            } else {
                Algorithm::Muedgw
            }
        }
        Network::Test => {
            if next_height < 2 {
                Algorithm::Btc
            } else if next_height < 5 {
                Algorithm::Kgw
            } else if next_height < 10 {
                Algorithm::Dgw
            } else if next_height < 30 {
                Algorithm::Mue
            } else {
                Algorithm::Muedgw
            }
        }
    }
}

/// Entry point a node calls once per new block: the compact target the block
/// at `last.height() + 1` must satisfy. `last` is `None` only when the block
/// being produced is height 0 itself (no chain exists yet), in which case
/// the pow limit is returned directly without consulting the Selector or any
/// retarget algorithm. `now` is the wall-clock time the caller observed the
/// candidate block at, used only by the algorithms that need a notion of
/// "now" (legacy's min-difficulty check, MUE's stale-tip guard); this crate
/// never reads the system clock itself.
pub fn next_work_required<C: ChainIndexView>(
    last: Option<&C>,
    now: i64,
    params: &ChainParams,
) -> u32 {
    let Some(last) = last else {
        return target_to_compact(&params.pow_limit);
    };

    let next_height = last.height() + 1;
    match select(params.network, next_height) {
        Algorithm::Btc => legacy_next_work(last, Some(now), params),
        Algorithm::Kgw => kgw_next_work(last, params),
        Algorithm::Dgw => dgw_next_work(last, params),
        Algorithm::Muedgw => muedgw_next_work(last, params),
        Algorithm::Mue => mue_next_work(last, now, params),
    }
}
