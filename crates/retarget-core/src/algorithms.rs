//! The five height-gated difficulty retargeting algorithms.
//!
//! Each function takes the last accepted block (as a [`ChainIndexView`]) and
//! the network's [`ChainParams`] and returns the compact target the *next*
//! block must satisfy. All five fall back to `pow_limit` when the available
//! history is shorter than the algorithm needs — never an error, per the
//! core's no-throw contract.

use retarget_params::ChainParams;

use crate::chain::ChainIndexView;
use crate::compact::{compact_to_u256, target_to_compact, u256_to_compact, BigInt256};

fn pow_limit_bits(params: &ChainParams) -> u32 {
    target_to_compact(&params.pow_limit)
}

fn pow_limit_value(params: &ChainParams) -> BigInt256 {
    BigInt256::from_little_endian(&params.pow_limit)
}

fn clamp_to_limit(value: BigInt256, params: &ChainParams) -> BigInt256 {
    let limit = pow_limit_value(params);
    if value > limit {
        limit
    } else {
        value
    }
}

/// The legacy Bitcoin-style timespan retarget ("BTC"): identity except at
/// interval boundaries, where the window's actual timespan is measured
/// against `pow_target_timespan` and clamped to a `[1/4, 4x]` band.
pub fn legacy_next_work<C: ChainIndexView>(
    last: &C,
    next_block_time: Option<i64>,
    params: &ChainParams,
) -> u32 {
    let interval = params.pow_target_timespan / params.pow_target_spacing;
    let next_height = last.height() + 1;

    if next_height % (interval as i32) != 0 {
        if params.allow_min_difficulty_blocks {
            if let Some(candidate_time) = next_block_time {
                if candidate_time > last.time() + params.pow_target_spacing * 2 {
                    return pow_limit_bits(params);
                }
            }
            let limit_bits = pow_limit_bits(params);
            let mut cursor = last.clone();
            loop {
                let Some(parent) = cursor.parent() else {
                    break;
                };
                if cursor.height() % (interval as i32) == 0 || cursor.bits() != limit_bits {
                    break;
                }
                cursor = parent;
            }
            return cursor.bits();
        }
        return last.bits();
    }

    // `no_retargeting` only short-circuits the interval-boundary retarget
    // itself; the non-boundary min-difficulty branch above still runs on
    // networks (regtest) that set both flags at once.
    if params.no_retargeting {
        return last.bits();
    }

    let first_height = last.height() - (interval as i32 - 1);
    let mut first = last.clone();
    while first.height() > first_height {
        match first.parent() {
            Some(parent) => first = parent,
            None => break,
        }
    }

    let actual_timespan_raw = last.time() - first.time();
    let min_timespan = params.pow_target_timespan / 4;
    let max_timespan = params.pow_target_timespan * 4;
    let actual_timespan = actual_timespan_raw.clamp(min_timespan, max_timespan);

    let Ok(old_target) = compact_to_u256(last.bits()) else {
        retarget_log::log_warn!(
            "legacy: last block at height {} has an undecodable bits value {:#010x}, falling back to pow limit",
            last.height(),
            last.bits()
        );
        return pow_limit_bits(params);
    };
    let mut next = old_target * BigInt256::from(actual_timespan as u64);
    next /= BigInt256::from(params.pow_target_timespan as u64);

    u256_to_compact(clamp_to_limit(next, params))
}

/// Kimoto Gravity Well: an adaptive window whose length is governed by how
/// far the measured block rate has drifted from `spacing`, bounded by a
/// floating-point "event horizon" term.
pub fn kgw_next_work<C: ChainIndexView>(last: &C, params: &ChainParams) -> u32 {
    let past_seconds_min = (params.pow_target_timespan as f64 * 0.025) as i64;
    let past_seconds_max = params.pow_target_timespan * 7;
    let past_blocks_min = (past_seconds_min / params.pow_target_spacing).max(0);
    let past_blocks_max = (past_seconds_max / params.pow_target_spacing).max(0);

    if last.height() == 0 || (last.height() as i64) < past_blocks_min {
        retarget_log::log_warn!(
            "kgw: window smaller than minimum at height {}, falling back to pow limit",
            last.height()
        );
        return pow_limit_bits(params);
    }

    let mut avg = BigInt256::zero();
    let mut actual_seconds: i64 = 0;
    let mut target_seconds: i64 = 0;
    let mut reading = last.clone();
    let mut i: i64 = 1;

    loop {
        if reading.height() == 0 {
            break;
        }
        if past_blocks_max > 0 && i > past_blocks_max {
            break;
        }

        let Ok(reading_target) = compact_to_u256(reading.bits()) else {
            retarget_log::log_warn!(
                "kgw: ancestor at height {} has an undecodable bits value {:#010x}, stopping the window walk early",
                reading.height(),
                reading.bits()
            );
            break;
        };
        if i == 1 {
            avg = reading_target;
        } else if reading_target >= avg {
            avg = (reading_target - avg) / BigInt256::from(i as u64) + avg;
        } else {
            avg -= (avg - reading_target) / BigInt256::from(i as u64);
        }

        actual_seconds = (last.time() - reading.time()).max(0);
        target_seconds = params.pow_target_spacing * i;

        let ratio = if actual_seconds != 0 && target_seconds != 0 {
            target_seconds as f64 / actual_seconds as f64
        } else {
            1.0
        };
        let event_horizon = 1.0 + 0.7084 * (i as f64 / 28.2).powf(-1.228);

        if i >= past_blocks_min && (ratio <= 1.0 / event_horizon || ratio >= event_horizon) {
            break;
        }

        match reading.parent() {
            Some(parent) => reading = parent,
            None => break,
        }
        i += 1;
    }

    let mut next = avg;
    if actual_seconds != 0 && target_seconds != 0 {
        next *= BigInt256::from(actual_seconds as u64);
        next /= BigInt256::from(target_seconds as u64);
    }

    u256_to_compact(clamp_to_limit(next, params))
}

/// Fixed-window cumulative-average retarget shared by Dark Gravity Wave and
/// its "MUEDGW" variant; they differ only in `min`/`max` window sizes.
fn dgw_like<C: ChainIndexView>(last: &C, params: &ChainParams, min: i64, max: i64) -> u32 {
    if last.height() == 0 || (last.height() as i64) < min {
        retarget_log::log_warn!(
            "dgw: window smaller than minimum ({min}) at height {}, falling back to pow limit",
            last.height()
        );
        return pow_limit_bits(params);
    }

    let mut avg = BigInt256::zero();
    let mut actual_timespan: i64 = 0;
    let mut last_block_time: i64 = 0;
    let mut count: i64 = 0;
    let mut reading = last.clone();

    loop {
        // A block at height 0 (genesis) is never folded into the window,
        // matching the backward walk terminating one block short of it.
        if reading.height() == 0 {
            break;
        }
        if max > 0 && count + 1 > max {
            break;
        }
        count += 1;

        if count <= min {
            let Ok(reading_target) = compact_to_u256(reading.bits()) else {
                retarget_log::log_warn!(
                    "dgw: ancestor at height {} has an undecodable bits value {:#010x}, stopping the window walk early",
                    reading.height(),
                    reading.bits()
                );
                break;
            };
            avg = if count == 1 {
                reading_target
            } else {
                (avg * BigInt256::from(count as u64) + reading_target)
                    / BigInt256::from((count + 1) as u64)
            };
        }

        if last_block_time > 0 {
            actual_timespan += last_block_time - reading.time();
        }
        last_block_time = reading.time();

        match reading.parent() {
            Some(parent) => reading = parent,
            None => break,
        }
    }

    let target_timespan = count * params.pow_target_spacing;
    let clamped = actual_timespan.clamp(target_timespan / 3, target_timespan * 3);

    let mut next = avg * BigInt256::from(clamped as u64);
    next /= BigInt256::from(target_timespan.max(1) as u64);

    u256_to_compact(clamp_to_limit(next, params))
}

/// Dark Gravity Wave: fixed 24-block window.
pub fn dgw_next_work<C: ChainIndexView>(last: &C, params: &ChainParams) -> u32 {
    dgw_like(last, params, 24, 24)
}

/// "MUEDGW": Dark Gravity Wave with a 23-block minimum, 24-block maximum.
pub fn muedgw_next_work<C: ChainIndexView>(last: &C, params: &ChainParams) -> u32 {
    dgw_like(last, params, 23, 24)
}

/// The local "MUE" algorithm: a fixed 6-block lookahead scaled by a
/// double-precision weighted factor derived from recent inter-block gaps.
pub fn mue_next_work<C: ChainIndexView>(last: &C, now: i64, params: &ChainParams) -> u32 {
    const SCAN_HEIGHT: i64 = 6;
    let ds_rate_norm = params.pow_target_spacing;
    let ds_rate_max = ds_rate_norm * 3;
    let fr_rate_ceiling = ds_rate_max * 3;
    let fr_rate_down = ds_rate_norm - 2;
    let fr_rate_floor = ds_rate_norm - 5;

    if (last.height() as i64) < SCAN_HEIGHT || now - last.time() > fr_rate_ceiling {
        retarget_log::log_warn!(
            "mue: insufficient window or stale tip at height {}, falling back to pow limit",
            last.height()
        );
        return pow_limit_bits(params);
    }

    let mut factors = [0.0f64; 5];
    let mut cursor = last.clone();
    let mut scan_time_b = last.time();

    for slot in 0..5 {
        let Some(parent) = cursor.parent() else {
            return pow_limit_bits(params);
        };
        let scan_time_a = scan_time_b;
        cursor = parent;
        scan_time_b = cursor.time();

        if now - cursor.time() > fr_rate_ceiling {
            return pow_limit_bits(params);
        }

        let interval = scan_time_a - scan_time_b;
        let factor = if interval >= ds_rate_norm {
            if interval > fr_rate_ceiling {
                0.5
            } else if interval > ds_rate_max {
                0.75
            } else {
                1.0
            }
        } else if interval < fr_rate_floor {
            2.0
        } else if interval < fr_rate_down {
            1.5
        } else {
            1.25
        };
        factors[slot] = factor;
    }

    let average: f64 = factors.iter().sum::<f64>() / 5.0;
    let difficulty_factor = (10_000.0 * average) as u64;

    let Ok(old_target) = compact_to_u256(last.bits()) else {
        retarget_log::log_warn!(
            "mue: last block at height {} has an undecodable bits value {:#010x}, falling back to pow limit",
            last.height(),
            last.bits()
        );
        return pow_limit_bits(params);
    };
    if difficulty_factor == 0 {
        return pow_limit_bits(params);
    }
    let mut next = old_target / BigInt256::from(difficulty_factor);
    next *= BigInt256::from(10_000u64);

    u256_to_compact(clamp_to_limit(next, params))
}
