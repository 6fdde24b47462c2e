//! Candidate generation for the dark, bright and motion categories.
//!
//! Each selector returns `(frame, score)` pairs in preference order. Nothing
//! here enforces temporal separation; that happens in the composer, which
//! walks these lists with [`pick_separated`](super::dedupe::pick_separated).

use std::collections::BTreeMap;

use crate::config::{AnalysisConfig, LumaBand};
use crate::error::CoreResult;
use crate::processing::quantile::quantile;

type Candidates = Vec<(usize, f64)>;

/// Dark-frame candidates: darkest first.
pub fn dark_candidates(
    brightness: &BTreeMap<usize, f64>,
    count: usize,
    config: &AnalysisConfig,
) -> CoreResult<Candidates> {
    if count == 0 || brightness.is_empty() {
        return Ok(Vec::new());
    }

    if config.use_quantiles {
        let threshold = quantile(&values(brightness), config.dark_quantile)?;
        let pool = brightness.iter().filter(|&(_, &v)| v <= threshold).map(|(&f, &v)| (f, v));
        Ok(rank_ascending(pool.collect()))
    } else {
        Ok(band_candidates(brightness, count, config.dark_luma_band)
            .unwrap_or_else(|| rank_ascending(entries(brightness))))
    }
}

/// Bright-frame candidates: brightest first.
pub fn bright_candidates(
    brightness: &BTreeMap<usize, f64>,
    count: usize,
    config: &AnalysisConfig,
) -> CoreResult<Candidates> {
    if count == 0 || brightness.is_empty() {
        return Ok(Vec::new());
    }

    if config.use_quantiles {
        let threshold = quantile(&values(brightness), config.bright_quantile)?;
        let pool = brightness.iter().filter(|&(_, &v)| v >= threshold).map(|(&f, &v)| (f, v));
        Ok(rank_descending(pool.collect()))
    } else {
        Ok(band_candidates(brightness, count, config.bright_luma_band)
            .unwrap_or_else(|| rank_descending(entries(brightness))))
    }
}

/// High-motion candidates: strongest motion first, scene-cut spikes removed
/// when `motion_scenecut_quantile > 0`.
pub fn motion_candidates(
    motion: &BTreeMap<usize, f64>,
    count: usize,
    config: &AnalysisConfig,
) -> CoreResult<Candidates> {
    if count == 0 || motion.is_empty() {
        return Ok(Vec::new());
    }

    let pool = if config.motion_scenecut_quantile > 0.0 {
        let cutoff = quantile(&values(motion), config.motion_scenecut_quantile)?;
        let kept: Candidates =
            motion.iter().filter(|&(_, &v)| v <= cutoff).map(|(&f, &v)| (f, v)).collect();
        log::debug!(
            "Scene-cut filter at q={} (motion <= {:.4}) kept {} of {} samples",
            config.motion_scenecut_quantile,
            cutoff,
            kept.len(),
            motion.len()
        );
        kept
    } else {
        entries(motion)
    };

    Ok(rank_descending(pool))
}

/// Fixed-band selection: `count` evenly spaced frames from the band, then the
/// rest of the band as backfill. `None` when the band is too small.
fn band_candidates(
    brightness: &BTreeMap<usize, f64>,
    count: usize,
    band: LumaBand,
) -> Option<Candidates> {
    let in_band: Candidates =
        brightness.iter().filter(|&(_, &v)| band.contains(v)).map(|(&f, &v)| (f, v)).collect();

    if in_band.len() < count {
        log::debug!(
            "Only {} samples in luma band [{}, {}] for {} requested frames; ranking all samples",
            in_band.len(),
            band.min,
            band.max,
            count
        );
        return None;
    }

    let positions = evenly_spaced_positions(in_band.len(), count);
    let mut ordered: Candidates = positions.iter().map(|&p| in_band[p]).collect();
    ordered.extend(
        in_band
            .iter()
            .enumerate()
            .filter(|(i, _)| positions.binary_search(i).is_err())
            .map(|(_, &entry)| entry),
    );
    Some(ordered)
}

/// Centres of `count` equal segments over `len` items. Requires `count <= len`.
fn evenly_spaced_positions(len: usize, count: usize) -> Vec<usize> {
    (0..count)
        .map(|i| (((i as f64 + 0.5) * len as f64) / count as f64).floor() as usize)
        .map(|p| p.min(len - 1))
        .collect()
}

fn values(map: &BTreeMap<usize, f64>) -> Vec<f64> {
    map.values().copied().collect()
}

fn entries(map: &BTreeMap<usize, f64>) -> Candidates {
    map.iter().map(|(&f, &v)| (f, v)).collect()
}

fn rank_ascending(mut pool: Candidates) -> Candidates {
    pool.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    pool
}

fn rank_descending(mut pool: Candidates) -> Candidates {
    pool.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    pool
}
