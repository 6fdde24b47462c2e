//! Selection sidecar: the final frame list stored next to the outputs.
//!
//! When the metrics cache is off, a run can still skip sampling entirely by
//! reusing the frames chosen last time. The sidecar is keyed by a selection
//! hash over every setting that can change which frames are picked, plus the
//! path, size and mtime of every compared clip. Any mismatch means the
//! sidecar is ignored and everything is recomputed.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use crate::cache::identity::{analyzed_file_name, ClipIdentity};
use crate::config::{AnalysisConfig, LumaBand};
use crate::error::{config_error, CoreResult};
use crate::processing::types::{
    Category, FrameSelection, SelectionDetail, SelectionSource, SelectionWindowSpec,
};
use crate::source::Fps;
use crate::temp_files::write_atomic;
use crate::utils::format_timecode;

/// Format version of the selection sidecar document.
pub const SELECTION_SIDECAR_VERSION: u32 = 1;

/// Settings that decide which frames are chosen. Field order is part of the hash.
#[derive(Serialize)]
struct SelectionFingerprint<'a> {
    frame_count_dark: usize,
    frame_count_bright: usize,
    frame_count_motion: usize,
    user_frames: &'a [usize],
    random_frames: usize,
    random_seed: u64,
    downscale_height: u32,
    step: usize,
    analyze_in_sdr: bool,
    use_quantiles: bool,
    dark_quantile: f64,
    bright_quantile: f64,
    dark_luma_band: LumaBand,
    bright_luma_band: LumaBand,
    motion_use_absdiff: bool,
    motion_scenecut_quantile: f64,
    motion_diff_radius: usize,
    screen_separation_sec: f64,
    window: Option<SelectionWindowSpec>,
    num_frames: usize,
    fps: Fps,
}

/// SHA1 hex fingerprint of everything that affects the selection.
pub fn compute_selection_hash(
    config: &AnalysisConfig,
    num_frames: usize,
    fps: Fps,
    window: Option<SelectionWindowSpec>,
) -> CoreResult<String> {
    let fingerprint = SelectionFingerprint {
        frame_count_dark: config.frame_count_dark,
        frame_count_bright: config.frame_count_bright,
        frame_count_motion: config.frame_count_motion,
        user_frames: &config.user_frames,
        random_frames: config.random_frames,
        random_seed: config.random_seed,
        downscale_height: config.downscale_height,
        step: config.step,
        analyze_in_sdr: config.analyze_in_sdr,
        use_quantiles: config.use_quantiles,
        dark_quantile: config.dark_quantile,
        bright_quantile: config.bright_quantile,
        dark_luma_band: config.dark_luma_band,
        bright_luma_band: config.bright_luma_band,
        motion_use_absdiff: config.motion_use_absdiff,
        motion_scenecut_quantile: config.motion_scenecut_quantile,
        motion_diff_radius: config.motion_diff_radius,
        screen_separation_sec: config.screen_separation_sec,
        window,
        num_frames,
        fps,
    };
    let canonical = serde_json::to_vec(&fingerprint)?;
    Ok(hex::encode(Sha1::digest(&canonical)))
}

#[derive(Debug, Serialize, Deserialize)]
struct SelectionSidecar {
    version: u32,
    selection_hash: String,
    analyzed_file: String,
    clip_paths: Vec<String>,
    inputs: Vec<ClipIdentity>,
    frames: Vec<usize>,
    #[serde(default)]
    details: BTreeMap<usize, SelectionDetail>,
}

/// Loads a previously saved selection if it matches `selection_hash` and was
/// made from the same `clips`. Any problem yields `None`.
pub fn load_selection_sidecar(
    path: &Path,
    selection_hash: &str,
    clips: &[ClipIdentity],
    fps: Fps,
) -> Option<FrameSelection> {
    let analyzed_file = analyzed_file_name(clips)?;
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("No selection sidecar at {}", path.display());
            return None;
        }
        Err(e) => {
            log::debug!("Failed to read selection sidecar {}: {}", path.display(), e);
            return None;
        }
    };

    let value: serde_json::Value = serde_json::from_slice(&raw)
        .map_err(|e| log::debug!("Selection sidecar {} is not valid JSON: {}", path.display(), e))
        .ok()?;
    if value.get("version").and_then(serde_json::Value::as_u64)
        != Some(u64::from(SELECTION_SIDECAR_VERSION))
    {
        log::debug!("Selection sidecar {} has an unsupported version", path.display());
        return None;
    }

    let sidecar: SelectionSidecar = serde_json::from_value(value)
        .map_err(|e| log::debug!("Selection sidecar {} is malformed: {}", path.display(), e))
        .ok()?;

    if sidecar.selection_hash != selection_hash {
        log::debug!("Selection sidecar {} was made with different settings", path.display());
        return None;
    }
    if sidecar.analyzed_file != analyzed_file {
        log::debug!(
            "Selection sidecar {} belongs to {}, not {}",
            path.display(),
            sidecar.analyzed_file,
            analyzed_file
        );
        return None;
    }
    let clip_paths: Vec<&str> = clips.iter().map(|c| c.path.as_str()).collect();
    if sidecar.clip_paths != clip_paths {
        log::debug!("Selection sidecar {} was made from other clips", path.display());
        return None;
    }
    if let Some(changed) = changed_clip(&sidecar.inputs, clips) {
        log::debug!(
            "Selection sidecar {} is stale: {} changed since it was written",
            path.display(),
            changed.name
        );
        return None;
    }

    let mut frames = sidecar.frames;
    frames.sort_unstable();
    frames.dedup();

    let mut details = sidecar.details;
    let selection = FrameSelection {
        details: frames
            .iter()
            .map(|&frame| {
                let detail = details.remove(&frame).unwrap_or_else(|| SelectionDetail {
                    label: Category::Cached,
                    score: None,
                    source: SelectionSource::Sidecar,
                    timecode: format_timecode(frame, fps.as_f64()),
                    clip_role: None,
                    note: None,
                });
                (frame, detail)
            })
            .collect(),
        frames,
    };
    Some(selection)
}

/// First current clip whose recorded size, mtime or digest no longer matches.
fn changed_clip<'a>(recorded: &[ClipIdentity], clips: &'a [ClipIdentity]) -> Option<&'a ClipIdentity> {
    if recorded.len() != clips.len() {
        return clips.first();
    }
    clips.iter().find(|current| {
        let stored = recorded.iter().find(|c| c.role == current.role && c.path == current.path);
        match stored {
            Some(stored) => {
                stored.size != current.size
                    || stored.mtime != current.mtime
                    || (current.sha1.is_some() && current.sha1 != stored.sha1)
            }
            None => true,
        }
    })
}

/// Writes the selection sidecar atomically. Callers treat failure as a warning.
pub fn save_selection_sidecar(
    path: &Path,
    selection_hash: &str,
    clips: &[ClipIdentity],
    selection: &FrameSelection,
) -> CoreResult<()> {
    let analyzed_file = analyzed_file_name(clips)
        .ok_or_else(|| config_error("No clip has the analyze role"))?
        .to_string();

    let sidecar = SelectionSidecar {
        version: SELECTION_SIDECAR_VERSION,
        selection_hash: selection_hash.to_string(),
        analyzed_file,
        clip_paths: clips.iter().map(|c| c.path.clone()).collect(),
        inputs: clips.to_vec(),
        frames: selection.frames.clone(),
        details: selection.details.clone(),
    };

    write_atomic(path, &serde_json::to_vec_pretty(&sidecar)?)?;
    log::debug!("Saved selection sidecar with {} frames to {}", selection.frames.len(), path.display());
    Ok(())
}
