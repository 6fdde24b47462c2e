// ============================================================================
// screenpick-core/src/processing/selection.rs
// ============================================================================
//
// SELECTION PIPELINE: Cache Probe, Sampling, Composition and Persistence
//
// `select_frames` is the single entry point callers need. It validates the
// config, reuses a selection sidecar or cached metrics when they are still
// valid, samples the frame source otherwise, and composes the final frame
// set. Cache and sidecar writes are best effort: a failure is logged and the
// in-memory selection is still returned.
//
// Everything runs on the caller's thread; the frame source is borrowed
// mutably for the duration of the scan.

// ---- Standard library imports ----
use std::collections::BTreeMap;
use std::path::Path;

// ---- Internal crate imports ----
use crate::cache::{
    analyzed_file_name, compute_selection_hash, load_selection_sidecar, probe_cached_metrics,
    save_cached_metrics, save_selection_sidecar, CacheReason, CacheStatus, ClipIdentity,
    FrameMetricsCacheInfo,
};
use crate::config::AnalysisConfig;
use crate::error::{CoreError, CoreResult};
use crate::processing::compose::compose_selection;
use crate::processing::sampling::{sample_metrics, ProgressCallback};
use crate::processing::types::{FrameMetrics, SelectionDetail, SelectionWindowSpec};
use crate::source::FrameSource;

/// Inputs of one selection run besides the config and frame source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionRequest<'a> {
    /// Identities of all compared clips, used to key the sidecar
    pub clips: &'a [ClipIdentity],
    /// Analyzable window; `None` restricts the selection to user frames
    pub window: Option<SelectionWindowSpec>,
    /// Metrics cache location and keys; used when `save_frames_data` is set
    pub cache_info: Option<&'a FrameMetricsCacheInfo>,
    /// Selection sidecar location; used when the metrics cache is not
    pub sidecar_path: Option<&'a Path>,
}

/// How the returned selection was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOrigin {
    MetricsCacheReused,
    Recomputed,
    SidecarReused,
}

impl SelectionOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionOrigin::MetricsCacheReused => "metrics_cache_reused",
            SelectionOrigin::Recomputed => "recomputed",
            SelectionOrigin::SidecarReused => "sidecar_reused",
        }
    }
}

/// Final output of [`select_frames`].
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    /// Ascending, duplicate-free frame indices
    pub frames: Vec<usize>,
    pub details: BTreeMap<usize, SelectionDetail>,
    pub selection_hash: String,
    pub origin: SelectionOrigin,
    /// Probe outcome when the metrics cache was consulted
    pub cache_status: Option<CacheStatus>,
    pub cache_reason: Option<CacheReason>,
}

/// Selects comparison frames from `source`.
///
/// A window running past the clip is cut back to `num_frames`. Fails only on
/// an invalid config, a window with no frame inside the clip or a scan in
/// which no frame could be sampled. Cache and sidecar problems degrade to a recompute.
pub fn select_frames<S>(
    source: &mut S,
    config: &AnalysisConfig,
    request: SelectionRequest<'_>,
    progress: Option<ProgressCallback<'_>>,
) -> CoreResult<SelectionResult>
where
    S: FrameSource + ?Sized,
{
    config.validate()?;

    let num_frames = source.num_frames();
    let fps = source.fps();
    let window = match request.window {
        Some(w) => Some(w.clamp_to(num_frames).ok_or(CoreError::InvalidWindow {
            start: w.start_frame,
            end: w.end_frame.min(num_frames),
        })?),
        None => None,
    };
    let selection_hash = compute_selection_hash(config, num_frames, fps, window)?;

    let cache_info = request.cache_info.filter(|_| config.uses_metrics_cache());
    let sidecar = match (cache_info, request.sidecar_path) {
        (None, Some(path)) if analyzed_file_name(request.clips).is_some() => Some(path),
        (None, Some(_)) => {
            log::warn!("No analyzed clip among the inputs; selection sidecar disabled");
            None
        }
        _ => None,
    };

    if let Some(path) = sidecar {
        if let Some(selection) = load_selection_sidecar(path, &selection_hash, request.clips, fps) {
            log::info!(
                "Reusing {} frames from selection sidecar {}",
                selection.frames.len(),
                path.display()
            );
            return Ok(SelectionResult {
                frames: selection.frames,
                details: selection.details,
                selection_hash,
                origin: SelectionOrigin::SidecarReused,
                cache_status: None,
                cache_reason: None,
            });
        }
    }

    let mut origin = SelectionOrigin::Recomputed;
    let mut cache_status = None;
    let mut cache_reason = None;

    let metrics = match (window, cache_info) {
        (None, _) => FrameMetrics::default(),
        (Some(window), Some(info)) => {
            let probe = probe_cached_metrics(info, config, window);
            cache_status = Some(probe.status);
            cache_reason = probe.reason;

            match probe.metrics {
                Some(cached) => {
                    log::info!(
                        "Reusing cached metrics for {} frames from {}",
                        cached.metrics.len(),
                        info.path.display()
                    );
                    origin = SelectionOrigin::MetricsCacheReused;
                    cached.metrics
                }
                None => {
                    log::info!(
                        "Metrics cache {} ({}); sampling frames",
                        probe.status,
                        probe.reason.map_or("unknown", |r| r.as_str())
                    );
                    let metrics = sample_metrics(source, config, window, progress)?;
                    if let Err(e) = save_cached_metrics(info, config, window, &metrics) {
                        log::warn!("Failed to save metrics cache {}: {}", info.path.display(), e);
                    }
                    metrics
                }
            }
        }
        (Some(window), None) => sample_metrics(source, config, window, progress)?,
    };

    let selection = compose_selection(&metrics, num_frames, fps, window, config)?;

    if let Some(path) = sidecar {
        if let Err(e) = save_selection_sidecar(path, &selection_hash, request.clips, &selection) {
            log::warn!("Failed to save selection sidecar {}: {}", path.display(), e);
        }
    }

    Ok(SelectionResult {
        frames: selection.frames,
        details: selection.details,
        selection_hash,
        origin,
        cache_status,
        cache_reason,
    })
}
