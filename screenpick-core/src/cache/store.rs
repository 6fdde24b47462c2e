// ============================================================================
// screenpick-core/src/cache/store.rs
// ============================================================================
//
// METRICS CACHE STORE: Verified Reuse of Sampled Metrics
//
// The cache document holds the sampled brightness/motion maps together with
// everything that determines them: the input identities, trims, frame rate
// and the metric-affecting slice of the analysis config. A probe checks each
// of these in a fixed order and reports the first difference as a
// `CacheReason`. Read problems never fail the run; they only force a
// recompute.

// ---- External crate imports ----
use serde::{Deserialize, Serialize};

// ---- Standard library imports ----
use std::fmt;
use std::fs;
use std::io;

// ---- Internal crate imports ----
use crate::cache::identity::{ClipIdentity, FrameMetricsCacheInfo};
use crate::config::AnalysisConfig;
use crate::error::CoreResult;
use crate::processing::types::{FrameMetrics, SelectionWindowSpec};
use crate::source::Fps;
use crate::temp_files::write_atomic;
use crate::utils::format_bytes;

/// Format version of the metrics cache document.
pub const METRICS_CACHE_VERSION: u32 = 1;

/// The analysis settings that change sampled metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfigSnapshot {
    pub step: usize,
    pub downscale_height: u32,
    pub analyze_in_sdr: bool,
    pub motion_use_absdiff: bool,
    pub motion_diff_radius: usize,
    pub window_start: usize,
    pub window_end: usize,
}

impl MetricsConfigSnapshot {
    #[must_use]
    pub fn capture(config: &AnalysisConfig, window: SelectionWindowSpec) -> Self {
        Self {
            step: config.step,
            downscale_height: config.downscale_height,
            analyze_in_sdr: config.analyze_in_sdr,
            motion_use_absdiff: config.motion_use_absdiff,
            motion_diff_radius: config.motion_diff_radius,
            window_start: window.start_frame,
            window_end: window.end_frame,
        }
    }
}

/// Metrics restored from a cache document.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedMetrics {
    pub metrics: FrameMetrics,
    pub config: MetricsConfigSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    Reused,
    Stale,
    Missing,
    Error,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Reused => "reused",
            CacheStatus::Stale => "stale",
            CacheStatus::Missing => "missing",
            CacheStatus::Error => "error",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a cache document was not reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheReason {
    Missing,
    Unreadable,
    VersionMismatch,
    FileListMismatch,
    InputsPathMismatch,
    InputsStatMismatch,
    InputsSha1Mismatch,
    ConfigMismatch,
}

impl CacheReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheReason::Missing => "missing",
            CacheReason::Unreadable => "unreadable",
            CacheReason::VersionMismatch => "version_mismatch",
            CacheReason::FileListMismatch => "file_list_mismatch",
            CacheReason::InputsPathMismatch => "inputs_path_mismatch",
            CacheReason::InputsStatMismatch => "inputs_stat_mismatch",
            CacheReason::InputsSha1Mismatch => "inputs_sha1_mismatch",
            CacheReason::ConfigMismatch => "config_mismatch",
        }
    }
}

impl fmt::Display for CacheReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`probe_cached_metrics`]. `metrics` is set only when reused.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheLoadResult {
    pub status: CacheStatus,
    pub reason: Option<CacheReason>,
    pub metrics: Option<CachedMetrics>,
}

impl CacheLoadResult {
    fn reused(metrics: CachedMetrics) -> Self {
        Self { status: CacheStatus::Reused, reason: None, metrics: Some(metrics) }
    }

    fn rejected(status: CacheStatus, reason: CacheReason) -> Self {
        Self { status, reason: Some(reason), metrics: None }
    }

    fn stale(reason: CacheReason) -> Self {
        Self::rejected(CacheStatus::Stale, reason)
    }

    pub fn is_reused(&self) -> bool {
        self.status == CacheStatus::Reused
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct MetricsCacheDocument {
    version: u32,
    files: Vec<String>,
    analyzed_file: String,
    trim_start: i64,
    trim_end: Option<i64>,
    fps: Fps,
    inputs: Vec<ClipIdentity>,
    config: MetricsConfigSnapshot,
    brightness: Vec<(usize, f64)>,
    motion: Vec<(usize, f64)>,
}

/// Checks the cache document at `info.path` against the current inputs and
/// config, returning the metrics only if every check passes.
pub fn probe_cached_metrics(
    info: &FrameMetricsCacheInfo,
    config: &AnalysisConfig,
    window: SelectionWindowSpec,
) -> CacheLoadResult {
    let result = probe(info, config, window);
    match result.reason {
        None => log::debug!("Metrics cache {} is valid", info.path.display()),
        Some(reason) => log::debug!(
            "Metrics cache {} not reused: {} ({})",
            info.path.display(),
            result.status,
            reason
        ),
    }
    result
}

fn probe(
    info: &FrameMetricsCacheInfo,
    config: &AnalysisConfig,
    window: SelectionWindowSpec,
) -> CacheLoadResult {
    let raw = match fs::read(&info.path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return CacheLoadResult::rejected(CacheStatus::Missing, CacheReason::Missing);
        }
        Err(e) => {
            log::debug!("Failed to read metrics cache {}: {}", info.path.display(), e);
            return CacheLoadResult::rejected(CacheStatus::Error, CacheReason::Unreadable);
        }
    };

    let value: serde_json::Value = match serde_json::from_slice(&raw) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("Metrics cache {} is not valid JSON: {}", info.path.display(), e);
            return CacheLoadResult::rejected(CacheStatus::Error, CacheReason::Unreadable);
        }
    };

    if value.get("version").and_then(serde_json::Value::as_u64)
        != Some(u64::from(METRICS_CACHE_VERSION))
    {
        return CacheLoadResult::stale(CacheReason::VersionMismatch);
    }

    let document: MetricsCacheDocument = match serde_json::from_value(value) {
        Ok(document) => document,
        Err(e) => {
            log::debug!("Metrics cache {} is malformed: {}", info.path.display(), e);
            return CacheLoadResult::rejected(CacheStatus::Error, CacheReason::Unreadable);
        }
    };

    if let Some(reason) = input_mismatch(info, &document) {
        return CacheLoadResult::stale(reason);
    }

    let snapshot = MetricsConfigSnapshot::capture(config, window);
    if document.config != snapshot
        || document.analyzed_file != info.analyzed_file
        || document.trim_start != info.trim_start
        || document.trim_end != info.trim_end
        || document.fps != info.fps
    {
        return CacheLoadResult::stale(CacheReason::ConfigMismatch);
    }

    CacheLoadResult::reused(CachedMetrics {
        metrics: FrameMetrics {
            brightness: document.brightness.into_iter().collect(),
            motion: document.motion.into_iter().collect(),
        },
        config: document.config,
    })
}

/// First difference between the current and cached inputs, checking file
/// names, then paths, then size/mtime, then digests.
fn input_mismatch(info: &FrameMetricsCacheInfo, document: &MetricsCacheDocument) -> Option<CacheReason> {
    if document.files != info.files {
        return Some(CacheReason::FileListMismatch);
    }

    let mut pairs = Vec::with_capacity(info.clips.len());
    for current in &info.clips {
        let cached = document
            .inputs
            .iter()
            .find(|c| c.role == current.role && c.name == current.name);
        match cached {
            Some(cached) if cached.path == current.path => pairs.push((current, cached)),
            _ => return Some(CacheReason::InputsPathMismatch),
        }
    }

    if pairs.iter().any(|(current, cached)| {
        current.size != cached.size || current.mtime != cached.mtime
    }) {
        return Some(CacheReason::InputsStatMismatch);
    }

    if pairs
        .iter()
        .any(|(current, cached)| current.sha1.is_some() && current.sha1 != cached.sha1)
    {
        return Some(CacheReason::InputsSha1Mismatch);
    }

    None
}

/// Writes `metrics` to `info.path` atomically. Callers treat failure as a warning.
pub fn save_cached_metrics(
    info: &FrameMetricsCacheInfo,
    config: &AnalysisConfig,
    window: SelectionWindowSpec,
    metrics: &FrameMetrics,
) -> CoreResult<()> {
    let document = MetricsCacheDocument {
        version: METRICS_CACHE_VERSION,
        files: info.files.clone(),
        analyzed_file: info.analyzed_file.clone(),
        trim_start: info.trim_start,
        trim_end: info.trim_end,
        fps: info.fps,
        inputs: info.clips.clone(),
        config: MetricsConfigSnapshot::capture(config, window),
        brightness: metrics.brightness.iter().map(|(&k, &v)| (k, v)).collect(),
        motion: metrics.motion.iter().map(|(&k, &v)| (k, v)).collect(),
    };

    let bytes = serde_json::to_vec(&document)?;
    write_atomic(&info.path, &bytes)?;
    log::info!(
        "Saved metrics for {} frames to {} ({})",
        metrics.len(),
        info.path.display(),
        format_bytes(bytes.len() as u64)
    );
    Ok(())
}
