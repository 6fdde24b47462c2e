//! Configuration structures and constants for the screenpick-core library.
//!
//! This module provides the analysis configuration consumed by the frame
//! selection engine: how many frames to pick per category, how metrics are
//! sampled, and where cached results are persisted. A configuration can also
//! be read from a JSON file with [`AnalysisConfig::from_json_file`].

mod builder;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreResult, config_error};

pub use builder::AnalysisConfigBuilder;

// Default constants

/// Default number of dark frames to select.
pub const DEFAULT_FRAME_COUNT_DARK: usize = 20;

/// Default number of bright frames to select.
pub const DEFAULT_FRAME_COUNT_BRIGHT: usize = 10;

/// Default number of high-motion frames to select.
pub const DEFAULT_FRAME_COUNT_MOTION: usize = 15;

/// Default number of random frames to select.
pub const DEFAULT_RANDOM_FRAMES: usize = 15;

/// Default seed for random frame selection. Fixed so repeated runs agree.
pub const DEFAULT_RANDOM_SEED: u64 = 20_202_020;

/// Default height frames are downscaled to before metrics are computed.
/// 0 disables downscaling.
pub const DEFAULT_DOWNSCALE_HEIGHT: u32 = 480;

/// Default sampling stride in frames.
pub const DEFAULT_STEP: usize = 2;

/// Brightness quantile at or below which frames count as dark.
pub const DEFAULT_DARK_QUANTILE: f64 = 0.20;

/// Brightness quantile at or above which frames count as bright.
pub const DEFAULT_BRIGHT_QUANTILE: f64 = 0.80;

/// Normalized luma band for dark frames when quantiles are disabled.
/// The lower bound excludes near-black fades (16/255 limited-range black).
pub const DEFAULT_DARK_LUMA_BAND: LumaBand = LumaBand { min: 0.062_746, max: 0.38 };

/// Normalized luma band for bright frames when quantiles are disabled.
pub const DEFAULT_BRIGHT_LUMA_BAND: LumaBand = LumaBand { min: 0.45, max: 0.80 };

/// Motion samples are averaged over this many neighbouring samples on each side.
pub const DEFAULT_MOTION_DIFF_RADIUS: usize = 4;

/// Minimum spacing between selected frames, in seconds.
pub const DEFAULT_SCREEN_SEPARATION_SEC: f64 = 6.0;

/// Shortest analyzable window, in seconds, before lead/trail trims are abandoned.
pub const DEFAULT_MIN_WINDOW_SECONDS: f64 = 5.0;

/// Default metrics cache file name.
pub const DEFAULT_FRAME_DATA_FILENAME: &str = "generated.compframes";

/// Default selection sidecar file name.
pub const DEFAULT_SELECTION_SIDECAR_FILENAME: &str = "generated.selection.v1.json";

/// Inclusive normalized brightness range used in fixed-band selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LumaBand {
    pub min: f64,
    pub max: f64,
}

impl LumaBand {
    /// Returns true when `value` lies within the band, bounds included.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Analysis configuration for a single selection run.
///
/// All fields have defaults. Use [`AnalysisConfigBuilder`] for a fluent,
/// validated construction, or mutate a `Default` value and call
/// [`AnalysisConfig::validate`].
///
/// # Examples
///
/// ```rust
/// use screenpick_core::config::AnalysisConfigBuilder;
///
/// let config = AnalysisConfigBuilder::new()
///     .frame_count_dark(6)
///     .frame_count_bright(4)
///     .random_seed(7)
///     .screen_separation_sec(4.0)
///     .build()
///     .unwrap();
/// assert_eq!(config.frame_count_dark, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    //
    // Frame counts
    //

    /// Number of dark frames to select
    pub frame_count_dark: usize,

    /// Number of bright frames to select
    pub frame_count_bright: usize,

    /// Number of high-motion frames to select
    pub frame_count_motion: usize,

    /// Frames the user asked for explicitly. Always included when in range.
    pub user_frames: Vec<usize>,

    /// Number of random frames to select
    pub random_frames: usize,

    /// Seed for the random frame sampler
    pub random_seed: u64,

    //
    // Metric sampling
    //

    /// Height to downscale to before sampling (0 = disabled)
    pub downscale_height: u32,

    /// Sampling stride in frames (>= 1)
    pub step: usize,

    /// Ask the frame source for tonemapped SDR samples of HDR content
    pub analyze_in_sdr: bool,

    //
    // Brightness selection
    //

    /// Select dark/bright frames by quantile rank instead of fixed luma bands
    pub use_quantiles: bool,

    /// Brightness quantile bounding the dark pool
    pub dark_quantile: f64,

    /// Brightness quantile bounding the bright pool
    pub bright_quantile: f64,

    /// Luma band for dark frames in fixed-band mode
    pub dark_luma_band: LumaBand,

    /// Luma band for bright frames in fixed-band mode
    pub bright_luma_band: LumaBand,

    //
    // Motion selection
    //

    /// Ask the frame source for absolute-difference motion instead of its default metric
    pub motion_use_absdiff: bool,

    /// Exclude motion above this quantile as scene cuts (0 = disabled)
    pub motion_scenecut_quantile: f64,

    /// Average motion over this many neighbouring samples on each side
    pub motion_diff_radius: usize,

    //
    // Window and spacing
    //

    /// Minimum spacing between selected frames in seconds
    pub screen_separation_sec: f64,

    /// Seconds skipped at the start of every clip
    pub ignore_lead_seconds: f64,

    /// Seconds skipped at the end of every clip
    pub ignore_trail_seconds: f64,

    /// Trims are abandoned if they leave less than this many seconds
    pub min_window_seconds: f64,

    //
    // Persistence
    //

    /// Persist sampled metrics to the cache file
    pub save_frames_data: bool,

    /// Cache file name, resolved against the comparison root by the caller
    pub frame_data_filename: String,

    /// Selection sidecar file name, used when the metrics cache is off
    pub selection_sidecar_filename: String,

    /// Hash every input with SHA1 when capturing clip identities (slow for large files)
    pub verify_input_hashes: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_count_dark: DEFAULT_FRAME_COUNT_DARK,
            frame_count_bright: DEFAULT_FRAME_COUNT_BRIGHT,
            frame_count_motion: DEFAULT_FRAME_COUNT_MOTION,
            user_frames: Vec::new(),
            random_frames: DEFAULT_RANDOM_FRAMES,
            random_seed: DEFAULT_RANDOM_SEED,
            downscale_height: DEFAULT_DOWNSCALE_HEIGHT,
            step: DEFAULT_STEP,
            analyze_in_sdr: true,
            use_quantiles: true,
            dark_quantile: DEFAULT_DARK_QUANTILE,
            bright_quantile: DEFAULT_BRIGHT_QUANTILE,
            dark_luma_band: DEFAULT_DARK_LUMA_BAND,
            bright_luma_band: DEFAULT_BRIGHT_LUMA_BAND,
            motion_use_absdiff: false,
            motion_scenecut_quantile: 0.0,
            motion_diff_radius: DEFAULT_MOTION_DIFF_RADIUS,
            screen_separation_sec: DEFAULT_SCREEN_SEPARATION_SEC,
            ignore_lead_seconds: 0.0,
            ignore_trail_seconds: 0.0,
            min_window_seconds: DEFAULT_MIN_WINDOW_SECONDS,
            save_frames_data: true,
            frame_data_filename: DEFAULT_FRAME_DATA_FILENAME.to_string(),
            selection_sidecar_filename: DEFAULT_SELECTION_SIDECAR_FILENAME.to_string(),
            verify_input_hashes: false,
        }
    }
}

impl AnalysisConfig {
    /// Checks every field for values the engine cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.step == 0 {
            return Err(config_error("step must be at least 1"));
        }

        for (name, q) in [
            ("dark_quantile", self.dark_quantile),
            ("bright_quantile", self.bright_quantile),
            ("motion_scenecut_quantile", self.motion_scenecut_quantile),
        ] {
            if !(0.0..=1.0).contains(&q) {
                return Err(config_error(format!("{name} must be within [0, 1], got {q}")));
            }
        }

        for (name, band) in [
            ("dark_luma_band", self.dark_luma_band),
            ("bright_luma_band", self.bright_luma_band),
        ] {
            if !(0.0..=1.0).contains(&band.min)
                || !(0.0..=1.0).contains(&band.max)
                || band.min > band.max
            {
                return Err(config_error(format!(
                    "{name} must satisfy 0 <= min <= max <= 1, got [{}, {}]",
                    band.min, band.max
                )));
            }
        }

        for (name, secs) in [
            ("screen_separation_sec", self.screen_separation_sec),
            ("ignore_lead_seconds", self.ignore_lead_seconds),
            ("ignore_trail_seconds", self.ignore_trail_seconds),
            ("min_window_seconds", self.min_window_seconds),
        ] {
            if !secs.is_finite() || secs < 0.0 {
                return Err(config_error(format!(
                    "{name} must be a non-negative number of seconds, got {secs}"
                )));
            }
        }

        if self.save_frames_data && self.frame_data_filename.trim().is_empty() {
            return Err(config_error(
                "frame_data_filename must be set when save_frames_data is enabled",
            ));
        }

        Ok(())
    }

    /// True when sampled metrics should go through the metrics cache.
    #[must_use]
    pub fn uses_metrics_cache(&self) -> bool {
        self.save_frames_data
    }

    /// Loads a JSON configuration file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            config_error(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config: AnalysisConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_step_is_rejected() {
        let config = AnalysisConfig { step: 0, ..AnalysisConfig::default() };
        assert!(matches!(config.validate(), Err(crate::CoreError::Config(_))));
    }

    #[test]
    fn test_quantile_bounds() {
        let config = AnalysisConfig { dark_quantile: 1.5, ..AnalysisConfig::default() };
        assert!(config.validate().is_err());

        let config = AnalysisConfig { motion_scenecut_quantile: -0.1, ..AnalysisConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_band_is_rejected() {
        let config = AnalysisConfig {
            bright_luma_band: LumaBand { min: 0.9, max: 0.5 },
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_separation_is_rejected() {
        let config = AnalysisConfig { screen_separation_sec: -1.0, ..AnalysisConfig::default() };
        assert!(config.validate().is_err());

        let config = AnalysisConfig { ignore_lead_seconds: f64::NAN, ..AnalysisConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_cache_filename() {
        let config = AnalysisConfig {
            frame_data_filename: "  ".to_string(),
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            frame_data_filename: String::new(),
            save_frames_data: false,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"frame_count_dark": 3, "user_frames": [10, 20]}"#).unwrap();
        assert_eq!(config.frame_count_dark, 3);
        assert_eq!(config.user_frames, vec![10, 20]);
        assert_eq!(config.step, DEFAULT_STEP);
        assert_eq!(config.dark_luma_band, DEFAULT_DARK_LUMA_BAND);
    }

    #[test]
    fn test_luma_band_contains_bounds() {
        let band = LumaBand { min: 0.2, max: 0.4 };
        assert!(band.contains(0.2));
        assert!(band.contains(0.4));
        assert!(!band.contains(0.41));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screenpick.json");

        std::fs::write(&path, r#"{"random_seed": 5, "save_frames_data": false}"#).unwrap();
        let config = AnalysisConfig::from_json_file(&path).unwrap();
        assert_eq!(config.random_seed, 5);
        assert!(!config.uses_metrics_cache());

        std::fs::write(&path, r#"{"step": 0}"#).unwrap();
        assert!(AnalysisConfig::from_json_file(&path).is_err());
        assert!(AnalysisConfig::from_json_file(&dir.path().join("missing.json")).is_err());
    }
}
