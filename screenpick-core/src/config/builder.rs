// ============================================================================
// screenpick-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for AnalysisConfig
//
// This module implements the builder pattern for AnalysisConfig, providing a
// fluent API that starts from the documented defaults and validates the
// result in `build()`.

// ---- Internal crate imports ----
use super::{AnalysisConfig, LumaBand};
use crate::error::CoreResult;

/// Builder for creating validated [`AnalysisConfig`] instances.
///
/// # Examples
///
/// ```rust
/// use screenpick_core::config::AnalysisConfigBuilder;
///
/// let config = AnalysisConfigBuilder::new()
///     .frame_count_motion(8)
///     .motion_scenecut_quantile(0.98)
///     .user_frames(vec![120, 2400])
///     .save_frames_data(false)
///     .build()
///     .unwrap();
/// assert!(!config.save_frames_data);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfigBuilder {
    config: AnalysisConfig,
}

impl AnalysisConfigBuilder {
    /// Creates a builder holding the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration, e.g. one loaded from a file.
    pub fn from_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Sets the number of dark frames.
    pub fn frame_count_dark(mut self, count: usize) -> Self {
        self.config.frame_count_dark = count;
        self
    }

    /// Sets the number of bright frames.
    pub fn frame_count_bright(mut self, count: usize) -> Self {
        self.config.frame_count_bright = count;
        self
    }

    /// Sets the number of high-motion frames.
    pub fn frame_count_motion(mut self, count: usize) -> Self {
        self.config.frame_count_motion = count;
        self
    }

    /// Sets the explicit user frames.
    pub fn user_frames(mut self, frames: Vec<usize>) -> Self {
        self.config.user_frames = frames;
        self
    }

    /// Sets the number of random frames.
    pub fn random_frames(mut self, count: usize) -> Self {
        self.config.random_frames = count;
        self
    }

    /// Sets the random sampler seed.
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Sets the downscale height (0 disables downscaling).
    pub fn downscale_height(mut self, height: u32) -> Self {
        self.config.downscale_height = height;
        self
    }

    /// Sets the sampling stride.
    pub fn step(mut self, step: usize) -> Self {
        self.config.step = step;
        self
    }

    /// Requests tonemapped SDR samples.
    pub fn analyze_in_sdr(mut self, enabled: bool) -> Self {
        self.config.analyze_in_sdr = enabled;
        self
    }

    /// Chooses quantile ranking (true) or fixed luma bands (false).
    pub fn use_quantiles(mut self, enabled: bool) -> Self {
        self.config.use_quantiles = enabled;
        self
    }

    /// Sets the dark and bright brightness quantiles.
    pub fn quantiles(mut self, dark: f64, bright: f64) -> Self {
        self.config.dark_quantile = dark;
        self.config.bright_quantile = bright;
        self
    }

    /// Sets the dark luma band used in fixed-band mode.
    pub fn dark_luma_band(mut self, min: f64, max: f64) -> Self {
        self.config.dark_luma_band = LumaBand { min, max };
        self
    }

    /// Sets the bright luma band used in fixed-band mode.
    pub fn bright_luma_band(mut self, min: f64, max: f64) -> Self {
        self.config.bright_luma_band = LumaBand { min, max };
        self
    }

    /// Requests absolute-difference motion samples.
    pub fn motion_use_absdiff(mut self, enabled: bool) -> Self {
        self.config.motion_use_absdiff = enabled;
        self
    }

    /// Sets the scene-cut exclusion quantile (0 disables it).
    pub fn motion_scenecut_quantile(mut self, quantile: f64) -> Self {
        self.config.motion_scenecut_quantile = quantile;
        self
    }

    /// Sets the motion smoothing radius in samples.
    pub fn motion_diff_radius(mut self, radius: usize) -> Self {
        self.config.motion_diff_radius = radius;
        self
    }

    /// Sets the minimum spacing between selected frames.
    pub fn screen_separation_sec(mut self, seconds: f64) -> Self {
        self.config.screen_separation_sec = seconds;
        self
    }

    /// Sets the lead and trail trims in seconds.
    pub fn ignore_seconds(mut self, lead: f64, trail: f64) -> Self {
        self.config.ignore_lead_seconds = lead;
        self.config.ignore_trail_seconds = trail;
        self
    }

    /// Sets the minimum analyzable window in seconds.
    pub fn min_window_seconds(mut self, seconds: f64) -> Self {
        self.config.min_window_seconds = seconds;
        self
    }

    /// Enables or disables the metrics cache.
    pub fn save_frames_data(mut self, enabled: bool) -> Self {
        self.config.save_frames_data = enabled;
        self
    }

    /// Sets the metrics cache file name.
    pub fn frame_data_filename(mut self, filename: impl Into<String>) -> Self {
        self.config.frame_data_filename = filename.into();
        self
    }

    /// Sets the selection sidecar file name.
    pub fn selection_sidecar_filename(mut self, filename: impl Into<String>) -> Self {
        self.config.selection_sidecar_filename = filename.into();
        self
    }

    /// Enables SHA1 verification of inputs.
    pub fn verify_input_hashes(mut self, enabled: bool) -> Self {
        self.config.verify_input_hashes = enabled;
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> CoreResult<AnalysisConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
