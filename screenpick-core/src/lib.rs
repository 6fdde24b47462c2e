//! Core library for choosing representative comparison frames.
//!
//! Given a source of per-frame brightness and motion samples, this crate
//! picks a small set of frames that cover dark, bright and high-motion scenes
//! plus user-requested and seeded random frames. Sampled metrics can be
//! cached next to the outputs and are reused only while the inputs (path,
//! size, mtime and optionally SHA1) and the metric settings are unchanged.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use screenpick_core::cache::{FrameMetricsCacheInfo, capture_clip_identities};
//! use screenpick_core::config::AnalysisConfigBuilder;
//! use screenpick_core::processing::{SelectionRequest, compute_selection_window, select_frames};
//! use screenpick_core::source::{FrameSource, RecordedFrameSource};
//! use std::path::{Path, PathBuf};
//!
//! let config = AnalysisConfigBuilder::new().random_seed(7).build().unwrap();
//! let mut source = RecordedFrameSource::from_json_file(Path::new("metrics.json")).unwrap();
//!
//! let paths = [PathBuf::from("source.mkv"), PathBuf::from("encode.mkv")];
//! let clips = capture_clip_identities(&paths, 1, config.verify_input_hashes).unwrap();
//! let cache_info =
//!     FrameMetricsCacheInfo::new("generated.compframes", clips.clone(), source.fps(), 0, None)
//!         .unwrap();
//!
//! let window =
//!     compute_selection_window(&[source.num_frames()], source.fps().as_f64(), &config);
//! let request = SelectionRequest {
//!     clips: &clips,
//!     window,
//!     cache_info: Some(&cache_info),
//!     sidecar_path: None,
//! };
//! let result = select_frames(&mut source, &config, request, None).unwrap();
//! println!("{:?}", result.frames);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod processing;
pub mod source;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use cache::{CacheReason, CacheStatus, ClipIdentity, ClipRole, FrameMetricsCacheInfo};
pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use processing::{
    Category, FrameSelection, SelectionDetail, SelectionOrigin, SelectionRequest, SelectionResult,
    SelectionWindowSpec, select_frames,
};
pub use source::{FrameSample, FrameSource, Fps, RecordedFrameSource};
pub use utils::format_timecode;
