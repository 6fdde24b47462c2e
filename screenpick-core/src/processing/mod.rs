//! Frame sampling and selection.
//!
//! The stages run in order: the window is computed from the clip lengths,
//! metrics are sampled (or restored from the cache), each category proposes
//! ranked candidates, and the composer merges them into the final frame set.
//! [`select_frames`] drives the whole pipeline.

/// Shared data types for metrics and selections
pub mod types;

/// Linear-interpolation quantile estimator
pub mod quantile;

/// Temporal separation of selected frames
pub mod dedupe;

/// Metric sampling over the analysis window
pub mod sampling;

/// Dark, bright and motion candidate ranking
pub mod categories;

/// Analyzable window shared by all clips
pub mod window;

/// Merging of user, category and random frames
pub mod compose;

/// End-to-end selection with cache and sidecar reuse
pub mod selection;

pub use compose::compose_selection;
pub use dedupe::{dedupe, pick_separated};
pub use quantile::quantile;
pub use sampling::{ProgressCallback, sample_metrics};
pub use selection::{SelectionOrigin, SelectionRequest, SelectionResult, select_frames};
pub use types::{
    Category, FrameMetrics, FrameSelection, SelectionDetail, SelectionSource, SelectionWindowSpec,
};
pub use window::compute_selection_window;
