//! Persistence of sampled metrics and final selections.
//!
//! Two independent artifacts live here: the metrics cache, which stores
//! sampled brightness/motion keyed by verified input identities, and the
//! selection sidecar, which stores the final frame list keyed by a hash of
//! the selection settings.

/// Role-tagged input clip snapshots
pub mod identity;

/// Versioned metrics cache with ordered validity checks
pub mod store;

/// Selection sidecar keyed by the selection hash
pub mod sidecar;

pub use identity::{
    ClipIdentity, ClipRole, FrameMetricsCacheInfo, analyzed_file_name, capture_clip_identities,
    capture_clip_identity, compute_sha1,
};
pub use sidecar::{
    SELECTION_SIDECAR_VERSION, compute_selection_hash, load_selection_sidecar,
    save_selection_sidecar,
};
pub use store::{
    CacheLoadResult, CacheReason, CacheStatus, CachedMetrics, METRICS_CACHE_VERSION,
    MetricsConfigSnapshot, probe_cached_metrics, save_cached_metrics,
};
