// screenpick-core/src/processing/types.rs
// Responsibility: data types shared by the sampling, selection and persistence stages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::cache::ClipRole;
use crate::error::{CoreError, CoreResult};

/// Sparse per-frame metrics: only sampled indices are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameMetrics {
    pub brightness: BTreeMap<usize, f64>,
    pub motion: BTreeMap<usize, f64>,
}

impl FrameMetrics {
    /// Number of sampled frames.
    pub fn len(&self) -> usize {
        self.brightness.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brightness.is_empty()
    }

    /// Copy restricted to frames inside `window`.
    pub fn within(&self, window: SelectionWindowSpec) -> FrameMetrics {
        let range = window.start_frame..window.end_frame;
        FrameMetrics {
            brightness: self.brightness.range(range.clone()).map(|(&k, &v)| (k, v)).collect(),
            motion: self.motion.range(range).map(|(&k, &v)| (k, v)).collect(),
        }
    }
}

/// Half-open range of frames eligible for metric-based and random selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionWindowSpec {
    pub start_frame: usize,
    pub end_frame: usize,
}

impl SelectionWindowSpec {
    /// Creates a window, rejecting `end <= start`.
    pub fn new(start_frame: usize, end_frame: usize) -> CoreResult<Self> {
        if end_frame <= start_frame {
            return Err(CoreError::InvalidWindow { start: start_frame, end: end_frame });
        }
        Ok(Self { start_frame, end_frame })
    }

    pub fn len(&self) -> usize {
        self.end_frame.saturating_sub(self.start_frame)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, frame: usize) -> bool {
        frame >= self.start_frame && frame < self.end_frame
    }

    /// Window cut back to a clip of `num_frames` frames; `None` when nothing is left.
    #[must_use]
    pub fn clamp_to(self, num_frames: usize) -> Option<Self> {
        Self::new(self.start_frame, self.end_frame.min(num_frames)).ok()
    }
}

/// Why a frame was selected. Declaration order is the cross-category
/// precedence: when two categories pick the same frame the earlier one wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    User,
    Dark,
    Bright,
    Motion,
    Random,
    Cached,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::User => "user",
            Category::Dark => "dark",
            Category::Bright => "bright",
            Category::Motion => "motion",
            Category::Random => "random",
            Category::Cached => "cached",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a selected frame came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    /// Listed explicitly in the configuration
    User,
    /// Chosen from sampled brightness/motion metrics
    Metrics,
    /// Drawn by the seeded random sampler
    Random,
    /// Restored from a selection sidecar without a detail record
    Sidecar,
}

/// Per-frame explanation of a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionDetail {
    pub label: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub source: SelectionSource,
    pub timecode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clip_role: Option<ClipRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The final, ascending, duplicate-free frame list with a detail per frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSelection {
    pub frames: Vec<usize>,
    pub details: BTreeMap<usize, SelectionDetail>,
}

impl FrameSelection {
    /// Frames labelled with `category`, ascending.
    pub fn frames_in(&self, category: Category) -> Vec<usize> {
        self.frames
            .iter()
            .copied()
            .filter(|f| self.details.get(f).is_some_and(|d| d.label == category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_rejects_empty_and_inverted() {
        assert!(SelectionWindowSpec::new(10, 10).is_err());
        assert!(SelectionWindowSpec::new(10, 5).is_err());
        let window = SelectionWindowSpec::new(10, 20).unwrap();
        assert_eq!(window.len(), 10);
        assert!(window.contains(10));
        assert!(!window.contains(20));
    }

    #[test]
    fn test_window_clamped_to_clip() {
        let window = SelectionWindowSpec::new(10, 1000).unwrap();
        assert_eq!(window.clamp_to(100), SelectionWindowSpec::new(10, 100).ok());
        assert_eq!(window.clamp_to(5000), Some(window));
        assert_eq!(window.clamp_to(10), None);
        assert_eq!(window.clamp_to(0), None);
    }

    #[test]
    fn test_category_precedence_order() {
        let mut categories = vec![
            Category::Cached,
            Category::Random,
            Category::Motion,
            Category::Bright,
            Category::Dark,
            Category::User,
        ];
        categories.sort();
        assert_eq!(
            categories,
            vec![
                Category::User,
                Category::Dark,
                Category::Bright,
                Category::Motion,
                Category::Random,
                Category::Cached,
            ]
        );
    }

    #[test]
    fn test_metrics_within_window() {
        let mut metrics = FrameMetrics::default();
        for frame in [0, 5, 10, 15] {
            metrics.brightness.insert(frame, 0.5);
            metrics.motion.insert(frame, 1.0);
        }
        let restricted = metrics.within(SelectionWindowSpec::new(5, 15).unwrap());
        assert_eq!(restricted.brightness.keys().copied().collect::<Vec<_>>(), vec![5, 10]);
        assert_eq!(restricted.motion.len(), 2);
    }

    #[test]
    fn test_metrics_len_and_is_empty_agree() {
        let mut metrics = FrameMetrics::default();
        metrics.motion.insert(3, 1.0);
        assert_eq!(metrics.len(), 0);
        assert!(metrics.is_empty());

        metrics.brightness.insert(3, 0.5);
        assert_eq!(metrics.len(), 1);
        assert!(!metrics.is_empty());
    }
}
