//! Analyzable window shared by all compared clips.

use crate::config::AnalysisConfig;
use crate::processing::types::SelectionWindowSpec;
use crate::utils::seconds_to_frames;

/// Intersects the per-clip analyzable ranges `[lead, frames - trail)`.
///
/// `clip_frame_counts` holds the (already aligned) length of every compared
/// clip. If the trims leave less than `min_window_seconds`, they are dropped
/// and the full common range is used instead. Returns `None` when no frame is
/// shared by every clip; that degrades the selection, it is not an error.
#[must_use]
pub fn compute_selection_window(
    clip_frame_counts: &[usize],
    fps: f64,
    config: &AnalysisConfig,
) -> Option<SelectionWindowSpec> {
    let common = clip_frame_counts.iter().copied().min()?;
    if common == 0 {
        log::warn!("At least one clip has no frames; nothing to analyze");
        return None;
    }

    let lead = seconds_to_frames(config.ignore_lead_seconds, fps);
    let trail = seconds_to_frames(config.ignore_trail_seconds, fps);
    let min_window = seconds_to_frames(config.min_window_seconds, fps);

    let start = lead;
    let end = common.saturating_sub(trail);
    if end > start && end - start >= min_window {
        return SelectionWindowSpec::new(start, end).ok();
    }

    if lead > 0 || trail > 0 {
        log::warn!(
            "Ignoring lead/trail trims ({}s/{}s): they leave fewer than {}s of a {}-frame clip",
            config.ignore_lead_seconds,
            config.ignore_trail_seconds,
            config.min_window_seconds,
            common
        );
    }
    SelectionWindowSpec::new(0, common).ok()
}
