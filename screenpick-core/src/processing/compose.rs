// ============================================================================
// screenpick-core/src/processing/compose.rs
// ============================================================================
//
// FRAME SET COMPOSER: Merging User, Category and Random Selections
//
// The composer turns sampled metrics into the final frame list:
//
// 1. User frames, always kept while inside the clip.
// 2. Dark, bright and motion frames, each category picked from its ranked
//    candidates under its own minimum separation.
// 3. Seeded random frames drawn from the window, excluding frames already
//    chosen.
//
// The union is sorted and frames claimed by several categories keep the label
// with the highest precedence (User > Dark > Bright > Motion > Random > Cached).

// ---- External crate imports ----
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

// ---- Standard library imports ----
use std::collections::BTreeSet;

// ---- Internal crate imports ----
use crate::cache::ClipRole;
use crate::config::AnalysisConfig;
use crate::error::CoreResult;
use crate::processing::categories::{bright_candidates, dark_candidates, motion_candidates};
use crate::processing::dedupe::{dedupe_frames, min_gap_frames, pick_separated};
use crate::processing::types::{
    Category, FrameMetrics, FrameSelection, SelectionDetail, SelectionSource, SelectionWindowSpec,
};
use crate::source::Fps;
use crate::utils::format_timecode;

#[derive(Debug)]
struct Pick {
    frame: usize,
    category: Category,
    score: Option<f64>,
    source: SelectionSource,
    note: Option<String>,
}

/// Builds the final selection from sampled metrics.
///
/// Metric and random categories only draw from `window`, cut back to the
/// clip; with no window only user frames are returned. Categories that cannot find enough well
/// separated frames return fewer frames rather than failing.
pub fn compose_selection(
    metrics: &FrameMetrics,
    num_frames: usize,
    fps: Fps,
    window: Option<SelectionWindowSpec>,
    config: &AnalysisConfig,
) -> CoreResult<FrameSelection> {
    let fps_f64 = fps.as_f64();
    let gap = min_gap_frames(config.screen_separation_sec, fps_f64);
    let motion_gap = min_gap_frames(config.screen_separation_sec / 4.0, fps_f64);

    let requested = window;
    let window = window.and_then(|w| w.clamp_to(num_frames));
    if let (Some(w), None) = (requested, window) {
        log::warn!(
            "Window {}..{} lies outside a {}-frame clip",
            w.start_frame,
            w.end_frame,
            num_frames
        );
    }

    let mut picks = user_picks(config, num_frames, window);

    if let Some(window) = window {
        let in_window = metrics.within(window);

        let dark = dark_candidates(&in_window.brightness, config.frame_count_dark, config)?;
        push_category(&mut picks, Category::Dark, separated(dark, config.frame_count_dark, gap));

        let bright = bright_candidates(&in_window.brightness, config.frame_count_bright, config)?;
        push_category(&mut picks, Category::Bright, separated(bright, config.frame_count_bright, gap));

        let motion = motion_candidates(&in_window.motion, config.frame_count_motion, config)?;
        push_category(
            &mut picks,
            Category::Motion,
            separated(motion, config.frame_count_motion, motion_gap),
        );

        let chosen: BTreeSet<usize> = picks.iter().map(|p| p.frame).collect();
        for frame in random_sample(window, &chosen, config.random_frames, config.random_seed, gap) {
            picks.push(Pick {
                frame,
                category: Category::Random,
                score: None,
                source: SelectionSource::Random,
                note: None,
            });
        }
    } else {
        log::warn!("No analyzable window; only user frames will be selected");
    }

    // Same frame from several categories: lowest Category wins
    picks.sort_by(|a, b| a.frame.cmp(&b.frame).then(a.category.cmp(&b.category)));
    picks.dedup_by_key(|p| p.frame);

    let selection = build_selection(picks, fps_f64);
    log_summary(&selection, config);
    Ok(selection)
}

fn user_picks(
    config: &AnalysisConfig,
    num_frames: usize,
    window: Option<SelectionWindowSpec>,
) -> Vec<Pick> {
    let mut frames: Vec<usize> = config
        .user_frames
        .iter()
        .copied()
        .filter(|&frame| {
            if frame < num_frames {
                true
            } else {
                log::warn!("Dropping user frame {} outside a {}-frame clip", frame, num_frames);
                false
            }
        })
        .collect();
    frames.sort_unstable();
    frames.dedup();

    frames
        .into_iter()
        .map(|frame| Pick {
            frame,
            category: Category::User,
            score: None,
            source: SelectionSource::User,
            note: window
                .filter(|w| !w.contains(frame))
                .map(|_| "outside analysis window".to_string()),
        })
        .collect()
}

/// Picks up to `count` separated candidates, returned ascending.
fn separated(candidates: Vec<(usize, f64)>, count: usize, gap: usize) -> Vec<(usize, f64)> {
    let mut picked = pick_separated(candidates, count, gap);
    picked.sort_by_key(|&(frame, _)| frame);

    let frames: Vec<usize> = picked.iter().map(|&(frame, _)| frame).collect();
    let kept = dedupe_frames(&frames, gap);
    picked.retain(|(frame, _)| kept.binary_search(frame).is_ok());

    if picked.len() < count {
        log::debug!("Found {} of {} requested frames at a {}-frame gap", picked.len(), count, gap);
    }
    picked
}

fn push_category(picks: &mut Vec<Pick>, category: Category, frames: Vec<(usize, f64)>) {
    picks.extend(frames.into_iter().map(|(frame, score)| Pick {
        frame,
        category,
        score: Some(score),
        source: SelectionSource::Metrics,
        note: None,
    }));
}

/// Seeded draw of up to `count` separated window frames not in `chosen`.
fn random_sample(
    window: SelectionWindowSpec,
    chosen: &BTreeSet<usize>,
    count: usize,
    seed: u64,
    gap: usize,
) -> Vec<usize> {
    if count == 0 {
        return Vec::new();
    }

    let mut pool: Vec<usize> = (window.start_frame..window.end_frame)
        .filter(|frame| !chosen.contains(frame))
        .collect();
    let mut rng = StdRng::seed_from_u64(seed);
    pool.shuffle(&mut rng);

    pick_separated(pool.into_iter().map(|frame| (frame, 0.0)), count, gap)
        .into_iter()
        .map(|(frame, _)| frame)
        .collect()
}

fn build_selection(picks: Vec<Pick>, fps: f64) -> FrameSelection {
    let mut selection = FrameSelection::default();
    for pick in picks {
        let clip_role = match pick.source {
            SelectionSource::User | SelectionSource::Sidecar => None,
            SelectionSource::Metrics | SelectionSource::Random => Some(ClipRole::Analyze),
        };
        selection.frames.push(pick.frame);
        selection.details.insert(
            pick.frame,
            SelectionDetail {
                label: pick.category,
                score: pick.score,
                source: pick.source,
                timecode: format_timecode(pick.frame, fps),
                clip_role,
                note: pick.note,
            },
        );
    }
    selection
}

fn log_summary(selection: &FrameSelection, config: &AnalysisConfig) {
    let count = |category| selection.frames_in(category).len();
    log::info!(
        "Selected {} frames: user {}, dark {}/{}, bright {}/{}, motion {}/{}, random {}/{}",
        selection.frames.len(),
        count(Category::User),
        count(Category::Dark),
        config.frame_count_dark,
        count(Category::Bright),
        config.frame_count_bright,
        count(Category::Motion),
        config.frame_count_motion,
        count(Category::Random),
        config.random_frames
    );
}
