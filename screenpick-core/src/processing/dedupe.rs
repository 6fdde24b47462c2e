//! Temporal separation between selected frames.
//!
//! Two passes share one rule, "keep a frame only if it is at least N frames
//! from what was already kept":
//!
//! * [`pick_separated`] walks candidates in preference order (best score
//!   first) and stops once enough frames are accepted.
//! * [`dedupe`] is the ascending left-to-right scan applied to each
//!   category's final list.
//!
//! A gap of zero still drops repeated indices.

use crate::utils::seconds_to_frames;

/// Minimum gap in whole frames for a separation in seconds.
#[must_use]
pub fn min_gap_frames(min_separation_sec: f64, fps: f64) -> usize {
    seconds_to_frames(min_separation_sec, fps).max(1)
}

/// Keeps a frame only if it lies at least `min_separation_sec * fps` frames
/// after the last kept frame. Input must be ascending.
#[must_use]
pub fn dedupe(frames_ascending: &[usize], min_separation_sec: f64, fps: f64) -> Vec<usize> {
    dedupe_frames(frames_ascending, min_gap_frames(min_separation_sec, fps))
}

/// [`dedupe`] with the gap already expressed in frames.
#[must_use]
pub fn dedupe_frames(frames_ascending: &[usize], min_gap: usize) -> Vec<usize> {
    let min_gap = min_gap.max(1);
    let mut kept: Vec<usize> = Vec::with_capacity(frames_ascending.len());
    for &frame in frames_ascending {
        match kept.last() {
            Some(&last) if frame < last.saturating_add(min_gap) => {}
            _ => kept.push(frame),
        }
    }
    kept
}

/// Accepts candidates in the given order while they are at least `min_gap`
/// frames from every frame accepted so far, up to `count` frames.
#[must_use]
pub fn pick_separated<I>(candidates: I, count: usize, min_gap: usize) -> Vec<(usize, f64)>
where
    I: IntoIterator<Item = (usize, f64)>,
{
    let min_gap = min_gap.max(1);
    let candidates = candidates.into_iter();
    // count may be any usize; never reserve more than the candidates can fill
    let mut accepted: Vec<(usize, f64)> =
        Vec::with_capacity(count.min(candidates.size_hint().0));
    if count == 0 {
        return accepted;
    }

    for (frame, score) in candidates {
        if accepted.iter().all(|&(kept, _)| kept.abs_diff(frame) >= min_gap) {
            accepted.push((frame, score));
            if accepted.len() == count {
                break;
            }
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedupe_reference_case() {
        assert_eq!(dedupe(&[0, 10, 20, 30, 100], 1.0, 24.0), vec![0, 30, 100]);
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let inputs: [&[usize]; 4] = [
            &[0, 10, 20, 30, 100],
            &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 48, 49, 96],
            &[5, 5, 5, 100],
            &[],
        ];
        for frames in inputs {
            for (sec, fps) in [(1.0, 24.0), (2.5, 23.976), (0.0, 24.0)] {
                let once = dedupe(frames, sec, fps);
                assert_eq!(dedupe(&once, sec, fps), once);
            }
        }
    }

    #[test]
    fn test_zero_separation_drops_repeats_only() {
        assert_eq!(dedupe(&[1, 1, 2, 3, 3], 0.0, 24.0), vec![1, 2, 3]);
    }

    #[test]
    fn test_gap_is_measured_from_last_kept() {
        // 24 would pass against 10 but is measured against 0
        assert_eq!(dedupe_frames(&[0, 10, 23, 24, 47, 48], 24), vec![0, 24, 48]);
    }

    #[test]
    fn test_pick_separated_prefers_candidate_order() {
        let candidates = (0..240).rev().map(|f| (f, f as f64));
        let picked = pick_separated(candidates, 4, 48);
        let frames: Vec<usize> = picked.iter().map(|&(f, _)| f).collect();
        assert_eq!(frames, vec![239, 191, 143, 95]);
    }

    #[test]
    fn test_pick_separated_degrades_when_pool_is_small() {
        let candidates = vec![(0, 1.0), (10, 0.9), (20, 0.8)];
        let picked = pick_separated(candidates, 5, 15);
        assert_eq!(picked, vec![(0, 1.0), (20, 0.8)]);
        assert!(pick_separated(vec![(1, 1.0)], 0, 1).is_empty());
    }

    #[test]
    fn test_pick_separated_with_unbounded_count() {
        let picked = pick_separated((0..100).map(|f| (f, 0.0)), usize::MAX, 10);
        let frames: Vec<usize> = picked.iter().map(|&(f, _)| f).collect();
        assert_eq!(frames, (0..100).step_by(10).collect::<Vec<_>>());
    }

    #[test]
    fn test_picked_frames_survive_dedupe() {
        let candidates = [(50, 0.1), (10, 0.2), (75, 0.3), (30, 0.4), (90, 0.5)];
        let mut frames: Vec<usize> =
            pick_separated(candidates, 5, 20).into_iter().map(|(f, _)| f).collect();
        frames.sort_unstable();
        assert_eq!(dedupe_frames(&frames, 20), frames);
    }
}
