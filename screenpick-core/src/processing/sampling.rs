// screenpick-core/src/processing/sampling.rs
// Responsibility: walk the analysis window and collect brightness/motion samples.

use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::error::{CoreError, CoreResult};
use crate::processing::types::{FrameMetrics, SelectionWindowSpec};
use crate::source::{FrameSample, FrameSource, SamplingOptions};

/// Observational progress hook, called with `(processed, total)` once per sample.
pub type ProgressCallback<'a> = &'a mut dyn FnMut(usize, usize);

/// Sampling options derived from the analysis config.
#[must_use]
pub fn sampling_options(config: &AnalysisConfig) -> SamplingOptions {
    SamplingOptions {
        downscale_height: config.downscale_height,
        analyze_in_sdr: config.analyze_in_sdr,
        motion_use_absdiff: config.motion_use_absdiff,
    }
}

/// Samples every `config.step`-th frame of `window` from `source`.
///
/// Frames without a sample, frames the source fails on, and out-of-range
/// values are skipped. If nothing at all could be sampled the call fails with
/// [`CoreError::SamplingFailed`]. Motion is smoothed over
/// `config.motion_diff_radius` neighbouring samples before returning.
pub fn sample_metrics<S>(
    source: &mut S,
    config: &AnalysisConfig,
    window: SelectionWindowSpec,
    mut progress: Option<ProgressCallback<'_>>,
) -> CoreResult<FrameMetrics>
where
    S: FrameSource + ?Sized,
{
    let step = config.step.max(1);
    let end = window.end_frame.min(source.num_frames());
    if end <= window.start_frame {
        return Err(CoreError::InvalidWindow { start: window.start_frame, end });
    }

    source.prepare(&sampling_options(config))?;

    let total = (end - window.start_frame).div_ceil(step);
    log::debug!(
        "Sampling {} frames from [{}, {}) every {} frame(s)",
        total,
        window.start_frame,
        end,
        step
    );

    let mut metrics = FrameMetrics::default();
    let mut skipped = 0usize;

    for (done, frame) in (window.start_frame..end).step_by(step).enumerate() {
        match source.sample(frame) {
            Ok(Some(sample)) if is_valid_sample(&sample) => {
                metrics.brightness.insert(frame, sample.brightness);
                metrics.motion.insert(frame, sample.motion);
            }
            Ok(Some(sample)) => {
                log::debug!("Discarding out-of-range sample for frame {}: {:?}", frame, sample);
                skipped += 1;
            }
            Ok(None) => {
                log::trace!("No sample for frame {}", frame);
                skipped += 1;
            }
            Err(e) => {
                log::debug!("Skipping frame {} after sampling error: {}", frame, e);
                skipped += 1;
            }
        }

        if let Some(callback) = progress.as_deref_mut() {
            callback(done + 1, total);
        }
    }

    if metrics.brightness.is_empty() {
        return Err(CoreError::SamplingFailed { requested: total });
    }
    if skipped > 0 {
        log::debug!("Skipped {} of {} sampled frames", skipped, total);
    }

    if config.motion_diff_radius > 0 {
        metrics.motion = smooth_motion(&metrics.motion, config.motion_diff_radius);
    }

    log::info!("Collected metrics for {} of {} sampled frames", metrics.len(), total);
    Ok(metrics)
}

fn is_valid_sample(sample: &FrameSample) -> bool {
    sample.brightness.is_finite()
        && (0.0..=1.0).contains(&sample.brightness)
        && sample.motion.is_finite()
        && sample.motion >= 0.0
}

/// Replaces each motion value by the mean over `radius` neighbouring samples
/// on each side (fewer at the edges).
#[must_use]
pub fn smooth_motion(motion: &BTreeMap<usize, f64>, radius: usize) -> BTreeMap<usize, f64> {
    if radius == 0 || motion.len() < 2 {
        return motion.clone();
    }

    let frames: Vec<usize> = motion.keys().copied().collect();
    let values: Vec<f64> = motion.values().copied().collect();

    let mut prefix = Vec::with_capacity(values.len() + 1);
    prefix.push(0.0);
    for value in &values {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + value);
    }

    frames
        .iter()
        .enumerate()
        .map(|(i, &frame)| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(values.len() - 1);
            let mean = (prefix[hi + 1] - prefix[lo]) / (hi - lo + 1) as f64;
            (frame, mean)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{Fps, RecordedFrameSource};

    fn fps24() -> Fps {
        Fps::new(24, 1).unwrap()
    }

    fn config(step: usize, radius: usize) -> AnalysisConfig {
        AnalysisConfig { step, motion_diff_radius: radius, ..AnalysisConfig::default() }
    }

    struct FailingSource;

    impl FrameSource for FailingSource {
        fn num_frames(&self) -> usize {
            100
        }
        fn fps(&self) -> Fps {
            Fps::new(24, 1).unwrap()
        }
        fn sample(&mut self, index: usize) -> CoreResult<Option<FrameSample>> {
            Err(CoreError::FrameSource(format!("decoder failed at {index}")))
        }
    }

    #[test]
    fn test_samples_at_stride_within_window() {
        let brightness: Vec<f64> = (0..50).map(|i| i as f64 / 100.0).collect();
        let motion = vec![1.0; 50];
        let mut source = RecordedFrameSource::from_series(fps24(), &brightness, &motion).unwrap();

        let window = SelectionWindowSpec::new(10, 30).unwrap();
        let metrics = sample_metrics(&mut source, &config(5, 0), window, None).unwrap();

        assert_eq!(metrics.brightness.keys().copied().collect::<Vec<_>>(), vec![10, 15, 20, 25]);
        assert_eq!(metrics.brightness[&15], 0.15);
        assert_eq!(source.sample_calls(), 4);
        assert_eq!(source.options().unwrap().downscale_height, 480);
    }

    #[test]
    fn test_progress_fires_once_per_sample() {
        let mut source =
            RecordedFrameSource::from_series(fps24(), &[0.5; 10], &[0.0; 10]).unwrap();
        let mut calls = Vec::new();
        let mut callback = |done: usize, total: usize| calls.push((done, total));

        let window = SelectionWindowSpec::new(0, 10).unwrap();
        sample_metrics(&mut source, &config(3, 0), window, Some(&mut callback)).unwrap();

        assert_eq!(calls, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
    }

    #[test]
    fn test_missing_and_invalid_samples_are_skipped() {
        let mut source = RecordedFrameSource::new(fps24(), 10);
        source.insert(0, FrameSample { brightness: 0.2, motion: 1.0 });
        source.insert(1, FrameSample { brightness: 1.5, motion: 1.0 });
        source.insert(2, FrameSample { brightness: 0.3, motion: f64::NAN });
        source.insert(3, FrameSample { brightness: 0.4, motion: -1.0 });
        source.insert(5, FrameSample { brightness: 0.6, motion: 2.0 });

        let window = SelectionWindowSpec::new(0, 10).unwrap();
        let metrics = sample_metrics(&mut source, &config(1, 0), window, None).unwrap();
        assert_eq!(metrics.brightness.keys().copied().collect::<Vec<_>>(), vec![0, 5]);
    }

    #[test]
    fn test_total_failure_is_an_error() {
        let window = SelectionWindowSpec::new(0, 20).unwrap();
        let result = sample_metrics(&mut FailingSource, &config(1, 0), window, None);
        assert!(matches!(result, Err(CoreError::SamplingFailed { requested: 20 })));
    }

    #[test]
    fn test_window_beyond_clip_is_malformed() {
        let mut source = RecordedFrameSource::from_series(fps24(), &[0.5; 10], &[0.0; 10]).unwrap();
        let window = SelectionWindowSpec::new(20, 40).unwrap();
        let result = sample_metrics(&mut source, &config(1, 0), window, None);
        assert!(matches!(result, Err(CoreError::InvalidWindow { .. })));
    }

    #[test]
    fn test_window_is_clamped_to_clip_length() {
        let mut source = RecordedFrameSource::from_series(fps24(), &[0.5; 10], &[0.0; 10]).unwrap();
        let window = SelectionWindowSpec::new(5, 100).unwrap();
        let metrics = sample_metrics(&mut source, &config(1, 0), window, None).unwrap();
        assert_eq!(metrics.len(), 5);
    }

    #[test]
    fn test_smooth_motion_averages_neighbours() {
        let motion: BTreeMap<usize, f64> =
            [(0, 0.0), (2, 3.0), (4, 6.0), (6, 9.0)].into_iter().collect();
        let smoothed = smooth_motion(&motion, 1);
        assert_eq!(smoothed[&0], 1.5);
        assert_eq!(smoothed[&2], 3.0);
        assert_eq!(smoothed[&4], 6.0);
        assert_eq!(smoothed[&6], 7.5);
        assert_eq!(smooth_motion(&motion, 0), motion);
    }

    #[test]
    fn test_radius_applies_during_sampling() {
        let motion: Vec<f64> = (0..5).map(|i| (i * 3) as f64).collect();
        let mut source = RecordedFrameSource::from_series(fps24(), &[0.5; 5], &motion).unwrap();
        let window = SelectionWindowSpec::new(0, 5).unwrap();
        let metrics = sample_metrics(&mut source, &config(1, 1), window, None).unwrap();
        assert_eq!(metrics.motion[&0], 1.5);
        assert_eq!(metrics.motion[&2], 6.0);
    }
}
