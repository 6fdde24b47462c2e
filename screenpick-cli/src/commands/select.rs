//! Implementation of the 'select' subcommand.
//!
//! Loads recorded metrics for the analyzed clip, captures the identities of
//! all compared clips, and hands everything to `screenpick_core::select_frames`.
//! The metrics cache and selection sidecar live in the output directory.

use crate::cli::SelectArgs;
use crate::logging::get_timestamp;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use screenpick_core::cache::{FrameMetricsCacheInfo, capture_clip_identities};
use screenpick_core::config::{AnalysisConfig, AnalysisConfigBuilder};
use screenpick_core::processing::{SelectionResult, compute_selection_window, select_frames};
use screenpick_core::source::{FrameSource, RecordedFrameSource};
use screenpick_core::{SelectionDetail, SelectionRequest};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, info};

/// JSON form of a selection run printed with `--json`.
#[derive(Debug, Serialize)]
pub struct SelectionReport<'a> {
    pub generated_at: String,
    pub analyzed_file: &'a str,
    pub origin: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_reason: Option<&'static str>,
    pub selection_hash: &'a str,
    pub frames: &'a [usize],
    pub details: &'a BTreeMap<usize, SelectionDetail>,
}

/// Builds the analysis config from an optional config file plus flag overrides.
pub fn build_config(args: &SelectArgs) -> Result<AnalysisConfig> {
    let base = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => AnalysisConfig::default(),
    };

    let mut builder = AnalysisConfigBuilder::from_config(base);
    if let Some(count) = args.dark {
        builder = builder.frame_count_dark(count);
    }
    if let Some(count) = args.bright {
        builder = builder.frame_count_bright(count);
    }
    if let Some(count) = args.motion {
        builder = builder.frame_count_motion(count);
    }
    if let Some(count) = args.random {
        builder = builder.random_frames(count);
    }
    if let Some(seed) = args.seed {
        builder = builder.random_seed(seed);
    }
    if let Some(frames) = &args.user_frames {
        builder = builder.user_frames(frames.clone());
    }
    if let Some(step) = args.step {
        builder = builder.step(step as usize);
    }
    if let Some(seconds) = args.separation {
        builder = builder.screen_separation_sec(seconds);
    }
    if args.ignore_lead.is_some() || args.ignore_trail.is_some() {
        let current = builder.clone().build()?;
        builder = builder.ignore_seconds(
            args.ignore_lead.unwrap_or(current.ignore_lead_seconds),
            args.ignore_trail.unwrap_or(current.ignore_trail_seconds),
        );
    }
    if args.luma_bands {
        builder = builder.use_quantiles(false);
    }
    if args.no_cache {
        builder = builder.save_frames_data(false);
    }
    if args.verify_hashes {
        builder = builder.verify_input_hashes(true);
    }

    Ok(builder.build()?)
}

/// Directory holding the cache and sidecar: `--output-dir` or the analyzed clip's parent.
fn resolve_output_dir(args: &SelectArgs, analyzed_clip: &Path) -> PathBuf {
    args.output_dir.clone().unwrap_or_else(|| {
        analyzed_clip
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    })
}

fn sampling_progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner} Sampling [{bar:40}] {pos}/{len} frames ({eta})",
    ) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

/// Runs the `select` command and prints the selection to stdout.
pub fn run_select(args: SelectArgs) -> Result<()> {
    let config = build_config(&args)?;

    let Some(analyzed_clip) = args.clips.get(args.analyze_index) else {
        bail!(
            "Analyzed clip index {} is out of range for {} clip(s)",
            args.analyze_index,
            args.clips.len()
        );
    };

    let mut source = RecordedFrameSource::from_json_file(&args.metrics)
        .with_context(|| format!("Failed to load metrics '{}'", args.metrics.display()))?;
    let fps = source.fps();
    debug!("Loaded metrics for {} frames at {} fps", source.num_frames(), fps);

    let clips = capture_clip_identities(&args.clips, args.analyze_index, config.verify_input_hashes)
        .context("Failed to read input clips")?;

    let output_dir = resolve_output_dir(&args, analyzed_clip);
    let cache_info = if config.uses_metrics_cache() {
        Some(FrameMetricsCacheInfo::new(
            output_dir.join(&config.frame_data_filename),
            clips.clone(),
            fps,
            args.trim_start,
            args.trim_end,
        )?)
    } else {
        None
    };
    let sidecar_path = output_dir.join(&config.selection_sidecar_filename);

    let clip_frames = match &args.clip_frames {
        Some(counts) if counts.len() != clips.len() => {
            bail!("--clip-frames lists {} counts for {} clips", counts.len(), clips.len())
        }
        Some(counts) => counts.clone(),
        None => vec![source.num_frames(); clips.len()],
    };
    let window = compute_selection_window(&clip_frames, fps.as_f64(), &config);
    match window {
        Some(w) => info!("Analysis window: frames {}..{}", w.start_frame, w.end_frame),
        None => info!("No analysis window; selecting user frames only"),
    }

    let request = SelectionRequest {
        clips: &clips,
        window,
        cache_info: cache_info.as_ref(),
        sidecar_path: Some(&sidecar_path),
    };

    let bar = sampling_progress_bar();
    let mut on_progress = |done: usize, total: usize| {
        bar.set_length(total as u64);
        bar.set_position(done as u64);
    };
    let result = select_frames(&mut source, &config, request, Some(&mut on_progress))
        .context("Frame selection failed")?;
    bar.finish_and_clear();

    info!(
        "Selected {} frames ({}{})",
        result.frames.len(),
        result.origin.as_str(),
        result
            .cache_reason
            .map(|r| format!(", cache {}", r))
            .unwrap_or_default()
    );

    let analyzed_file = clips[args.analyze_index].name.as_str();
    if args.json {
        print_json(&result, analyzed_file)?;
    } else {
        print_table(&result);
    }
    Ok(())
}

fn print_json(result: &SelectionResult, analyzed_file: &str) -> Result<()> {
    let report = SelectionReport {
        generated_at: get_timestamp(),
        analyzed_file,
        origin: result.origin.as_str(),
        cache_status: result.cache_status.map(|s| s.as_str()),
        cache_reason: result.cache_reason.map(|r| r.as_str()),
        selection_hash: &result.selection_hash,
        frames: &result.frames,
        details: &result.details,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn print_table(result: &SelectionResult) {
    println!("{:>8}  {:<12}  {:<7}  {:>10}", "FRAME", "TIMECODE", "LABEL", "SCORE");
    for frame in &result.frames {
        let Some(detail) = result.details.get(frame) else {
            continue;
        };
        let score = detail.score.map(|s| format!("{s:.4}")).unwrap_or_else(|| "-".to_string());
        println!("{:>8}  {:<12}  {:<7}  {:>10}", frame, detail.timecode, detail.label.as_str(), score);
    }
    println!("{} frames, selection {}", result.frames.len(), result.selection_hash);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn select_args(extra: &[&str]) -> SelectArgs {
        let mut argv = vec!["screenpick", "select", "clip.mkv", "-m", "m.json"];
        argv.extend_from_slice(extra);
        let Commands::Select(args) = Cli::parse_from(argv).command;
        args
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = build_config(&select_args(&[
            "--dark", "2", "--seed", "9", "--ignore-lead", "3", "--luma-bands", "--no-cache",
        ]))
        .unwrap();
        assert_eq!(config.frame_count_dark, 2);
        assert_eq!(config.random_seed, 9);
        assert_eq!(config.ignore_lead_seconds, 3.0);
        assert_eq!(config.ignore_trail_seconds, AnalysisConfig::default().ignore_trail_seconds);
        assert!(!config.use_quantiles);
        assert!(!config.save_frames_data);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        assert!(build_config(&select_args(&["--separation=-1"])).is_err());
    }

    #[test]
    fn test_output_dir_defaults_to_clip_parent() {
        let args = select_args(&[]);
        assert_eq!(resolve_output_dir(&args, Path::new("/videos/enc.mkv")), PathBuf::from("/videos"));
        assert_eq!(resolve_output_dir(&args, Path::new("enc.mkv")), PathBuf::from("."));
    }
}
