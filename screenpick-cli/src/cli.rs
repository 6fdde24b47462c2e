// screenpick-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "screenpick: comparison frame selection",
    long_about = "Selects dark, bright, high-motion, user and random frames for encode comparisons, caching sampled metrics next to the outputs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (RUST_LOG overrides this)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Selects comparison frames from recorded per-frame metrics
    Select(SelectArgs),
}

#[derive(Parser, Debug)]
pub struct SelectArgs {
    /// Clips being compared, in order (reference, encodes...)
    #[arg(required = true, value_name = "CLIP")]
    pub clips: Vec<PathBuf>,

    /// Recorded metrics dump for the analyzed clip (JSON)
    #[arg(short = 'm', long = "metrics", required = true, value_name = "METRICS_JSON")]
    pub metrics: PathBuf,

    /// Index of the analyzed clip within CLIP
    #[arg(short = 'a', long = "analyze", default_value_t = 0, value_name = "INDEX")]
    pub analyze_index: usize,

    /// Directory for the metrics cache and selection sidecar (defaults to the analyzed clip's directory)
    #[arg(short = 'o', long = "output-dir", value_name = "DIR", env = "SCREENPICK_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Optional: JSON analysis config; flags below override its values
    #[arg(short = 'c', long = "config", value_name = "CONFIG_JSON", env = "SCREENPICK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Optional: aligned frame count of every clip (defaults to the analyzed clip's count for all)
    #[arg(long, value_delimiter = ',', value_name = "COUNTS")]
    pub clip_frames: Option<Vec<usize>>,

    // --- Frame Counts ---
    /// Number of dark frames
    #[arg(long, value_name = "COUNT")]
    pub dark: Option<usize>,

    /// Number of bright frames
    #[arg(long, value_name = "COUNT")]
    pub bright: Option<usize>,

    /// Number of high-motion frames
    #[arg(long, value_name = "COUNT")]
    pub motion: Option<usize>,

    /// Number of random frames
    #[arg(long, value_name = "COUNT")]
    pub random: Option<usize>,

    /// Seed for random frame selection
    #[arg(long, value_name = "SEED", env = "SCREENPICK_SEED")]
    pub seed: Option<u64>,

    /// Comma-separated frames that are always selected (e.g., 120,2400)
    #[arg(long, value_delimiter = ',', value_name = "FRAMES")]
    pub user_frames: Option<Vec<usize>>,

    // --- Sampling and Separation ---
    /// Sample every Nth frame
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub step: Option<u32>,

    /// Minimum seconds between frames of one category
    #[arg(long, value_name = "SECONDS")]
    pub separation: Option<f64>,

    /// Seconds ignored at the start of every clip
    #[arg(long, value_name = "SECONDS")]
    pub ignore_lead: Option<f64>,

    /// Seconds ignored at the end of every clip
    #[arg(long, value_name = "SECONDS")]
    pub ignore_trail: Option<f64>,

    /// Use fixed luma bands instead of quantiles for dark/bright frames
    #[arg(long, default_value_t = false)]
    pub luma_bands: bool,

    // --- Caching ---
    /// Disable the metrics cache (the selection sidecar is used instead)
    #[arg(long, default_value_t = false)]
    pub no_cache: bool,

    /// Verify inputs by SHA1 in addition to size and mtime
    #[arg(long, default_value_t = false)]
    pub verify_hashes: bool,

    /// Trim applied to the analyzed clip before sampling, recorded in the cache key
    #[arg(long, default_value_t = 0, value_name = "FRAMES", allow_hyphen_values = true)]
    pub trim_start: i64,

    /// Optional end trim recorded in the cache key
    #[arg(long, value_name = "FRAMES", allow_hyphen_values = true)]
    pub trim_end: Option<i64>,

    // --- Output ---
    /// Print the selection as JSON instead of a table
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select_basic_args() {
        let cli = Cli::parse_from(["screenpick", "select", "src.mkv", "enc.mkv", "-m", "m.json"]);
        let Commands::Select(args) = cli.command;
        assert_eq!(args.clips, vec![PathBuf::from("src.mkv"), PathBuf::from("enc.mkv")]);
        assert_eq!(args.metrics, PathBuf::from("m.json"));
        assert_eq!(args.analyze_index, 0);
        assert!(args.user_frames.is_none());
        assert!(!args.no_cache);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_select_overrides() {
        let cli = Cli::parse_from([
            "screenpick",
            "select",
            "a.mkv",
            "--metrics",
            "m.json",
            "--user-frames",
            "10,20,30",
            "--step",
            "3",
            "--trim-end",
            "-24",
            "--no-cache",
            "-v",
        ]);
        let Commands::Select(args) = cli.command;
        assert_eq!(args.user_frames, Some(vec![10, 20, 30]));
        assert_eq!(args.step, Some(3));
        assert_eq!(args.trim_end, Some(-24));
        assert!(args.no_cache);
        assert!(cli.verbose);
    }

    #[test]
    fn test_step_must_be_positive() {
        let result = Cli::try_parse_from(["screenpick", "select", "a.mkv", "-m", "m.json", "--step", "0"]);
        assert!(result.is_err());
    }
}
