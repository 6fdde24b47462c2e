use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn screenpick_cmd() -> Command {
    let mut cmd = Command::cargo_bin("screenpick").expect("Failed to find screenpick binary");
    cmd.env_remove("SCREENPICK_OUTPUT_DIR")
        .env_remove("SCREENPICK_CONFIG")
        .env_remove("SCREENPICK_SEED");
    cmd
}

/// Writes a metrics dump with a sample for every frame.
fn write_metrics(dir: &Path, frames: usize) -> Result<PathBuf, Box<dyn Error>> {
    let samples: Vec<serde_json::Value> = (0..frames)
        .map(|i| {
            serde_json::json!({
                "frame": i,
                "brightness": ((i * 37) % 101) as f64 / 100.0,
                "motion": ((i * 13) % 29) as f64,
            })
        })
        .collect();
    let dump = serde_json::json!({ "fps": [24, 1], "num_frames": frames, "samples": samples });
    let path = dir.join("metrics.json");
    fs::write(&path, serde_json::to_vec(&dump)?)?;
    Ok(path)
}

fn write_clips(dir: &Path) -> Result<(PathBuf, PathBuf), Box<dyn Error>> {
    let source = dir.join("source.mkv");
    let encode = dir.join("encode.mkv");
    fs::write(&source, "source content")?;
    fs::write(&encode, "encode content")?;
    Ok((source, encode))
}

fn run_json(cmd: &mut Command) -> Result<serde_json::Value, Box<dyn Error>> {
    let output = cmd.assert().success().get_output().stdout.clone();
    Ok(serde_json::from_slice(&output)?)
}

#[test]
fn test_select_reuses_metrics_cache() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let metrics = write_metrics(dir.path(), 1200)?;
    let (source, encode) = write_clips(dir.path())?;

    let args = [
        source.to_str().unwrap(),
        encode.to_str().unwrap(),
        "--metrics",
        metrics.to_str().unwrap(),
        "--analyze",
        "1",
        "--user-frames",
        "5,600",
        "--json",
    ];

    let first = run_json(screenpick_cmd().arg("select").args(args))?;
    assert_eq!(first["origin"], "recomputed");
    assert_eq!(first["cache_status"], "missing");
    assert!(dir.path().join("generated.compframes").exists());

    let second = run_json(screenpick_cmd().arg("select").args(args))?;
    assert_eq!(second["origin"], "metrics_cache_reused");
    assert_eq!(second["cache_status"], "reused");
    assert_eq!(second["frames"], first["frames"]);
    assert_eq!(second["details"], first["details"]);
    assert_eq!(second["analyzed_file"], "encode.mkv");

    let frames: Vec<u64> = serde_json::from_value(second["frames"].clone())?;
    assert!(frames.contains(&5) && frames.contains(&600));
    assert_eq!(second["details"]["5"]["label"], "user");

    Ok(())
}

#[test]
fn test_select_without_cache_uses_sidecar() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let out = tempdir()?;
    let metrics = write_metrics(dir.path(), 600)?;
    let (source, _) = write_clips(dir.path())?;

    let args = [
        source.to_str().unwrap(),
        "--metrics",
        metrics.to_str().unwrap(),
        "--output-dir",
        out.path().to_str().unwrap(),
        "--no-cache",
        "--json",
    ];

    let first = run_json(screenpick_cmd().arg("select").args(args))?;
    assert_eq!(first["origin"], "recomputed");
    assert!(out.path().join("generated.selection.v1.json").exists());
    assert!(!out.path().join("generated.compframes").exists());

    let second = run_json(screenpick_cmd().arg("select").args(args))?;
    assert_eq!(second["origin"], "sidecar_reused");
    assert_eq!(second["frames"], first["frames"]);

    Ok(())
}

#[test]
fn test_select_clip_frames_beyond_metrics() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let metrics = write_metrics(dir.path(), 100)?;
    let (source, _) = write_clips(dir.path())?;

    let report = run_json(
        screenpick_cmd()
            .arg("select")
            .arg(&source)
            .arg("--metrics")
            .arg(&metrics)
            .args(["--clip-frames", "1000", "--random", "5", "--separation", "0.5", "--json"]),
    )?;

    let frames: Vec<u64> = serde_json::from_value(report["frames"].clone())?;
    assert!(!frames.is_empty());
    assert!(frames.iter().all(|&f| f < 100), "frames {frames:?}");

    Ok(())
}

#[test]
fn test_select_prints_table() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let metrics = write_metrics(dir.path(), 480)?;
    let (source, _) = write_clips(dir.path())?;

    screenpick_cmd()
        .arg("select")
        .arg(&source)
        .arg("--metrics")
        .arg(&metrics)
        .arg("--user-frames")
        .arg("24")
        .assert()
        .success()
        .stdout(contains("TIMECODE"))
        .stdout(contains("00:00:01.000"))
        .stdout(contains("user"));

    Ok(())
}

#[test]
fn test_select_missing_metrics_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let (source, _) = write_clips(dir.path())?;

    screenpick_cmd()
        .arg("select")
        .arg(&source)
        .arg("--metrics")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .stderr(contains("Failed to load metrics"));

    Ok(())
}

#[test]
fn test_select_analyze_index_out_of_range() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let metrics = write_metrics(dir.path(), 100)?;
    let (source, _) = write_clips(dir.path())?;

    screenpick_cmd()
        .arg("select")
        .arg(&source)
        .arg("--metrics")
        .arg(&metrics)
        .arg("--analyze")
        .arg("3")
        .assert()
        .failure()
        .stderr(contains("out of range"));

    Ok(())
}

#[test]
fn test_select_invalid_arguments() -> Result<(), Box<dyn Error>> {
    screenpick_cmd()
        .arg("select")
        .arg("clip.mkv")
        .assert()
        .failure()
        .stderr(contains("--metrics"));

    screenpick_cmd()
        .arg("select")
        .arg("clip.mkv")
        .arg("--metrics")
        .arg("m.json")
        .arg("--step")
        .arg("0")
        .assert()
        .failure();

    Ok(())
}
