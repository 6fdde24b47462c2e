//! Utility functions for formatting and frame/time conversion.
//!
//! These are small helpers shared by the selection and cache modules:
//! timecode rendering for selection details, second-to-frame conversion for
//! separation thresholds and window trims, and byte formatting for log lines.

use std::path::Path;

/// Formats a frame index as `HH:MM:SS.mmm` at the given frame rate.
/// Returns "??:??:??.???" for a non-positive or non-finite rate.
#[must_use]
pub fn format_timecode(frame: usize, fps: f64) -> String {
    if !fps.is_finite() || fps <= 0.0 {
        return "??:??:??.???".to_string();
    }

    let total_millis = ((frame as f64 / fps) * 1000.0).round() as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!("{hours:02}:{minutes:02}:{secs:02}.{millis:03}")
}

/// Converts a duration in seconds to a whole number of frames, rounding up.
/// Non-positive or non-finite inputs give 0.
#[must_use]
pub fn seconds_to_frames(seconds: f64, fps: f64) -> usize {
    let frames = seconds * fps;
    if !frames.is_finite() || frames <= 0.0 {
        0
    } else {
        frames.ceil() as usize
    }
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Extracts the file name of a path as a String.
pub fn get_filename_safe(path: &Path) -> crate::CoreResult<String> {
    Ok(path
        .file_name()
        .ok_or_else(|| {
            crate::CoreError::PathError(format!("Failed to get filename for {}", path.display()))
        })?
        .to_string_lossy()
        .to_string())
}
