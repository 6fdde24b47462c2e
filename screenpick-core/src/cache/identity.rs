// ============================================================================
// screenpick-core/src/cache/identity.rs
// ============================================================================
//
// CLIP IDENTITY: Role-Tagged Input Snapshots
//
// Every input clip is captured once per run as a `ClipIdentity`: its role in
// the comparison, resolved path, file name, size, UTC modification time and
// (optionally) a streamed SHA1 of its contents. The metrics cache stores these
// snapshots and compares them field by field on the next run.

// ---- External crate imports ----
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

// ---- Standard library imports ----
use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ---- Internal crate imports ----
use crate::error::{config_error, CoreError, CoreResult};
use crate::source::Fps;
use crate::utils::get_filename_safe;

/// Buffer size for streamed hashing
const HASH_BUFFER_SIZE: usize = 1024 * 1024;

/// Role of a clip in the comparison.
///
/// Serialized as `"reference"`, `"analyze"` or `"target-N"` (N starting at 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ClipRole {
    Reference,
    Analyze,
    Target(u32),
}

impl fmt::Display for ClipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipRole::Reference => f.write_str("reference"),
            ClipRole::Analyze => f.write_str("analyze"),
            ClipRole::Target(n) => write!(f, "target-{n}"),
        }
    }
}

impl FromStr for ClipRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reference" => Ok(ClipRole::Reference),
            "analyze" => Ok(ClipRole::Analyze),
            _ => s
                .strip_prefix("target-")
                .and_then(|n| n.parse::<u32>().ok())
                .filter(|&n| n >= 1)
                .map(ClipRole::Target)
                .ok_or_else(|| config_error(format!("Unknown clip role '{s}'"))),
        }
    }
}

impl TryFrom<String> for ClipRole {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClipRole> for String {
    fn from(role: ClipRole) -> Self {
        role.to_string()
    }
}

/// Snapshot of one input clip's identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipIdentity {
    pub role: ClipRole,
    /// Resolved absolute path
    pub path: String,
    pub name: String,
    pub size: u64,
    /// Modification time, UTC RFC 3339 with microseconds
    pub mtime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
}

/// Role for the clip at `index` when `analyzed_index` is the analyzed clip.
fn role_for(index: usize, analyzed_index: usize) -> ClipRole {
    let position = if index > analyzed_index { index - 1 } else { index };
    match (index == analyzed_index, position) {
        (true, _) => ClipRole::Analyze,
        (false, 0) => ClipRole::Reference,
        (false, n) => ClipRole::Target(n as u32),
    }
}

/// Captures identities for all input clips, in input order.
///
/// The clip at `analyzed_index` gets the analyze role, the first remaining
/// clip is the reference and the rest are targets 1, 2, ... SHA1 digests are
/// computed only when `compute_hash` is set.
pub fn capture_clip_identities(
    paths: &[PathBuf],
    analyzed_index: usize,
    compute_hash: bool,
) -> CoreResult<Vec<ClipIdentity>> {
    if analyzed_index >= paths.len() {
        return Err(config_error(format!(
            "Analyzed clip index {} is out of range for {} clip(s)",
            analyzed_index,
            paths.len()
        )));
    }

    paths
        .iter()
        .enumerate()
        .map(|(i, path)| capture_clip_identity(path, role_for(i, analyzed_index), compute_hash))
        .collect()
}

/// Captures the identity of a single clip.
pub fn capture_clip_identity(
    path: &Path,
    role: ClipRole,
    compute_hash: bool,
) -> CoreResult<ClipIdentity> {
    let metadata = fs::metadata(path).map_err(|e| {
        CoreError::PathError(format!("Cannot stat input clip {}: {}", path.display(), e))
    })?;
    let resolved = fs::canonicalize(path).or_else(|_| std::path::absolute(path))?;
    let mtime: DateTime<Utc> = metadata.modified()?.into();

    let sha1 = if compute_hash {
        Some(compute_sha1(path)?)
    } else {
        None
    };

    let identity = ClipIdentity {
        role,
        path: resolved.to_string_lossy().into_owned(),
        name: get_filename_safe(path)?,
        size: metadata.len(),
        mtime: mtime.to_rfc3339_opts(SecondsFormat::Micros, true),
        sha1,
    };
    log::debug!("Captured {} clip identity: {}", identity.role, identity.path);
    Ok(identity)
}

/// Streams `path` through SHA1 and returns the lowercase hex digest.
pub fn compute_sha1(path: &Path) -> CoreResult<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha1::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// File name of the analyzed clip, if any clip has the analyze role.
#[must_use]
pub fn analyzed_file_name(clips: &[ClipIdentity]) -> Option<&str> {
    clips.iter().find(|c| c.role == ClipRole::Analyze).map(|c| c.name.as_str())
}

/// Everything the metrics cache keys on besides the analysis config.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMetricsCacheInfo {
    /// Location of the cache document
    pub path: PathBuf,
    /// Input file names, in input order
    pub files: Vec<String>,
    pub analyzed_file: String,
    pub trim_start: i64,
    pub trim_end: Option<i64>,
    pub fps: Fps,
    pub clips: Vec<ClipIdentity>,
}

impl FrameMetricsCacheInfo {
    /// Builds cache info from captured identities; one clip must have the analyze role.
    pub fn new(
        path: impl Into<PathBuf>,
        clips: Vec<ClipIdentity>,
        fps: Fps,
        trim_start: i64,
        trim_end: Option<i64>,
    ) -> CoreResult<Self> {
        let analyzed_file = analyzed_file_name(&clips)
            .ok_or_else(|| config_error("No clip has the analyze role"))?
            .to_string();
        Ok(Self {
            path: path.into(),
            files: clips.iter().map(|c| c.name.clone()).collect(),
            analyzed_file,
            trim_start,
            trim_end,
            fps,
            clips,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_role_round_trip() {
        for role in [ClipRole::Reference, ClipRole::Analyze, ClipRole::Target(3)] {
            assert_eq!(role.to_string().parse::<ClipRole>().unwrap(), role);
        }
        assert_eq!(serde_json::to_string(&ClipRole::Target(1)).unwrap(), "\"target-1\"");
        assert!("target-0".parse::<ClipRole>().is_err());
        assert!("encode".parse::<ClipRole>().is_err());
        assert!(serde_json::from_str::<ClipRole>("\"target-x\"").is_err());
    }

    #[test]
    fn test_roles_follow_analyzed_index() {
        let roles: Vec<ClipRole> = (0..4).map(|i| role_for(i, 1)).collect();
        assert_eq!(
            roles,
            vec![ClipRole::Reference, ClipRole::Analyze, ClipRole::Target(1), ClipRole::Target(2)]
        );
        let roles: Vec<ClipRole> = (0..3).map(|i| role_for(i, 0)).collect();
        assert_eq!(roles, vec![ClipRole::Analyze, ClipRole::Reference, ClipRole::Target(1)]);
    }

    #[test]
    fn test_capture_identities() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("source.mkv");
        let encode = dir.path().join("encode.mkv");
        File::create(&source).unwrap().write_all(b"abc").unwrap();
        File::create(&encode).unwrap().write_all(b"encoded").unwrap();

        let clips = capture_clip_identities(&[source, encode], 1, true).unwrap();
        assert_eq!(clips[0].role, ClipRole::Reference);
        assert_eq!(clips[1].role, ClipRole::Analyze);
        assert_eq!(clips[0].name, "source.mkv");
        assert_eq!(clips[0].size, 3);
        assert!(Path::new(&clips[0].path).is_absolute());
        assert!(clips[0].mtime.ends_with('Z'));
        assert_eq!(
            clips[0].sha1.as_deref(),
            Some("a9993e364706816aba3e25717850c26c9cd0d89d")
        );
    }

    #[test]
    fn test_capture_without_hash_and_bad_index() {
        let dir = tempdir().unwrap();
        let clip = dir.path().join("clip.mkv");
        File::create(&clip).unwrap();

        let clips = capture_clip_identities(&[clip.clone()], 0, false).unwrap();
        assert_eq!(clips[0].sha1, None);
        assert!(capture_clip_identities(&[clip], 1, false).is_err());
        assert!(capture_clip_identities(&[dir.path().join("missing.mkv")], 0, false).is_err());
    }

    #[test]
    fn test_cache_info_requires_analyzed_clip() {
        let fps = Fps::new(24, 1).unwrap();
        let clip = ClipIdentity {
            role: ClipRole::Reference,
            path: "/videos/a.mkv".to_string(),
            name: "a.mkv".to_string(),
            size: 1,
            mtime: "2024-01-01T00:00:00.000000Z".to_string(),
            sha1: None,
        };
        assert!(FrameMetricsCacheInfo::new("cache", vec![clip.clone()], fps, 0, None).is_err());

        let analyzed = ClipIdentity { role: ClipRole::Analyze, name: "b.mkv".to_string(), ..clip.clone() };
        let info = FrameMetricsCacheInfo::new("cache", vec![clip, analyzed], fps, 0, None).unwrap();
        assert_eq!(info.files, vec!["a.mkv", "b.mkv"]);
        assert_eq!(info.analyzed_file, "b.mkv");
    }
}
