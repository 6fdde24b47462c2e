//! Temporary file handling for atomic writes.
//!
//! Cache and sidecar documents are written to a temporary file in the target
//! directory and then renamed over the destination. The tempfile crate removes
//! the temporary file on drop, so a failed write leaves neither a partial
//! document nor a stray temp file behind.

use crate::error::CoreResult;
use crate::utils::get_filename_safe;
use std::io::Write;
use std::path::Path;
use tempfile::{Builder as TempFileBuilder, NamedTempFile};

/// Creates a temporary file next to `target`, named after it. Auto-deleted when dropped.
pub fn create_sibling_temp_file(target: &Path) -> CoreResult<NamedTempFile> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let file_name = get_filename_safe(target)?;
    let temp_file = TempFileBuilder::new()
        .prefix(&format!(".{file_name}_"))
        .suffix(".tmp")
        .tempfile_in(dir)?;

    Ok(temp_file)
}

/// Writes `contents` to `target` atomically: temp file, flush, fsync, rename.
pub fn write_atomic(target: &Path, contents: &[u8]) -> CoreResult<()> {
    let mut temp_file = create_sibling_temp_file(target)?;
    temp_file.write_all(contents)?;
    temp_file.flush()?;
    temp_file.as_file().sync_all()?;
    temp_file.persist(target).map_err(|e| e.error)?;

    log::trace!("Atomically wrote {} bytes to {}", contents.len(), target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_creates_and_overwrites() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("nested").join("cache.json");

        write_atomic(&target, b"first").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"first");

        write_atomic(&target, b"second").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"second");

        // Only the target remains; the temp file was renamed away
        let entries: Vec<_> = std::fs::read_dir(target.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_atomic_rejects_pathless_target() {
        assert!(write_atomic(Path::new("/"), b"data").is_err());
    }

    #[test]
    fn test_sibling_temp_file_is_removed_on_drop() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("selection.json");

        let temp_path = {
            let temp = create_sibling_temp_file(&target).unwrap();
            assert_eq!(temp.path().parent(), Some(dir.path()));
            temp.path().to_path_buf()
        };
        assert!(!temp_path.exists());
        assert!(!target.exists());
    }
}
