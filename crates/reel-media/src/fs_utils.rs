//! Filesystem helpers for all-or-nothing output.
//!
//! Outputs are first written to a hidden temp file in the destination
//! directory, then renamed over the destination. A rename within one
//! directory never crosses filesystems, so readers observe either the
//! previous file or the complete new one.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{MediaError, MediaResult};

/// Temp file that becomes `destination` on [`StagedOutput::commit`].
///
/// Dropping an uncommitted stage removes the temp file.
#[derive(Debug)]
pub struct StagedOutput {
    temp: NamedTempFile,
    destination: PathBuf,
    /// Set for stages filled in-process, whose content may legitimately be empty
    allow_empty: bool,
}

impl StagedOutput {
    /// Reserve a temp file next to `destination`, keeping its extension so
    /// tools that infer formats from file names still work.
    pub fn new(destination: impl AsRef<Path>) -> MediaResult<Self> {
        let destination = destination.as_ref().to_path_buf();
        let dir = parent_dir(&destination);
        std::fs::create_dir_all(&dir)
            .map_err(|e| MediaError::assembly_write(&destination, e.to_string()))?;

        let suffix = destination
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let temp = tempfile::Builder::new()
            .prefix(".staged-")
            .suffix(&suffix)
            .tempfile_in(&dir)
            .map_err(|e| MediaError::assembly_write(&destination, e.to_string()))?;

        Ok(Self {
            temp,
            destination,
            allow_empty: false,
        })
    }

    /// Stage `contents` for `destination`.
    pub fn with_contents(destination: impl AsRef<Path>, contents: &[u8]) -> MediaResult<Self> {
        let mut staged = Self::new(destination)?;
        staged
            .temp
            .write_all(contents)
            .and_then(|_| staged.temp.as_file().sync_all())
            .map_err(|e| MediaError::assembly_write(&staged.destination, e.to_string()))?;
        staged.allow_empty = true;
        Ok(staged)
    }

    /// Path writers should fill.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Replace the destination with the staged content.
    pub fn commit(self) -> MediaResult<PathBuf> {
        let written = self.ensure_written()?;
        self.persist(written)
    }

    /// Byte count of the staged file, rejecting an empty external write.
    fn ensure_written(&self) -> MediaResult<u64> {
        let written = std::fs::metadata(self.temp.path())
            .map(|m| m.len())
            .unwrap_or(0);
        if written == 0 && !self.allow_empty {
            return Err(MediaError::assembly_write(
                &self.destination,
                "staged output is empty",
            ));
        }
        Ok(written)
    }

    fn persist(self, written: u64) -> MediaResult<PathBuf> {
        let destination = self.destination;
        self.temp
            .persist(&destination)
            .map_err(|e| MediaError::assembly_write(&destination, e.error.to_string()))?;

        tracing::debug!(path = %destination.display(), bytes = written, "Committed output");
        Ok(destination)
    }
}

/// Commit a group of stages in order.
///
/// Every stage is checked before the first rename, so a failed check leaves
/// all destinations untouched.
pub fn commit_all(stages: Vec<StagedOutput>) -> MediaResult<Vec<PathBuf>> {
    let sizes = stages
        .iter()
        .map(StagedOutput::ensure_written)
        .collect::<MediaResult<Vec<_>>>()?;

    stages
        .into_iter()
        .zip(sizes)
        .map(|(stage, written)| stage.persist(written))
        .collect()
}

/// Write `contents` to `path` atomically.
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> MediaResult<PathBuf> {
    let path = path.as_ref();
    let dir = parent_dir(path);
    std::fs::create_dir_all(&dir).map_err(|e| MediaError::assembly_write(path, e.to_string()))?;

    let mut temp = NamedTempFile::new_in(&dir)
        .map_err(|e| MediaError::assembly_write(path, e.to_string()))?;
    temp.write_all(contents)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| MediaError::assembly_write(path, e.to_string()))?;
    temp.persist(path)
        .map_err(|e| MediaError::assembly_write(path, e.error.to_string()))?;

    Ok(path.to_path_buf())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("captions.srt");
        std::fs::write(&dst, b"old").unwrap();

        write_atomic(&dst, b"new content").unwrap();

        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "new content");
    }

    #[test]
    fn test_write_atomic_creates_parent() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("nested").join("out.srt");

        write_atomic(&dst, b"x").unwrap();

        assert!(dst.exists());
    }

    #[test]
    fn test_staged_output_keeps_extension() {
        let dir = TempDir::new().unwrap();
        let staged = StagedOutput::new(dir.path().join("output.mp4")).unwrap();
        assert_eq!(staged.path().extension().unwrap(), "mp4");
        assert_eq!(staged.path().parent().unwrap(), dir.path());
    }

    #[test]
    fn test_staged_output_commit() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("output.mp4");
        std::fs::write(&dst, b"previous").unwrap();

        let staged = StagedOutput::new(&dst).unwrap();
        std::fs::write(staged.path(), b"encoded").unwrap();
        staged.commit().unwrap();

        assert_eq!(std::fs::read(&dst).unwrap(), b"encoded");
    }

    #[test]
    fn test_dropped_stage_leaves_destination_untouched() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("output.mp4");
        std::fs::write(&dst, b"previous").unwrap();

        let staged_path = {
            let staged = StagedOutput::new(&dst).unwrap();
            std::fs::write(staged.path(), b"partial").unwrap();
            staged.path().to_path_buf()
        };

        assert!(!staged_path.exists());
        assert_eq!(std::fs::read(&dst).unwrap(), b"previous");
    }

    #[test]
    fn test_staged_contents_may_be_empty() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("captions.srt");

        StagedOutput::with_contents(&dst, b"").unwrap().commit().unwrap();

        assert_eq!(std::fs::read(&dst).unwrap(), b"");
    }

    #[test]
    fn test_commit_all_is_all_or_nothing() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("a.mp4");
        let srt = dir.path().join("a.srt");
        std::fs::write(&video, b"old video").unwrap();
        std::fs::write(&srt, b"old srt").unwrap();

        // Encoder produced nothing: neither file may change
        let stages = vec![
            StagedOutput::with_contents(&srt, b"new srt").unwrap(),
            StagedOutput::new(&video).unwrap(),
        ];
        assert!(commit_all(stages).is_err());
        assert_eq!(std::fs::read(&video).unwrap(), b"old video");
        assert_eq!(std::fs::read(&srt).unwrap(), b"old srt");

        let staged_video = StagedOutput::new(&video).unwrap();
        std::fs::write(staged_video.path(), b"new video").unwrap();
        let stages = vec![
            StagedOutput::with_contents(&srt, b"new srt").unwrap(),
            staged_video,
        ];
        assert_eq!(commit_all(stages).unwrap(), vec![srt.clone(), video.clone()]);
        assert_eq!(std::fs::read(&video).unwrap(), b"new video");
        assert_eq!(std::fs::read(&srt).unwrap(), b"new srt");

        let leftovers = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".staged-"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_empty_stage_is_rejected() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("output.mp4");

        let staged = StagedOutput::new(&dst).unwrap();
        let err = staged.commit().unwrap_err();

        assert!(matches!(err, MediaError::AssemblyWrite { .. }));
        assert!(!dst.exists());
    }
}
