//! Output file naming and cleanup.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// Marker inserted between the input stem and the unique token.
pub const OUTPUT_SUFFIX: &str = "_audio";

/// Extension of every generated file.
pub const OUTPUT_EXTENSION: &str = "mp3";

/// Mints a fresh output path for `input`.
///
/// `<dir>/<stem>_audio_<token>.mp3`, where `dir` is `output_dir` or the input's
/// own directory and `token` is 8 hex characters of a random UUID, so
/// concurrent conversions of the same input never share a file.
pub fn output_path_for(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());

    let token = Uuid::new_v4().simple().to_string();

    dir.join(format!(
        "{}{}_{}.{}",
        stem,
        OUTPUT_SUFFIX,
        &token[..8],
        OUTPUT_EXTENSION
    ))
}

/// An output file that is deleted on drop unless [`keep`](Self::keep) is called.
///
/// Holds the "no partial output after failure" guarantee even when the
/// surrounding future is dropped mid-conversion.
#[derive(Debug)]
pub struct PartialOutput {
    path: PathBuf,
    armed: bool,
}

impl PartialOutput {
    pub fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hands ownership of the file to the caller.
    pub fn keep(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }

    /// Deletes the file now.
    pub async fn discard(self) {
        let path = self.keep();
        remove_if_exists(&path).await;
    }
}

impl Drop for PartialOutput {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed partial output"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to remove partial output")
            }
        }
    }
}

/// Removes `path`, treating a missing file as success.
pub(crate) async fn remove_if_exists(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Removed output file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove output file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_path_next_to_input() {
        let path = output_path_for(Path::new("/videos/lecture.mp4"), None);

        assert_eq!(path.parent(), Some(Path::new("/videos")));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("lecture_audio_"), "{}", name);
        assert!(name.ends_with(".mp3"));
        assert_eq!(name.len(), "lecture_audio_".len() + 8 + ".mp3".len());
    }

    #[test]
    fn test_output_path_in_configured_dir() {
        let path = output_path_for(Path::new("/videos/talk.mkv"), Some(Path::new("/tmp/out")));
        assert_eq!(path.parent(), Some(Path::new("/tmp/out")));
    }

    #[test]
    fn test_bare_filename_uses_current_dir() {
        let path = output_path_for(Path::new("clip.mov"), None);
        assert_eq!(path.parent(), Some(Path::new(".")));
    }

    #[test]
    fn test_output_paths_are_unique() {
        let input = Path::new("/videos/same.mp4");
        let a = output_path_for(input, None);
        let b = output_path_for(input, None);
        assert_ne!(a, b);
    }

    #[test]
    fn test_partial_output_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partial.mp3");
        std::fs::write(&path, b"half").unwrap();

        drop(PartialOutput::new(path.clone()));
        assert!(!path.exists());
    }

    #[test]
    fn test_kept_output_survives() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("done.mp3");
        std::fs::write(&path, b"audio").unwrap();

        let kept = PartialOutput::new(path.clone()).keep();
        assert_eq!(kept, path);
        assert!(path.exists());
    }

    #[test]
    fn test_drop_without_file_is_quiet() {
        let dir = TempDir::new().unwrap();
        drop(PartialOutput::new(dir.path().join("never-written.mp3")));
    }

    #[tokio::test]
    async fn test_discard_removes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("failed.mp3");
        std::fs::write(&path, b"junk").unwrap();

        PartialOutput::new(path.clone()).discard().await;
        assert!(!path.exists());
    }
}
