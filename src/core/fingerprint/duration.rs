//! Media duration probing.

use lofty::file::AudioFile;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Reads the playing time of a media file.
///
/// Implementations must not fail: anything unreadable is zero.
pub trait DurationReader: Send + Sync {
    fn duration(&self, path: &Path) -> Duration;
}

/// Probes containers with `lofty`.
///
/// Covers the common audio formats and MP4-family files with an audio
/// track. Anything else reports zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaDurationReader;

impl DurationReader for MediaDurationReader {
    fn duration(&self, path: &Path) -> Duration {
        match lofty::read_from_path(path) {
            Ok(tagged) => tagged.properties().duration(),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No duration available");
                Duration::ZERO
            }
        }
    }
}

/// Always reports zero
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDuration;

impl DurationReader for NoDuration {
    fn duration(&self, _path: &Path) -> Duration {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn missing_file_has_zero_duration() {
        let reader = MediaDurationReader;
        assert_eq!(
            reader.duration(Path::new("/nonexistent/song.mp3")),
            Duration::ZERO
        );
    }

    #[test]
    fn corrupt_container_has_zero_duration() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.flac");
        File::create(&path)
            .unwrap()
            .write_all(b"this is not a flac stream")
            .unwrap();

        assert_eq!(MediaDurationReader.duration(&path), Duration::ZERO);
    }

    #[test]
    fn no_duration_is_always_zero() {
        assert_eq!(NoDuration.duration(Path::new("/a.mp4")), Duration::ZERO);
    }
}
