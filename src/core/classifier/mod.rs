//! # Classifier Module
//!
//! Maps a path to the [`Category`] it is indexed under, or skips it.
//!
//! ## Rules
//! - Extensions are matched case-insensitively, final segment only
//! - A media extension whose category is disabled is skipped outright
//! - `Other` takes everything else, but only when enabled and only outside
//!   system-reserved directories

mod tables;

pub use tables::{AUDIO_EXTENSIONS, RESERVED_DIR_NAMES, RESERVED_PREFIXES, VIDEO_EXTENSIONS};

use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// What kind of file a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Video,
    Audio,
    Other,
}

impl Category {
    /// Detect a media category from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_lowercase();
        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Category::Video)
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            Some(Category::Audio)
        } else {
            None
        }
    }

    /// Whether a duration is worth probing for this category
    pub fn is_media(&self) -> bool {
        matches!(self, Category::Video | Category::Audio)
    }

    /// Stable name used by stores
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Video => "video",
            Category::Audio => "audio",
            Category::Other => "other",
        }
    }

    /// Parse a stored name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "video" => Some(Category::Video),
            "audio" => Some(Category::Audio),
            "other" => Some(Category::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Video => write!(f, "Video"),
            Category::Audio => write!(f, "Audio"),
            Category::Other => write!(f, "Other"),
        }
    }
}

/// Which categories a scan indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryConfig {
    pub include_video: bool,
    pub include_audio: bool,
    pub include_other: bool,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            include_video: true,
            include_audio: true,
            include_other: false,
        }
    }
}

impl CategoryConfig {
    /// Whether `category` is switched on
    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Video => self.include_video,
            Category::Audio => self.include_audio,
            Category::Other => self.include_other,
        }
    }

    /// Whether anything at all would be indexed
    pub fn any_enabled(&self) -> bool {
        self.include_video || self.include_audio || self.include_other
    }
}

/// Decides the category of each enumerated file
#[derive(Debug, Clone, Default)]
pub struct PathClassifier {
    config: CategoryConfig,
}

impl PathClassifier {
    /// Create a classifier for the given category switches
    pub fn new(config: CategoryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CategoryConfig {
        &self.config
    }

    /// Classify a path, returning `None` when it must not be indexed
    pub fn classify(&self, path: &Path) -> Option<Category> {
        let media = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Category::from_extension);

        match media {
            Some(category) if self.config.is_enabled(category) => Some(category),
            Some(_) => None,
            None if self.config.include_other && !is_system_reserved(path) => {
                Some(Category::Other)
            }
            None => None,
        }
    }
}

/// Check whether a path lies under OS or program directories
pub fn is_system_reserved(path: &Path) -> bool {
    if path.is_absolute()
        && RESERVED_PREFIXES
            .iter()
            .any(|prefix| path.starts_with(prefix))
    {
        return true;
    }

    path.components().any(|component| match component {
        Component::Normal(name) => name
            .to_str()
            .map(|n| RESERVED_DIR_NAMES.contains(&n.to_lowercase().as_str()))
            .unwrap_or(false),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_enabled() -> PathClassifier {
        PathClassifier::new(CategoryConfig {
            include_video: true,
            include_audio: true,
            include_other: true,
        })
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let classifier = PathClassifier::default();
        assert_eq!(
            classifier.classify(Path::new("/media/Clip.MP4")),
            Some(Category::Video)
        );
        assert_eq!(
            classifier.classify(Path::new("/media/song.Flac")),
            Some(Category::Audio)
        );
    }

    #[test]
    fn only_final_extension_segment_counts() {
        let classifier = PathClassifier::default();
        assert_eq!(
            classifier.classify(Path::new("/media/backup.mp4.zip")),
            None
        );
        assert_eq!(
            classifier.classify(Path::new("/media/archive.tar.mkv")),
            Some(Category::Video)
        );
    }

    #[test]
    fn disabled_media_category_is_skipped_not_other() {
        let classifier = PathClassifier::new(CategoryConfig {
            include_video: false,
            include_audio: true,
            include_other: true,
        });
        assert_eq!(classifier.classify(Path::new("/home/me/movie.mkv")), None);
    }

    #[test]
    fn other_requires_opt_in() {
        let classifier = PathClassifier::default();
        assert_eq!(classifier.classify(Path::new("/home/me/notes.txt")), None);

        assert_eq!(
            all_enabled().classify(Path::new("/home/me/notes.txt")),
            Some(Category::Other)
        );
    }

    #[test]
    fn other_excludes_system_directories() {
        let classifier = all_enabled();
        assert_eq!(classifier.classify(Path::new("/usr/lib/libc.so")), None);
        assert_eq!(
            classifier.classify(Path::new("/mnt/c/Windows/System32/kernel32.dll")),
            None
        );
        assert_eq!(
            classifier.classify(Path::new("/mnt/c/Users/me/AppData/Local/cache.bin")),
            None
        );
    }

    #[test]
    fn media_files_are_indexed_even_in_reserved_directories() {
        let classifier = all_enabled();
        assert_eq!(
            classifier.classify(Path::new("/mnt/c/Windows/Media/chimes.wav")),
            Some(Category::Audio)
        );
    }

    #[test]
    fn file_without_extension_is_other_when_enabled() {
        assert_eq!(
            all_enabled().classify(Path::new("/home/me/README")),
            Some(Category::Other)
        );
        assert_eq!(PathClassifier::default().classify(Path::new("/home/me/README")), None);
    }

    #[test]
    fn category_names_round_trip() {
        for category in [Category::Video, Category::Audio, Category::Other] {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        assert_eq!(Category::parse("image"), None);
    }
}
