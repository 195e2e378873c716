//! Platform defaults: which folders to index and where the database lives.

use std::path::PathBuf;

/// Application directory name under the user data dir
pub const APP_DIR_NAME: &str = "media-indexer";

/// Database file name inside the application directory
pub const DATABASE_FILE_NAME: &str = "index.db";

/// Resolves platform-specific default paths
pub trait Environment {
    /// Folders scanned when no roots are given
    fn default_roots(&self) -> Vec<PathBuf>;

    /// Per-user data directory
    fn data_dir(&self) -> PathBuf;

    /// Default database location
    fn default_database(&self) -> PathBuf {
        self.data_dir().join(APP_DIR_NAME).join(DATABASE_FILE_NAME)
    }
}

/// Environment backed by the operating system's user directories
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn default_roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = [dirs::video_dir(), dirs::audio_dir(), dirs::home_dir()]
            .into_iter()
            .flatten()
            .filter(|dir| dir.is_dir())
            .collect();
        roots.dedup();
        roots
    }

    fn data_dir(&self) -> PathBuf {
        dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEnvironment(PathBuf);

    impl Environment for FixedEnvironment {
        fn default_roots(&self) -> Vec<PathBuf> {
            vec![self.0.join("Videos")]
        }

        fn data_dir(&self) -> PathBuf {
            self.0.clone()
        }
    }

    #[test]
    fn default_database_lives_under_app_dir() {
        let env = FixedEnvironment(PathBuf::from("/data"));

        assert_eq!(
            env.default_database(),
            PathBuf::from("/data/media-indexer/index.db")
        );
    }

    #[test]
    fn system_roots_all_exist() {
        for root in SystemEnvironment.default_roots() {
            assert!(root.is_dir(), "{} should exist", root.display());
        }
    }
}
