//! Directory-backed song locations.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gmd_format::SongPathResolver;
use gmd_format::song::{RESOURCES_DIR, SONG_EXTENSION};
use serde::Deserialize;
use tracing::debug;

/// Where songs live on disk.
///
/// Loaded from a JSON file with `songs-dir` and `resources-dir` keys; a
/// missing key keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SongDirs {
    /// Downloaded custom songs, stored as `<id>.mp3`.
    pub songs_dir: PathBuf,
    /// Bundled songs.
    pub resources_dir: PathBuf,
}

impl Default for SongDirs {
    fn default() -> Self {
        Self {
            songs_dir: PathBuf::from("songs"),
            resources_dir: PathBuf::from(RESOURCES_DIR),
        }
    }
}

impl SongDirs {
    /// Load song locations from a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns an error naming the file if it cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read song config from {}", path.display()))?;
        let dirs: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse song config from {}", path.display()))?;
        debug!(
            config = %path.display(),
            songs_dir = %dirs.songs_dir.display(),
            resources_dir = %dirs.resources_dir.display(),
            "loaded song config"
        );
        Ok(dirs)
    }
}

/// [`SongPathResolver`] over a pair of directories.
#[derive(Debug, Clone, Default)]
pub struct DirectorySongResolver {
    dirs: SongDirs,
}

impl DirectorySongResolver {
    pub fn new(dirs: SongDirs) -> Self {
        Self { dirs }
    }
}

impl SongPathResolver for DirectorySongResolver {
    fn custom_song_path(&self, song_id: i64) -> PathBuf {
        self.dirs
            .songs_dir
            .join(format!("{song_id}{SONG_EXTENSION}"))
    }

    fn resources_dir(&self) -> PathBuf {
        self.dirs.resources_dir.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_layout() {
        let resolver = DirectorySongResolver::default();
        assert_eq!(resolver.custom_song_path(42), PathBuf::from("songs/42.mp3"));
        assert_eq!(resolver.official_song_path(3), PathBuf::from("Resources/3.mp3"));
    }

    #[test]
    fn test_song_dirs_from_json() {
        let dirs: SongDirs = serde_json::from_str(r#"{"songs-dir":"/data/songs"}"#).unwrap();
        assert_eq!(dirs.songs_dir, PathBuf::from("/data/songs"));
        assert_eq!(dirs.resources_dir, PathBuf::from("Resources"));

        let resolver = DirectorySongResolver::new(dirs);
        assert_eq!(
            resolver.custom_song_path(7),
            PathBuf::from("/data/songs/7.mp3")
        );
    }

    #[test]
    fn test_load_song_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("songs.json");
        fs::write(&path, r#"{"resources-dir":"/opt/game/Resources"}"#).unwrap();

        let dirs = SongDirs::load(&path).unwrap();
        assert_eq!(dirs.songs_dir, PathBuf::from("songs"));
        assert_eq!(dirs.resources_dir, PathBuf::from("/opt/game/Resources"));
    }

    #[test]
    fn test_load_song_config_errors_name_the_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("absent.json");
        let err = SongDirs::load(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ songs-dir").unwrap();
        let err = SongDirs::load(&broken).unwrap_err();
        assert!(format!("{err}").starts_with("Failed to parse song config"));
    }
}
