//! Song asset naming and non-destructive placement on disk.

use std::fs;
use std::path::{Path, PathBuf};

use gmd_model::Level;
use tracing::{debug, warn};

use crate::error::{GmdError, Result};

/// Extension every embedded song file carries.
pub const SONG_EXTENSION: &str = ".mp3";

/// Relative directory bundled songs live under.
pub const RESOURCES_DIR: &str = "Resources";

/// Host-supplied lookup for song locations.
pub trait SongPathResolver {
    /// Path of a downloaded custom song.
    fn custom_song_path(&self, song_id: i64) -> PathBuf;

    /// Directory holding bundled songs.
    fn resources_dir(&self) -> PathBuf {
        PathBuf::from(RESOURCES_DIR)
    }

    /// Path of a bundled official track.
    fn official_song_path(&self, track: i64) -> PathBuf {
        self.resources_dir().join(format!("{track}{SONG_EXTENSION}"))
    }
}

/// Where a song ended up after placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongPlacement {
    /// Path the new song bytes were written to.
    pub target: PathBuf,
    /// New location of the file previously occupying `target`.
    pub displaced: Option<PathBuf>,
}

/// Check that `name` is `<decimal-integer>.mp3`.
#[must_use]
pub fn verify_song_file_name(name: &str) -> bool {
    song_id_from_file_name(name).is_some()
}

/// The numeric song id encoded in a song file name.
#[must_use]
pub fn song_id_from_file_name(name: &str) -> Option<i64> {
    let stem = name.strip_suffix(SONG_EXTENSION)?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Where a song from an archive should be written.
///
/// Custom songs are resolved by id; bundled songs land under the resources
/// directory with their file name unchanged.
pub fn song_target_path(
    file_name: &str,
    is_custom: bool,
    resolver: &dyn SongPathResolver,
) -> Result<PathBuf> {
    let song_id = song_id_from_file_name(file_name)
        .ok_or_else(|| GmdError::InvalidSongFileName(file_name.to_string()))?;
    if is_custom {
        Ok(resolver.custom_song_path(song_id))
    } else {
        Ok(resolver.resources_dir().join(file_name))
    }
}

/// First `<stem>_…_.mp3` sibling of `target` that does not exist yet.
#[must_use]
pub fn free_backup_path(target: &Path) -> PathBuf {
    let stem = target
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut candidate_stem = stem;
    loop {
        candidate_stem.push('_');
        let candidate = target.with_file_name(format!("{candidate_stem}{SONG_EXTENSION}"));
        if !candidate.exists() {
            return candidate;
        }
    }
}

/// Write `bytes` to `target`, first moving any existing file aside.
///
/// Not safe against concurrent writers to the same target.
pub fn place_song(target: &Path, bytes: &[u8]) -> Result<SongPlacement> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| GmdError::io(parent, e))?;
    }

    let displaced = if target.exists() {
        let backup = free_backup_path(target);
        fs::rename(target, &backup).map_err(|e| GmdError::io(target, e))?;
        warn!(
            target = %target.display(),
            backup = %backup.display(),
            "existing song moved aside"
        );
        Some(backup)
    } else {
        None
    };

    fs::write(target, bytes).map_err(|e| GmdError::io(target, e))?;
    debug!(target = %target.display(), bytes = bytes.len(), "song written");

    Ok(SongPlacement {
        target: target.to_path_buf(),
        displaced,
    })
}

/// On-disk location of the song a level plays.
#[must_use]
pub fn song_source_path(level: &Level, resolver: &dyn SongPathResolver) -> PathBuf {
    if level.uses_custom_song() {
        resolver.custom_song_path(level.song_id)
    } else {
        resolver.official_song_path(level.official_song)
    }
}
