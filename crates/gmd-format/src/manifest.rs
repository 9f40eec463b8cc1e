//! The `level.meta` document of a `.gmd2` archive.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GmdError, Result};
use crate::variant::GMD2_VERSION;

/// Archive entry holding the manifest.
pub const META_ENTRY: &str = "level.meta";

/// Archive entry holding the level data text.
pub const DATA_ENTRY: &str = "level.data";

/// Value of `song-is-custom`.
///
/// Exporters write the numeric song id here, so both a bool and an integer
/// are accepted. A non-zero id counts as custom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SongFlag {
    Flag(bool),
    SongId(i64),
}

impl SongFlag {
    /// Whether the song is a downloaded custom song.
    #[must_use]
    pub const fn is_custom(self) -> bool {
        match self {
            Self::Flag(flag) => flag,
            Self::SongId(id) => id != 0,
        }
    }
}

/// Metadata stored alongside the level data in a `.gmd2` archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveManifest {
    /// Name of the song entry inside the archive.
    #[serde(rename = "song-file", default, skip_serializing_if = "Option::is_none")]
    pub song_file: Option<String>,

    #[serde(
        rename = "song-is-custom",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub song_is_custom: Option<SongFlag>,

    /// Container version of the writer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

impl ArchiveManifest {
    /// Manifest for an archive without a song.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: Some(GMD2_VERSION),
            ..Self::default()
        }
    }

    /// Manifest for an archive that embeds `file_name` for `song_id`.
    #[must_use]
    pub fn for_song(file_name: impl Into<String>, song_id: i64) -> Self {
        Self {
            song_file: Some(file_name.into()),
            song_is_custom: Some(SongFlag::SongId(song_id)),
            version: Some(GMD2_VERSION),
        }
    }

    /// Parse the raw `level.meta` bytes.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let manifest: Self =
            serde_json::from_slice(bytes).map_err(|e| GmdError::ManifestParse(e.to_string()))?;
        if let Some(version) = manifest.version.filter(|version| *version > GMD2_VERSION) {
            debug!(version, supported = GMD2_VERSION, "archive written by a newer format version");
        }
        Ok(manifest)
    }

    /// Serialize to the JSON stored in `level.meta`.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| GmdError::ArchiveWrite(e.to_string()))
    }

    /// The embedded song's entry name, if one is named.
    #[must_use]
    pub fn song_file(&self) -> Option<&str> {
        self.song_file.as_deref().filter(|name| !name.is_empty())
    }

    /// Whether the embedded song is a custom song.
    #[must_use]
    pub fn song_is_custom(&self) -> bool {
        self.song_is_custom.is_some_and(SongFlag::is_custom)
    }
}
