//! Level export: [`Level`] to container bytes or file.
//!
//! Sequence triggers are always written in expanded form, including for
//! `.gmd3`; nothing re-compresses them.

use std::fmt;
use std::fs;
use std::path::Path;

use gmd_model::{Level, LevelCodec};
use tracing::{debug, info, info_span};

use crate::error::{GmdError, Result};
use crate::framing::{self, SongEntry};
use crate::song::{SongPathResolver, song_source_path};
use crate::variant::GmdVariant;

/// Builder for exporting a level.
///
/// # Example
///
/// ```no_run
/// use gmd_format::{ExportGmdFile, GmdVariant};
/// use gmd_model::{Level, PlistLevelCodec};
///
/// let level = Level::new("Stereo Madness");
/// ExportGmdFile::from_level(&level)
///     .with_variant(GmdVariant::Lvl)
///     .into_file(&PlistLevelCodec, "stereo.lvl")?;
/// # Ok::<(), gmd_format::GmdError>(())
/// ```
#[derive(Clone)]
pub struct ExportGmdFile<'a> {
    level: &'a Level,
    variant: Option<GmdVariant>,
    songs: Option<&'a dyn SongPathResolver>,
}

impl fmt::Debug for ExportGmdFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportGmdFile")
            .field("level", &self.level.name)
            .field("variant", &self.variant)
            .field("include_song", &self.songs.is_some())
            .finish()
    }
}

impl<'a> ExportGmdFile<'a> {
    /// Start an export of `level` with no variant set.
    #[must_use]
    pub fn from_level(level: &'a Level) -> Self {
        Self {
            level,
            variant: None,
            songs: None,
        }
    }

    #[must_use]
    pub fn with_variant(mut self, variant: GmdVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Embed the level's song, located through `songs`, in `.gmd2` output.
    #[must_use]
    pub fn with_include_song(mut self, songs: &'a dyn SongPathResolver) -> Self {
        self.songs = Some(songs);
        self
    }

    #[must_use]
    pub fn variant(&self) -> Option<GmdVariant> {
        self.variant
    }

    /// Serialize the level to raw level-data text.
    pub fn level_data<C: LevelCodec + ?Sized>(&self, codec: &C) -> Result<String> {
        codec
            .serialize(self.level)
            .map_err(GmdError::LevelDataSerialize)
    }

    fn song_entry(&self) -> Result<Option<SongEntry>> {
        match self.songs {
            Some(songs) => {
                let path = song_source_path(self.level, songs);
                debug!(song = %path.display(), "embedding song");
                SongEntry::read(&path, self.level.song_id).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Produce the container bytes.
    pub fn into_bytes<C: LevelCodec + ?Sized>(self, codec: &C) -> Result<Vec<u8>> {
        let variant = self.variant.ok_or(GmdError::NoTypeSet)?;
        let span = info_span!("export", %variant, level = %self.level.name);
        let _guard = span.enter();

        let data = self.level_data(codec)?;
        let song = if variant == GmdVariant::Gmd2 {
            self.song_entry()?
        } else {
            None
        };
        let bytes = framing::pack(variant, &data, song.as_ref())?;
        debug!(text = data.len(), bytes = bytes.len(), "packed level");
        Ok(bytes)
    }

    /// Produce the container bytes and write them to `path`.
    ///
    /// A failed write may leave a partial file behind.
    pub fn into_file<C: LevelCodec + ?Sized>(
        self,
        codec: &C,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let path = path.as_ref();
        let variant = self.variant.ok_or(GmdError::NoTypeSet)?;
        let bytes = self.into_bytes(codec)?;
        fs::write(path, &bytes).map_err(|e| GmdError::io(path, e))?;
        info!(
            %variant,
            path = %path.display(),
            bytes = bytes.len(),
            "exported level"
        );
        Ok(())
    }
}
