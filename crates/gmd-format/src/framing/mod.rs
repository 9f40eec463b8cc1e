//! Conversion between on-disk bytes and raw level data text.
//!
//! One strategy per [`GmdVariant`]:
//!
//! | Variant | Strategy |
//! |---------|----------|
//! | `Lvl`   | [`deflate`] |
//! | `Gmd`   | [`plain`] |
//! | `Gmd2`  | [`archive`] |
//! | `Gmd3`  | [`plain`] (trigger expansion is applied by the importer) |

pub mod archive;
pub mod deflate;
pub mod plain;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{GmdError, Result};
use crate::song::{SongPathResolver, SongPlacement};
use crate::variant::GmdVariant;

pub use archive::SongEntry;

/// Raw level data pulled out of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub level_data: String,
    /// Set when a `.gmd2` song was written to disk.
    pub song: Option<SongPlacement>,
}

impl Extracted {
    fn text(level_data: String) -> Self {
        Self {
            level_data,
            song: None,
        }
    }
}

/// Read `path` and unpack it as `variant`.
///
/// `songs` enables song placement for archives; it is ignored otherwise.
pub fn extract(
    variant: GmdVariant,
    path: &Path,
    songs: Option<&dyn SongPathResolver>,
) -> Result<Extracted> {
    let bytes = fs::read(path).map_err(|e| GmdError::io(path, e))?;
    debug!(%variant, path = %path.display(), bytes = bytes.len(), "read container");
    unpack(variant, &bytes, songs)
}

/// Unpack container bytes as `variant`.
pub fn unpack(
    variant: GmdVariant,
    bytes: &[u8],
    songs: Option<&dyn SongPathResolver>,
) -> Result<Extracted> {
    match variant {
        GmdVariant::Gmd | GmdVariant::Gmd3 => plain::read_level_data(bytes).map(Extracted::text),
        GmdVariant::Lvl => deflate::read_level_data(bytes).map(Extracted::text),
        GmdVariant::Gmd2 => archive::unpack(bytes, songs),
    }
}

/// Pack level data text as `variant`.
///
/// `song` is embedded only by archives.
pub fn pack(variant: GmdVariant, level_data: &str, song: Option<&SongEntry>) -> Result<Vec<u8>> {
    match variant {
        GmdVariant::Gmd | GmdVariant::Gmd3 => Ok(plain::write_level_data(level_data)),
        GmdVariant::Lvl => deflate::deflate(level_data.as_bytes()),
        GmdVariant::Gmd2 => archive::pack(level_data, song),
    }
}
