//! Error types for level container operations.

use std::path::{Path, PathBuf};

use gmd_model::DictError;
use thiserror::Error;

/// Errors that can occur when importing or exporting a level file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GmdError {
    /// No container variant was set or inferred.
    #[error("no file type set")]
    NoTypeSet,

    /// The file extension is not a known container variant.
    #[error("unknown file type: '{extension}'")]
    UnknownVariant { extension: String },

    /// Reading or writing a file failed.
    #[error("unable to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Inflating level data failed or produced nothing.
    #[error("unable to decompress level data")]
    Decompression,

    /// Deflating level data failed or produced nothing.
    #[error("unable to compress level data")]
    Compression,

    /// The zip container could not be opened.
    #[error("unable to read zip: {0}")]
    ArchiveOpen(String),

    /// A required archive entry does not exist.
    #[error("archive entry '{0}' is missing")]
    ArchiveEntryMissing(String),

    /// An archive entry exists but could not be read.
    #[error("unable to read archive entry '{entry}': {detail}")]
    ArchiveEntryRead { entry: String, detail: String },

    /// Building the zip container failed.
    #[error("unable to write zip: {0}")]
    ArchiveWrite(String),

    /// The `level.meta` document is malformed.
    #[error("unable to parse metadata: {0}")]
    ManifestParse(String),

    /// The song named in the manifest is not `<id>.mp3`.
    #[error("song file name '{0}' is invalid")]
    InvalidSongFileName(String),

    /// The song entry could not be read from the archive or disk.
    #[error("unable to read song file: {0}")]
    SongRead(String),

    /// Extracted bytes are not valid UTF-8 text.
    #[error("{0} is not valid UTF-8 text")]
    NotUtf8(&'static str),

    /// The level dictionary codec rejected the level data.
    #[error("unable to parse level data: {0}")]
    LevelDataParse(#[source] DictError),

    /// The level dictionary codec could not serialize the level.
    #[error("unable to serialize level data: {0}")]
    LevelDataSerialize(#[source] DictError),

    /// Raw extraction failed for the given source file.
    #[error("unable to read {}: {source}", .path.display())]
    Extraction {
        path: PathBuf,
        #[source]
        source: Box<GmdError>,
    },
}

/// Result type alias for container operations.
pub type Result<T> = std::result::Result<T, GmdError>;

impl GmdError {
    /// Create an Io error for the given path.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an UnknownVariant error.
    pub fn unknown_variant(extension: impl Into<String>) -> Self {
        Self::UnknownVariant {
            extension: extension.into(),
        }
    }

    /// Create an ArchiveEntryRead error.
    pub fn entry_read(entry: impl Into<String>, detail: impl ToString) -> Self {
        Self::ArchiveEntryRead {
            entry: entry.into(),
            detail: detail.to_string(),
        }
    }

    /// Annotate an extraction failure with the file it came from.
    pub fn extraction(path: impl AsRef<Path>, source: GmdError) -> Self {
        Self::Extraction {
            path: path.as_ref().to_path_buf(),
            source: Box::new(source),
        }
    }

    /// The underlying error, looking through path annotations.
    #[must_use]
    pub fn cause(&self) -> &GmdError {
        match self {
            Self::Extraction { source, .. } => source.cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GmdError::ArchiveEntryMissing("level.data".to_string());
        assert_eq!(format!("{err}"), "archive entry 'level.data' is missing");

        let err = GmdError::unknown_variant("txt");
        assert_eq!(format!("{err}"), "unknown file type: 'txt'");
    }

    #[test]
    fn test_extraction_wraps_path() {
        let err = GmdError::extraction(
            "levels/a.gmd2",
            GmdError::ArchiveOpen("bad".to_string()),
        );
        let message = format!("{err}");
        assert!(message.contains("levels/a.gmd2"));
        assert!(message.contains("unable to read zip: bad"));
        assert!(matches!(err.cause(), GmdError::ArchiveOpen(_)));
    }

    #[test]
    fn test_io_error_names_path() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = GmdError::io("missing.gmd", io_err);
        assert_eq!(format!("{err}"), "unable to access missing.gmd: gone");
    }
}
