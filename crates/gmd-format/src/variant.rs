//! Container variants and file-type detection.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{GmdError, Result};

/// On-disk framing convention for a level file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GmdVariant {
    /// Deflate-compressed level data (`.lvl`).
    Lvl,
    /// Plain level data text (`.gmd`).
    Gmd,
    /// Zip archive with metadata and an optional song (`.gmd2`).
    Gmd2,
    /// Plain text with run-length compressed sequence triggers (`.gmd3`).
    Gmd3,
}

/// Variant used when inference finds no match in best-effort mode.
pub const DEFAULT_VARIANT: GmdVariant = GmdVariant::Gmd;

/// Format version of the `.gmd2` container.
pub const GMD2_VERSION: u32 = 1;

/// Format version of the `.gmd3` container.
pub const GMD3_VERSION: u32 = 1;

impl GmdVariant {
    /// Every supported variant, in table order.
    pub const ALL: [Self; 4] = [Self::Lvl, Self::Gmd, Self::Gmd2, Self::Gmd3];

    /// Canonical file extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Lvl => "lvl",
            Self::Gmd => "gmd",
            Self::Gmd2 => "gmd2",
            Self::Gmd3 => "gmd3",
        }
    }

    /// Look up a variant by extension (case-sensitive, without the dot).
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.extension() == extension)
    }

    /// Format version written for forward-compatibility signalling.
    ///
    /// Never checked on read.
    #[must_use]
    pub const fn format_version(self) -> u32 {
        match self {
            Self::Lvl | Self::Gmd => 1,
            Self::Gmd2 => GMD2_VERSION,
            Self::Gmd3 => GMD3_VERSION,
        }
    }

    /// Human-readable description of the framing.
    #[must_use]
    pub const fn framing(self) -> &'static str {
        match self {
            Self::Lvl => "deflate-compressed binary",
            Self::Gmd => "plain text",
            Self::Gmd2 => "zip archive",
            Self::Gmd3 => "plain text, compressed sequence triggers",
        }
    }

    /// Whether the importer runs the sequence-trigger expansion pass.
    #[must_use]
    pub const fn expands_triggers(self) -> bool {
        matches!(self, Self::Gmd3)
    }

    /// Infer the variant from a path's extension.
    ///
    /// In [`InferMode::BestEffort`] an unknown extension yields
    /// [`DEFAULT_VARIANT`]; in [`InferMode::Strict`] it is an error.
    pub fn infer(path: &Path, mode: InferMode) -> Result<Self> {
        let extension = extension_without_dot(path);
        match (Self::from_extension(&extension), mode) {
            (Some(variant), _) => Ok(variant),
            (None, InferMode::BestEffort) => Ok(DEFAULT_VARIANT),
            (None, InferMode::Strict) => Err(GmdError::unknown_variant(extension)),
        }
    }
}

impl fmt::Display for GmdVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for GmdVariant {
    type Err = GmdError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim_start_matches('.');
        Self::from_extension(trimmed).ok_or_else(|| GmdError::unknown_variant(trimmed))
    }
}

/// How to treat an unrecognised extension during inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferMode {
    /// Fall back to [`DEFAULT_VARIANT`].
    #[default]
    BestEffort,
    /// Fail with [`GmdError::UnknownVariant`].
    Strict,
}

/// What kind of container a path names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GmdFileKind {
    None,
    Level,
}

/// Classify a path by its extension.
#[must_use]
pub fn file_kind(path: &Path) -> GmdFileKind {
    if GmdVariant::from_extension(&extension_without_dot(path)).is_some() {
        GmdFileKind::Level
    } else {
        GmdFileKind::None
    }
}

/// The path's extension without the leading dot, or an empty string.
#[must_use]
pub fn extension_without_dot(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_table() {
        for variant in GmdVariant::ALL {
            assert_eq!(GmdVariant::from_extension(variant.extension()), Some(variant));
        }
        assert_eq!(GmdVariant::from_extension("GMD"), None);
        assert_eq!("gmd2".parse::<GmdVariant>().unwrap(), GmdVariant::Gmd2);
        assert_eq!(".lvl".parse::<GmdVariant>().unwrap(), GmdVariant::Lvl);
    }

    #[test]
    fn test_infer_best_effort_falls_back() {
        let variant = GmdVariant::infer(Path::new("level.txt"), InferMode::BestEffort).unwrap();
        assert_eq!(variant, GmdVariant::Gmd);

        let variant = GmdVariant::infer(Path::new("noext"), InferMode::BestEffort).unwrap();
        assert_eq!(variant, DEFAULT_VARIANT);
    }

    #[test]
    fn test_infer_strict_rejects_unknown() {
        let err = GmdVariant::infer(Path::new("level.txt"), InferMode::Strict).unwrap_err();
        assert!(matches!(err, GmdError::UnknownVariant { ref extension } if extension == "txt"));

        let variant = GmdVariant::infer(Path::new("dir/level.gmd3"), InferMode::Strict).unwrap();
        assert_eq!(variant, GmdVariant::Gmd3);
    }

    #[test]
    fn test_file_kind() {
        assert_eq!(file_kind(Path::new("a.gmd")), GmdFileKind::Level);
        assert_eq!(file_kind(Path::new("a.lvl")), GmdFileKind::Level);
        assert_eq!(file_kind(Path::new("a.gmdl")), GmdFileKind::None);
        assert_eq!(file_kind(Path::new("a")), GmdFileKind::None);
    }

    #[test]
    fn test_only_gmd3_expands_triggers() {
        let expanding: Vec<GmdVariant> = GmdVariant::ALL
            .into_iter()
            .filter(|variant| variant.expands_triggers())
            .collect();
        assert_eq!(expanding, vec![GmdVariant::Gmd3]);
    }
}
