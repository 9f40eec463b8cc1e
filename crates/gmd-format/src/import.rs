//! Level import: container file to [`Level`].
//!
//! Stages run in order, any of which may fail the import:
//!
//! 1. type resolution (explicit or inferred variant)
//! 2. raw extraction through [`crate::framing`]
//! 3. trigger preprocessing (`.gmd3` only)
//! 4. structural parse through a [`LevelCodec`]
//! 5. materialization (editable flag, level type, legacy repair)

use std::fmt;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use gmd_model::{Level, LevelCodec, LevelType};
use tracing::{debug, info, info_span};

use crate::error::{GmdError, Result};
use crate::framing::{self, Extracted};
use crate::song::{SongPathResolver, SongPlacement};
use crate::triggers::{TriggerExpansion, decompress_sequence_triggers};
use crate::variant::{GmdVariant, InferMode};

/// Stage of an import, recorded on the tracing span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    TypeResolution,
    RawExtraction,
    TriggerPreprocessing,
    StructuralParse,
    Materialization,
}

impl ImportStage {
    /// Short name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TypeResolution => "type_resolution",
            Self::RawExtraction => "raw_extraction",
            Self::TriggerPreprocessing => "trigger_preprocessing",
            Self::StructuralParse => "structural_parse",
            Self::Materialization => "materialization",
        }
    }
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything an import produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedLevel {
    pub level: Level,
    pub variant: GmdVariant,
    /// Song written to disk by a `.gmd2` import.
    pub song: Option<SongPlacement>,
    /// Trigger expansion report; empty unless the variant is `.gmd3`.
    pub triggers: TriggerExpansion,
    /// The document used the legacy plist layout.
    pub legacy: bool,
}

/// Builder for importing a level file.
///
/// # Example
///
/// ```no_run
/// use gmd_format::ImportGmdFile;
/// use gmd_model::PlistLevelCodec;
///
/// let level = ImportGmdFile::from_path("levels/stereo.gmd")
///     .infer_variant()
///     .into_level(&PlistLevelCodec)?;
/// println!("{}", level.name);
/// # Ok::<(), gmd_format::GmdError>(())
/// ```
#[derive(Clone)]
pub struct ImportGmdFile<'a> {
    path: PathBuf,
    variant: Option<GmdVariant>,
    songs: Option<&'a dyn SongPathResolver>,
}

impl fmt::Debug for ImportGmdFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportGmdFile")
            .field("path", &self.path)
            .field("variant", &self.variant)
            .field("import_song", &self.songs.is_some())
            .finish()
    }
}

impl<'a> ImportGmdFile<'a> {
    /// Start an import of `path` with no variant set.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            variant: None,
            songs: None,
        }
    }

    /// Use an explicit variant.
    #[must_use]
    pub fn with_variant(mut self, variant: GmdVariant) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Infer the variant from the extension, leaving it unset on failure.
    ///
    /// Returns whether the extension was recognised.
    pub fn try_infer_variant(&mut self) -> bool {
        match GmdVariant::infer(&self.path, InferMode::Strict) {
            Ok(variant) => {
                self.variant = Some(variant);
                true
            }
            Err(_) => false,
        }
    }

    /// Infer the variant, falling back to the default for unknown extensions.
    #[must_use]
    pub fn infer_variant(mut self) -> Self {
        let variant = GmdVariant::infer(&self.path, InferMode::BestEffort)
            .unwrap_or(crate::variant::DEFAULT_VARIANT);
        self.variant = Some(variant);
        self
    }

    /// Infer the variant, failing on unknown extensions.
    pub fn infer_variant_strict(mut self) -> Result<Self> {
        self.variant = Some(GmdVariant::infer(&self.path, InferMode::Strict)?);
        Ok(self)
    }

    /// Infer the variant using the given mode.
    pub fn infer_with(self, mode: InferMode) -> Result<Self> {
        match mode {
            InferMode::BestEffort => Ok(self.infer_variant()),
            InferMode::Strict => self.infer_variant_strict(),
        }
    }

    /// Place an archive's song on disk using `songs`.
    #[must_use]
    pub fn with_import_song(mut self, songs: &'a dyn SongPathResolver) -> Self {
        self.songs = Some(songs);
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn variant(&self) -> Option<GmdVariant> {
        self.variant
    }

    /// Run raw extraction only.
    ///
    /// Failures other than plain I/O errors are annotated with the path.
    pub fn read_level_data(&self) -> Result<Extracted> {
        let variant = self.variant.ok_or(GmdError::NoTypeSet)?;
        framing::extract(variant, &self.path, self.songs).map_err(|e| match e {
            GmdError::Io { .. } => e,
            other => GmdError::extraction(&self.path, other),
        })
    }

    /// Run the full import.
    pub fn import<C: LevelCodec + ?Sized>(&self, codec: &C) -> Result<ImportedLevel> {
        let span = info_span!("import", path = %self.path.display());
        let _guard = span.enter();

        let variant = self.variant.ok_or(GmdError::NoTypeSet)?;
        debug!(stage = %ImportStage::TypeResolution, %variant);

        let Extracted {
            mut level_data,
            song,
        } = self.read_level_data()?;
        debug!(stage = %ImportStage::RawExtraction, bytes = level_data.len());

        let triggers = if variant.expands_triggers() {
            let report = decompress_sequence_triggers(&mut level_data);
            debug!(
                stage = %ImportStage::TriggerPreprocessing,
                records = report.records,
                bytes = level_data.len()
            );
            report
        } else {
            TriggerExpansion::default()
        };

        let parsed = codec
            .parse(&level_data)
            .map_err(GmdError::LevelDataParse)?;
        debug!(stage = %ImportStage::StructuralParse, legacy = parsed.legacy);

        let mut level = parsed.level;
        level.editable = true;
        level.level_type = LevelType::Editor;
        if parsed.legacy {
            repair_legacy_description(&mut level);
        }
        debug!(stage = %ImportStage::Materialization);

        info!(
            %variant,
            name = %level.name,
            objects = level.object_count(),
            song = song.is_some(),
            "imported level"
        );
        Ok(ImportedLevel {
            level,
            variant,
            song,
            triggers,
            legacy: parsed.legacy,
        })
    }

    /// Run the full import and keep only the level.
    pub fn into_level<C: LevelCodec + ?Sized>(self, codec: &C) -> Result<Level> {
        self.import(codec).map(|imported| imported.level)
    }
}

/// Legacy descriptions may omit their trailing padding.
const LENIENT_PADDING: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT_PADDING);
const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT_PADDING);

/// Decode a legacy file's base64 description in place.
///
/// Tries the URL-safe alphabet, then the standard one, with or without
/// padding. The description is left untouched when neither decodes to UTF-8
/// text. Returns whether it changed.
pub fn repair_legacy_description(level: &mut Level) -> bool {
    if level.description.is_empty() {
        return false;
    }
    let decoded = URL_SAFE
        .decode(&level.description)
        .or_else(|_| STANDARD.decode(&level.description))
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok());
    match decoded {
        Some(text) => {
            level.description = text;
            true
        }
        None => {
            debug!("legacy description is not base64; kept as is");
            false
        }
    }
}
