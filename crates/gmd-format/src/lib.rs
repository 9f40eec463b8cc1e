//! Reader and writer for GMD level container files.
//!
//! A level file wraps the level's dictionary text in one of four framings:
//!
//! | Extension | Framing |
//! |-----------|---------|
//! | `.lvl`    | deflate-compressed binary |
//! | `.gmd`    | plain text |
//! | `.gmd2`   | zip archive with `level.meta`, `level.data` and an optional song |
//! | `.gmd3`   | plain text with run-length compressed sequence triggers |
//!
//! # Features
//!
//! - Variant inference from file extensions, best-effort or strict
//! - Non-destructive song placement for `.gmd2` archives
//! - In-place expansion of run-length sequence-trigger payloads
//! - Any [`gmd_model::LevelCodec`] for the dictionary text
//!
//! # Example
//!
//! ```no_run
//! use gmd_format::{GmdVariant, export_level_as_gmd, import_gmd_as_level};
//! use gmd_model::PlistLevelCodec;
//!
//! let level = import_gmd_as_level("levels/old.gmd3", &PlistLevelCodec)?;
//! export_level_as_gmd(&level, &PlistLevelCodec, "levels/new.lvl", GmdVariant::Lvl)?;
//! # Ok::<(), gmd_format::GmdError>(())
//! ```

mod error;
mod export;
pub mod framing;
mod import;
pub mod manifest;
pub mod song;
pub mod triggers;
mod variant;

use std::path::Path;

use gmd_model::{Level, LevelCodec};

pub use error::{GmdError, Result};
pub use export::ExportGmdFile;
pub use import::{ImportGmdFile, ImportStage, ImportedLevel, repair_legacy_description};
pub use manifest::ArchiveManifest;
pub use song::{SongPathResolver, SongPlacement};
pub use triggers::{
    SequenceTrigger, TriggerExpansion, TriggerScan, decompress_sequence_triggers,
    parse_sequence_triggers, scan_sequence_triggers,
};
pub use variant::{
    DEFAULT_VARIANT, GMD2_VERSION, GMD3_VERSION, GmdFileKind, GmdVariant, InferMode, file_kind,
};

/// Import a level, inferring the variant from the extension (best effort).
pub fn import_gmd_as_level<C: LevelCodec + ?Sized>(
    path: impl AsRef<Path>,
    codec: &C,
) -> Result<Level> {
    ImportGmdFile::from_path(path.as_ref())
        .infer_variant()
        .into_level(codec)
}

/// Export a level to `path` as `variant`.
pub fn export_level_as_gmd<C: LevelCodec + ?Sized>(
    level: &Level,
    codec: &C,
    path: impl AsRef<Path>,
    variant: GmdVariant,
) -> Result<()> {
    ExportGmdFile::from_level(level)
        .with_variant(variant)
        .into_file(codec, path)
}
