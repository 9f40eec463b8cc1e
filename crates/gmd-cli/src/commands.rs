//! Command implementations, independent of argument parsing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gmd_format::{
    ExportGmdFile, GmdVariant, ImportGmdFile, ImportedLevel, InferMode, SongPlacement,
    TriggerScan, decompress_sequence_triggers, scan_sequence_triggers,
};
use gmd_model::PlistLevelCodec;
use tracing::{info, info_span};

use crate::songs::DirectorySongResolver;

/// How to resolve and read an input file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Explicit variant; inferred from the extension when `None`.
    pub variant: Option<GmdVariant>,
    pub mode: InferMode,
    pub import_song: bool,
}

#[derive(Debug, Clone)]
pub struct InspectReport {
    pub path: PathBuf,
    pub imported: ImportedLevel,
    /// `(group, activations)` pairs found in the level string.
    pub sequence_triggers: usize,
}

#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub input_variant: GmdVariant,
    pub output_variant: GmdVariant,
    pub output: PathBuf,
    pub objects: usize,
    pub song: Option<SongPlacement>,
    pub song_included: bool,
}

#[derive(Debug, Clone)]
pub struct TriggerReport {
    pub variant: GmdVariant,
    /// Records rewritten by the expansion pass, when it ran.
    pub expanded_records: Option<usize>,
    pub scan: TriggerScan,
}

fn resolve_import<'a>(
    path: &Path,
    options: &ImportOptions,
    songs: &'a DirectorySongResolver,
) -> Result<ImportGmdFile<'a>> {
    let import = ImportGmdFile::from_path(path);
    let import = match options.variant {
        Some(variant) => import.with_variant(variant),
        None => import
            .infer_with(options.mode)
            .with_context(|| format!("determine file type of {}", path.display()))?,
    };
    Ok(if options.import_song {
        import.with_import_song(songs)
    } else {
        import
    })
}

fn import_level(
    path: &Path,
    options: &ImportOptions,
    songs: &DirectorySongResolver,
) -> Result<ImportedLevel> {
    resolve_import(path, options, songs)?
        .import(&PlistLevelCodec)
        .with_context(|| format!("import {}", path.display()))
}

pub fn run_inspect(
    path: &Path,
    options: &ImportOptions,
    songs: &DirectorySongResolver,
) -> Result<InspectReport> {
    let imported = import_level(path, options, songs)?;
    let sequence_triggers = scan_sequence_triggers(&imported.level.level_string)
        .triggers
        .len();
    Ok(InspectReport {
        path: path.to_path_buf(),
        imported,
        sequence_triggers,
    })
}

pub fn run_convert(
    input: &Path,
    output: &Path,
    options: &ImportOptions,
    to: Option<GmdVariant>,
    include_song: bool,
    songs: &DirectorySongResolver,
) -> Result<ConvertReport> {
    let span = info_span!("convert", input = %input.display(), output = %output.display());
    let _guard = span.enter();

    let imported = import_level(input, options, songs)?;
    let output_variant = match to {
        Some(variant) => variant,
        None => GmdVariant::infer(output, InferMode::BestEffort)?,
    };

    let export = ExportGmdFile::from_level(&imported.level).with_variant(output_variant);
    let export = if include_song {
        export.with_include_song(songs)
    } else {
        export
    };
    export
        .into_file(&PlistLevelCodec, output)
        .with_context(|| format!("export {}", output.display()))?;

    let song_included = include_song && output_variant == GmdVariant::Gmd2;
    info!(
        from = %imported.variant,
        to = %output_variant,
        song_included,
        "converted level"
    );
    Ok(ConvertReport {
        input_variant: imported.variant,
        output_variant,
        output: output.to_path_buf(),
        objects: imported.level.object_count(),
        song: imported.song,
        song_included,
    })
}

pub fn run_triggers(
    path: &Path,
    variant: Option<GmdVariant>,
    expand: bool,
) -> Result<TriggerReport> {
    let import = ImportGmdFile::from_path(path);
    let import = match variant {
        Some(variant) => import.with_variant(variant),
        None => import.infer_variant(),
    };
    let variant = import.variant().unwrap_or(gmd_format::DEFAULT_VARIANT);
    let mut level_data = import
        .read_level_data()
        .with_context(|| format!("read {}", path.display()))?
        .level_data;

    let expanded_records = expand.then(|| decompress_sequence_triggers(&mut level_data).records);
    let scan = scan_sequence_triggers(&level_data);
    Ok(TriggerReport {
        variant,
        expanded_records,
        scan,
    })
}
