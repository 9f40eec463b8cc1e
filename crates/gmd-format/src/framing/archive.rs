//! Zip framing used by `.gmd2` files.
//!
//! An archive holds `level.meta` (an [`ArchiveManifest`]), `level.data`
//! and, optionally, the song named by the manifest.

use std::fs;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use super::Extracted;
use crate::error::{GmdError, Result};
use crate::manifest::{ArchiveManifest, DATA_ENTRY, META_ENTRY};
use crate::song::{SongPathResolver, SongPlacement, place_song, song_target_path};

/// A song to embed in an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongEntry {
    /// Entry name, the source file's name.
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Written to the manifest's `song-is-custom` field.
    pub song_id: i64,
}

impl SongEntry {
    /// Load a song from disk.
    pub fn read(path: &Path, song_id: i64) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| GmdError::SongRead(format!("{} has no file name", path.display())))?;
        let bytes = fs::read(path)
            .map_err(|e| GmdError::SongRead(format!("{}: {e}", path.display())))?;
        Ok(Self {
            file_name,
            bytes,
            song_id,
        })
    }
}

/// Read a whole entry, distinguishing a missing entry from a broken one.
fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(GmdError::ArchiveEntryMissing(name.to_string()));
        }
        Err(e) => return Err(GmdError::entry_read(name, e)),
    };
    let mut buf = Vec::new();
    entry
        .read_to_end(&mut buf)
        .map_err(|e| GmdError::entry_read(name, e))?;
    debug!(entry = name, bytes = buf.len(), "read archive entry");
    Ok(buf)
}

/// Validate, extract and place the song named by the manifest.
///
/// The name is checked before anything touches the filesystem.
fn import_song<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    manifest: &ArchiveManifest,
    file_name: &str,
    resolver: &dyn SongPathResolver,
) -> Result<SongPlacement> {
    let target = song_target_path(file_name, manifest.song_is_custom(), resolver)?;
    let bytes = read_entry(archive, file_name).map_err(|e| match e {
        GmdError::ArchiveEntryMissing(name) => {
            GmdError::SongRead(format!("archive has no entry '{name}'"))
        }
        other => GmdError::SongRead(other.to_string()),
    })?;
    place_song(&target, &bytes)
}

/// Unpack a `.gmd2` archive.
///
/// `level.data` is read and decoded before the song is placed, so a
/// malformed archive never leaves a song behind.
pub fn unpack(bytes: &[u8], songs: Option<&dyn SongPathResolver>) -> Result<Extracted> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| GmdError::ArchiveOpen(e.to_string()))?;

    let meta = read_entry(&mut archive, META_ENTRY)?;
    let manifest = ArchiveManifest::parse(&meta)?;
    let data = read_entry(&mut archive, DATA_ENTRY)?;
    let level_data = String::from_utf8(data).map_err(|_| GmdError::NotUtf8(DATA_ENTRY))?;

    let song = match (songs, manifest.song_file()) {
        (Some(resolver), Some(file_name)) => {
            Some(import_song(&mut archive, &manifest, file_name, resolver)?)
        }
        (None, Some(file_name)) => {
            debug!(song = file_name, "song import not requested");
            None
        }
        (_, None) => None,
    };

    Ok(Extracted { level_data, song })
}

fn write_err(e: impl std::fmt::Display) -> GmdError {
    GmdError::ArchiveWrite(e.to_string())
}

/// Build a `.gmd2` archive in memory.
pub fn pack(level_data: &str, song: Option<&SongEntry>) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    let manifest = match song {
        Some(song) => {
            writer
                .start_file(song.file_name.as_str(), options)
                .map_err(write_err)?;
            writer.write_all(&song.bytes).map_err(write_err)?;
            ArchiveManifest::for_song(song.file_name.as_str(), song.song_id)
        }
        None => ArchiveManifest::new(),
    };

    writer
        .start_file(META_ENTRY, options)
        .map_err(write_err)?;
    writer
        .write_all(manifest.to_json()?.as_bytes())
        .map_err(write_err)?;

    writer
        .start_file(DATA_ENTRY, options)
        .map_err(write_err)?;
    writer
        .write_all(level_data.as_bytes())
        .map_err(write_err)?;

    let cursor = writer.finish().map_err(write_err)?;
    let bytes = cursor.into_inner();
    debug!(bytes = bytes.len(), song = song.is_some(), "packed archive");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Dirs(PathBuf);

    impl SongPathResolver for Dirs {
        fn custom_song_path(&self, song_id: i64) -> PathBuf {
            self.0.join(format!("{song_id}.mp3"))
        }

        fn resources_dir(&self) -> PathBuf {
            self.0.join("Resources")
        }
    }

    fn raw_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn entry_names(bytes: &[u8]) -> Vec<String> {
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn test_pack_without_song() {
        let bytes = pack("data", None).unwrap();
        let mut names = entry_names(&bytes);
        names.sort();
        assert_eq!(names, vec!["level.data", "level.meta"]);

        let extracted = unpack(&bytes, None).unwrap();
        assert_eq!(extracted.level_data, "data");
    }

    #[test]
    fn test_pack_with_song_writes_manifest() {
        let song = SongEntry {
            file_name: "42.mp3".to_string(),
            bytes: b"ID3".to_vec(),
            song_id: 42,
        };
        let bytes = pack("data", Some(&song)).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let meta = read_entry(&mut archive, META_ENTRY).unwrap();
        let manifest = ArchiveManifest::parse(&meta).unwrap();
        assert_eq!(manifest.song_file(), Some("42.mp3"));
        assert!(manifest.song_is_custom());
        assert_eq!(read_entry(&mut archive, "42.mp3").unwrap(), b"ID3");
    }

    #[test]
    fn test_song_placed_only_when_requested() {
        let dir = TempDir::new().unwrap();
        let song = SongEntry {
            file_name: "42.mp3".to_string(),
            bytes: b"ID3".to_vec(),
            song_id: 42,
        };
        let bytes = pack("data", Some(&song)).unwrap();

        let extracted = unpack(&bytes, None).unwrap();
        assert_eq!(extracted.song, None);
        assert!(!dir.path().join("42.mp3").exists());

        let resolver = Dirs(dir.path().to_path_buf());
        let extracted = unpack(&bytes, Some(&resolver)).unwrap();
        let placement = extracted.song.unwrap();
        assert_eq!(placement.target, dir.path().join("42.mp3"));
        assert_eq!(fs::read(&placement.target).unwrap(), b"ID3");
    }

    #[test]
    fn test_bundled_song_goes_to_resources() {
        let dir = TempDir::new().unwrap();
        let bytes = raw_archive(&[
            ("7.mp3", &b"tune"[..]),
            (META_ENTRY, &br#"{"song-file":"7.mp3","song-is-custom":false}"#[..]),
            (DATA_ENTRY, &b"data"[..]),
        ]);
        let resolver = Dirs(dir.path().to_path_buf());
        let placement = unpack(&bytes, Some(&resolver)).unwrap().song.unwrap();
        assert_eq!(placement.target, dir.path().join("Resources").join("7.mp3"));
    }

    #[test]
    fn test_not_a_zip() {
        let err = unpack(b"plain text", None).unwrap_err();
        assert!(matches!(err, GmdError::ArchiveOpen(_)));
    }

    #[test]
    fn test_missing_entries() {
        let bytes = raw_archive(&[(DATA_ENTRY, &b"data"[..])]);
        let err = unpack(&bytes, None).unwrap_err();
        assert!(matches!(err, GmdError::ArchiveEntryMissing(ref name) if name == META_ENTRY));

        let bytes = raw_archive(&[(META_ENTRY, &b"{}"[..])]);
        let err = unpack(&bytes, None).unwrap_err();
        assert!(matches!(err, GmdError::ArchiveEntryMissing(ref name) if name == DATA_ENTRY));
    }

    #[test]
    fn test_malformed_manifest() {
        let bytes = raw_archive(&[(META_ENTRY, &b"[1, 2"[..]), (DATA_ENTRY, &b"data"[..])]);
        let err = unpack(&bytes, None).unwrap_err();
        assert!(matches!(err, GmdError::ManifestParse(_)));
    }

    #[test]
    fn test_song_named_but_absent() {
        let dir = TempDir::new().unwrap();
        let bytes = raw_archive(&[
            (META_ENTRY, &br#"{"song-file":"9.mp3","song-is-custom":true}"#[..]),
            (DATA_ENTRY, &b"data"[..]),
        ]);
        let resolver = Dirs(dir.path().to_path_buf());
        let err = unpack(&bytes, Some(&resolver)).unwrap_err();
        assert!(matches!(err, GmdError::SongRead(_)));
        assert!(!dir.path().join("9.mp3").exists());
    }

    #[test]
    fn test_non_utf8_level_data_places_no_song() {
        let dir = TempDir::new().unwrap();
        let bytes = raw_archive(&[
            ("5.mp3", &b"tune"[..]),
            (META_ENTRY, &br#"{"song-file":"5.mp3","song-is-custom":true}"#[..]),
            (DATA_ENTRY, &[0xff, 0xfe][..]),
        ]);
        let resolver = Dirs(dir.path().to_path_buf());
        let err = unpack(&bytes, Some(&resolver)).unwrap_err();
        assert!(matches!(err, GmdError::NotUtf8(name) if name == DATA_ENTRY));
        assert!(!dir.path().join("5.mp3").exists());
    }
}
