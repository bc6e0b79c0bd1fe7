//! Handing encoded outputs to wherever they are saved.
//!
//! The host picks one [`ExportSink`] at startup; the transformation code
//! never looks at it. Before export, several outputs can be bundled into a
//! single `Sprites.zip` archive.
//!
//! # Available Sinks
//!
//! - [`DirectorySink`] - writes files into a directory on the local filesystem
//! - [`MemorySink`] - keeps the files in memory for the host to consume

use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{SpriteError, SpriteResult};
use crate::raster::EncodedImage;

/// File name of a bundled archive.
pub const BUNDLE_NAME: &str = "Sprites.zip";

/// Folder inside the archive that holds every bundled file.
pub const BUNDLE_FOLDER: &str = "Sprites";

/// Deflate level used for bundles.
const BUNDLE_COMPRESSION_LEVEL: i64 = 7;

/// Name for an output that has none: `Sprite 00.png`, `Sprite 01.png`, ...
pub fn fallback_name(index: usize) -> String {
    format!("Sprite {:02}.png", index)
}

/// `"name (n).ext"` for the `n`th collision of `name`.
pub fn numbered_name(name: &str, n: usize) -> String {
    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!(
            "{} ({}).{}",
            stem.to_string_lossy(),
            n,
            ext.to_string_lossy()
        ),
        _ => format!("{} ({})", name, n),
    }
}

fn display_name(file: &EncodedImage, index: usize) -> String {
    if file.name.is_empty() {
        fallback_name(index)
    } else {
        file.name.clone()
    }
}

/// Zip `files` into one `Sprites.zip`, each under the `Sprites/` folder.
///
/// Duplicate names get a ` (n)` suffix so no entry is lost.
///
/// # Errors
///
/// Returns [`SpriteError::Archive`] if the archive cannot be written.
pub fn bundle_files(files: &[EncodedImage]) -> SpriteResult<EncodedImage> {
    let archive_err = |e: &dyn std::fmt::Display| SpriteError::Archive(e.to_string());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(BUNDLE_COMPRESSION_LEVEL));

    writer
        .add_directory(BUNDLE_FOLDER, options)
        .map_err(|e| archive_err(&e))?;

    let mut taken = HashSet::new();
    for (index, file) in files.iter().enumerate() {
        let base = display_name(file, index);
        let mut name = base.clone();
        let mut n = 1;
        while !taken.insert(name.clone()) {
            name = numbered_name(&base, n);
            n += 1;
        }

        writer
            .start_file(format!("{}/{}", BUNDLE_FOLDER, name), options)
            .map_err(|e| archive_err(&e))?;
        writer.write_all(&file.bytes).map_err(|e| archive_err(&e))?;
        debug!(entry = %name, bytes = file.bytes.len(), "Bundled file");
    }

    let bytes = writer.finish().map_err(|e| archive_err(&e))?.into_inner();
    info!(files = files.len(), bytes = bytes.len(), "Bundled outputs into {}", BUNDLE_NAME);

    Ok(EncodedImage {
        name: BUNDLE_NAME.to_string(),
        path: files.first().and_then(|f| f.path.clone()),
        width: 0,
        height: 0,
        mime_type: "application/zip",
        bytes,
    })
}

/// Bundle `files` when asked to and there is more than one; otherwise
/// return them unchanged.
pub fn prepare_for_export(files: Vec<EncodedImage>, bundle: bool) -> SpriteResult<Vec<EncodedImage>> {
    if bundle && files.len() > 1 {
        Ok(vec![bundle_files(&files)?])
    } else {
        Ok(files)
    }
}

/// Where exported files ended up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// One entry per exported file, in export order.
    pub locations: Vec<PathBuf>,
}

impl ExportReport {
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Destination for encoded outputs.
///
/// Implementors handle everything platform-specific about saving: choosing
/// a folder, avoiding overwrites, writing bytes.
pub trait ExportSink {
    /// Save every file. Stops at the first failure.
    fn export(&mut self, files: Vec<EncodedImage>) -> SpriteResult<ExportReport>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Bundle if requested, then export through `sink`.
pub fn save_files(
    sink: &mut dyn ExportSink,
    files: Vec<EncodedImage>,
    bundle: bool,
) -> SpriteResult<ExportReport> {
    let files = prepare_for_export(files, bundle)?;
    debug!(sink = sink.name(), files = files.len(), "Exporting");
    sink.export(files)
}

/// Writes files into one directory, never overwriting existing files.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    directory: PathBuf,
}

impl DirectorySink {
    /// Create a sink writing into `directory`. The directory is created on
    /// first export if missing.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// First path in the directory that does not exist yet.
    fn unique_path(&self, name: &str) -> PathBuf {
        let mut candidate = self.directory.join(name);
        let mut n = 1;
        while candidate.exists() {
            candidate = self.directory.join(numbered_name(name, n));
            n += 1;
        }
        if n > 1 {
            warn!(
                requested = %name,
                path = %candidate.display(),
                "File exists, writing under a new name"
            );
        }
        candidate
    }
}

impl ExportSink for DirectorySink {
    fn export(&mut self, files: Vec<EncodedImage>) -> SpriteResult<ExportReport> {
        fs::create_dir_all(&self.directory).map_err(|source| SpriteError::Io {
            path: self.directory.clone(),
            source,
        })?;

        let mut report = ExportReport::default();
        for (index, file) in files.iter().enumerate() {
            let path = self.unique_path(&display_name(file, index));
            fs::write(&path, &file.bytes).map_err(|source| SpriteError::Io {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), bytes = file.bytes.len(), "Wrote file");
            report.locations.push(path);
        }

        info!(
            directory = %self.directory.display(),
            files = report.len(),
            "Exported files"
        );
        Ok(report)
    }

    fn name(&self) -> &str {
        "directory"
    }
}

/// Keeps exported files in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: Vec<EncodedImage>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files exported so far.
    pub fn files(&self) -> &[EncodedImage] {
        &self.files
    }

    /// Take the exported files, leaving the sink empty.
    pub fn take(&mut self) -> Vec<EncodedImage> {
        std::mem::take(&mut self.files)
    }
}

impl ExportSink for MemorySink {
    fn export(&mut self, files: Vec<EncodedImage>) -> SpriteResult<ExportReport> {
        let start = self.files.len();
        let locations = files
            .iter()
            .enumerate()
            .map(|(index, file)| PathBuf::from(display_name(file, start + index)))
            .collect();
        self.files.extend(files);
        Ok(ExportReport { locations })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn file(name: &str, bytes: &[u8]) -> EncodedImage {
        EncodedImage {
            name: name.to_string(),
            path: None,
            width: 1,
            height: 1,
            mime_type: "image/png",
            bytes: bytes.to_vec(),
        }
    }

    fn entry_names(bundle: &EncodedImage) -> Vec<String> {
        let archive = zip::ZipArchive::new(Cursor::new(bundle.bytes.clone())).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    #[test]
    fn test_fallback_name_is_zero_padded() {
        assert_eq!(fallback_name(0), "Sprite 00.png");
        assert_eq!(fallback_name(7), "Sprite 07.png");
        assert_eq!(fallback_name(123), "Sprite 123.png");
    }

    #[test]
    fn test_numbered_name() {
        assert_eq!(numbered_name("00-hero.png", 1), "00-hero (1).png");
        assert_eq!(numbered_name("Sprite Sheet.png", 2), "Sprite Sheet (2).png");
        assert_eq!(numbered_name("README", 3), "README (3)");
    }

    #[test]
    fn test_bundle_puts_files_in_sprites_folder() {
        let files = vec![file("00-a.png", b"one"), file("01-a.png", b"two")];
        let bundle = bundle_files(&files).unwrap();
        assert_eq!(bundle.name, "Sprites.zip");
        assert_eq!(bundle.mime_type, "application/zip");

        let mut names = entry_names(&bundle);
        names.sort();
        assert_eq!(names, ["Sprites/", "Sprites/00-a.png", "Sprites/01-a.png"]);

        let mut archive = zip::ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
        let mut contents = String::new();
        archive
            .by_name("Sprites/01-a.png")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "two");
    }

    #[test]
    fn test_bundle_names_unnamed_and_duplicate_files() {
        let files = vec![file("", b"x"), file("a.png", b"y"), file("a.png", b"z")];
        let bundle = bundle_files(&files).unwrap();

        let mut names = entry_names(&bundle);
        names.sort();
        assert_eq!(
            names,
            ["Sprites/", "Sprites/Sprite 00.png", "Sprites/a (1).png", "Sprites/a.png"]
        );
    }

    #[test]
    fn test_prepare_only_bundles_multiple_files() {
        let single = prepare_for_export(vec![file("a.png", b"1")], true).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].name, "a.png");

        let unbundled =
            prepare_for_export(vec![file("a.png", b"1"), file("b.png", b"2")], false).unwrap();
        assert_eq!(unbundled.len(), 2);

        let bundled =
            prepare_for_export(vec![file("a.png", b"1"), file("b.png", b"2")], true).unwrap();
        assert_eq!(bundled.len(), 1);
        assert_eq!(bundled[0].name, BUNDLE_NAME);
    }

    #[test]
    fn test_directory_sink_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out");
        let mut sink = DirectorySink::new(&target);

        let report = sink
            .export(vec![file("a.png", b"1"), file("b.png", b"2")])
            .unwrap();
        assert_eq!(report.len(), 2);
        assert_eq!(fs::read(target.join("a.png")).unwrap(), b"1");
        assert_eq!(fs::read(target.join("b.png")).unwrap(), b"2");
    }

    #[test]
    fn test_directory_sink_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());

        sink.export(vec![file("a.png", b"first")]).unwrap();
        let report = sink.export(vec![file("a.png", b"second")]).unwrap();

        assert_eq!(report.locations, [dir.path().join("a (1).png")]);
        assert_eq!(fs::read(dir.path().join("a.png")).unwrap(), b"first");
        assert_eq!(fs::read(dir.path().join("a (1).png")).unwrap(), b"second");
    }

    #[test]
    fn test_memory_sink_collects() {
        let mut sink = MemorySink::new();
        let report = save_files(&mut sink, vec![file("", b"1"), file("b.png", b"2")], false).unwrap();

        assert_eq!(
            report.locations,
            [PathBuf::from("Sprite 00.png"), PathBuf::from("b.png")]
        );
        assert_eq!(sink.files().len(), 2);
        assert_eq!(sink.take().len(), 2);
        assert!(sink.files().is_empty());
    }

    #[test]
    fn test_save_files_bundles_through_sink() {
        let mut sink = MemorySink::new();
        let report = save_files(&mut sink, vec![file("a.png", b"1"), file("b.png", b"2")], true).unwrap();
        assert_eq!(report.locations, [PathBuf::from("Sprites.zip")]);
        assert_eq!(sink.files()[0].mime_type, "application/zip");
    }
}
