use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::core::collector::collect_files;
use crate::utils::{md5_hex, slugify};

pub const EXT_ZIP: &str = ".zip";

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Composes the archive file name from the submission metadata.
///
/// The parts are the timestamp, the slugified student name, the lowercased
/// Neptun code and the slugified task name, joined with underscores:
/// `20231130-123456_john-doe_abc123_php-assignment.zip`. Collisions within
/// the same second are acceptable for a single-shot interactive tool.
pub fn archive_file_name(
    name: &str,
    neptun: &str,
    task: &str,
    now: &DateTime<Local>,
) -> String {
    let parts = [
        now.format(TIMESTAMP_FORMAT).to_string(),
        slugify(name),
        neptun.to_lowercase(),
        slugify(task),
    ];

    format!("{}{}", parts.join("_"), EXT_ZIP)
}

/// An archive built in memory, together with the list of files it holds.
#[derive(Debug)]
pub struct BuiltArchive {
    pub files: Vec<String>,
    pub bytes: Vec<u8>,
}

/// Collects every file under `dir` (honoring the `.zipignore` chain plus
/// `default_patterns`) and compresses them into an in-memory ZIP archive.
/// Entry names are the collected forward-slash relative paths.
pub fn build_archive(dir: &Path, default_patterns: &[String]) -> Result<BuiltArchive> {
    let files = collect_files(dir, default_patterns)?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for relative in &files {
        let content = fs::read(dir.join(relative))
            .with_context(|| format!("Failed to read {relative}"))?;

        writer
            .start_file(relative.as_str(), options)
            .with_context(|| format!("Failed to start archive entry {relative}"))?;
        writer
            .write_all(&content)
            .with_context(|| format!("Failed to write archive entry {relative}"))?;
    }

    let cursor = writer.finish().context("Failed to finalize the archive")?;

    Ok(BuiltArchive {
        files,
        bytes: cursor.into_inner(),
    })
}

/// Verifies a written archive against the source directory.
///
/// Every entry is decompressed and its MD5 checksum compared with the
/// checksum of the corresponding file on disk. A missing source file or a
/// checksum mismatch is a fatal error.
pub fn verify_archive(zip_path: &Path, source_dir: &Path) -> Result<()> {
    let file = File::open(zip_path)
        .with_context(|| format!("Failed to open archive {}", zip_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Failed to read archive {}", zip_path.display()))?;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .with_context(|| format!("Failed to read archive entry #{index}"))?;

        if entry.is_dir() {
            continue;
        }

        let entry_name = entry.name().to_string();
        let mut packed = Vec::new();
        entry
            .read_to_end(&mut packed)
            .with_context(|| format!("Failed to decompress archive entry {entry_name}"))?;

        let source = fs::read(source_dir.join(&entry_name))
            .with_context(|| format!("Missing source file for archive entry {entry_name}"))?;

        if md5_hex(&packed) != md5_hex(&source) {
            anyhow::bail!("Checksum mismatch for archive entry {entry_name}");
        }
    }

    Ok(())
}
