//! Zip archiving of extracted buckets
//!
//! The archive for `<output>/<bucket>` is written next to it as
//! `<output>/<bucket>.zip`, with entry names relative to the bucket
//! directory and file data deflated.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::constants::extraction;
use crate::errors::{ArchiveError, ArchiveResult};

/// Where the archive for `bucket` is written
pub fn archive_path(output_dir: &Path, bucket: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", bucket, extraction::ARCHIVE_EXTENSION))
}

/// Archive `<output_dir>/<bucket>` into `<output_dir>/<bucket>.zip`
pub fn archive_bucket(output_dir: &Path, bucket: &str) -> ArchiveResult<PathBuf> {
    let source = output_dir.join(bucket);
    let output = archive_path(output_dir, bucket);
    pack_directory(&source, &output)?;
    Ok(output)
}

/// Pack the contents of `source` into a new zip file at `output`
///
/// Returns the number of files written. A failed archive is removed rather
/// than left half-written.
pub fn pack_directory(source: &Path, output: &Path) -> ArchiveResult<usize> {
    if !source.is_dir() {
        return Err(ArchiveError::SourceMissing {
            path: source.to_path_buf(),
        });
    }

    let result = write_archive(source, output);
    match &result {
        Ok(files) => info!(
            "Archived {} files from {} into {}",
            files,
            source.display(),
            output.display()
        ),
        Err(_) => {
            let _ = std::fs::remove_file(output);
        }
    }
    result
}

fn write_archive(source: &Path, output: &Path) -> ArchiveResult<usize> {
    let mut zip = ZipWriter::new(BufWriter::new(File::create(output)?));
    let mut files = 0;

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let name = entry_name(source, path);

        if entry.file_type().is_dir() {
            let options =
                FileOptions::<'static, ()>::default().compression_method(CompressionMethod::Stored);
            zip.add_directory(format!("{}/", name), options)?;
        } else if entry.file_type().is_file() {
            if name.ends_with(extraction::PARTIAL_FILE_SUFFIX) {
                debug!("Leaving incomplete download {} out of archive", path.display());
                continue;
            }
            let options = FileOptions::<'static, ()>::default()
                .compression_method(CompressionMethod::Deflated);
            zip.start_file(name.as_str(), options)?;
            io::copy(&mut BufReader::new(File::open(path)?), &mut zip)?;
            files += 1;
        }
    }

    zip.finish()?.flush()?;
    Ok(files)
}

/// Archive entry name for `path`: relative to `base`, `/`-separated
fn entry_name(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
