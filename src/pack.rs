use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::ThingsError;

/// Walks `source_dir` and writes every file into a deflate-compressed zip
/// at `output_zip`, entry names relative to `source_dir`. A missing or
/// empty source directory fails before any output file is created.
pub fn pack(source_dir: &Path, output_zip: &Path) -> Result<(), ThingsError> {
    if !source_dir.is_dir() {
        return Err(ThingsError::Packaging(format!(
            "source directory does not exist: {}",
            source_dir.display()
        )));
    }
    let files = walk_files(source_dir)?;
    if files.is_empty() {
        return Err(ThingsError::Packaging(format!(
            "source directory is empty: {}",
            source_dir.display()
        )));
    }

    let output =
        fs::File::create(output_zip).map_err(|err| ThingsError::Packaging(err.to_string()))?;
    let mut writer = ZipWriter::new(output);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let relative = path
            .strip_prefix(source_dir)
            .map_err(|err| ThingsError::Packaging(err.to_string()))?;
        let name = archive_name(relative)?;
        writer
            .start_file(name, options)
            .map_err(|err| ThingsError::Packaging(err.to_string()))?;
        let mut input =
            fs::File::open(&path).map_err(|err| ThingsError::Packaging(err.to_string()))?;
        io::copy(&mut input, &mut writer)
            .map_err(|err| ThingsError::Packaging(err.to_string()))?;
    }

    writer
        .finish()
        .map_err(|err| ThingsError::Packaging(err.to_string()))?;
    Ok(())
}

fn archive_name(relative: &Path) -> Result<String, ThingsError> {
    let mut parts = Vec::new();
    for component in relative.components() {
        let part = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| ThingsError::Packaging("non-utf8 file path in tree".to_string()))?;
        parts.push(part);
    }
    Ok(parts.join("/"))
}

fn walk_files(root: &Path) -> Result<Vec<PathBuf>, ThingsError> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(path) = stack.pop() {
        let entries =
            fs::read_dir(&path).map_err(|err| ThingsError::Packaging(err.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|err| ThingsError::Packaging(err.to_string()))?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}
