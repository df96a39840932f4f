use std::fs;
use std::path::Path;

use crate::error::ThingsError;
use crate::fs_util;

/// Extracts a downloaded archive into a scratch directory under
/// `extract_root`, then moves its single top-level directory to
/// `extract_root/<target_folder_name>`. An archive whose root does not hold
/// exactly one directory is rejected. Any previous occupant of the target
/// folder is replaced.
pub fn normalize(
    archive_path: &Path,
    extract_root: &Path,
    target_folder_name: &str,
) -> Result<(), ThingsError> {
    fs::create_dir_all(extract_root).map_err(|err| ThingsError::Filesystem(err.to_string()))?;
    let scratch = tempfile::Builder::new()
        .prefix("things-extract")
        .tempdir_in(extract_root)
        .map_err(|err| ThingsError::Filesystem(err.to_string()))?;

    fs_util::validate_zip(archive_path)?;
    fs_util::extract_zip(archive_path, scratch.path())?;

    let top_level = single_top_level_dir(scratch.path())?;
    let target = extract_root.join(target_folder_name);
    if target.exists() {
        fs::remove_dir_all(&target).map_err(|err| ThingsError::Filesystem(err.to_string()))?;
    }
    fs::rename(&top_level, &target).map_err(|err| ThingsError::Filesystem(err.to_string()))?;

    // scratch is removed when the TempDir guard drops
    Ok(())
}

fn single_top_level_dir(root: &Path) -> Result<std::path::PathBuf, ThingsError> {
    let mut entries = Vec::new();
    let read = fs::read_dir(root).map_err(|err| ThingsError::Filesystem(err.to_string()))?;
    for entry in read {
        let entry = entry.map_err(|err| ThingsError::Filesystem(err.to_string()))?;
        entries.push(entry.path());
    }

    match entries.as_slice() {
        [only] if only.is_dir() => Ok(only.clone()),
        [only] => Err(ThingsError::Extraction(format!(
            "archive root entry {} is not a directory",
            only.display()
        ))),
        [] => Err(ThingsError::Extraction(
            "archive is empty".to_string(),
        )),
        entries => Err(ThingsError::Extraction(format!(
            "expected exactly one top-level directory, found {} entries",
            entries.len()
        ))),
    }
}
