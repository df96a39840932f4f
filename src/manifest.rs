use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::ThingsError;
use crate::selection::ResolvedSelection;

pub const MANIFEST_NAME: &str = "README.txt";

/// Writes the human-readable description of everything that was selected,
/// one fixed-format block per entry in selection order. Overwrites any
/// existing file at `path`.
pub fn write(
    selection: &ResolvedSelection,
    descriptions: &HashMap<String, String>,
    path: &Path,
) -> Result<(), ThingsError> {
    let content = render(selection, descriptions);
    fs::write(path, content).map_err(|err| ThingsError::Filesystem(err.to_string()))
}

pub fn render(selection: &ResolvedSelection, descriptions: &HashMap<String, String>) -> String {
    let mut out = String::new();
    for entry in selection {
        let _ = writeln!(out, "Dataset: {}", entry.group_name);
        if let Some(group_description) = descriptions.get(&entry.group_name) {
            let _ = writeln!(out, "Group Description: {group_description}");
        }
        let _ = writeln!(out, "Sub-Dataset: {}", entry.sub_name);
        let _ = writeln!(out, "Description: {}", entry.description);
        let _ = writeln!(out, "Size: {}", entry.size);
        let _ = writeln!(out, "Download URL: {}", entry.download_url);
        let _ = writeln!(out, "Files: {}", entry.files.join(", "));
        let _ = writeln!(out, "Code: {}", entry.code);
        let _ = writeln!(out);
    }
    out
}
