use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use crate::error::ThingsError;

pub const CATALOG_FILE: &str = "datasets.csv";
pub const DESCRIPTIONS_FILE: &str = "dataset_descriptions.csv";

const MULTI_VALUE_DELIMITER: &str = "; ";

/// Retrieval strategy for one catalog entry, resolved once at load time
/// from the download url. Markers are checked in fixed priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    ArchiveHost,
    DirectFile,
    ExternalTool,
}

impl SourceKind {
    pub fn from_url(url: &str) -> Result<Self, ThingsError> {
        if url.contains("figshare") {
            Ok(SourceKind::ArchiveHost)
        } else if url.contains("osf") {
            Ok(SourceKind::DirectFile)
        } else if url.contains("openneuro") {
            Ok(SourceKind::ExternalTool)
        } else {
            Err(ThingsError::UnknownHost(url.to_string()))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::ArchiveHost => "archive-host",
            SourceKind::DirectFile => "direct-file",
            SourceKind::ExternalTool => "external-tool",
        }
    }
}

/// One fetchable dataset unit. Immutable after load; `download_url` is
/// unique within the catalog.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub group_name: String,
    pub sub_name: String,
    pub description: String,
    pub files: Vec<String>,
    pub download_url: String,
    pub size: String,
    pub folder_name: String,
    pub include_files: Vec<String>,
    pub code: String,
    pub kind: SourceKind,
}

#[derive(Debug, Clone)]
pub struct CatalogGroup {
    pub name: String,
    pub entries: Vec<CatalogEntry>,
}

/// Dataset groups in catalog-file row order; sub-entries keep row order
/// within their group.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    groups: Vec<CatalogGroup>,
}

impl Catalog {
    pub fn groups(&self) -> &[CatalogGroup] {
        &self.groups
    }

    /// Looks up a sub-entry by 1-based group and sub indices, the numbering
    /// the interactive listing shows.
    pub fn entry(&self, group_index: usize, sub_index: usize) -> Option<&CatalogEntry> {
        let group = self.groups.get(group_index.checked_sub(1)?)?;
        group.entries.get(sub_index.checked_sub(1)?)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct DatasetRow {
    name: String,
    #[serde(rename = "sub-dataset name")]
    sub_dataset_name: String,
    description: String,
    files: String,
    download_url: String,
    size: String,
    include_files: String,
    #[serde(default)]
    code: String,
}

#[derive(Debug, Deserialize)]
struct DescriptionRow {
    name: String,
    name_description: String,
}

/// Loads the dataset catalog and the group-level descriptions from an
/// explicitly configured directory.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    root: Utf8PathBuf,
}

impl CatalogStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn catalog_path(&self) -> Utf8PathBuf {
        self.root.join(CATALOG_FILE)
    }

    pub fn descriptions_path(&self) -> Utf8PathBuf {
        self.root.join(DESCRIPTIONS_FILE)
    }

    pub fn load(&self) -> Result<Catalog, ThingsError> {
        let path = self.catalog_path();
        let mut reader = open_csv(&path)?;

        let mut groups: Vec<CatalogGroup> = Vec::new();
        for row in reader.deserialize() {
            let row: DatasetRow =
                row.map_err(|err| ThingsError::CatalogParse(err.to_string()))?;
            let entry = resolve_row(row)?;
            match groups
                .iter_mut()
                .find(|group| group.name == entry.group_name)
            {
                Some(group) => group.entries.push(entry),
                None => groups.push(CatalogGroup {
                    name: entry.group_name.clone(),
                    entries: vec![entry],
                }),
            }
        }

        Ok(Catalog { groups })
    }

    pub fn load_descriptions(&self) -> Result<HashMap<String, String>, ThingsError> {
        let path = self.descriptions_path();
        let mut reader = open_csv(&path)?;

        let mut descriptions = HashMap::new();
        for row in reader.deserialize() {
            let row: DescriptionRow =
                row.map_err(|err| ThingsError::CatalogParse(err.to_string()))?;
            descriptions.insert(row.name, row.name_description);
        }
        Ok(descriptions)
    }
}

fn open_csv(path: &Utf8Path) -> Result<csv::Reader<std::fs::File>, ThingsError> {
    csv::Reader::from_path(path.as_std_path())
        .map_err(|_| ThingsError::CatalogRead(path.as_std_path().to_path_buf()))
}

fn resolve_row(row: DatasetRow) -> Result<CatalogEntry, ThingsError> {
    let kind = SourceKind::from_url(&row.download_url)?;
    let folder_name = derive_folder_name(&row.name, &row.sub_dataset_name);
    Ok(CatalogEntry {
        group_name: row.name,
        sub_name: row.sub_dataset_name,
        description: row.description,
        files: split_multi(&row.files),
        download_url: row.download_url,
        size: row.size,
        folder_name,
        include_files: split_multi(&row.include_files),
        code: row.code,
        kind,
    })
}

pub fn derive_folder_name(group_name: &str, sub_name: &str) -> String {
    format!("{}_{}", group_name, sub_name.replace(' ', "_"))
}

fn split_multi(value: &str) -> Vec<String> {
    value
        .split(MULTI_VALUE_DELIMITER)
        .filter(|part| !part.is_empty())
        .map(|part| part.to_string())
        .collect()
}
