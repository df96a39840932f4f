use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::warn;

use crate::catalog::{CatalogEntry, SourceKind};
use crate::error::ThingsError;
use crate::figshare::ArchiveHostClient;
use crate::manifest;
use crate::normalize;
use crate::openneuro::{ExternalToolClient, dataset_id_from_url};
use crate::osf::DirectFileClient;
use crate::pack;
use crate::selection::ResolvedSelection;

pub const FINAL_ARCHIVE_NAME: &str = "things-datasets.zip";

/// The two scratch directories owned by one pipeline run. Both are removed
/// unconditionally once packaging has been attempted.
#[derive(Debug, Clone)]
pub struct WorkingTree {
    downloads: Utf8PathBuf,
    extracted: Utf8PathBuf,
}

impl WorkingTree {
    pub fn create(output_dir: &Utf8Path) -> Result<Self, ThingsError> {
        let downloads = output_dir.join("downloads");
        let extracted = output_dir.join("extracted");
        fs::create_dir_all(downloads.as_std_path())
            .map_err(|err| ThingsError::Filesystem(err.to_string()))?;
        fs::create_dir_all(extracted.as_std_path())
            .map_err(|err| ThingsError::Filesystem(err.to_string()))?;
        Ok(Self {
            downloads,
            extracted,
        })
    }

    pub fn downloads(&self) -> &Utf8Path {
        &self.downloads
    }

    pub fn extracted(&self) -> &Utf8Path {
        &self.extracted
    }

    pub fn archive_download_path(&self, folder_name: &str) -> Utf8PathBuf {
        self.downloads.join(format!("{folder_name}.zip"))
    }

    pub fn entry_dir(&self, folder_name: &str) -> Utf8PathBuf {
        self.extracted.join(folder_name)
    }

    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.extracted.join(manifest::MANIFEST_NAME)
    }

    pub fn cleanup(&self) -> Result<(), ThingsError> {
        for dir in [&self.downloads, &self.extracted] {
            if dir.as_std_path().exists() {
                fs::remove_dir_all(dir.as_std_path())
                    .map_err(|err| ThingsError::Filesystem(err.to_string()))?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchItemResult {
    pub dataset: String,
    pub sub_dataset: String,
    pub source: String,
    pub action: String,
    pub path: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub archive_path: Option<String>,
    pub items: Vec<FetchItemResult>,
    pub finished_at: String,
}

/// The acquisition-and-packaging pipeline: per-entry fetch dispatch,
/// normalization, manifest, final archive, cleanup. Entries are processed
/// strictly in selection order; a failed entry is logged and skipped, and
/// the run continues with the remaining ones.
#[derive(Clone)]
pub struct Pipeline<A: ArchiveHostClient, D: DirectFileClient, X: ExternalToolClient> {
    archive_host: A,
    direct_file: D,
    external_tool: X,
}

impl<A: ArchiveHostClient, D: DirectFileClient, X: ExternalToolClient> Pipeline<A, D, X> {
    pub fn new(archive_host: A, direct_file: D, external_tool: X) -> Self {
        Self {
            archive_host,
            direct_file,
            external_tool,
        }
    }

    pub fn run(
        &self,
        selection: &ResolvedSelection,
        descriptions: &HashMap<String, String>,
        output_dir: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<RunResult, ThingsError> {
        if selection.is_empty() {
            return Ok(RunResult {
                archive_path: None,
                items: Vec::new(),
                finished_at: iso_timestamp(),
            });
        }

        fs::create_dir_all(output_dir.as_std_path())
            .map_err(|err| ThingsError::Filesystem(err.to_string()))?;
        let tree = WorkingTree::create(output_dir)?;

        let mut items = Vec::new();
        for entry in selection {
            sink.event(ProgressEvent {
                message: format!(
                    "phase=Fetch; {} / {} ({})",
                    entry.group_name,
                    entry.sub_name,
                    entry.kind.as_str()
                ),
                elapsed: None,
            });
            let start = std::time::Instant::now();
            match self.fetch_entry(entry, &tree, sink) {
                Ok(path) => {
                    sink.event(ProgressEvent {
                        message: format!("phase=Fetch; done {}", entry.folder_name),
                        elapsed: Some(start.elapsed()),
                    });
                    items.push(FetchItemResult {
                        dataset: entry.group_name.clone(),
                        sub_dataset: entry.sub_name.clone(),
                        source: entry.kind.as_str().to_string(),
                        action: "fetched".to_string(),
                        path: Some(path.to_string()),
                        error: None,
                    });
                }
                Err(err) => {
                    warn!(
                        "fetch failed for {} ({}): {err}",
                        entry.folder_name, entry.download_url
                    );
                    sink.event(ProgressEvent {
                        message: format!("phase=Fetch; failed {}: {err}", entry.folder_name),
                        elapsed: Some(start.elapsed()),
                    });
                    items.push(FetchItemResult {
                        dataset: entry.group_name.clone(),
                        sub_dataset: entry.sub_name.clone(),
                        source: entry.kind.as_str().to_string(),
                        action: "failed".to_string(),
                        path: None,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        let packed = self.package(selection, descriptions, &items, &tree, output_dir, sink);
        let cleanup = tree.cleanup();

        let archive_path = packed?;
        cleanup?;

        Ok(RunResult {
            archive_path: Some(archive_path.to_string()),
            items,
            finished_at: iso_timestamp(),
        })
    }

    fn package(
        &self,
        selection: &ResolvedSelection,
        descriptions: &HashMap<String, String>,
        items: &[FetchItemResult],
        tree: &WorkingTree,
        output_dir: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<Utf8PathBuf, ThingsError> {
        let fetched = items.iter().filter(|item| item.action == "fetched").count();
        if fetched == 0 {
            return Err(ThingsError::Packaging(
                "no datasets were fetched; nothing to package".to_string(),
            ));
        }

        sink.event(ProgressEvent {
            message: "phase=Manifest; writing README.txt".to_string(),
            elapsed: None,
        });
        manifest::write(selection, descriptions, tree.manifest_path().as_std_path())?;

        let archive_path = output_dir.join(FINAL_ARCHIVE_NAME);
        sink.event(ProgressEvent {
            message: format!("phase=Package; writing {archive_path}"),
            elapsed: None,
        });
        pack::pack(tree.extracted().as_std_path(), archive_path.as_std_path())?;
        Ok(archive_path)
    }

    fn fetch_entry(
        &self,
        entry: &CatalogEntry,
        tree: &WorkingTree,
        sink: &dyn ProgressSink,
    ) -> Result<Utf8PathBuf, ThingsError> {
        match entry.kind {
            SourceKind::ArchiveHost => {
                let zip_path = tree.archive_download_path(&entry.folder_name);
                self.archive_host
                    .download_archive(&entry.download_url, zip_path.as_std_path())?;
                sink.event(ProgressEvent {
                    message: format!("phase=Extract; {}", entry.folder_name),
                    elapsed: None,
                });
                normalize::normalize(
                    zip_path.as_std_path(),
                    tree.extracted().as_std_path(),
                    &entry.folder_name,
                )?;
                Ok(tree.entry_dir(&entry.folder_name))
            }
            SourceKind::DirectFile => {
                let dir = tree.entry_dir(&entry.folder_name);
                fs::create_dir_all(dir.as_std_path())
                    .map_err(|err| ThingsError::Filesystem(err.to_string()))?;
                self.direct_file
                    .download_file(&entry.download_url, dir.as_std_path())?;
                Ok(dir)
            }
            SourceKind::ExternalTool => {
                let dataset_id = dataset_id_from_url(&entry.download_url);
                let dir = tree.entry_dir(&entry.folder_name);
                fs::create_dir_all(dir.as_std_path())
                    .map_err(|err| ThingsError::Filesystem(err.to_string()))?;
                self.external_tool
                    .sync_dataset(dataset_id, &entry.include_files, dir.as_std_path())?;
                Ok(dir)
            }
        }
    }
}

fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
