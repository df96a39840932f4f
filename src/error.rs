use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ThingsError {
    #[error("failed to read catalog file at {0}")]
    CatalogRead(PathBuf),

    #[error("failed to parse catalog: {0}")]
    CatalogParse(String),

    #[error("unrecognized download host: {0}")]
    UnknownHost(String),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("download failed for {url}: {message}")]
    Download { url: String, message: String },

    #[error("download of {url} returned status {status}")]
    DownloadStatus { url: String, status: u16 },

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("dataset sync tool failed: {0}")]
    ExternalTool(String),

    #[error("required tool not found: {0}")]
    MissingTool(String),

    #[error("packaging failed: {0}")]
    Packaging(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
