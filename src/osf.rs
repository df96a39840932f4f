use std::fs::File;
use std::path::{Path, PathBuf};

use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_DISPOSITION, HeaderMap, HeaderValue, USER_AGENT};

use crate::error::ThingsError;
use crate::figshare::handle_status;

/// Single-file host backend: the payload lands directly in the entry's
/// folder, no extraction step.
pub trait DirectFileClient: Send + Sync {
    /// Downloads `url` into `destination_dir` and returns the written path.
    fn download_file(&self, url: &str, destination_dir: &Path) -> Result<PathBuf, ThingsError>;
}

#[derive(Clone)]
pub struct OsfHttpClient {
    client: Client,
}

impl OsfHttpClient {
    pub fn new() -> Result<Self, ThingsError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("things-dl/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ThingsError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|err| ThingsError::Http(err.to_string()))?;
        Ok(Self { client })
    }
}

impl DirectFileClient for OsfHttpClient {
    fn download_file(&self, url: &str, destination_dir: &Path) -> Result<PathBuf, ThingsError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| ThingsError::Download {
                url: url.to_string(),
                message: err.to_string(),
            })?;
        let mut response = handle_status(url, response)?;

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_content_disposition)
            .unwrap_or_else(|| filename_from_url(url));

        let destination = destination_dir.join(filename);
        let mut file =
            File::create(&destination).map_err(|err| ThingsError::Filesystem(err.to_string()))?;
        std::io::copy(&mut response, &mut file)
            .map_err(|err| ThingsError::Filesystem(err.to_string()))?;
        Ok(destination)
    }
}

/// Pulls the filename out of a `Content-Disposition` header value; handles
/// both quoted and bare forms.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let re = Regex::new(r#"filename\s*=\s*"?([^";]+)"?"#).unwrap();
    let name = re.captures(header)?.get(1)?.as_str().trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Fallback output name: the url's last path segment.
pub fn filename_from_url(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string()
}
