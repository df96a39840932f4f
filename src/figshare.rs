use std::fs::File;
use std::path::Path;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::error::ThingsError;

/// Bulk-archive host backend: the url's payload is one zip file, downloaded
/// as-is and handed to the normalizer afterwards.
pub trait ArchiveHostClient: Send + Sync {
    fn download_archive(&self, url: &str, destination: &Path) -> Result<(), ThingsError>;
}

#[derive(Clone)]
pub struct FigshareHttpClient {
    client: Client,
}

impl FigshareHttpClient {
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

impl ArchiveHostClient for FigshareHttpClient {
    fn download_archive(&self, url: &str, destination: &Path) -> Result<(), ThingsError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| ThingsError::Download {
                url: url.to_string(),
                message: err.to_string(),
            })?;
        let mut response = handle_status(url, response)?;
        let mut file =
            File::create(destination).map_err(|err| ThingsError::Filesystem(err.to_string()))?;
        std::io::copy(&mut response, &mut file)
            .map_err(|err| ThingsError::Filesystem(err.to_string()))?;
        Ok(())
    }
}

pub(crate) fn handle_status(
    url: &str,
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ThingsError> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(ThingsError::DownloadStatus {
        url: url.to_string(),
        status: response.status().as_u16(),
    })
}
