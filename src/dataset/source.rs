//! Where the dataset comes from.
//!
//! Credentials for remote sources are plain values handed in by the caller;
//! nothing here reads the environment.

use super::error::{DatasetError, DatasetResult};
use super::loader::{load_table_from_bytes, load_table_from_path};
use super::models::Table;
use reqwest::StatusCode;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

const BLOB_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Location of a blob in an HTTP object store, optionally authorized with
/// a shared-access token appended as query string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobLocation {
    pub endpoint: String,
    pub container: String,
    pub blob_name: String,
    pub sas_token: Option<String>,
}

impl BlobLocation {
    /// Splits `{endpoint}/{container}/{blob_name}[?token]`. An explicit
    /// `sas_token` takes precedence over the url query.
    pub fn parse_url(url: &str, sas_token: Option<String>) -> DatasetResult<BlobLocation> {
        let invalid = |reason: &str| DatasetError::invalid_parameter("blob_url", reason);
        let parsed = reqwest::Url::parse(url).map_err(|e| invalid(&e.to_string()))?;
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();
        let [endpoint_segments @ .., container, blob_name] = segments.as_slice() else {
            return Err(invalid("expected {endpoint}/{container}/{blob}"));
        };

        let mut endpoint = format!("{}://{}", parsed.scheme(), parsed.host_str().unwrap_or(""));
        if let Some(port) = parsed.port() {
            endpoint.push_str(&format!(":{}", port));
        }
        for segment in endpoint_segments {
            endpoint.push('/');
            endpoint.push_str(segment);
        }

        Ok(BlobLocation {
            endpoint,
            container: container.to_string(),
            blob_name: blob_name.to_string(),
            sas_token: sas_token.or_else(|| parsed.query().map(str::to_owned)),
        })
    }

    pub fn url(&self) -> String {
        let base = format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.container.trim_matches('/'),
            self.blob_name.trim_start_matches('/')
        );
        match &self.sas_token {
            Some(token) if !token.is_empty() => {
                format!("{}?{}", base, token.trim_start_matches('?'))
            }
            _ => base,
        }
    }

    /// Url safe to print, without the access token.
    pub fn display_url(&self) -> String {
        BlobLocation {
            sas_token: None,
            ..self.clone()
        }
        .url()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Blob(BlobLocation),
}

impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            DataSource::File(path) => path.display().to_string(),
            DataSource::Blob(location) => location.display_url(),
        }
    }

    /// Name recorded as `source_file` in snapshots.
    pub fn source_name(&self) -> String {
        match self {
            DataSource::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            DataSource::Blob(location) => location.blob_name.clone(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DataSource::File(_) => "file",
            DataSource::Blob(_) => "blob",
        }
    }

    /// Performs a fresh read of the source and parses it.
    pub async fn load(&self) -> DatasetResult<Table> {
        let table = match self {
            DataSource::File(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || load_table_from_path(&path))
                    .await
                    .map_err(|e| DatasetError::Io(std::io::Error::other(e)))??
            }
            DataSource::Blob(location) => {
                let bytes = download_blob(location).await?;
                load_table_from_bytes(&bytes)?
            }
        };
        debug!(
            "Loaded {} rows from {} ({} dropped)",
            table.len(),
            self.describe(),
            table.report.rows_dropped
        );
        Ok(table)
    }
}

async fn download_blob(location: &BlobLocation) -> DatasetResult<Vec<u8>> {
    info!("Downloading blob {}", location.display_url());
    let client = reqwest::Client::builder()
        .timeout(BLOB_DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| DatasetError::Download(e.to_string()))?;

    let response = client
        .get(location.url())
        .send()
        .await
        .map_err(|e| DatasetError::Download(e.without_url().to_string()))?;

    match response.status() {
        StatusCode::NOT_FOUND => Err(DatasetError::NotFound(location.display_url())),
        status if !status.is_success() => Err(DatasetError::Download(format!(
            "{} responded {}",
            location.display_url(),
            status
        ))),
        _ => {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| DatasetError::Download(e.without_url().to_string()))?;
            Ok(bytes.to_vec())
        }
    }
}
