mod file_config;

pub use file_config::{BlobConfig, FileConfig};

use crate::dataset::{BlobLocation, DataSource};
use crate::server::RequestsLoggingLevel;
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_CSV_PATH: &str = "All_Diets.csv";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub csv_path: Option<PathBuf>,
    pub blob_url: Option<String>,
    pub blob_sas_token: Option<String>,
    pub host: String,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            csv_path: None,
            blob_url: None,
            blob_sas_token: None,
            host: "127.0.0.1".to_owned(),
            port: 5000,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::Path,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_source: DataSource,
    pub host: String,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present. A data source set in
    /// the file replaces the CLI one as a whole.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let file_source = source_from_parts(
            file.csv_path.as_ref().map(PathBuf::from),
            file.blob.as_ref().map(blob_from_file).transpose()?,
            "config file",
        )?;
        let cli_source = source_from_parts(
            cli.csv_path.clone(),
            cli.blob_url
                .as_deref()
                .map(|url| BlobLocation::parse_url(url, cli.blob_sas_token.clone()))
                .transpose()?,
            "command line",
        )?;
        let data_source = file_source
            .or(cli_source)
            .unwrap_or_else(|| DataSource::File(PathBuf::from(DEFAULT_CSV_PATH)));

        let host = file.host.unwrap_or_else(|| cli.host.clone());
        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if metrics_port == port {
            bail!("metrics_port must differ from port ({})", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        Ok(Self {
            data_source,
            host,
            port,
            metrics_port,
            logging_level,
        })
    }
}

fn source_from_parts(
    csv_path: Option<PathBuf>,
    blob: Option<BlobLocation>,
    origin: &str,
) -> Result<Option<DataSource>> {
    match (csv_path, blob) {
        (Some(_), Some(_)) => bail!(
            "Only one data source can be configured in the {}: a csv path or a blob",
            origin
        ),
        (Some(path), None) => Ok(Some(DataSource::File(path))),
        (None, Some(blob)) => Ok(Some(DataSource::Blob(blob))),
        (None, None) => Ok(None),
    }
}

fn blob_from_file(blob: &BlobConfig) -> Result<BlobLocation> {
    if let Some(url) = &blob.url {
        return Ok(BlobLocation::parse_url(url, blob.sas_token.clone())?);
    }
    let field = |value: &Option<String>, name: &str| {
        value
            .clone()
            .ok_or_else(|| anyhow!("[blob] requires either url or {} in config file", name))
    };
    Ok(BlobLocation {
        endpoint: field(&blob.endpoint, "endpoint")?,
        container: field(&blob.container, "container")?,
        blob_name: field(&blob.blob_name, "blob_name")?,
        sas_token: blob.sas_token.clone(),
    })
}

/// Parses a logging level string into RequestsLoggingLevel.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_logging_level() {
        assert!(matches!(
            parse_logging_level("none"),
            Some(RequestsLoggingLevel::None)
        ));
        assert!(matches!(
            parse_logging_level("BODY"),
            Some(RequestsLoggingLevel::Body)
        ));
        assert!(parse_logging_level("verbose").is_none());
    }

    #[test]
    fn test_resolve_defaults_to_local_csv() {
        let config = AppConfig::resolve(&CliConfig::default(), None).unwrap();

        assert_eq!(
            config.data_source,
            DataSource::File(PathBuf::from("All_Diets.csv"))
        );
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 5000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Path);
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let cli = CliConfig {
            csv_path: Some(PathBuf::from("/cli/data.csv")),
            port: 3001,
            metrics_port: 9100,
            logging_level: RequestsLoggingLevel::Path,
            ..Default::default()
        };
        let file_config = FileConfig {
            port: Some(4000),
            logging_level: Some("body".to_string()),
            blob: Some(BlobConfig {
                endpoint: Some("https://acct.blob.core.windows.net".to_string()),
                container: Some("datasets".to_string()),
                blob_name: Some("All_Diets.csv".to_string()),
                sas_token: Some("sig=abc".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.logging_level, RequestsLoggingLevel::Body);
        assert_eq!(config.metrics_port, 9100);
        match config.data_source {
            DataSource::Blob(location) => {
                assert_eq!(location.container, "datasets");
                assert_eq!(location.sas_token.as_deref(), Some("sig=abc"));
            }
            other => panic!("Unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_resolve_blob_url_from_cli() {
        let cli = CliConfig {
            blob_url: Some("https://acct.blob.core.windows.net/datasets/All_Diets.csv".to_string()),
            blob_sas_token: Some("sig=abc".to_string()),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(
            config.data_source,
            DataSource::Blob(BlobLocation {
                endpoint: "https://acct.blob.core.windows.net".to_string(),
                container: "datasets".to_string(),
                blob_name: "All_Diets.csv".to_string(),
                sas_token: Some("sig=abc".to_string()),
            })
        );
    }

    #[test]
    fn test_resolve_rejects_two_sources() {
        let cli = CliConfig {
            csv_path: Some(PathBuf::from("data.csv")),
            blob_url: Some("https://acct.blob.core.windows.net/datasets/All_Diets.csv".to_string()),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli, None).unwrap_err();
        assert!(err.to_string().contains("Only one data source"));
    }

    #[test]
    fn test_resolve_incomplete_blob_table_error() {
        let file_config = FileConfig {
            blob: Some(BlobConfig {
                endpoint: Some("https://acct.blob.core.windows.net".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = AppConfig::resolve(&CliConfig::default(), Some(file_config)).unwrap_err();
        assert!(err.to_string().contains("container"));
    }

    #[test]
    fn test_resolve_same_ports_error() {
        let cli = CliConfig {
            port: 5000,
            metrics_port: 5000,
            ..Default::default()
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }
}
