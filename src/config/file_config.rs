use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub csv_path: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,

    pub blob: Option<BlobConfig>,
}

/// `[blob]` table. Either `url`, or `endpoint` + `container` + `blob_name`.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct BlobConfig {
    pub url: Option<String>,
    pub endpoint: Option<String>,
    pub container: Option<String>,
    pub blob_name: Option<String>,
    pub sas_token: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
