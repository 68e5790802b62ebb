//! Persisted per-diet averages, used by the offline path when the recipe
//! table is unavailable.

use super::aggregate::summarize;
use super::error::{DatasetError, DatasetResult};
use super::models::{DietMacros, Table};
use super::source::DataSource;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Only `average_macros` is required when reading; the metadata fields
/// default when absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// ISO 8601 timestamp of when the snapshot was computed.
    pub processing_timestamp: String,
    pub source_file: String,
    pub total_records_processed: usize,
    pub diet_types_analyzed: Vec<String>,
    average_macros: Vec<DietMacros>,
}

impl Snapshot {
    pub fn from_table(table: &Table, source_file: &str) -> Snapshot {
        let average_macros: Vec<DietMacros> =
            summarize(table).iter().map(|s| s.macros()).collect();
        Snapshot {
            processing_timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            source_file: source_file.to_owned(),
            total_records_processed: table.len(),
            diet_types_analyzed: average_macros.iter().map(|m| m.diet_type.clone()).collect(),
            average_macros,
        }
    }

    pub fn average_macros(&self) -> &[DietMacros] {
        &self.average_macros
    }

    pub fn write(&self, path: &Path) -> DatasetResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| DatasetError::Snapshot(e.to_string()))?;
        std::fs::write(path, json)?;
        info!("Wrote snapshot to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> DatasetResult<Snapshot> {
        if !path.is_file() {
            return Err(DatasetError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)
            .map_err(|e| DatasetError::Snapshot(e.to_string()))?;
        if snapshot.average_macros.is_empty() {
            return Err(DatasetError::Snapshot(format!(
                "average_macros not present in {}",
                path.display()
            )));
        }
        Ok(snapshot)
    }
}

/// What the offline path works on: the full recipe table, or only the
/// per-diet averages of a snapshot when the table is missing.
#[derive(Debug)]
pub enum AnalysisInput {
    Recipes(Table),
    Averages(Snapshot),
}

/// Loads the table at `csv`, falling back to the snapshot at `snapshot_path`
/// only when the table does not exist. Any other table failure is returned
/// as is, and so is a missing or unusable snapshot.
pub async fn load_with_fallback(csv: &Path, snapshot_path: &Path) -> DatasetResult<AnalysisInput> {
    match DataSource::File(csv.to_path_buf()).load().await {
        Ok(table) => Ok(AnalysisInput::Recipes(table)),
        Err(DatasetError::NotFound(what)) => {
            info!(
                "{} not found, reading averages from {}",
                what,
                snapshot_path.display()
            );
            Snapshot::load(snapshot_path).map(AnalysisInput::Averages)
        }
        Err(e) => Err(e),
    }
}
