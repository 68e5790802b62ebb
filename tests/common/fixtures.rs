//! Test fixture creation for the dataset file

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Writes `contents` as All_Diets.csv inside a fresh temporary directory.
/// Returns (temp_dir, csv_path)
pub fn create_dataset_file(contents: &str) -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let csv_path = dir.path().join("All_Diets.csv");
    fs::write(&csv_path, contents)?;
    Ok((dir, csv_path))
}
