//! One-JSON-file-per-record persistence shared by the file repositories.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub fn record_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.json"))
}

/// Write `record` to `<dir>/<id>.json` via temp file + rename.
pub fn write_record<T: Serialize>(dir: &Path, id: &str, record: &T) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create records dir: {}", dir.display()))?;

    let path = record_path(dir, id);
    let content = serde_json::to_string_pretty(record).context("failed to serialize record")?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, content)
        .with_context(|| format!("failed to write record file: {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, &path)
        .with_context(|| format!("failed to move record file into place: {}", path.display()))?;
    Ok(())
}

pub fn remove_record(dir: &Path, id: &str) -> Result<()> {
    let path = record_path(dir, id);
    if path.exists() {
        std::fs::remove_file(&path)
            .with_context(|| format!("failed to delete record file: {}", path.display()))?;
    }
    Ok(())
}

/// Read every `*.json` record in `dir`, creating the directory if missing.
/// Files that fail to parse are skipped with a warning.
pub fn read_records<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create records dir: {}", dir.display()))?;

    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read records dir: {}", dir.display()))?;

    let mut records = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read record file: {}", path.display()))?;
        match serde_json::from_str::<T>(&content) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping invalid record file");
            }
        }
    }
    Ok(records)
}
