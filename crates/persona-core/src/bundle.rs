use crate::error::PersonaError;
use crate::io::atomic_write;
use crate::persona::{validate_required, AgentConfig};
use crate::store::Store;
use crate::Result;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Bundle import/export
// ---------------------------------------------------------------------------

/// Outcome of a bundle import: which entries landed on disk and which
/// were skipped, with the reason for each skip.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub written: Vec<String>,
    pub skipped: Vec<(String, String)>,
}

/// Export every readable stored configuration as one JSON object mapping
/// file stem → full config object. Returns the number of entries.
pub fn export_bundle(store: &Store, out: &Path) -> Result<usize> {
    let mut bundle = serde_json::Map::new();

    for entry in store.list() {
        if entry.error.is_some() {
            warn!(file = %entry.file_name, "skipping unreadable config in bundle export");
            continue;
        }
        let Ok(data) = std::fs::read_to_string(&entry.path) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&data) else {
            continue;
        };
        let stem = entry
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(entry.file_name);
        bundle.insert(stem, value);
    }

    let data = serde_json::to_string_pretty(&serde_json::Value::Object(bundle.clone()))?;
    atomic_write(out, data.as_bytes())?;
    Ok(bundle.len())
}

/// Import a bundle file: each entry is validated independently against
/// the required keys and written as `<bundle-key>.json`. Invalid entries
/// become reported skips, never a failed import.
pub fn import_bundle(store: &Store, path: &Path) -> Result<ImportReport> {
    let data = std::fs::read_to_string(path)?;
    let value: serde_json::Value =
        serde_json::from_str(&data).map_err(|e| PersonaError::Malformed {
            path: path.to_path_buf(),
            source: e,
        })?;
    let serde_json::Value::Object(entries) = value else {
        return Err(PersonaError::MissingKey("bundle object".to_string()));
    };

    let mut report = ImportReport::default();
    for (key, entry) in entries {
        if let Err(e) = validate_required(&entry) {
            report.skipped.push((key, e.to_string()));
            continue;
        }
        match serde_json::from_value::<AgentConfig>(entry) {
            Ok(cfg) => {
                store.save(&cfg, &key)?;
                report.written.push(key);
            }
            Err(e) => report.skipped.push((key, e.to_string())),
        }
    }
    Ok(report)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
