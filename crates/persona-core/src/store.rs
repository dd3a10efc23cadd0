use crate::error::PersonaError;
use crate::io::atomic_write;
use crate::persona::{validate_required, AgentConfig};
use crate::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "CLAUDE_AGENT_CONFIG_DIR";

/// Fallback directory, relative to the invoking working directory.
pub const DEFAULT_CONFIG_DIR: &str = "../configs";

/// The ambient persona file loaded at startup.
pub const DEFAULT_CONFIG_FILE: &str = "agent_config.json";

/// Pointer to the most recently explicitly-loaded persona.
const LAST_CONFIG_FILE: &str = ".last_config";

const SNIPPET_LEN: usize = 50;

// ---------------------------------------------------------------------------
// LoadOutcome / ConfigEntry
// ---------------------------------------------------------------------------

/// What the lenient load path actually did. Reported, never raised.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(PathBuf),
    /// No file at the resolved path; defaults returned.
    Missing,
    /// The file existed but wasn't well-formed JSON; defaults returned.
    Malformed(String),
}

/// One row of a configuration listing. Unreadable files still get an
/// entry, carrying the error instead of being silently omitted.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigEntry {
    pub file_name: String,
    pub path: PathBuf,
    pub name: String,
    /// Description snippet, truncated to 50 characters.
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// The persona configuration store.
///
/// By default the directory is re-resolved from [`CONFIG_DIR_ENV`] on
/// every operation, so changing the variable between calls takes effect
/// immediately. `Store::at` pins an explicit directory instead (tests,
/// `--config-dir`-style callers).
#[derive(Debug, Clone, Default)]
pub struct Store {
    dir: Option<PathBuf>,
}

impl Store {
    /// A store resolving its directory from the environment per call.
    pub fn from_env() -> Self {
        Store { dir: None }
    }

    /// A store pinned to `dir`, bypassing the environment.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Store {
            dir: Some(dir.into()),
        }
    }

    pub fn dir(&self) -> PathBuf {
        match &self.dir {
            Some(d) => d.clone(),
            None => std::env::var_os(CONFIG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR)),
        }
    }

    /// The literal path if it exists as-is, otherwise the config
    /// directory joined with `filename`.
    pub fn resolve(&self, filename: &str) -> PathBuf {
        let literal = Path::new(filename);
        if literal.exists() {
            literal.to_path_buf()
        } else {
            self.dir().join(filename)
        }
    }

    // -----------------------------------------------------------------------
    // Load
    // -----------------------------------------------------------------------

    /// The lenient load path: missing or malformed files yield the
    /// hard-coded defaults plus a reported outcome; well-formed files
    /// missing optional keys are default-filled (loaded values win).
    /// Never errors — ambient startup must always produce a usable agent.
    pub fn load_or_default(&self, filename: &str) -> (AgentConfig, LoadOutcome) {
        let path = self.resolve(filename);
        let data = match std::fs::read_to_string(&path) {
            Ok(d) => d,
            Err(_) => return (AgentConfig::default(), LoadOutcome::Missing),
        };
        match serde_json::from_str::<AgentConfig>(&data) {
            Ok(cfg) => (cfg, LoadOutcome::Loaded(path)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "malformed config, using defaults");
                (AgentConfig::default(), LoadOutcome::Malformed(e.to_string()))
            }
        }
    }

    /// The strict load path for explicit user requests: every required
    /// key must be present or the load is rejected naming the missing
    /// key, leaving the caller's in-memory config unchanged.
    pub fn load_strict(&self, filename: &str) -> Result<AgentConfig> {
        let path = self.resolve(filename);
        let data = std::fs::read_to_string(&path)?;
        let value: serde_json::Value =
            serde_json::from_str(&data).map_err(|e| PersonaError::Malformed {
                path: path.clone(),
                source: e,
            })?;
        validate_required(&value)?;
        serde_json::from_value(value).map_err(|e| PersonaError::Malformed { path, source: e })
    }

    /// Ambient startup: last-used persona first, then the default file,
    /// then hard-coded defaults. The last-used pointer only counts when
    /// the file it names still passes the strict check.
    pub fn load_ambient(&self) -> (AgentConfig, LoadOutcome) {
        if let Some(last) = self.load_last() {
            if let Ok(cfg) = self.load_strict(&last.to_string_lossy()) {
                return (cfg, LoadOutcome::Loaded(last));
            }
        }
        self.load_or_default(DEFAULT_CONFIG_FILE)
    }

    // -----------------------------------------------------------------------
    // Save / delete / rename
    // -----------------------------------------------------------------------

    /// Save `config` under `filename` (`.json` appended if absent) in the
    /// config directory. Overwrites without prompting — confirmation, if
    /// any, belongs to the caller.
    pub fn save(&self, config: &AgentConfig, filename: &str) -> Result<PathBuf> {
        let path = self.dir().join(ensure_json_ext(filename));
        let data = serde_json::to_string_pretty(config)?;
        atomic_write(&path, data.as_bytes())?;
        info!(path = %path.display(), "configuration saved");
        Ok(path)
    }

    /// Delete a stored configuration. Refuses to delete the active
    /// configuration's own file.
    pub fn delete(&self, filename: &str, active: &str) -> Result<()> {
        let name = ensure_json_ext(filename);
        if name == ensure_json_ext(active) {
            return Err(PersonaError::ActiveConfig(name));
        }
        let path = self.resolve(&name);
        std::fs::remove_file(&path)?;
        info!(path = %path.display(), "configuration deleted");
        Ok(())
    }

    pub fn rename(&self, old: &str, new: &str) -> Result<PathBuf> {
        let from = self.resolve(&ensure_json_ext(old));
        let to = from
            .parent()
            .unwrap_or(Path::new("."))
            .join(ensure_json_ext(new));
        std::fs::rename(&from, &to)?;
        Ok(to)
    }

    // -----------------------------------------------------------------------
    // Enumerate
    // -----------------------------------------------------------------------

    /// List stored configurations: legacy `*_config.json` files in the
    /// working directory, then every `*.json` in the config directory.
    pub fn list(&self) -> Vec<ConfigEntry> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        self.list_from(&cwd)
    }

    /// [`Store::list`] with an explicit working directory.
    pub fn list_from(&self, working_dir: &Path) -> Vec<ConfigEntry> {
        let mut entries = Vec::new();
        // A file reachable from both locations shows up twice. Unclear
        // whether the original tooling meant to surface legacy files
        // distinctly or simply never de-duplicated; preserved as-is.
        scan_dir(working_dir, |n| n.ends_with("_config.json"), &mut entries);
        scan_dir(&self.dir(), |n| n.ends_with(".json"), &mut entries);
        entries
    }

    // -----------------------------------------------------------------------
    // Last-used pointer
    // -----------------------------------------------------------------------

    pub fn save_last(&self, path: &Path) -> Result<()> {
        atomic_write(
            &self.dir().join(LAST_CONFIG_FILE),
            path.to_string_lossy().as_bytes(),
        )
    }

    pub fn load_last(&self) -> Option<PathBuf> {
        std::fs::read_to_string(self.dir().join(LAST_CONFIG_FILE))
            .ok()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn ensure_json_ext(filename: &str) -> String {
    if filename.ends_with(".json") {
        filename.to_string()
    } else {
        format!("{filename}.json")
    }
}

/// Default file stem for a persona imported or duplicated by name.
pub fn suggested_file_stem(name: &str) -> String {
    format!("{}_config", name.to_lowercase().replace(' ', "_"))
}

fn scan_dir(dir: &Path, matches: impl Fn(&str) -> bool, out: &mut Vec<ConfigEntry>) {
    let Ok(read) = std::fs::read_dir(dir) else {
        return; // nonexistent location contributes nothing
    };

    let mut names: Vec<String> = read
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|n| matches(n) && *n != LAST_CONFIG_FILE)
        .collect();
    names.sort();

    for file_name in names {
        let path = dir.join(&file_name);
        out.push(read_entry(&path, file_name));
    }
}

fn read_entry(path: &Path, file_name: String) -> ConfigEntry {
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|data| {
            serde_json::from_str::<serde_json::Value>(&data).map_err(|e| e.to_string())
        });

    match parsed {
        Ok(value) => ConfigEntry {
            file_name,
            path: path.to_path_buf(),
            name: value
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown")
                .to_string(),
            description: snippet(
                value
                    .get("description")
                    .and_then(|v| v.as_str())
                    .unwrap_or(""),
            ),
            error: None,
        },
        Err(e) => ConfigEntry {
            file_name,
            path: path.to_path_buf(),
            name: "Unknown".to_string(),
            description: String::new(),
            error: Some(e),
        },
    }
}

fn snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_LEN {
        text.to_string()
    } else {
        let cut: String = text.chars().take(SNIPPET_LEN).collect();
        format!("{cut}...")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, Store) {
        let dir = TempDir::new().unwrap();
        let store = Store::at(dir.path());
        (dir, store)
    }

    #[test]
    fn save_then_load_roundtrips_required_fields() {
        let (_dir, store) = store();
        let cfg = AgentConfig {
            name: "Archivist".to_string(),
            description: "keeps the books".to_string(),
            instructions: "catalogue everything".to_string(),
            conversation_starters: vec!["hello".to_string()],
            ..AgentConfig::default()
        };
        store.save(&cfg, "archivist").unwrap();

        let loaded = store.load_strict("archivist.json").unwrap();
        assert_eq!(loaded.name, cfg.name);
        assert_eq!(loaded.description, cfg.description);
        assert_eq!(loaded.instructions, cfg.instructions);
        assert_eq!(loaded.conversation_starters, cfg.conversation_starters);
    }

    #[test]
    fn save_appends_json_extension_once() {
        let (dir, store) = store();
        store.save(&AgentConfig::default(), "one").unwrap();
        store.save(&AgentConfig::default(), "two.json").unwrap();
        assert!(dir.path().join("one.json").exists());
        assert!(dir.path().join("two.json").exists());
        assert!(!dir.path().join("two.json.json").exists());
    }

    #[test]
    fn ambient_load_of_nonexistent_file_yields_defaults() {
        let (_dir, store) = store();
        let (cfg, outcome) = store.load_or_default("nope.json");
        assert_eq!(outcome, LoadOutcome::Missing);
        assert_eq!(cfg.name, "Custom AI Agent");
    }

    #[test]
    fn ambient_load_of_malformed_file_yields_defaults() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        let (cfg, outcome) = store.load_or_default("bad.json");
        assert!(matches!(outcome, LoadOutcome::Malformed(_)));
        assert_eq!(cfg.name, "Custom AI Agent");
    }

    #[test]
    fn ambient_load_default_fills_partial_files() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("partial.json"), r#"{"name": "Poet"}"#).unwrap();
        let (cfg, outcome) = store.load_or_default("partial.json");
        assert!(matches!(outcome, LoadOutcome::Loaded(_)));
        assert_eq!(cfg.name, "Poet");
        assert_eq!(cfg.description, "A helpful AI assistant");
    }

    #[test]
    fn strict_load_rejects_missing_required_key() {
        let (dir, store) = store();
        std::fs::write(
            dir.path().join("partial.json"),
            r#"{"name": "x", "description": "y", "conversation_starters": []}"#,
        )
        .unwrap();
        let err = store.load_strict("partial.json").unwrap_err();
        assert!(matches!(err, PersonaError::MissingKey(k) if k == "instructions"));
    }

    #[test]
    fn strict_load_reports_malformed_json() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("bad.json"), "[1, 2").unwrap();
        let err = store.load_strict("bad.json").unwrap_err();
        assert!(matches!(err, PersonaError::Malformed { .. }));
    }

    #[test]
    fn literal_path_wins_over_directory_resolution() {
        let (dir, store) = store();
        let outside = TempDir::new().unwrap();
        let literal = outside.path().join("elsewhere.json");
        std::fs::write(
            &literal,
            serde_json::to_string(&AgentConfig::default()).unwrap(),
        )
        .unwrap();
        // Must not look for <config-dir>/elsewhere.json
        assert!(!dir.path().join("elsewhere.json").exists());
        let cfg = store.load_strict(&literal.to_string_lossy()).unwrap();
        assert_eq!(cfg.name, "Custom AI Agent");
    }

    #[test]
    fn list_of_empty_directory_is_empty_not_an_error() {
        let (dir, store) = store();
        let cwd = TempDir::new().unwrap();
        let entries = store.list_from(cwd.path());
        assert!(entries.is_empty());
        drop(dir);
    }

    #[test]
    fn list_concatenates_legacy_and_configs_without_dedup() {
        let (dir, store) = store();
        let cwd = TempDir::new().unwrap();
        std::fs::write(
            cwd.path().join("legacy_config.json"),
            serde_json::to_string(&AgentConfig::default()).unwrap(),
        )
        .unwrap();
        store.save(&AgentConfig::default(), "stored").unwrap();

        let entries = store.list_from(cwd.path());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file_name, "legacy_config.json");
        assert_eq!(entries[1].file_name, "stored.json");
        drop(dir);
    }

    #[test]
    fn list_marks_unreadable_files_instead_of_omitting() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("broken.json"), "{oops").unwrap();
        store.save(&AgentConfig::default(), "fine").unwrap();

        let cwd = TempDir::new().unwrap();
        let entries = store.list_from(cwd.path());
        assert_eq!(entries.len(), 2);
        let broken = entries.iter().find(|e| e.file_name == "broken.json").unwrap();
        assert!(broken.error.is_some());
        let fine = entries.iter().find(|e| e.file_name == "fine.json").unwrap();
        assert!(fine.error.is_none());
        assert_eq!(fine.name, "Custom AI Agent");
    }

    #[test]
    fn list_truncates_long_descriptions() {
        let (dir, store) = store();
        let cfg = AgentConfig {
            description: "d".repeat(80),
            ..AgentConfig::default()
        };
        store.save(&cfg, "longdesc").unwrap();
        let cwd = TempDir::new().unwrap();
        let entries = store.list_from(cwd.path());
        assert_eq!(entries[0].description, format!("{}...", "d".repeat(50)));
        drop(dir);
    }

    #[test]
    fn delete_refuses_the_active_config() {
        let (_dir, store) = store();
        store.save(&AgentConfig::default(), "agent_config").unwrap();
        let err = store
            .delete("agent_config.json", DEFAULT_CONFIG_FILE)
            .unwrap_err();
        assert!(matches!(err, PersonaError::ActiveConfig(_)));
    }

    #[test]
    fn delete_removes_other_files_from_subsequent_listings() {
        let (_dir, store) = store();
        store.save(&AgentConfig::default(), "doomed").unwrap();
        let cwd = TempDir::new().unwrap();
        assert_eq!(store.list_from(cwd.path()).len(), 1);

        store.delete("doomed", DEFAULT_CONFIG_FILE).unwrap();
        assert!(store.list_from(cwd.path()).is_empty());
    }

    #[test]
    fn delete_of_missing_file_is_a_reported_error() {
        let (_dir, store) = store();
        let err = store.delete("ghost", DEFAULT_CONFIG_FILE).unwrap_err();
        assert!(matches!(err, PersonaError::Io(_)));
    }

    #[test]
    fn rename_moves_within_the_config_directory() {
        let (dir, store) = store();
        store.save(&AgentConfig::default(), "before").unwrap();
        let to = store.rename("before", "after").unwrap();
        assert_eq!(to, dir.path().join("after.json"));
        assert!(!dir.path().join("before.json").exists());
        assert!(dir.path().join("after.json").exists());
    }

    #[test]
    fn last_used_pointer_roundtrips_and_feeds_ambient_load() {
        let (_dir, store) = store();
        let cfg = AgentConfig {
            name: "Pinned".to_string(),
            ..AgentConfig::default()
        };
        let path = store.save(&cfg, "pinned").unwrap();
        store.save_last(&path).unwrap();
        assert_eq!(store.load_last(), Some(path));

        let (ambient, outcome) = store.load_ambient();
        assert_eq!(ambient.name, "Pinned");
        assert!(matches!(outcome, LoadOutcome::Loaded(_)));
    }

    #[test]
    fn ambient_load_falls_back_when_last_used_vanished() {
        let (dir, store) = store();
        store.save_last(&dir.path().join("gone.json")).unwrap();
        let (cfg, outcome) = store.load_ambient();
        assert_eq!(cfg.name, "Custom AI Agent");
        assert_eq!(outcome, LoadOutcome::Missing);
    }

    #[test]
    fn last_config_pointer_is_hidden_from_listings() {
        let (dir, store) = store();
        store.save_last(Path::new("/tmp/x.json")).unwrap();
        assert!(dir.path().join(".last_config").exists());
        let cwd = TempDir::new().unwrap();
        assert!(store.list_from(cwd.path()).is_empty());
    }

    // Env-var directory resolution is covered in tests/config_dir_env.rs;
    // mutating the environment is process-global, so that test runs in
    // its own binary.

    #[test]
    fn suggested_file_stem_is_snake_case() {
        assert_eq!(suggested_file_stem("Code Assistant"), "code_assistant_config");
    }
}
