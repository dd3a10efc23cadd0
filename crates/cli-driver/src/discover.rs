use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::binding::CliBinding;
use crate::provider::{Preference, Provider};

/// How long a `--version` probe may run before the candidate is skipped.
pub(crate) const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

// ─── ProviderTable ────────────────────────────────────────────────────────

/// The shared discovery table: provider → ordered candidate executables.
///
/// Every entry point consumes this one table rather than re-deriving its
/// own candidate list. Candidates are opaque strings to try — a bare
/// command name, common absolute install paths, the user-local install
/// path, and indirect invocation through a JS package runner. Multi-word
/// candidates are split on whitespace at spawn time.
#[derive(Debug, Clone)]
pub struct ProviderTable {
    claude: Vec<String>,
    gemini: Vec<String>,
}

impl ProviderTable {
    pub fn new(claude: Vec<String>, gemini: Vec<String>) -> Self {
        ProviderTable { claude, gemini }
    }

    pub fn candidates(&self, provider: Provider) -> &[String] {
        match provider {
            Provider::Claude => &self.claude,
            Provider::Gemini => &self.gemini,
        }
    }
}

impl Default for ProviderTable {
    fn default() -> Self {
        ProviderTable {
            claude: default_candidates("claude"),
            gemini: default_candidates("gemini"),
        }
    }
}

fn default_candidates(name: &str) -> Vec<String> {
    let mut candidates = vec![
        name.to_string(),
        format!("/usr/local/bin/{name}"),
        format!("/usr/bin/{name}"),
    ];
    if let Some(home) = home::home_dir() {
        candidates.push(home.join(".local/bin").join(name).to_string_lossy().into_owned());
    }
    candidates.push(format!("npx {name}"));
    candidates.push(format!("yarn {name}"));
    candidates
}

// ─── Discovery ────────────────────────────────────────────────────────────

/// Locate an available assistant CLI.
///
/// `Auto` tries providers in priority order (claude before gemini) and
/// binds to the first whose candidate answers a `--version` probe with
/// exit 0 inside [`PROBE_TIMEOUT`]. An explicit preference tries only
/// that provider's candidates and never falls back to the other family.
///
/// Probe failures (missing executable, non-zero exit, timeout) are
/// swallowed and the next candidate is tried; an unbound result is a
/// normal outcome, never an error.
pub async fn discover(preference: Preference) -> CliBinding {
    discover_in(&ProviderTable::default(), preference).await
}

/// [`discover`] against a caller-supplied candidate table.
pub async fn discover_in(table: &ProviderTable, preference: Preference) -> CliBinding {
    for provider in preference.providers() {
        for candidate in table.candidates(provider) {
            if probe(candidate).await {
                info!(provider = provider.as_str(), path = %candidate, "found CLI");
                return CliBinding::bound(candidate, provider);
            }
        }
        debug!(provider = provider.as_str(), "no candidate answered the probe");
    }
    CliBinding::unbound()
}

/// Run `<candidate> --version` and report whether it exited 0 in time.
async fn probe(candidate: &str) -> bool {
    let mut parts = candidate.split_whitespace();
    let Some(program) = parts.next() else {
        return false;
    };

    // Skip without spawning when the candidate clearly isn't there:
    // absolute paths that don't exist, bare names absent from PATH.
    if program.contains('/') {
        if !Path::new(program).exists() {
            return false;
        }
    } else if which::which(program).is_err() {
        return false;
    }

    let mut cmd = Command::new(program);
    cmd.args(parts)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            debug!(candidate, error = %e, "probe spawn failed");
            return false;
        }
    };

    match timeout(PROBE_TIMEOUT, child.wait()).await {
        Ok(Ok(status)) if status.success() => true,
        Ok(_) => {
            debug!(candidate, "probe exited non-zero");
            false
        }
        Err(_) => {
            debug!(candidate, "probe timed out");
            false
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Write an executable shell script acting as a fake assistant CLI.
    #[cfg(unix)]
    fn fake_cli(dir: &Path, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn missing(dir: &Path, name: &str) -> String {
        PathBuf::from(dir)
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    #[tokio::test]
    async fn all_probes_failing_returns_unbound() {
        let dir = TempDir::new().unwrap();
        let table = ProviderTable::new(
            vec![missing(dir.path(), "claude")],
            vec![missing(dir.path(), "gemini")],
        );
        let binding = discover_in(&table, Preference::Auto).await;
        assert!(!binding.is_bound());
        assert_eq!(binding.path, None);
        assert_eq!(binding.provider, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn auto_falls_back_to_secondary_provider() {
        let dir = TempDir::new().unwrap();
        let gemini = fake_cli(dir.path(), "gemini", "exit 0");
        let table = ProviderTable::new(vec![missing(dir.path(), "claude")], vec![gemini.clone()]);
        let binding = discover_in(&table, Preference::Auto).await;
        assert_eq!(binding.provider, Some(Provider::Gemini));
        assert_eq!(binding.path.as_deref(), Some(gemini.as_str()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn explicit_request_does_not_fall_back() {
        let dir = TempDir::new().unwrap();
        let _gemini = fake_cli(dir.path(), "gemini", "exit 0");
        let table = ProviderTable::new(
            vec![missing(dir.path(), "claude")],
            vec![dir.path().join("gemini").to_string_lossy().into_owned()],
        );
        let binding = discover_in(&table, Preference::Only(Provider::Claude)).await;
        assert!(!binding.is_bound());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn auto_prefers_primary_when_both_present() {
        let dir = TempDir::new().unwrap();
        let claude = fake_cli(dir.path(), "claude", "exit 0");
        let gemini = fake_cli(dir.path(), "gemini", "exit 0");
        let table = ProviderTable::new(vec![claude.clone()], vec![gemini]);
        let binding = discover_in(&table, Preference::Auto).await;
        assert_eq!(binding.provider, Some(Provider::Claude));
        assert_eq!(binding.path.as_deref(), Some(claude.as_str()));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_probe_is_skipped_for_next_candidate() {
        let dir = TempDir::new().unwrap();
        let broken = fake_cli(dir.path(), "claude-broken", "exit 1");
        let working = fake_cli(dir.path(), "claude", "exit 0");
        let table = ProviderTable::new(vec![broken, working.clone()], vec![]);
        let binding = discover_in(&table, Preference::Only(Provider::Claude)).await;
        assert_eq!(binding.path.as_deref(), Some(working.as_str()));
    }

    #[test]
    fn default_table_lists_bare_name_first() {
        let table = ProviderTable::default();
        assert_eq!(table.candidates(Provider::Claude)[0], "claude");
        assert_eq!(table.candidates(Provider::Gemini)[0], "gemini");
        // Package-runner invocations are the last resort, npx then yarn.
        let claude = table.candidates(Provider::Claude);
        assert_eq!(claude[claude.len() - 2], "npx claude");
        assert_eq!(claude[claude.len() - 1], "yarn claude");
    }
}
