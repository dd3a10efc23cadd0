use crate::provider::Provider;

// ─── CliBinding ───────────────────────────────────────────────────────────

/// The resolved (executable, provider) pair currently in use, or the
/// explicit "unbound" state when discovery found nothing.
///
/// `path` is the candidate string that answered the version probe. It may
/// be a bare command name, an absolute path, or a multi-word runner
/// invocation like `npx claude`; [`crate::invoke`] splits it on whitespace
/// at spawn time. It is never handed to a shell.
///
/// Lifecycle: `Unresolved -> Probing -> Bound | Unbound`. Exactly one
/// binding is active at a time, owned by the orchestrating caller; a
/// bound result is kept for the process lifetime and only an explicit
/// provider switch triggers a re-probe.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliBinding {
    pub path: Option<String>,
    pub provider: Option<Provider>,
}

impl CliBinding {
    pub fn bound(path: impl Into<String>, provider: Provider) -> Self {
        CliBinding {
            path: Some(path.into()),
            provider: Some(provider),
        }
    }

    /// The "discovery found nothing" state. A normal outcome, not an error.
    pub fn unbound() -> Self {
        CliBinding::default()
    }

    pub fn is_bound(&self) -> bool {
        self.path.is_some()
    }

    /// Display label for the bound provider (`"none"` when unbound).
    pub fn provider_name(&self) -> &'static str {
        self.provider.map(|p| p.as_str()).unwrap_or("none")
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_has_no_path_and_no_provider() {
        let b = CliBinding::unbound();
        assert!(!b.is_bound());
        assert_eq!(b.path, None);
        assert_eq!(b.provider, None);
        assert_eq!(b.provider_name(), "none");
    }

    #[test]
    fn bound_carries_provider_label() {
        let b = CliBinding::bound("/usr/local/bin/claude", Provider::Claude);
        assert!(b.is_bound());
        assert_eq!(b.provider_name(), "claude");
    }
}
