use anyhow::Context;
use cli_driver::{discover, discover_in, invoke, CliBinding, Preference, ProviderTable};
use persona_core::store::{ensure_json_ext, DEFAULT_CONFIG_FILE};
use persona_core::{AgentConfig, ConversationHistory, LoadOutcome, Store};
use std::path::Path;

// ---------------------------------------------------------------------------
// AgentSession
// ---------------------------------------------------------------------------

/// The orchestrator: sole owner of the live persona, the CLI binding, and
/// the conversation history.
///
/// Every configuration change goes through [`AgentSession::replace`], and
/// every turn through [`AgentSession::record`] — a single writer, so the
/// background worker never touches shared state. The worker is handed a
/// binding clone and the composed message at dispatch time and reports
/// back over a channel; it is this object that appends the turn.
pub struct AgentSession {
    store: Store,
    config: AgentConfig,
    /// Canonical filename of the active persona; deletion of this file is
    /// refused for as long as it stays active.
    config_file: String,
    binding: CliBinding,
    history: ConversationHistory,
}

impl AgentSession {
    /// Open a session.
    ///
    /// With an explicit file the load is strict: a missing required key is
    /// an error and no session is created. Without one, the ambient path
    /// runs (last-used persona, then `agent_config.json`, then defaults)
    /// and cannot fail.
    pub fn open(store: Store, explicit: Option<&str>) -> anyhow::Result<Self> {
        let (config, config_file) = match explicit {
            Some(file) => {
                let file = ensure_json_ext(file);
                let config = store
                    .load_strict(&file)
                    .with_context(|| format!("failed to load configuration '{file}'"))?;
                (config, file_name_of(&file))
            }
            None => {
                let (config, outcome) = store.load_ambient();
                let file = match &outcome {
                    LoadOutcome::Loaded(path) => file_name_of(&path.to_string_lossy()),
                    LoadOutcome::Missing | LoadOutcome::Malformed(_) => {
                        DEFAULT_CONFIG_FILE.to_string()
                    }
                };
                if let LoadOutcome::Malformed(reason) = &outcome {
                    tracing::warn!(%reason, "ambient configuration malformed, using defaults");
                }
                (config, file)
            }
        };

        Ok(AgentSession {
            store,
            config,
            config_file,
            binding: CliBinding::unbound(),
            history: ConversationHistory::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn binding(&self) -> &CliBinding {
        &self.binding
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Swap in a new active persona. The only write path for the config.
    pub fn replace(&mut self, config: AgentConfig, file: impl Into<String>) {
        self.config = config;
        self.config_file = ensure_json_ext(&file.into());
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // -----------------------------------------------------------------------
    // Binding
    // -----------------------------------------------------------------------

    /// Initial discovery. The result is kept for the session lifetime;
    /// only [`AgentSession::switch_provider`] re-probes.
    pub async fn bind(&mut self, preference: Preference) -> &CliBinding {
        self.binding = discover(preference).await;
        &self.binding
    }

    /// Re-run discovery for a new preference. On failure the previous
    /// binding is left untouched so the caller can roll back UI state.
    pub async fn switch_provider(&mut self, preference: Preference) -> bool {
        self.switch_provider_in(&ProviderTable::default(), preference)
            .await
    }

    pub async fn switch_provider_in(
        &mut self,
        table: &ProviderTable,
        preference: Preference,
    ) -> bool {
        let candidate = discover_in(table, preference).await;
        if candidate.is_bound() {
            self.binding = candidate;
            true
        } else {
            false
        }
    }

    // -----------------------------------------------------------------------
    // Messaging
    // -----------------------------------------------------------------------

    /// The payload and system prompt an invocation for `message` carries:
    /// recent history folded in per `conversation_memory`, and the
    /// persona-derived system prompt.
    pub fn outgoing(&self, message: &str) -> (String, String) {
        (
            self.history
                .context_for(message, self.config.conversation_memory),
            self.config.render_system_prompt(),
        )
    }

    /// Append a completed exchange to the history.
    pub fn record(&mut self, user: &str, assistant: &str) {
        self.history.push(user, assistant);
    }

    /// Send one message and record the turn. Only successful invocations
    /// reach the history.
    pub async fn send(&mut self, message: &str) -> cli_driver::Result<String> {
        let (payload, system) = self.outgoing(message);
        let reply = invoke(&self.binding, &payload, Some(&system)).await?;
        self.record(message, &reply);
        Ok(reply)
    }
}

fn file_name_of(file: &str) -> String {
    Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
