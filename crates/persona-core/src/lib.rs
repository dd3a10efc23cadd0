//! `persona-core` — the persona data model and its JSON configuration store.
//!
//! A persona is an [`AgentConfig`] record: name, description, instructions
//! (the system-prompt body), conversation starters, and optional knowledge
//! file references. Records live as pretty-printed JSON files in a
//! directory resolved from `CLAUDE_AGENT_CONFIG_DIR` (default
//! `../configs`); identity on disk is the filename stem, never a field
//! inside the record.
//!
//! The [`store::Store`] exposes two load paths with deliberately different
//! strictness: the ambient startup path default-fills anything missing or
//! malformed so the tool always starts usable, while explicit loads reject
//! files missing any required key and leave the caller's current config
//! untouched.

pub mod bundle;
pub mod error;
pub mod history;
pub mod io;
pub mod persona;
pub mod store;
pub mod template;

pub use bundle::{export_bundle, import_bundle, ImportReport};
pub use error::PersonaError;
pub use history::{ConversationHistory, ConversationTurn};
pub use persona::AgentConfig;
pub use store::{ConfigEntry, LoadOutcome, Store};

pub type Result<T> = std::result::Result<T, PersonaError>;
