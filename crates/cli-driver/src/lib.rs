//! `cli-driver` — locator and one-shot invoker for external AI CLI binaries.
//!
//! Two assistant families are supported: a `claude`-style binary and a
//! `gemini`-style binary. The driver finds whichever is installed (or the
//! one the caller insists on), then runs single synchronous calls against
//! it, one subprocess per turn.
//!
//! # Architecture
//!
//! ```text
//! Preference ("auto" | "claude" | "gemini")
//!     │
//!     ▼
//! discover()      ← probes candidate executables with `--version`
//!     │
//!     ▼
//! CliBinding      ← resolved path + provider label, or the unbound state
//!     │
//!     ▼
//! invoke()        ← spawns `<exe> --print [--append-system-prompt …] <msg>`
//!                   60 s timeout, stdout is the reply
//! ```
//!
//! Discovery never fails: when no candidate answers the probe the result
//! is an unbound [`CliBinding`], and every [`invoke`] against it returns
//! [`DriverError::Unavailable`] without attempting a launch. A bound
//! result is cached by the caller for the process lifetime; only an
//! explicit provider switch re-runs discovery.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use cli_driver::{discover, invoke, Preference};
//!
//! let binding = discover(Preference::Auto).await;
//! let reply = invoke(&binding, "say hello", Some("You are terse.")).await?;
//! println!("{reply}");
//! ```

pub mod binding;
pub mod discover;
pub mod error;
pub mod invoke;
pub mod provider;

pub use binding::CliBinding;
pub use discover::{discover, discover_in, ProviderTable};
pub use error::DriverError;
pub use invoke::invoke;
pub use provider::{Preference, Provider};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, DriverError>;
