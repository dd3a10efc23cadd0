use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("no CLI available: run discovery or install claude/gemini")]
    Unavailable,

    #[error("CLI request timed out")]
    Timeout,

    #[error("CLI error: {0}")]
    Process(String),

    #[error("failed to launch CLI: {0}")]
    Launch(String),
}
