use chrono::{DateTime, Local};

// ---------------------------------------------------------------------------
// ConversationTurn / ConversationHistory
// ---------------------------------------------------------------------------

/// One user/assistant exchange. Never mutated after creation; corrections
/// happen by appending another turn or clearing the whole history.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub user: String,
    pub assistant: String,
    pub timestamp: DateTime<Local>,
}

/// Ordered, process-lifetime turn list. Never persisted to disk; turns
/// are appended only after a successful CLI invocation.
#[derive(Debug, Default)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        ConversationHistory::default()
    }

    /// Record a completed exchange, stamped now.
    pub fn push(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.turns.push(ConversationTurn {
            user: user.into(),
            assistant: assistant.into(),
            timestamp: Local::now(),
        });
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Fold the last `memory` turns into the outgoing message so a
    /// stateless one-shot CLI still sees recent context. An empty history
    /// passes the message through unchanged.
    pub fn context_for(&self, message: &str, memory: usize) -> String {
        if self.turns.is_empty() || memory == 0 {
            return message.to_string();
        }

        let start = self.turns.len().saturating_sub(memory);
        let mut out = String::from("Previous conversation:\n");
        for turn in &self.turns[start..] {
            out.push_str("Human: ");
            out.push_str(&turn.user);
            out.push('\n');
            out.push_str("Assistant: ");
            out.push_str(&turn.assistant);
            out.push('\n');
        }
        out.push_str("\nCurrent message:\nHuman: ");
        out.push_str(message);
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
