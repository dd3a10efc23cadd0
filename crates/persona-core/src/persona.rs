use crate::error::PersonaError;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// AgentConfig
// ---------------------------------------------------------------------------

/// Keys an explicitly-loaded configuration must carry. The ambient load
/// path pays no attention to these; it default-fills instead.
pub const REQUIRED_KEYS: [&str; 4] = [
    "name",
    "description",
    "instructions",
    "conversation_starters",
];

/// The persona record driving the system prompt and UI labels.
///
/// Field order is the on-disk key order (serde serializes declaration
/// order), so saved files keep a stable layout. Every field has a
/// documented default; a load can only fail on the strict path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_description")]
    pub description: String,
    /// The system-prompt body.
    #[serde(default = "default_instructions")]
    pub instructions: String,
    /// Display order is insertion order.
    #[serde(default = "default_starters")]
    pub conversation_starters: Vec<String>,
    /// Informational only; never read into the prompt automatically.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub knowledge_files: Vec<String>,
    /// Unused override kept for on-disk compatibility.
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// How many prior turns are folded into the outgoing message.
    #[serde(default = "default_memory")]
    pub conversation_memory: usize,
}

fn default_name() -> String {
    "Custom AI Agent".to_string()
}

fn default_description() -> String {
    "A helpful AI assistant".to_string()
}

fn default_instructions() -> String {
    "You are a helpful AI assistant. Please provide clear, concise, and accurate responses.\n\n\
     Your primary capabilities include:\n\
     - Answering questions across various topics\n\
     - Helping with problem-solving\n\
     - Providing explanations and guidance\n\
     - Assisting with code and technical issues\n\n\
     Always be polite, professional, and helpful in your responses."
        .to_string()
}

fn default_starters() -> Vec<String> {
    vec![
        "How can I help you today?".to_string(),
        "What would you like to work on?".to_string(),
        "Tell me about your project and I'll assist you.".to_string(),
        "What questions do you have for me?".to_string(),
    ]
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_temperature() -> f64 {
    0.7
}

fn default_memory() -> usize {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            name: default_name(),
            description: default_description(),
            instructions: default_instructions(),
            conversation_starters: default_starters(),
            knowledge_files: Vec::new(),
            system_prompt: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            conversation_memory: default_memory(),
        }
    }
}

impl AgentConfig {
    /// Render the system prompt the CLI invocation will carry.
    pub fn render_system_prompt(&self) -> String {
        format!(
            "You are {}.\n\n\
             Description: {}\n\n\
             Instructions:\n{}\n\n\
             Please follow these instructions carefully and embody the role described above.",
            self.name, self.description, self.instructions
        )
    }
}

/// Check that a parsed JSON object carries every required key, reporting
/// the first missing one by name.
pub fn validate_required(value: &serde_json::Value) -> std::result::Result<(), PersonaError> {
    for key in REQUIRED_KEYS {
        if value.get(key).is_none() {
            return Err(PersonaError::MissingKey(key.to_string()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Built-in templates
// ---------------------------------------------------------------------------

pub const BUILTIN_TEMPLATES: [&str; 4] = ["assistant", "coder", "tutor", "writer"];

/// A starter persona by template slug, or `None` for an unknown slug.
pub fn builtin(slug: &str) -> Option<AgentConfig> {
    let (name, description, instructions, starters): (&str, &str, &str, &[&str]) = match slug {
        "assistant" => (
            "General Assistant",
            "A helpful general-purpose AI assistant",
            "You are a helpful, accurate, and friendly AI assistant. Provide clear, \
             concise answers and always be respectful.",
            &["How can I help you?", "What would you like to know?"],
        ),
        "coder" => (
            "Code Assistant",
            "Programming and development helper",
            "You are an expert programmer. Help with code review, debugging, best \
             practices, and programming questions. Always explain your reasoning.",
            &[
                "What code can I help with?",
                "Need help debugging?",
                "Looking for code review?",
            ],
        ),
        "tutor" => (
            "Learning Tutor",
            "Patient educational assistant",
            "You are a patient tutor. Break down complex topics, use examples, and \
             adapt to the learner's level. Always encourage questions.",
            &[
                "What would you like to learn?",
                "Need help understanding something?",
                "Ready for your lesson?",
            ],
        ),
        "writer" => (
            "Writing Assistant",
            "Writing and editing helper",
            "You are a professional writing coach. Help improve clarity, style, \
             grammar, and structure while maintaining the author's voice.",
            &[
                "What writing can I help with?",
                "Need editing assistance?",
                "Want to improve your text?",
            ],
        ),
        _ => return None,
    };

    Some(AgentConfig {
        name: name.to_string(),
        description: description.to_string(),
        instructions: instructions.to_string(),
        conversation_starters: starters.iter().map(|s| s.to_string()).collect(),
        ..AgentConfig::default()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
