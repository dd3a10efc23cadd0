use crate::io::atomic_write;
use crate::persona::AgentConfig;
use crate::Result;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Markdown template projection
// ---------------------------------------------------------------------------

const KNOWLEDGE_BOILERPLATE: &str = "\
Upload relevant files here that your AI agent should reference. These files \
will be available to your agent during conversations and can include:
- Documentation
- Reference materials
- Templates
- Examples
- Data files
- Guidelines

Files uploaded here can be referenced in your instructions and will help \
your agent provide more accurate and contextual responses.";

/// Render a persona as a Markdown template document.
///
/// One-way projection with fixed section headers; the output is not
/// re-imported by this tool.
pub fn render_markdown(config: &AgentConfig) -> String {
    let mut out = format!(
        "# {name}\n\n## Name\n{name}\n\n## Description\n{desc}\n\n## Instructions\n{inst}\n\n## Conversation Starters\n",
        name = config.name,
        desc = config.description,
        inst = config.instructions,
    );
    for starter in &config.conversation_starters {
        out.push_str(&format!("- \"{starter}\"\n"));
    }
    out.push_str("\n## Knowledge\n");
    out.push_str(KNOWLEDGE_BOILERPLATE);
    out.push('\n');
    for file in &config.knowledge_files {
        let basename = Path::new(file)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.clone());
        out.push_str(&format!("- {basename}\n"));
    }
    out
}

/// Write the Markdown projection to `path` (`.md` appended if absent).
pub fn export_markdown(config: &AgentConfig, path: &Path) -> Result<PathBuf> {
    let path = if path.extension().is_some_and(|e| e == "md") {
        path.to_path_buf()
    } else {
        path.with_extension("md")
    };
    atomic_write(&path, render_markdown(config).as_bytes())?;
    Ok(path)
}

/// Default export filename for a persona.
pub fn default_markdown_name(config: &AgentConfig) -> String {
    format!("{}_claude.md", config.name.to_lowercase().replace(' ', "_"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
