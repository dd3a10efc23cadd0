use crate::output;
use crate::session::AgentSession;
use anyhow::{bail, Context};
use clap::Subcommand;
use persona_core::persona::{builtin, BUILTIN_TEMPLATES};
use persona_core::store::{ensure_json_ext, suggested_file_stem};
use persona_core::{AgentConfig, Store};

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the active persona
    Show,

    /// List personas in the working directory and the config directory
    List,

    /// Make a stored persona the active one
    Load {
        /// Persona file (path or name inside the config directory)
        file: String,
    },

    /// Create a new persona
    New {
        /// Display name of the persona
        name: String,

        /// Built-in template to start from: assistant, coder, tutor, writer
        #[arg(long)]
        template: Option<String>,

        /// File name to save under (default: derived from the name)
        #[arg(long = "as")]
        save_as: Option<String>,

        /// Make it the active persona immediately
        #[arg(long = "use")]
        activate: bool,
    },

    /// Edit fields of the active persona in place
    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        instructions: Option<String>,

        /// Append a conversation starter (repeatable)
        #[arg(long = "add-starter")]
        add_starters: Vec<String>,

        /// Remove the starter at this 1-based index
        #[arg(long = "remove-starter")]
        remove_starter: Option<usize>,

        /// How many recent turns are folded into each message
        #[arg(long)]
        memory: Option<usize>,
    },

    /// Delete a stored persona (the active one is refused)
    Delete { file: String },

    /// Rename a stored persona file
    Rename { old: String, new: String },

    /// Copy a stored persona to a new file
    Duplicate {
        file: String,

        /// Target file name (default: `<stem>_copy.json`)
        #[arg(long = "as")]
        save_as: Option<String>,
    },
}

pub fn run(sub: ConfigSubcommand, config: Option<&str>, json: bool) -> anyhow::Result<()> {
    let store = Store::from_env();
    match sub {
        ConfigSubcommand::Show => show(store, config, json),
        ConfigSubcommand::List => list(&store, json),
        ConfigSubcommand::Load { file } => load(&store, &file),
        ConfigSubcommand::New {
            name,
            template,
            save_as,
            activate,
        } => new(&store, &name, template.as_deref(), save_as.as_deref(), activate),
        ConfigSubcommand::Set {
            name,
            description,
            instructions,
            add_starters,
            remove_starter,
            memory,
        } => set(
            store,
            config,
            SetFields {
                name,
                description,
                instructions,
                add_starters,
                remove_starter,
                memory,
            },
        ),
        ConfigSubcommand::Delete { file } => delete(store, config, &file),
        ConfigSubcommand::Rename { old, new } => rename(&store, &old, &new),
        ConfigSubcommand::Duplicate { file, save_as } => {
            duplicate(&store, &file, save_as.as_deref())
        }
    }
}

// ---------------------------------------------------------------------------
// Subcommand bodies
// ---------------------------------------------------------------------------

fn show(store: Store, config: Option<&str>, json: bool) -> anyhow::Result<()> {
    let session = AgentSession::open(store, config)?;
    if json {
        return output::print_json(session.config());
    }
    let config = session.config();
    println!("File:         {}", session.config_file());
    println!("Name:         {}", config.name);
    println!("Description:  {}", config.description);
    println!("Memory:       {} turns", config.conversation_memory);
    println!("\nInstructions:\n{}", config.instructions);
    if !config.conversation_starters.is_empty() {
        println!("\nConversation starters:");
        for (i, starter) in config.conversation_starters.iter().enumerate() {
            println!("  {}. {}", i + 1, starter);
        }
    }
    Ok(())
}

fn list(store: &Store, json: bool) -> anyhow::Result<()> {
    let entries = store.list();
    if json {
        return output::print_json(&entries);
    }
    if entries.is_empty() {
        println!("No persona configurations found.");
        println!("Config directory: {}", store.dir().display());
        return Ok(());
    }
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            let description = match &e.error {
                Some(err) => format!("[unreadable: {err}]"),
                None => e.description.clone(),
            };
            vec![e.file_name.clone(), e.name.clone(), description]
        })
        .collect();
    output::print_table(&["FILE", "NAME", "DESCRIPTION"], &rows);
    Ok(())
}

fn load(store: &Store, file: &str) -> anyhow::Result<()> {
    let file = ensure_json_ext(file);
    let config = store
        .load_strict(&file)
        .with_context(|| format!("failed to load '{file}'"))?;
    store.save_last(&store.resolve(&file))?;
    println!("Now using: {}", config.name);
    Ok(())
}

fn new(
    store: &Store,
    name: &str,
    template: Option<&str>,
    save_as: Option<&str>,
    activate: bool,
) -> anyhow::Result<()> {
    let mut config = match template {
        Some(slug) => builtin(slug).with_context(|| {
            format!(
                "unknown template '{slug}' (available: {})",
                BUILTIN_TEMPLATES.join(", ")
            )
        })?,
        None => AgentConfig::default(),
    };
    config.name = name.to_string();

    let file = match save_as {
        Some(f) => ensure_json_ext(f),
        None => format!("{}.json", suggested_file_stem(name)),
    };
    let path = store.save(&config, &file)?;
    println!("Created {} at {}", config.name, path.display());

    if activate {
        store.save_last(&path)?;
        println!("Now using: {}", config.name);
    }
    Ok(())
}

struct SetFields {
    name: Option<String>,
    description: Option<String>,
    instructions: Option<String>,
    add_starters: Vec<String>,
    remove_starter: Option<usize>,
    memory: Option<usize>,
}

fn set(store: Store, config_file: Option<&str>, fields: SetFields) -> anyhow::Result<()> {
    let mut session = AgentSession::open(store, config_file)?;
    let mut config = session.config().clone();

    if let Some(name) = fields.name {
        config.name = name;
    }
    if let Some(description) = fields.description {
        config.description = description;
    }
    if let Some(instructions) = fields.instructions {
        config.instructions = instructions;
    }
    if let Some(index) = fields.remove_starter {
        if index == 0 || index > config.conversation_starters.len() {
            bail!(
                "no starter at index {index} (there are {})",
                config.conversation_starters.len()
            );
        }
        config.conversation_starters.remove(index - 1);
    }
    config.conversation_starters.extend(fields.add_starters);
    if let Some(memory) = fields.memory {
        config.conversation_memory = memory;
    }

    let file = session.config_file().to_string();
    let path = session.store().save(&config, &file)?;
    session.replace(config, file);
    println!("Saved {}", path.display());
    Ok(())
}

fn delete(store: Store, config_file: Option<&str>, file: &str) -> anyhow::Result<()> {
    // The active file name is whatever a fresh session would resolve to.
    let session = AgentSession::open(store, config_file)?;
    session.store().delete(file, session.config_file())?;
    println!("Deleted {}", ensure_json_ext(file));
    Ok(())
}

fn rename(store: &Store, old: &str, new: &str) -> anyhow::Result<()> {
    let path = store.rename(old, new)?;
    // Keep the last-used pointer valid across the rename.
    if store.load_last().as_deref() == Some(store.resolve(&ensure_json_ext(old)).as_path()) {
        store.save_last(&path)?;
    }
    println!("Renamed to {}", path.display());
    Ok(())
}

fn duplicate(store: &Store, file: &str, save_as: Option<&str>) -> anyhow::Result<()> {
    let source = ensure_json_ext(file);
    let config = store
        .load_strict(&source)
        .with_context(|| format!("failed to load '{source}'"))?;
    let target = match save_as {
        Some(f) => ensure_json_ext(f),
        None => format!("{}_copy.json", source.trim_end_matches(".json")),
    };
    let path = store.save(&config, &target)?;
    println!("Copied to {}", path.display());
    Ok(())
}
