use crate::session::AgentSession;
use clap::Subcommand;
use persona_core::store::ensure_json_ext;
use persona_core::{export_bundle, template, Store};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum ExportSubcommand {
    /// Write the active persona as a Markdown template
    Template {
        /// Output file (default: `<name>_claude.md`)
        file: Option<String>,
    },

    /// Write every stored persona into one JSON bundle
    Bundle {
        /// Output file
        file: String,
    },

    /// Write the active persona as a standalone JSON file
    Config {
        /// Output file name
        file: String,
    },
}

pub fn run(sub: ExportSubcommand, config: Option<&str>) -> anyhow::Result<()> {
    let store = Store::from_env();
    match sub {
        ExportSubcommand::Template { file } => {
            let session = AgentSession::open(store, config)?;
            let target = file.unwrap_or_else(|| template::default_markdown_name(session.config()));
            let path = template::export_markdown(session.config(), &PathBuf::from(target))?;
            println!("Exported template to {}", path.display());
        }
        ExportSubcommand::Bundle { file } => {
            let count = export_bundle(&store, &PathBuf::from(&file))?;
            println!("Exported {count} configuration(s) to {file}");
        }
        ExportSubcommand::Config { file } => {
            let session = AgentSession::open(store, config)?;
            let path = session.store().save(session.config(), &ensure_json_ext(&file))?;
            println!("Exported configuration to {}", path.display());
        }
    }
    Ok(())
}
