use anyhow::Context;
use clap::Subcommand;
use persona_core::store::ensure_json_ext;
use persona_core::{import_bundle, Store};
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum ImportSubcommand {
    /// Copy a single persona file into the store
    Config {
        /// Source file (validated before anything is written)
        file: String,

        /// File name inside the store (default: the source file's name)
        #[arg(long)]
        save_as: Option<String>,

        /// Make it the active persona immediately
        #[arg(long = "use")]
        activate: bool,
    },

    /// Import every valid entry of a JSON bundle
    Bundle {
        /// Bundle file produced by `persona export bundle`
        file: String,
    },
}

pub fn run(sub: ImportSubcommand) -> anyhow::Result<()> {
    let store = Store::from_env();
    match sub {
        ImportSubcommand::Config {
            file,
            save_as,
            activate,
        } => {
            let config = store
                .load_strict(&file)
                .with_context(|| format!("failed to import '{file}'"))?;
            let target = match save_as {
                Some(name) => ensure_json_ext(&name),
                None => Path::new(&file)
                    .file_name()
                    .map(|n| ensure_json_ext(&n.to_string_lossy()))
                    .unwrap_or_else(|| ensure_json_ext(&file)),
            };
            let path = store.save(&config, &target)?;
            println!("Imported {} as {}", config.name, path.display());
            if activate {
                store.save_last(&path)?;
                println!("Now using: {}", config.name);
            }
        }
        ImportSubcommand::Bundle { file } => {
            let report = import_bundle(&store, &PathBuf::from(&file))?;
            println!("Imported {} configuration(s)", report.written.len());
            for (key, reason) in &report.skipped {
                println!("  skipped '{key}': {reason}");
            }
        }
    }
    Ok(())
}
