mod cmd;
mod output;
mod session;

use clap::{Parser, Subcommand};
use cli_driver::Preference;
use cmd::{config::ConfigSubcommand, export::ExportSubcommand, import::ImportSubcommand};

#[derive(Parser)]
#[command(
    name = "persona",
    about = "Persona-driven front end for claude- and gemini-style CLI assistants",
    version,
    propagate_version = true
)]
struct Cli {
    /// Provider preference: auto, claude, or gemini
    #[arg(long, global = true, default_value = "auto")]
    provider: String,

    /// Persona file to use (default: last used, then agent_config.json)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive conversation with the active persona (default)
    Chat,

    /// Single query mode: print one reply and exit
    Ask {
        /// The question; multiple words are joined with spaces
        prompt: Vec<String>,
    },

    /// Manage stored persona configurations
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Export the active persona or the whole store
    Export {
        #[command(subcommand)]
        subcommand: ExportSubcommand,
    },

    /// Import persona files and bundles
    Import {
        #[command(subcommand)]
        subcommand: ImportSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let preference = match cli.provider.parse::<Preference>() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    let config = cli.config.as_deref();
    let result = match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => cmd::chat::run(preference, config),
        Commands::Ask { prompt } => cmd::ask::run(preference, config, &prompt.join(" ")),
        Commands::Config { subcommand } => cmd::config::run(subcommand, config, cli.json),
        Commands::Export { subcommand } => cmd::export::run(subcommand, config),
        Commands::Import { subcommand } => cmd::import::run(subcommand),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
