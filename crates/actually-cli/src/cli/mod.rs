//! CLI entry and dispatch.

use actually_core::{config, logging};
use anyhow::{Context, Result};
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "actually")]
#[command(version)]
#[command(about = "Ask a model. Well, actually...")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log debug output to stderr (non-interactive commands)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Ask a single question and print the formatted answer
    Ask {
        /// The prompt to send (`-` reads stdin)
        #[arg(short, long)]
        prompt: String,

        /// API key for this request (default: saved key, then OPENAI_API_KEY)
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,

        /// Override the model from config
        #[arg(short, long)]
        model: Option<String>,

        /// Print the response text without formatting
        #[arg(long)]
        raw: bool,
    },

    /// Manage the saved API key
    Key {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum KeyCommands {
    /// Save an API key for later sessions
    Save {
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Show the saved API key (masked)
    Show {
        /// Print the full key
        #[arg(long)]
        reveal: bool,
    },
    /// Remove the saved API key
    Clear,
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Print the default config as TOML
    Generate,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = config::Config::load().context("load config")?;
    let Cli { command, verbose } = cli;

    // default to the interactive form
    let Some(command) = command else {
        return commands::chat::run(&config, verbose).await;
    };

    logging::init_stderr_logging(verbose);

    match command {
        Commands::Ask {
            prompt,
            api_key,
            model,
            raw,
        } => {
            commands::ask::run(commands::ask::AskOptions {
                prompt: &prompt,
                api_key: api_key.as_deref(),
                model: model.as_deref(),
                raw,
                config: &config,
            })
            .await
        }

        Commands::Key { command } => match command {
            KeyCommands::Save { key } => commands::key::save(&key),
            KeyCommands::Show { reveal } => commands::key::show(reveal),
            KeyCommands::Clear => commands::key::clear(),
        },

        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
            ConfigCommands::Generate => commands::config::generate(),
        },
    }
}
