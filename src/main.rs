use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use peacenet::gemini::{ApiKeyManager, GeminiError, KeySource};
use peacenet::{App, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "peacenet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Catalog JSON file to use instead of the configured one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Talk to the PeaceNet AI support companion
    Chat,
    /// Work through an educational chapter
    Learn {
        /// Module id
        #[arg(short, long)]
        module: Option<u32>,
        /// Chapter id
        #[arg(short, long)]
        chapter: Option<u32>,
    },
    /// List learning modules and chapters
    Modules,
    /// List Gemini models available to your API key
    Models,
    /// Manage the stored Gemini API key
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Store an API key in the system keyring
    SetKey {
        /// Gemini API key
        key: String,
    },
    /// Show which key would be used
    Status,
    /// Remove the stored key
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they stay out of the console transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "peacenet=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Auth { action }) = &cli.command {
        return run_auth(action);
    }

    let config = Config::load()?;
    let app = App::new(config, cli.catalog)?;

    match cli.command {
        Some(Commands::Learn { module, chapter }) => app.run_learn(module, chapter).await?,
        Some(Commands::Modules) => app.list_modules(),
        Some(Commands::Models) => app.list_models().await?,
        Some(Commands::Chat) | None => app.run_chat().await?,
        Some(Commands::Auth { .. }) => {}
    }

    Ok(())
}

fn run_auth(action: &AuthAction) -> Result<()> {
    match action {
        AuthAction::SetKey { key } => {
            ApiKeyManager::set_api_key(key)?;
            println!("Stored API key {}", ApiKeyManager::mask_key(key.trim()));
        }
        AuthAction::Status => match ApiKeyManager::resolve() {
            Some((key, KeySource::Environment(var))) => {
                println!("Using {} from ${}", ApiKeyManager::mask_key(&key), var);
            }
            Some((key, KeySource::Keyring)) => {
                println!("Using {} from the system keyring", ApiKeyManager::mask_key(&key));
            }
            None => println!("No API key configured"),
        },
        AuthAction::Clear => match ApiKeyManager::delete_api_key() {
            Ok(()) => println!("Removed stored API key"),
            Err(GeminiError::ApiKeyNotFound) => println!("No stored API key"),
            Err(e) => return Err(e.into()),
        },
    }
    Ok(())
}
