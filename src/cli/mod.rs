//! Command-line interface parsing and handling
//!
//! This module parses arguments, resolves session settings and dispatches to
//! the chat loop or one of the one-shot commands.

pub mod ask;
pub mod chat_loop;
pub mod library_commands;
pub mod strategy_list;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Parser, Subcommand};

use crate::api::transport::{HttpTransport, Transport};
use crate::cli::ask::run_ask;
use crate::cli::chat_loop::run_chat;
use crate::cli::library_commands::{
    add_library, list_libraries, remove_libraries, show_library, update_library, AddArgs,
    UpdateArgs,
};
use crate::cli::strategy_list::{list_models, list_strategies};
use crate::core::config::{Config, SettingsOverrides};
use crate::core::constants::BACKEND_URL_ENV;
use crate::core::session::SessionSettings;
use crate::core::version::VersionToken;
use crate::utils::logging::init_tracing;

#[derive(Parser)]
#[command(name = "local-reason", version)]
#[command(about = "Chat with a local model, grounded in your own reference libraries")]
#[command(
    long_about = "local-reason is a terminal client for a local retrieval backend. It keeps a \
set of reference libraries (pasted text or URLs) on the backend, lets you pick which ones \
ground each answer, and sends prompts through one of four answering strategies.\n\n\
Strategies:\n\
  plain      Prompt only, no library context\n\
  pipeline   LLM extraction pass, then answer\n\
  rag        Chunk retrieval, then answer (default)\n\
  rag-2      Chunk retrieval, LLM condensation, then answer\n\n\
Environment Variables:\n\
  LOCAL_REASON_BACKEND_URL   Backend base URL (overrides config.toml)\n\
  RUST_LOG                   Diagnostic log filter (overrides -v)\n\n\
Commands in chat:\n\
  /help             Show all commands\n\
  /select <ids>     Choose libraries for the next prompts\n\
  /strategy <name>  Switch answering strategy\n\
  /log <filename>   Enable logging to specified file"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL (e.g., http://localhost:8000)
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Model to answer with
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Answering strategy: plain, pipeline, rag, rag-2 (or 0-3)
    #[arg(short = 's', long, global = true, value_name = "STRATEGY", value_parser = parse_strategy)]
    pub strategy: Option<VersionToken>,

    /// Enable logging to specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// Read settings from this file instead of the default config.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive chat (default)
    Chat,
    /// Send one prompt and print the answer
    Ask {
        /// Library id to ground the answer in (repeatable)
        #[arg(short = 'L', long = "library", value_name = "ID")]
        libraries: Vec<i64>,
        /// Also print the intermediate analysis from two-stage strategies
        #[arg(long)]
        analysis: bool,
        /// The prompt; multiple words are joined with spaces
        #[arg(required = true, trailing_var_arg = true)]
        prompt: Vec<String>,
    },
    /// List libraries stored on the backend
    Libraries,
    /// Show one library in full
    Show { id: i64 },
    /// Create a library from pasted text or a URL
    Add(AddArgs),
    /// Change fields of an existing library
    Update(UpdateArgs),
    /// Delete one or more libraries
    Remove {
        #[arg(required = true, value_name = "ID")]
        ids: Vec<i64>,
    },
    /// List answering strategies and their endpoints
    Strategies,
    /// List recommended models
    Models,
}

fn parse_strategy(value: &str) -> Result<VersionToken, String> {
    value.parse().map_err(|err: crate::core::error::ClientError| err.to_string())
}

impl Args {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            backend_url: self.backend_url.clone(),
            model: self.model.clone(),
            version: self.strategy,
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let config = Config::load(args.config.as_deref())?;
    let settings = resolve_settings(&config, &args)?;
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new());

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(transport, settings, known_models(&config), args.log).await,
        Commands::Ask {
            libraries,
            analysis,
            prompt,
        } => {
            let models = known_models(&config);
            run_ask(transport, settings, models, args.log, prompt, libraries, analysis).await
        }
        Commands::Libraries => list_libraries(transport, &settings).await,
        Commands::Show { id } => show_library(transport, &settings, id).await,
        Commands::Add(add) => add_library(transport, &settings, add).await,
        Commands::Update(update) => update_library(transport, &settings, update).await,
        Commands::Remove { ids } => remove_libraries(transport, &settings, &ids).await,
        Commands::Strategies => {
            list_strategies(&settings);
            Ok(())
        }
        Commands::Models => {
            list_models(&config, &settings);
            Ok(())
        }
    }
}

/// Recommended models plus the config's `extra_models`.
fn known_models(config: &Config) -> Vec<String> {
    config.model_choices().into_iter().map(String::from).collect()
}

fn resolve_settings(config: &Config, args: &Args) -> Result<SessionSettings, Box<dyn Error>> {
    let env_backend_url = std::env::var(BACKEND_URL_ENV).ok();
    let settings = config.resolve_settings(args.overrides(), env_backend_url)?;
    Ok(settings)
}
