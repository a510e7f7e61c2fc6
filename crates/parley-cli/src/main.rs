//! Parley CLI — entry point.
//!
//! # Commands
//!
//! - `parley chat [-m MESSAGE] [--name N] [--prompt FILE] [--intro FILE] [--session ID]`
//!   — talk to a prompt-bound agent (single-shot or REPL)
//! - `parley onboard` — write a default config plus sample prompt/intro files
//! - `parley status` — show configuration and provider status

mod helpers;
mod onboard;
mod repl;
mod status;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use parley_agent::Agent;
use parley_core::config::{load_config, Config};
use parley_core::session::SessionManager;
use parley_core::utils::expand_home;
use parley_providers::{create_provider, LlmRequestConfig};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Parley — prompt-driven conversation practice with a local or hosted LLM
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with an agent (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        #[command(flatten)]
        agent: AgentArgs,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Initialize configuration and sample prompt files
    Onboard,

    /// Show configuration and provider status
    Status,
}

/// Per-run overrides of the `agent` config section.
#[derive(clap::Args, Debug, Default)]
struct AgentArgs {
    /// Agent name (used in logs and as the default session id)
    #[arg(long)]
    name: Option<String>,

    /// System prompt file
    #[arg(long)]
    prompt: Option<String>,

    /// Intro messages file (JSON object)
    #[arg(long)]
    intro: Option<String>,

    /// Session identifier
    #[arg(short, long)]
    session: Option<String>,
}

impl AgentArgs {
    fn apply(self, config: &mut Config) {
        if let Some(name) = self.name {
            config.agent.name = name;
        }
        if let Some(prompt) = self.prompt {
            config.agent.prompt_file = prompt;
        }
        if let Some(intro) = self.intro {
            config.agent.intro_file = Some(intro);
        }
        if let Some(session) = self.session {
            config.agent.session_id = Some(session);
        }
    }
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            agent,
            logs,
        } => {
            init_logging(logs);
            run_chat(message, agent).await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(message: Option<String>, args: AgentArgs) -> Result<()> {
    let mut config = load_config(None);
    args.apply(&mut config);
    let agent = build_agent(&config)?;

    match message {
        Some(msg) => {
            info!(agent = agent.name(), session = agent.session_id(), "processing single message");
            let response = agent
                .chat_with_history(&msg)
                .await
                .context("chat request failed")?;
            helpers::print_response(agent.name(), &response);
        }
        None => repl::run(agent).await?,
    }

    Ok(())
}

/// Build an [`Agent`] from the loaded configuration.
pub fn build_agent(config: &Config) -> Result<Agent> {
    let model = &config.model.model;
    let provider = create_provider(model, &config.providers.to_map())
        .with_context(|| format!("no usable provider for model '{model}'"))?;

    let sessions = if config.sessions.persist {
        SessionManager::persistent(None).context("failed to open session store")?
    } else {
        SessionManager::in_memory()
    };

    let agent_cfg = &config.agent;
    let mut builder = Agent::builder(
        agent_cfg.name.clone(),
        expand_home(&agent_cfg.prompt_file),
        Arc::new(provider),
    )
    .model(model.clone())
    .request_config(LlmRequestConfig {
        max_tokens: config.model.max_tokens,
        temperature: config.model.temperature,
    })
    .sessions(Arc::new(sessions))
    .max_history(config.sessions.max_messages);

    if let Some(intro) = &agent_cfg.intro_file {
        builder = builder.intro_file(expand_home(intro));
    }
    if let Some(session_id) = &agent_cfg.session_id {
        builder = builder.session_id(session_id.clone());
    }

    builder
        .build()
        .with_context(|| format!("failed to load agent '{}' (try `parley onboard`)", agent_cfg.name))
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("parley=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
