//! # mcp-loop
//!
//! An iterative agent loop: a language model picks one MCP tool call (or a
//! final answer) per iteration, the call runs over the server's stdio and
//! its result is folded back into the next prompt.
//!
//! ## Modules
//!
//! - [`domain`] - tool descriptors, directives and session state
//! - [`application`] - the agent loop and the tool-provider side
//! - [`infrastructure`] - HTTP model clients
//! - [`config`] - `client.toml` loading and validation
//! - [`logging`] - tracing subscriber setup

pub mod application;
pub mod cli;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod logging;

use application::agent::{Agent, AgentOptions};
use application::tooling::McpProcess;
use cli::{Cli, RunMode};
use config::AppConfig;
use infrastructure::model::DynamicModelProvider;
use std::error::Error;
use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, info, warn};

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = load_effective_config(&cli)?;
    let log_file = cli.log_file.clone().or_else(|| config.logging.file.clone());
    logging::init_tracing(&config.logging.level, log_file.as_deref())?;
    info!(
        provider = %config.default_provider,
        model = %config.model,
        server = %config.server.name,
        "Configuration loaded"
    );

    let process = McpProcess::start(&config.server).await?;
    let result = run_with_process(&cli, &config, process.clone()).await;
    process.shutdown().await;
    result
}

fn load_effective_config(cli: &Cli) -> Result<AppConfig, Box<dyn Error>> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.select(cli.provider.clone(), cli.model.clone())?;
    if let Some(max_iterations) = cli.max_iterations {
        config.agent.max_iterations = max_iterations;
    }
    if let Some(secs) = cli.model_timeout {
        config.agent.model_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = cli.tool_timeout {
        config.agent.tool_timeout = Some(Duration::from_secs(secs));
    }
    Ok(config)
}

async fn run_with_process(
    cli: &Cli,
    config: &AppConfig,
    process: McpProcess,
) -> Result<(), Box<dyn Error>> {
    let provider = Arc::new(DynamicModelProvider::from_configs(&config.providers));
    let agent = Agent::connect(provider, Arc::new(process), AgentOptions::from_config(config)).await?;
    debug!(system_prompt = agent.system_prompt(), "System prompt rendered");

    match cli.mode {
        RunMode::Prompt => println!("{}", agent.system_prompt()),
        RunMode::Tools => println!("{}", serde_json::to_string_pretty(agent.tools())?),
        RunMode::Run => {
            let query = resolve_query(cli, config).await?;
            let outcome = agent.run(query).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}

/// `--prompt-file`, then positional words, then `query` from the config,
/// then piped stdin.
async fn resolve_query(cli: &Cli, config: &AppConfig) -> Result<String, Box<dyn Error>> {
    if let Some(path) = &cli.prompt_file {
        info!(path = %path.display(), "Loading query from file");
        return non_empty(tokio::fs::read_to_string(path).await?);
    }
    if !cli.query.is_empty() {
        return non_empty(cli.query.join(" "));
    }
    if let Some(query) = &config.query {
        info!("Using query from configuration");
        return non_empty(query.clone());
    }
    if !io::stdin().is_terminal() {
        info!("Reading query from standard input");
        return read_query(tokio::io::stdin()).await;
    }

    warn!("Query not provided via arguments, file, config or stdin");
    Err("query required via arguments, --prompt-file, config or stdin".into())
}

async fn read_query<R: AsyncRead + Unpin>(mut reader: R) -> Result<String, Box<dyn Error>> {
    let mut buffer = String::new();
    reader.read_to_string(&mut buffer).await?;
    non_empty(buffer)
}

fn non_empty(query: String) -> Result<String, Box<dyn Error>> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err("query is empty".into());
    }
    Ok(trimmed.to_string())
}
