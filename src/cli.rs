use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "mcp-loop",
    version,
    about = "Iterative tool-calling agent over an MCP stdio server"
)]
pub struct Cli {
    /// Path to client.toml
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Provider id from `[[providers]]`, overrides `default_provider`
    #[arg(long)]
    pub provider: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub max_iterations: Option<usize>,
    /// Model call deadline in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub model_timeout: Option<u64>,
    /// Per tool call deadline in seconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub tool_timeout: Option<u64>,
    /// Read the task from a file instead of the command line
    #[arg(long)]
    pub prompt_file: Option<PathBuf>,
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = RunMode::Run)]
    pub mode: RunMode,
    /// Task for the agent
    #[arg()]
    pub query: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RunMode {
    /// Run one session and print the outcome as JSON
    Run,
    /// Print the discovered tools
    Tools,
    /// Print the rendered system prompt
    Prompt,
}
