use clap::Parser;
use mcp_loop::cli::Cli;
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    mcp_loop::run(Cli::parse()).await
}
