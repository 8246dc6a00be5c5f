use std::path::PathBuf;

use clap::Parser;

/// Chatbot: a terminal client for a streaming chat backend.
#[derive(Parser, Debug)]
#[command(name = "chatbot", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter directive override (e.g. "chatbot=debug").
    #[arg(long)]
    pub log_level: Option<String>,

    /// Backend base URL override.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Print the effective config as JSON and exit.
    #[arg(long)]
    pub print_config: bool,

    /// Check that the backend is reachable and exit.
    #[arg(long)]
    pub check: bool,

    /// Send one message without streaming, print the reply, and exit.
    #[arg(long, value_name = "PROMPT")]
    pub once: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
