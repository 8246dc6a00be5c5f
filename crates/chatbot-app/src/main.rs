mod cli;
mod console;
mod event_log;
mod render;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use chatbot_ai::{BackendClient, BackendConfig, ChatClient, ChatSession, Message};
use chatbot_common::{ChatbotError, Event, EventBus};
use chatbot_config::ChatbotConfig;
use chrono::Utc;
use tracing_subscriber::EnvFilter;

use crate::console::Console;

const DEFAULT_LOG_DIRECTIVE: &str = "chatbot=info";

fn init_logging(directive: &str) {
    // RUST_LOG wins when set; a malformed directive falls back to the default.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn load_config(args: &cli::Args) -> Result<ChatbotConfig, ChatbotError> {
    let config = chatbot_config::load_config(args.config.as_deref(), args.base_url.clone())?;
    Ok(config)
}

/// The conversation's opening messages: the greeting, if configured.
fn initial_messages(greeting: &str) -> Vec<Message> {
    if greeting.is_empty() {
        return Vec::new();
    }
    vec![Message::assistant(greeting).with_timestamp(Utc::now())]
}

fn build_client(config: &ChatbotConfig) -> Result<BackendClient, ChatbotError> {
    let backend = BackendConfig::new(&config.api.base_url)
        .with_connect_timeout(Duration::from_secs(config.api.connect_timeout_secs.into()))
        .with_request_timeout(Duration::from_secs(config.api.request_timeout_secs.into()));
    BackendClient::new(backend).map_err(|e| ChatbotError::Network(e.to_string()))
}

async fn run(args: cli::Args, config: ChatbotConfig) -> Result<(), ChatbotError> {
    if args.print_config {
        println!("{}", chatbot_config::config_to_json(&config));
        return Ok(());
    }

    let client = Arc::new(build_client(&config)?);
    tracing::info!("Backend: {}", client.config().base_url);

    if args.check {
        client
            .health_check()
            .await
            .map_err(|e| ChatbotError::Network(e.to_string()))?;
        println!("backend at {} is healthy", client.config().base_url);
        return Ok(());
    }

    if let Some(prompt) = args.once {
        let reply = client
            .send_message(&[Message::user(prompt)])
            .await
            .map_err(|e| ChatbotError::Ai(e.to_string()))?;
        println!("{reply}");
        return Ok(());
    }

    if let Err(e) = client.health_check().await {
        tracing::warn!("Backend health check failed: {e}");
    }

    let events = Arc::new(EventBus::default());
    let event_log = event_log::spawn(&events);
    let session = Arc::new(
        ChatSession::new(client)
            .with_event_bus(events.clone())
            .with_initial_messages(initial_messages(&config.chat.greeting)),
    );
    tracing::info!(session = %session.id(), "Session started");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut console = Console::new(
        session,
        config.chat.max_input_chars as usize,
        std::io::stdout(),
    );
    console.run(stdin).await?;

    events.publish(Event::Shutdown);
    if let Err(e) = event_log.await {
        tracing::warn!("Event log task failed: {e}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine.
    let dotenv = dotenvy::dotenv();

    let args = cli::parse();
    let config = load_config(&args);

    let directive = match (&args.log_level, &config) {
        (Some(level), _) => level.clone(),
        (None, Ok(config)) => config.logging.directive(),
        (None, Err(_)) => DEFAULT_LOG_DIRECTIVE.to_string(),
    };
    init_logging(&directive);

    tracing::info!("Chatbot v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Config load failed: {e}");
            eprintln!("chatbot: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(args, config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("chatbot: {e}");
            ExitCode::FAILURE
        }
    }
}
