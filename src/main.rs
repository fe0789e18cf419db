use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use agri_chat::bootstrap::SessionBootstrap;
use agri_chat::config::{API_URL_VAR, ClientConfig};
use agri_chat::events::{EXAMPLE_QUERIES, EventRelay};
use agri_chat::net::api::{AnswerService, ApiClient};
use agri_chat::net::error::ApiError;
use agri_chat::render;
use agri_chat::state::chat::{ConversationStore, SendOutcome};
use agri_chat::state::session::{ConnectivityState, StatsState};

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("failed to read input: {0}")]
    Input(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("query failed")]
    QueryFailed,
}

#[derive(Parser, Debug)]
#[command(name = "agri-chat", about = "Chat with the Project Samarth agricultural data assistant")]
struct Cli {
    #[arg(long, env = API_URL_VAR)]
    api_url: Option<String>,

    /// Request timeout in milliseconds. `SAMARTH_API_TIMEOUT_MS` is read by
    /// the config layer, where unparseable values fall back to the default.
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat session (default).
    Chat,
    /// Ask a single question and print the answer.
    Ask { query: String },
    Health,
    Stats,
    Index,
    Search { query: String },
    /// List the suggested example queries.
    Examples,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    // A missing .env file is normal.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("ignoring .env: {e}");
        }
    }
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(tracing::Level::WARN).init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env().with_overrides(cli.api_url.as_deref(), cli.timeout_ms);
    tracing::debug!(api_url = %config.api_url, timeout_ms = config.timeout_ms, "client configured");
    let service: Arc<dyn AnswerService> = Arc::new(ApiClient::new(config)?);

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(service).await,
        Command::Ask { query } => run_ask(service, &query).await,
        Command::Health => print_json(&service.health_check().await?),
        Command::Stats => print_json(&service.get_stats().await?.0),
        Command::Index => print_json(&service.trigger_indexing().await?),
        Command::Search { query } => print_json(&serde_json::to_value(service.search_datasets(&query).await?)?),
        Command::Examples => {
            print_examples();
            Ok(())
        }
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_examples() {
    for (i, query) in EXAMPLE_QUERIES.iter().enumerate() {
        println!("  {}. {query}", i + 1);
    }
}

async fn run_ask(service: Arc<dyn AnswerService>, query: &str) -> Result<(), CliError> {
    let store = ConversationStore::new(service);
    let outcome = store.send(query).await;
    if let Some(msg) = store.last_message() {
        println!("{}", render::message(&msg));
    }
    match outcome {
        SendOutcome::Failed => Err(CliError::QueryFailed),
        SendOutcome::Answered | SendOutcome::Ignored => Ok(()),
    }
}

// =============================================================================
// INTERACTIVE CHAT
// =============================================================================

/// Prints transcript entries the user has not seen yet.
struct TranscriptPrinter {
    last_shown: Option<u64>,
}

impl TranscriptPrinter {
    fn flush(&mut self, store: &ConversationStore) {
        for msg in store.transcript() {
            if self.last_shown.is_none_or(|last| msg.id > last) {
                println!("{}\n", render::message(&msg));
                self.last_shown = Some(msg.id);
            }
        }
    }
}

async fn run_chat(service: Arc<dyn AnswerService>) -> Result<(), CliError> {
    let bootstrap = SessionBootstrap::new(Arc::clone(&service), ConnectivityState::new(), StatsState::new());
    let startup = bootstrap.start();
    drop(startup.stats);
    let store = ConversationStore::with_stats_refresh(service, bootstrap.stats_refresh_hook());
    let relay = EventRelay::new();
    let subscription = relay.attach(&store);

    println!("Project Samarth: agricultural & climate data assistant");
    println!("Type a question, or /help for commands.\n");

    let mut printer = TranscriptPrinter { last_shown: None };
    printer.flush(&store);

    let health = tokio::spawn(async move {
        if let Ok(connected) = startup.health.await {
            println!("({})\n", render::connectivity(connected));
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("/quit" | "/exit", _) => break,
            ("/help", _) => print_help(),
            ("/clear", _) => store.clear(),
            ("/examples", _) => print_examples(),
            ("/example", n) => match n.parse::<usize>().map(|n| n.checked_sub(1)) {
                Ok(Some(i)) if i < EXAMPLE_QUERIES.len() => {
                    relay.publish_example_query(EXAMPLE_QUERIES[i]);
                    tokio::task::yield_now().await;
                    store.wait_until_idle().await;
                }
                _ => println!("usage: /example <1-{}>\n", EXAMPLE_QUERIES.len()),
            },
            ("/stats", _) => match bootstrap.stats().current() {
                Some(stats) => println!("{}\n", render::stats(&stats)),
                None => println!("statistics unavailable\n"),
            },
            ("/health", _) => {
                let connected = bootstrap.check_connection().await;
                println!("({})\n", render::connectivity(connected));
            }
            ("/index", _) => match bootstrap.trigger_indexing().await {
                Ok(_) => println!("indexing complete\n"),
                Err(e) => println!("indexing failed: {e}\n"),
            },
            (cmd, _) if cmd.starts_with('/') => println!("unknown command {cmd}; try /help\n"),
            _ => {
                store.send(line).await;
            }
        }
        printer.flush(&store);
    }

    subscription.unsubscribe().await;
    health.abort();
    Ok(())
}

fn print_help() {
    println!("  /clear        start over");
    println!("  /examples     list example queries");
    println!("  /example N    ask example query N");
    println!("  /stats        show backend statistics");
    println!("  /health       re-check the backend connection");
    println!("  /index        re-index backend data");
    println!("  /quit         exit\n");
}
