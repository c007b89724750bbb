//! Traced HTTP client CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   traced-client <command>
//!        │
//!        ▼
//!   ┌─────────────┐    ┌───────────────────────────────────────────┐
//!   │ EntitiesApi │───▶│            InstrumentedClient             │
//!   └─────────────┘    │  before_send ─▶ transport ─▶ after_receive │──▶ API
//!                      └──────┬──────────────────────────┬─────────┘
//!                             │                          │
//!                             ▼                          ▼
//!                   ┌───────────────────┐      ┌──────────────────┐
//!                   │ IdentifierService │      │ TracingSink      │
//!                   │  + SessionStore   │      │ (tracing events) │
//!                   └───────────────────┘      └──────────────────┘
//! ```

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;

use traced_client::client::{ClientError, EntitiesApi, NewEntity};
use traced_client::config::{load_config, validate_config, ClientConfig};
use traced_client::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "traced-client")]
#[command(about = "Call the entities API with trace ids and structured request logging", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override api.base_url.
    #[arg(short, long, env = "TRACED_CLIENT_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Entity resource
    #[command(subcommand)]
    Entities(EntityCommand),
    /// Single stored value on the backend
    #[command(subcommand)]
    Value(ValueCommand),
    /// Diagnostic endpoints
    #[command(subcommand)]
    Probe(ProbeCommand),
    /// Local session trace id
    #[command(subcommand)]
    Session(SessionCommand),
}

#[derive(Subcommand)]
enum EntityCommand {
    /// List all entities
    List,
    /// Fetch one entity
    Get { id: String },
    /// Create an entity
    Create {
        name: String,
        #[arg(default_value = "")]
        description: String,
    },
}

#[derive(Subcommand)]
enum ValueCommand {
    Get,
    Set { value: String },
    Delete,
}

#[derive(Subcommand)]
enum ProbeCommand {
    /// Endpoint answering with a random status code
    Status,
    /// Endpoint answering after a random delay
    Sleep,
    /// Endpoint that calls another service
    Chain,
}

#[derive(Subcommand)]
enum SessionCommand {
    /// Print the session trace id, creating it if needed
    Show,
    /// Forget the session trace id
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
        validate_config(&config).map_err(|errors| {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })?;
    }

    logging::init(&config.observability)?;

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    tracing::debug!(
        base_url = %config.api.base_url,
        timeout_ms = config.api.timeout_ms,
        store = ?config.session.store,
        "Configuration loaded"
    );

    let api = EntitiesApi::from_config(&config)?;

    let result = match cli.command {
        Commands::Entities(EntityCommand::List) => api.get_all().await,
        Commands::Entities(EntityCommand::Get { id }) => api.get_by_id(&id).await,
        Commands::Entities(EntityCommand::Create { name, description }) => {
            api.create(&NewEntity { name, description }).await
        }
        Commands::Value(ValueCommand::Get) => api.get_stored_value().await,
        Commands::Value(ValueCommand::Set { value }) => api.set_stored_value(&value).await,
        Commands::Value(ValueCommand::Delete) => api.delete_stored_value().await,
        Commands::Probe(ProbeCommand::Status) => api.probe_random_status().await,
        Commands::Probe(ProbeCommand::Sleep) => api.probe_random_sleep().await,
        Commands::Probe(ProbeCommand::Chain) => api.probe_chain().await,
        Commands::Session(SessionCommand::Show) => {
            let id = api.identifiers().get_or_create_session_trace_id();
            Ok(Value::String(id.into_inner()))
        }
        Commands::Session(SessionCommand::Clear) => {
            api.identifiers().clear_session_trace_id();
            Ok(Value::Null)
        }
    };

    print_result(result)
}

fn print_result(result: Result<Value, ClientError>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match result {
        Ok(Value::Null) => Ok(ExitCode::SUCCESS),
        Ok(body) => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(ClientError::Transport(e)) => {
            match e.status {
                Some(status) => eprintln!("Error: API returned status {}", status),
                None => eprintln!("Error: {}", e.message),
            }
            if let Some(data) = e.data.filter(|d| !d.is_null()) {
                eprintln!("Response: {}", serde_json::to_string_pretty(&data)?);
            }
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}
