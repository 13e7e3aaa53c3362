use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use serde_json::{Map, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use flowrun_core::config::AppConfig;
use flowrun_core::traits::WorkflowStore;
use flowrun_core::types::{ConditionInput, RunStatus};
use flowrun_core::ExecutionState;
use flowrun_engine::{HandlerRegistry, WorkflowEngine};
use flowrun_store::SqliteStore;
use flowrun_weather::OpenMeteoClient;

#[derive(Parser)]
#[command(name = "flowrun", version, about = "Weather-alert workflow engine")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "flowrun.toml", env = "FLOWRUN_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve,
    /// Execute a stored workflow once and print the results
    Run {
        /// Workflow id
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        city: String,
        /// greater_than, less_than, equals, greater_than_or_equal, less_than_or_equal
        #[arg(long, default_value = "greater_than")]
        operator: String,
        #[arg(long, default_value_t = 25.0)]
        threshold: f64,
    },
    /// Print a stored workflow definition
    Show {
        /// Workflow id
        id: String,
    },
    /// Insert the sample workflow if it is missing
    Seed,
    /// Show current configuration
    Config,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("flowrun=info,warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    // Handle completions before config loading
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "flowrun", &mut std::io::stdout());
        return Ok(());
    }

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
        Commands::Seed => {
            let store = open_store(&config)?;
            if store.seed()? {
                println!("Sample workflow seeded");
            } else {
                println!("Sample workflow already present");
            }
        }
        Commands::Show { id } => {
            let store = open_store(&config)?;
            let workflow = store
                .get(&id)
                .await?
                .with_context(|| format!("workflow {} not found", id))?;
            println!("{}", serde_json::to_string_pretty(&workflow)?);
        }
        Commands::Run {
            id,
            name,
            email,
            city,
            operator,
            threshold,
        } => {
            let store = open_store(&config)?;
            if config.store.seed {
                store.seed()?;
            }
            let workflow = store
                .get(&id)
                .await?
                .with_context(|| format!("workflow {} not found", id))?;

            let mut form = Map::new();
            form.insert("name".into(), Value::String(name));
            form.insert("email".into(), Value::String(email));
            form.insert("city".into(), Value::String(city));
            let state = ExecutionState::new(form, ConditionInput::new(operator, threshold));

            let engine = build_engine(&config)?;
            let results = engine.execute(&workflow, state).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);

            if results.status == RunStatus::Failed {
                warn!(execution_id = %results.execution_id, "Workflow run failed");
            }
        }
        Commands::Serve => {
            let store = open_store(&config)?;
            if config.store.seed {
                store.seed()?;
            }
            let engine = Arc::new(build_engine(&config)?);
            let store: Arc<dyn WorkflowStore> = Arc::new(store);

            info!(bind = %config.gateway.bind, "Starting HTTP gateway");
            let server = flowrun_gateway::GatewayServer::new(config.gateway.clone(), engine, store);
            let cancel = tokio_util::sync::CancellationToken::new();
            let cancel_clone = cancel.clone();

            // Graceful shutdown on Ctrl-C
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                info!("Shutting down gateway...");
                cancel_clone.cancel();
            });

            server.run(cancel).await?;
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

fn open_store(config: &AppConfig) -> anyhow::Result<SqliteStore> {
    let path = config.store_path();
    SqliteStore::open(&path).with_context(|| format!("opening store {}", path.display()))
}

fn build_engine(config: &AppConfig) -> anyhow::Result<WorkflowEngine> {
    let weather = OpenMeteoClient::new(&config.weather)?;
    let registry = HandlerRegistry::with_builtins(Arc::new(weather));
    info!(handlers = ?registry.list(), "Handler registry ready");
    Ok(WorkflowEngine::new(Arc::new(registry)).with_max_steps(config.engine.max_steps))
}
