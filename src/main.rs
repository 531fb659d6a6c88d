// ABOUTME: Entry point for the testsmith binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and either serves the HTTP API or runs one generation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use testsmith_core::GenerateRequest;
use testsmith_server::{AppState, ServerConfig, create_router};

#[derive(Parser)]
#[command(name = "testsmith")]
#[command(about = "Generate Gherkin features, browser scripts and manual test cases with LLMs")]
struct Cli {
    /// Artifact root; overrides TESTSMITH_HOME
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API (the default)
    Serve {
        /// Address to bind; overrides TESTSMITH_BIND
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Run a single generation and print the result
    Generate {
        /// Artifact kind: gherkin, selenium, playwright, cypress, behave, chat,
        /// manual_testcases or manual_planning
        #[arg(long)]
        agent: String,
        #[arg(long)]
        requirement: String,
        /// File name for the saved feature or script
        #[arg(long)]
        name: Option<String>,
        /// Improvement passes (1-3)
        #[arg(long)]
        iterations: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "testsmith=debug,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env().context("invalid configuration")?;
    if let Some(home) = cli.home {
        config.home = home;
    }

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            serve(config).await
        }
        Command::Generate {
            agent,
            requirement,
            name,
            iterations,
        } => {
            let request = GenerateRequest {
                feature_name: name.clone(),
                test_name: name,
                iterations,
                ..GenerateRequest::new(agent, requirement)
            };
            generate_once(config, request).await
        }
    }
}

async fn serve(config: ServerConfig) -> Result<()> {
    let state = Arc::new(AppState::from_config(&config)?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!(addr = %config.bind, "testsmith listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn generate_once(config: ServerConfig, request: GenerateRequest) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let result = state.router.route(request).await;

    if !result.is_success() {
        bail!(result.message);
    }
    if let Some(content) = &result.content {
        println!("{content}");
    }
    if let Some(path) = result.feature_file.as_ref().or(result.file_path.as_ref()) {
        tracing::info!(path = %path, "artifact saved");
    }
    tracing::info!(message = %result.message, "generation finished");
    Ok(())
}
