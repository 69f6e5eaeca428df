//! revit-mcp: AI-assisted wall creation in Revit documents
//!
//! `revit-mcp mcp` runs the MCP server that AI assistants talk to.
//! `revit-mcp host` serves the host routes over an in-memory document.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use revit_mcp::config::{self, Config};
use revit_mcp::host::MemoryDocument;
use revit_mcp::mcp::server::McpServer;
use revit_mcp::routes;
use revit_mcp::tools::HostClient;

/// MCP server and host routes for AI-assisted wall creation in Revit.
#[derive(Parser, Debug)]
#[command(name = "revit-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "CONFIG_FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the MCP server on stdio (default)
    Mcp,
    /// Serve the host routes over an in-memory document
    Host,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber. Logs go to stderr; stdout carries MCP.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_document(cfg: &config::DocumentConfig) -> MemoryDocument {
    let mut doc = MemoryDocument::new(cfg.title.clone());
    for level in &cfg.levels {
        doc.add_level(level.clone());
    }
    for wall_type in &cfg.wall_types {
        doc.add_wall_type(wall_type.clone());
    }
    doc
}

async fn run_mcp(cfg: Config) -> Result<(), String> {
    let client = HostClient::new(&cfg.host).map_err(|e| e.to_string())?;
    info!(base_url = %client.base_url(), "Forwarding tool calls to host");

    let mut server = McpServer::new(client);
    info!("MCP server ready, waiting for client connection...");
    server.run().await.map_err(|e| e.to_string())
}

async fn run_host(cfg: Config) -> Result<(), String> {
    let addr = cfg.server.bind_addr().map_err(|e| e.to_string())?;
    let doc = build_document(&cfg.document);
    info!(
        title = %cfg.document.title,
        levels = cfg.document.levels.len(),
        wall_types = cfg.document.wall_types.len(),
        "Serving in-memory document"
    );

    let app = routes::api_router(&cfg.server.api_prefix, routes::share(doc));
    routes::serve(addr, app).await.map_err(|e| e.to_string())
}

/// Entry point for revit-mcp.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nConfig loaded from: {}", default_path.display());
                }
            }
            eprintln!("See config/example-config.json for the expected format");
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    let command = args.command.unwrap_or(Command::Mcp);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        command = ?command,
        "Starting revit-mcp"
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(async {
        match command {
            Command::Mcp => run_mcp(cfg).await,
            Command::Host => run_host(cfg).await,
        }
    });

    match result {
        Ok(()) => {
            info!("Shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
