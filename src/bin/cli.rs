use anyhow::Context;
use clap::{Parser, Subcommand};
use scopex::{
    agent::ChatAgent,
    config::AppConfig,
    db,
    mcp::{RmcpConnector, ToolClientBuilder, ToolReconciler},
    models::{McpServerInput, McpServerView, DEFAULT_TIMEOUT_SECS},
    repositories::{McpServerRepository, SqliteMcpServerRepository},
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "scopex-cli")]
#[command(about = "CLI tool for managing ScopeX MCP servers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// MCP server management commands
    Mcp {
        #[command(subcommand)]
        command: McpCommands,
    },
}

#[derive(Subcommand)]
enum McpCommands {
    /// List all MCP servers
    List,

    /// Add an MCP server
    Add {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Transport kind: stdio, streamable-http or sse
        #[arg(short, long, default_value = "streamable-http")]
        transport: String,

        /// Endpoint URL (streamable-http and sse)
        #[arg(short, long)]
        url: Option<String>,

        /// Executable to launch (stdio)
        #[arg(short, long)]
        command: Option<String>,

        /// Argument passed to the command; repeat for several
        #[arg(long = "arg")]
        args: Vec<String>,

        /// Handshake timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        timeout: i64,

        /// Store the server disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Remove an MCP server
    Remove {
        /// Id of the server to remove
        #[arg(short, long)]
        id: i64,
    },

    /// Connect to every enabled server and print its tools
    Catalog,
}

fn print_server(server: &McpServerView) {
    let endpoint = server
        .url
        .as_deref()
        .or(server.command.as_deref())
        .unwrap_or("-");
    println!(
        "{:<5} {:<24} {:<16} {:<8} {}",
        server.id,
        server.name,
        server.transport,
        if server.enabled { "yes" } else { "no" },
        endpoint
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    // Connect to database
    let pool = db::create_pool(&config.database_url)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;

    // Run migrations
    db::run_migrations(&pool)
        .await
        .context("failed to run migrations")?;

    let repository = Arc::new(SqliteMcpServerRepository::new(pool.clone()));

    // Parse CLI arguments
    let cli = Cli::parse();

    match cli.command {
        Commands::Mcp { command } => match command {
            McpCommands::List => {
                let servers = repository.list_all().await?;

                if servers.is_empty() {
                    println!("No MCP servers found");
                } else {
                    println!(
                        "{:<5} {:<24} {:<16} {:<8} ENDPOINT",
                        "ID", "NAME", "TRANSPORT", "ENABLED"
                    );
                    for server in servers {
                        print_server(&McpServerView::from(server));
                    }
                }
            }

            McpCommands::Add {
                name,
                transport,
                url,
                command,
                args,
                timeout,
                disabled,
            } => {
                let input = McpServerInput {
                    name,
                    transport,
                    url,
                    command,
                    args: Some(args),
                    env: None,
                    headers: None,
                    timeout: Some(timeout),
                    enabled: !disabled,
                };

                if let Err(msg) = input.validate() {
                    eprintln!("❌ {}", msg);
                    std::process::exit(1);
                }

                match repository.create(&input).await {
                    Ok(server) => {
                        println!("✅ MCP server added!");
                        println!("  ID: {}", server.id);
                        println!("  Name: {}", server.name);
                        println!("  Transport: {}", server.transport);
                        println!("  Restart the server or POST /scopex/mcps/reload to attach it");
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to add MCP server: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            McpCommands::Remove { id } => match repository.delete(id).await {
                Ok(true) => println!("✅ MCP server {} removed", id),
                Ok(false) => {
                    eprintln!("❌ MCP server not found: {}", id);
                    std::process::exit(1);
                }
                Err(err) => {
                    eprintln!("❌ Failed to remove MCP server: {}", err);
                    std::process::exit(1);
                }
            },

            McpCommands::Catalog => {
                let agent = Arc::new(ChatAgent::new(
                    &config.agent_id,
                    &config.agent_name,
                    &config.model_provider,
                ));
                let reconciler = ToolReconciler::new(
                    repository,
                    ToolClientBuilder::new(Arc::new(RmcpConnector::new())),
                    agent,
                );

                let report = reconciler
                    .probe_catalog()
                    .await
                    .context("failed to read MCP servers")?;

                for server in &report.servers {
                    println!(
                        "{} [{}] ({} tools)",
                        server.server_name,
                        server.server_id,
                        server.tools.len()
                    );
                    for tool in &server.tools {
                        println!("  - {}: {}", tool.name, tool.description);
                    }
                }
                for failure in &report.errors {
                    eprintln!(
                        "❌ {} ({}): {}",
                        failure.server_name, failure.server_id, failure.message
                    );
                }
            }
        },
    }

    Ok(())
}
