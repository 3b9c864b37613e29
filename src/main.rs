use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};

use flowlens::api::InsightResponse;
use flowlens::client::DashboardClient;
use flowlens::config::Config;
use flowlens::page::{load_workflow_page, PageOutcome};
use flowlens::telemetry::{init_telemetry, shutdown_telemetry, OtelConfig};

#[derive(Parser)]
#[command(name = "flowlens")]
#[command(about = "Workflow validation insights for dashboard apps", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a config file (default: ~/.config/flowlens/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the report server (HTML dashboard + JSON API)
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Dashboard API base URL
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Print one workflow's validation report
    Report {
        /// Application identifier
        app_id: String,
        /// Workflow file name
        workflow_id: String,
        /// Print the JSON report instead of text
        #[arg(long)]
        json: bool,
        /// Dashboard API base URL
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let provider = init_telemetry(&OtelConfig::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load_with(std::path::Path::new(path)),
        None => Config::load(),
    };

    let result = match cli.command {
        Commands::Serve {
            port,
            host,
            base_url,
        } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(base_url) = base_url {
                config.upstream.base_url = base_url;
            }
            cmd_serve(&config).await
        }
        Commands::Report {
            app_id,
            workflow_id,
            json,
            base_url,
        } => {
            if let Some(base_url) = base_url {
                config.upstream.base_url = base_url;
            }
            cmd_report(&config, &app_id, &workflow_id, json).await
        }
        Commands::Completions { shell } => cmd_completions(shell),
    };

    shutdown_telemetry(provider);
    result
}

/// Shell completion variants
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum CompletionShell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::PowerShell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

fn cmd_completions(shell: CompletionShell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    let shell: Shell = shell.into();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
    Ok(())
}

fn build_client(config: &Config) -> anyhow::Result<DashboardClient> {
    Ok(DashboardClient::new(
        config.upstream.base_url.clone(),
        config.upstream.timeout(),
    )?)
}

// ============================================================================
// Report Command
// ============================================================================

async fn cmd_report(
    config: &Config,
    app_id: &str,
    workflow_id: &str,
    json: bool,
) -> anyhow::Result<()> {
    let client = build_client(config)?;
    match load_workflow_page(&client, app_id, workflow_id).await {
        PageOutcome::Report(report) => {
            if json {
                let body = InsightResponse::new(&report);
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                print!("{}", flowlens::report::render_text(&report));
            }
            Ok(())
        }
        PageOutcome::ListingFailed { app_id } => {
            anyhow::bail!("Error loading workflows (AppId: {})", app_id)
        }
        PageOutcome::ValidationFailed { workflow_id } => {
            anyhow::bail!("Validation failed: {}", workflow_id)
        }
        PageOutcome::NotFound {
            app_id,
            workflow_id,
        } => anyhow::bail!("Workflow '{}' not found for app '{}'", workflow_id, app_id),
    }
}

// ============================================================================
// Server Command
// ============================================================================

async fn cmd_serve(config: &Config) -> anyhow::Result<()> {
    use flowlens::api::{create_router, AppState};

    flowlens::metrics::init_metrics();

    let client = build_client(config)?;
    let app = create_router(AppState::new(client));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("flowlens server running on http://{}", addr);
    println!();
    println!("Upstream dashboard API: {}", config.upstream.base_url);
    println!();
    println!("Endpoints:");
    println!("  GET  /apps/:app_id/workflows/:workflow_id  (HTML report)");
    println!("  GET  /api/insights/:app_id/:workflow_id    (JSON report)");
    println!("  GET  /api/health");
    println!("  GET  /api/metrics");
    println!();
    println!("Press Ctrl+C to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    println!("\nShutting down gracefully...");
}
