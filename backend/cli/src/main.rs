mod runtime;
mod terminal_output;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info, warn};

use moodline_config::{config_file_path, validate, MoodlineConfig};
use moodline_gateway::{build_router, start_server};
use moodline_logging::init_logger;
use moodline_scheduler::BroadcastScheduler;

use terminal_output::{note_error, note_info, note_success, note_warn, report_line, summary_table, supports_color};

#[derive(Parser)]
#[command(name = "moodline")]
#[command(about = "Moodline: daily mood tracking over LINE")]
#[command(version)]
struct Cli {
    /// Config file (defaults to $MOODLINE_CONFIG, then ./moodline.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Keep users and moods in memory only; nothing is written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server and the feeling-check scheduler
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Push the feeling-check prompt to every registered user once
    Check,
    /// Print the daily mood summaries
    Summary {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = config_file_path(cli.config.as_deref());
    let mut config = match moodline_config::load_and_prepare(&path).await {
        Ok(config) => config,
        Err(e) => {
            note_error(&format!("Failed to load {}: {e:#}", path.display()));
            return Err(e);
        }
    };
    init_logger(&runtime::log_options(&config));
    for warning in validate(&config).warnings {
        warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    if cli.ephemeral {
        runtime::use_memory_store(&mut config);
    }

    match cli.command {
        Commands::Serve { port } => run_server(config, port).await,
        Commands::Check => run_check(&config).await,
        Commands::Summary { json } => run_summary(&config, json).await,
    }
}

async fn run_server(config: MoodlineConfig, port: Option<u16>) -> Result<()> {
    if config.channel_secret().is_empty() {
        bail!("line.channelSecret (or LINE_CHANNEL_SECRET) is required to verify webhooks");
    }

    let ip: IpAddr = config
        .bind()
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.bind()))?;
    let addr = SocketAddr::new(ip, port.unwrap_or(config.port()));
    info!(
        addr = %addr,
        storage = ?config.storage_backend(),
        webhook = config.webhook_path(),
        "Starting Moodline"
    );

    let service = Arc::new(runtime::build_service(&config)?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            return;
        }
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let scheduler_task = match config.broadcast_schedule() {
        Some(expr) => {
            let scheduler = BroadcastScheduler::new(expr, service.broadcaster())?;
            let rx = shutdown_rx.clone();
            Some(tokio::spawn(async move { scheduler.run(wait_for_shutdown(rx)).await }))
        }
        None => {
            warn!("No broadcast schedule configured; feeling checks run only via `moodline check`");
            None
        }
    };

    let app = build_router(service, runtime::line_config(&config));
    start_server(addr, app, wait_for_shutdown(shutdown_rx)).await?;

    if let Some(task) = scheduler_task {
        if let Err(e) = task.await {
            error!(error = %e, "Scheduler task panicked");
        }
    }
    Ok(())
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow_and_update() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

async fn run_check(config: &MoodlineConfig) -> Result<()> {
    if config.channel_token().is_empty() {
        bail!("line.channelToken (or LINE_CHANNEL_TOKEN) is required to push messages");
    }

    let service = runtime::build_service(config)?;
    let report = service.broadcast_feeling_check().await?;
    if report.failed == 0 {
        note_success(&report_line(&report));
    } else {
        note_warn(&report_line(&report));
        for failure in &report.failures {
            note_warn(&format!("  {}: {}", failure.external_user_id, failure.error));
        }
    }
    Ok(())
}

async fn run_summary(config: &MoodlineConfig, json: bool) -> Result<()> {
    let service = runtime::build_service(config)?;
    let summaries = service.compute_daily_summaries().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else if summaries.is_empty() {
        note_info("No moods logged yet");
    } else {
        print!("{}", summary_table(&summaries, supports_color()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_config_after_subcommand() {
        let cli = Cli::parse_from(["moodline", "serve", "--port", "9000", "--config", "m.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("m.yaml")));
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000) }));
        assert!(!cli.ephemeral);

        let cli = Cli::parse_from(["moodline", "--ephemeral", "summary", "--json"]);
        assert!(cli.ephemeral);
        assert!(matches!(cli.command, Commands::Summary { json: true }));
    }

    #[tokio::test]
    async fn shutdown_waiter_resolves_on_signal() {
        let (tx, rx) = watch::channel(false);
        let waiter = tokio::spawn(wait_for_shutdown(rx));
        tx.send(true).unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }
}
