//! cronpoke entry point.
//!
//! Binary name: `cronpoke`
//!
//! Parses CLI arguments (with environment fallbacks), initializes tracing,
//! then either hosts the cron scheduler until interrupted (`run`) or fires
//! a single trigger (`once`).

mod cli;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use cronpoke_core::scheduler::{TickCallback, TriggerScheduler};
use cronpoke_core::trigger::TriggerRunner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity. Outcome logs are info/warn/error,
    // so the default filter keeps them visible.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,cronpoke=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run { schedule, target } => {
            let config = target.into_config(schedule);
            let runner = Arc::new(TriggerRunner::new(config.clone()));

            let scheduler = TriggerScheduler::new();
            scheduler.start().await?;

            let callback: TickCallback = Arc::new(move |_fired_at| {
                let runner = runner.clone();
                Box::pin(async move {
                    runner.run_once().await;
                })
            });
            scheduler.schedule(&config.schedule, callback).await?;

            if !cli.quiet {
                println!(
                    "  {} cronpoke armed: POST {} on '{}'",
                    console::style("⏱").bold(),
                    console::style(config.target_url()).cyan(),
                    console::style(&config.schedule).yellow(),
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            shutdown_signal().await;
            tracing::info!("shutdown signal received, stopping scheduler");
            scheduler.stop().await?;

            if !cli.quiet {
                println!("\n  Scheduler stopped.");
            }
        }

        Commands::Once { target } => {
            let config = target.into_config(String::new());
            let runner = TriggerRunner::new(config);
            let outcome = runner.run_once().await;

            // Outcomes are log lines, not exit codes; `once` always exits 0.
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
        }
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
