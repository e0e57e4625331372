//! FarmIQ CLI and REST API entry point.
//!
//! Binary name: `farmiq`
//!
//! Parses CLI arguments, loads configuration, then dispatches to the
//! command handler or composes the services and starts the REST API.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use console::style;
use farmiq_observe::{LogOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::{AppState, load_app_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions need neither logging nor configuration
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "farmiq", &mut std::io::stdout());
        return Ok(());
    }

    if let Commands::Seed { dry_run: true } = &cli.command {
        return cli::seed::dry_run(cli.json);
    }

    init_tracing(&LogOptions {
        verbosity: cli.verbose,
        json: cli.json,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_app_config(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let state = AppState::init(&config).await?;

            let host = host.unwrap_or_else(|| config.service.host.clone());
            let port = port.unwrap_or(config.service.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            tracing::info!(%addr, "FarmIQ API listening");
            println!(
                "  {} FarmIQ API listening on {}",
                style("⚡").bold(),
                style(format!("http://{addr}")).cyan()
            );
            println!("  {}", style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Seed { .. } => cli::seed::seed(&config, cli.json).await?,

        Commands::Skills => cli::skills::list_skills(&config, cli.json)?,

        Commands::CheckConfig => cli::check::check_config(&config, cli.json)?,

        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
