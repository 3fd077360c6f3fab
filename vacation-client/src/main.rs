use clap::Parser;
use client_core::observability::init_tracing;
use std::sync::Arc;
use vacation_client::cli::{run, Cli, TerminalNavigator};
use vacation_client::config::get_configuration;
use vacation_client::navigation::spawn_navigation_listener;
use vacation_client::AppContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing("vacation", &configuration.log_level);

    let context = AppContext::new(&configuration)?;
    let listener = spawn_navigation_listener(
        context.session.subscribe(),
        Arc::new(TerminalNavigator),
    );

    let outcome = run(&context, cli.command).await;

    // Closing the event channel lets the listener flush pending redirects.
    drop(context);
    if let Err(e) = listener.await {
        tracing::error!("Navigation listener failed: {}", e);
    }

    outcome
}
