//! Taskdeck - command-line client for the Taskdeck task backend
//!
//! Restores the stored session, runs one command and exits.

use clap::Parser;
use taskdeck_core::{AppDirs, ClientConfig};
use taskdeck_net::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod dashboard;
mod error;
mod render;
mod session;
mod state;

use cli::Cli;
use error::Result;
use state::AppState;

fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to create tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let dirs = match &cli.data_dir {
        Some(root) => AppDirs::rooted_at(root),
        None => AppDirs::discover()?,
    };

    let mut config = ClientConfig::load(&dirs.config_file())?.with_env_overrides();
    if let Some(url) = &cli.base_url {
        config.api.base_url = url.clone();
    }

    let state = AppState::new(config, dirs)?;
    tracing::info!(
        base_url = %state.config.api.base_url,
        data_dir = %state.dirs.data_dir.display(),
        "Starting Taskdeck"
    );

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling in-flight requests");
            watcher.cancel();
        }
    });

    let mut changes = state.session.subscribe();
    tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let session = changes.borrow_and_update().clone();
            tracing::debug!(?session, "Session changed");
        }
    });

    let session = state.session.init(&cancel).await?;
    tracing::debug!(
        authenticated = session.is_authenticated(),
        loading = session.is_loading(),
        "Session restored"
    );

    commands::execute(&state, cli.command, &cancel).await
}
