use anyhow::Result;
use clap::Parser;

use sshwatch_core::config::WatcherConfig;
use sshwatch_daemon::cli::DaemonCli;
use sshwatch_daemon::logging::init_tracing;
use sshwatch_daemon::{Orchestrator, ShutdownCause};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // file -> env -> CLI, then a single validation pass
    let mut config = WatcherConfig::resolve(cli.config.as_deref())
        .await
        .map_err(|e| anyhow::anyhow!("failed to load config: {}", e))?;
    cli.apply_overrides(&mut config);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

    if cli.validate {
        println!("configuration is valid");
        return Ok(());
    }

    init_tracing(&config.general)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "sshwatch-daemon starting");

    let orchestrator = Orchestrator::build_from_config(config)?;
    let cause = orchestrator.run().await?;

    match &cause {
        ShutdownCause::Signal(signal) => {
            tracing::info!(signal = *signal, "sshwatch-daemon shut down");
        }
        ShutdownCause::TaskSource(err) => {
            tracing::info!(error = %err, "sshwatch-daemon shut down after task source ended");
        }
    }

    // A blocking stdin read can keep the runtime from shutting down; exit explicitly.
    std::process::exit(0);
}
