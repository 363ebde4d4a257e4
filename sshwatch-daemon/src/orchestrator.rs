//! Daemon orchestration -- assembly, task wiring, and lifecycle management.
//!
//! The [`Orchestrator`] is the central coordinator of `sshwatch-daemon`.
//! It validates configuration, builds the supervisor and the control loop
//! around a shared active-child handle, and runs them until one of the
//! shutdown triggers fires.
//!
//! # Shutdown Triggers
//!
//! - `SIGTERM` / `SIGINT`
//! - Task source error (stdin closed or undecodable task)
//!
//! A supervisor that stops on its own (no log source, spawn failure) does
//! not end the daemon. The control loop keeps running until one of the
//! triggers above fires.

use std::future::Future;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use sshwatch_core::config::WatcherConfig;
use sshwatch_core::error::TaskError;
use sshwatch_core::pipeline::{RecordSink, TaskSource};
use sshwatch_log_pipeline::{ControlLoop, PipelineConfig, ProcessSpawner, Supervisor, TokioSpawner};

use crate::io::{JsonLineSink, JsonLineTaskSource};
use crate::metrics_server;

/// Why the daemon main loop ended.
#[derive(Debug)]
pub enum ShutdownCause {
    /// A termination signal was received.
    Signal(&'static str),
    /// The task source failed; the active subprocess has been killed.
    TaskSource(TaskError),
}

/// The main daemon orchestrator.
pub struct Orchestrator {
    /// Loaded and validated configuration.
    config: WatcherConfig,
    /// Shared cancellation for the supervisor, control loop, and background tasks.
    cancel: CancellationToken,
    /// Daemon start time (for uptime reporting).
    start_time: Instant,
}

impl Orchestrator {
    /// Build from an already-loaded configuration.
    pub fn build_from_config(config: WatcherConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;

        if config.metrics.enabled {
            metrics_server::install_metrics_recorder(&config.metrics)?;
            tracing::info!(port = config.metrics.port, "metrics endpoint enabled");
            record_daemon_metrics();
        }

        tracing::info!("orchestrator initialized");

        Ok(Self {
            config,
            cancel: CancellationToken::new(),
            start_time: Instant::now(),
        })
    }

    /// Run against the real host: spawn log sources with `tokio::process`,
    /// write records to stdout, read tasks from stdin, and stop on SIGTERM/SIGINT.
    ///
    /// Writes the PID file first when one is configured and removes it on exit.
    pub async fn run(&self) -> Result<ShutdownCause> {
        let pid_file = (!self.config.general.pid_file.is_empty())
            .then(|| Path::new(&self.config.general.pid_file));

        if let Some(path) = pid_file {
            write_pid_file(path)?;
        }

        let result = self
            .run_with(
                TokioSpawner,
                JsonLineSink::stdout(),
                JsonLineTaskSource::stdin(),
                wait_for_shutdown_signal(),
            )
            .await;

        if let Some(path) = pid_file {
            remove_pid_file(path);
        }

        result
    }

    /// Run the supervisor and the control loop with the given collaborators
    /// until `shutdown` resolves or the task source fails.
    pub async fn run_with<S, K, T, F>(
        &self,
        spawner: S,
        sink: K,
        tasks: T,
        shutdown: F,
    ) -> Result<ShutdownCause>
    where
        S: ProcessSpawner,
        K: RecordSink,
        T: TaskSource,
        F: Future<Output = Result<&'static str>>,
    {
        let pipeline_config = PipelineConfig::from_core(&self.config);
        let supervisor = Supervisor::new(pipeline_config, spawner, sink)
            .map_err(|e| anyhow::anyhow!("failed to build supervisor: {}", e))?
            .with_cancellation(self.cancel.clone());
        let control =
            ControlLoop::new(tasks, supervisor.active_child()).with_cancellation(self.cancel.clone());

        let mut supervisor_task = tokio::spawn(async move { supervisor.run().await });
        let mut control_task = tokio::spawn(control.run());
        let uptime_task = self
            .config
            .metrics
            .enabled
            .then(|| spawn_uptime_updater(self.start_time, self.cancel.clone()));

        tracing::info!("entering main event loop");
        tokio::pin!(shutdown);
        let mut supervisor_running = true;

        let outcome = loop {
            tokio::select! {
                signal = &mut shutdown => {
                    break signal.map(|signal| {
                        tracing::info!(signal = signal, "shutdown signal received");
                        ShutdownCause::Signal(signal)
                    });
                }
                joined = &mut control_task => {
                    break joined
                        .map(|err| {
                            tracing::info!(error = %err, "task source ended, shutting down");
                            ShutdownCause::TaskSource(err)
                        })
                        .map_err(|e| anyhow::anyhow!("control loop task failed: {}", e));
                }
                joined = &mut supervisor_task, if supervisor_running => {
                    supervisor_running = false;
                    match joined {
                        Ok(reason) => tracing::warn!(
                            reason = ?reason,
                            "supervisor stopped; waiting for task source or shutdown signal"
                        ),
                        Err(e) => tracing::error!(error = %e, "supervisor task failed"),
                    }
                }
            }
        };

        tracing::info!("cancelling pipeline tasks");
        self.cancel.cancel();

        if supervisor_running {
            match supervisor_task.await {
                Ok(reason) => tracing::info!(reason = ?reason, "supervisor finished"),
                Err(e) => tracing::error!(error = %e, "supervisor task failed"),
            }
        }

        // The stdin read inside the control loop cannot be cancelled cooperatively.
        control_task.abort();

        if let Some(task) = uptime_task {
            let _ = task.await;
        }

        outcome
    }

    /// Token cancelled when the daemon shuts down.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
///
/// # Errors
///
/// Returns an error if signal handlers cannot be installed.
pub async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Write the current process PID to a file.
///
/// Used to prevent duplicate daemon instances.
///
/// # Security
///
/// - Uses `create_new(true)` to atomically create file (prevents TOCTOU races)
/// - Verifies the created file is a regular file
/// - Creates parent directory with restrictive permissions (0o700)
///
/// # Errors
///
/// Returns an error if the PID file cannot be written or already exists.
pub fn write_pid_file(path: &Path) -> Result<()> {
    use std::fs::{self, OpenOptions};
    use std::io::{ErrorKind, Write};
    use std::os::unix::fs::{DirBuilderExt, PermissionsExt};

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::DirBuilder::new()
            .mode(0o700)
            .recursive(true)
            .create(parent)?;
    }

    let pid = std::process::id();

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            let existing_pid = fs::read_to_string(path).unwrap_or_else(|_| "unknown".to_string());
            return Err(anyhow::anyhow!(
                "PID file {} already exists with PID: {}. Is another instance running?",
                path.display(),
                existing_pid.trim()
            ));
        }
        Err(e) => return Err(e.into()),
    };

    if !file.metadata()?.is_file() {
        let _ = fs::remove_file(path);
        return Err(anyhow::anyhow!(
            "PID file {} is not a regular file",
            path.display()
        ));
    }

    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    writeln!(file, "{}", pid)?;

    tracing::info!(pid = pid, path = %path.display(), "PID file written");
    Ok(())
}

/// Remove the PID file on daemon shutdown.
///
/// Logs a warning but does not fail if the file cannot be removed.
pub fn remove_pid_file(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(
            path = %path.display(),
            error = %e,
            "failed to remove PID file"
        );
    } else {
        tracing::info!(path = %path.display(), "PID file removed");
    }
}

/// Record daemon-level metrics (build info).
fn record_daemon_metrics() {
    use sshwatch_core::metrics as m;

    metrics::gauge!(m::DAEMON_BUILD_INFO, "version" => env!("CARGO_PKG_VERSION")).set(1.0);

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        "daemon metrics recorded"
    );
}

/// Spawn a background task that periodically updates the uptime metric.
///
/// Updates every 10 seconds to keep the metric fresh for Prometheus scrapes.
fn spawn_uptime_updater(start_time: Instant, cancel: CancellationToken) -> JoinHandle<()> {
    use sshwatch_core::metrics as m;

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(10));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let uptime_secs = start_time.elapsed().as_secs();
                    #[allow(clippy::cast_precision_loss)]
                    metrics::gauge!(m::DAEMON_UPTIME_SECONDS).set(uptime_secs as f64);
                }
                _ = cancel.cancelled() => {
                    tracing::debug!("uptime updater shutting down");
                    break;
                }
            }
        }
    })
}
