//! Orchestrator integration tests.
//!
//! Tests the full flow: config -> supervisor + control loop -> shutdown trigger.

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;

use sshwatch_core::config::WatcherConfig;
use sshwatch_core::error::TaskError;
use sshwatch_core::types::Record;
use sshwatch_daemon::{JsonLineSink, JsonLineTaskSource, Orchestrator, ShutdownCause};
use sshwatch_log_pipeline::TokioSpawner;

/// Config whose every log source is missing on this host.
fn no_source_config(dir: &Path) -> WatcherConfig {
    let mut config = WatcherConfig::default();
    config.source.journal_command = dir.join("no-journalctl").display().to_string();
    config.source.auth_log_path = dir.join("auth.log").display().to_string();
    config.source.secure_log_path = dir.join("secure").display().to_string();
    config
}

#[tokio::test]
async fn test_task_source_eof_shuts_down_without_log_source() {
    // Given: No log source on the host and an empty task stream
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator =
        Orchestrator::build_from_config(no_source_config(dir.path())).expect("orchestrator");
    let tasks: &'static [u8] = b"";

    // When: Running until a trigger fires
    let cause = tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.run_with(
            TokioSpawner,
            JsonLineSink::new(Vec::<u8>::new()),
            JsonLineTaskSource::new(tasks),
            std::future::pending::<anyhow::Result<&'static str>>(),
        ),
    )
    .await
    .expect("daemon should stop once the task stream ends")
    .expect("run should succeed");

    // Then: The task source is reported as the cause
    assert!(
        matches!(cause, ShutdownCause::TaskSource(TaskError::Closed)),
        "got: {cause:?}"
    );
    assert!(orchestrator.cancellation_token().is_cancelled());
}

#[tokio::test]
async fn test_signal_shuts_down_while_task_source_is_open() {
    // Given: A task stream that never ends
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator =
        Orchestrator::build_from_config(no_source_config(dir.path())).expect("orchestrator");
    let (_task_writer, task_reader) = tokio::io::duplex(64);

    // When: A shutdown signal arrives immediately
    let cause = tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.run_with(
            TokioSpawner,
            JsonLineSink::new(Vec::<u8>::new()),
            JsonLineTaskSource::new(BufReader::new(task_reader)),
            async { Ok::<_, anyhow::Error>("SIGTERM") },
        ),
    )
    .await
    .expect("daemon should stop on signal")
    .expect("run should succeed");

    // Then: The signal is reported as the cause
    assert!(
        matches!(cause, ShutdownCause::Signal("SIGTERM")),
        "got: {cause:?}"
    );
}

#[tokio::test]
async fn test_signal_handler_error_is_propagated() {
    // Given: A shutdown future that fails
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator =
        Orchestrator::build_from_config(no_source_config(dir.path())).expect("orchestrator");
    let (_task_writer, task_reader) = tokio::io::duplex(64);

    // When: Running
    let result = orchestrator
        .run_with(
            TokioSpawner,
            JsonLineSink::new(Vec::<u8>::new()),
            JsonLineTaskSource::new(BufReader::new(task_reader)),
            async { Err::<&'static str, _>(anyhow::anyhow!("failed to install SIGTERM handler")) },
        )
        .await;

    // Then: The error surfaces and the pipeline is cancelled
    assert!(result.is_err());
    assert!(orchestrator.cancellation_token().is_cancelled());
}

#[tokio::test]
#[serial_test::serial]
async fn test_freeform_source_records_reach_sink() {
    // Given: A fake tail command that prints one sshd line then idles
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("fake-tail");
    std::fs::write(
        &script,
        "#!/bin/sh\n\
         echo 'Jan  2 15:04:05 bastion sshd[4242]: Accepted password for root from 10.0.0.1 port 50022 ssh2'\n\
         echo 'Jan  2 15:04:06 bastion CRON[991]: session opened for user root'\n\
         exec sleep 30\n",
    )
    .expect("write script");
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    let auth_log = dir.path().join("auth.log");
    std::fs::write(&auth_log, "").expect("create auth log");

    let mut config = no_source_config(dir.path());
    config.source.tail_command = script.display().to_string();
    config.source.auth_log_path = auth_log.display().to_string();
    let orchestrator = Orchestrator::build_from_config(config).expect("orchestrator");

    let (record_writer, record_reader) = tokio::io::duplex(4096);
    let (_task_writer, task_reader) = tokio::io::duplex(64);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let run = tokio::spawn(async move {
        orchestrator
            .run_with(
                TokioSpawner,
                JsonLineSink::new(record_writer),
                JsonLineTaskSource::new(BufReader::new(task_reader)),
                async move {
                    let _ = stop_rx.await;
                    Ok::<_, anyhow::Error>("SIGTERM")
                },
            )
            .await
    });

    // When: Reading the first record from the sink
    let mut lines = BufReader::new(record_reader).lines();
    let line = tokio::time::timeout(Duration::from_secs(10), lines.next_line())
        .await
        .expect("record should arrive")
        .expect("read record")
        .expect("record line");
    let record: Record = serde_json::from_str(&line).expect("record JSON");

    // Then: The login event was extracted from the freeform line
    assert_eq!(record.data_type, 4000);
    assert_eq!(record.field("status"), Some("true"));
    assert_eq!(record.field("types"), Some("password"));
    assert_eq!(record.field("user"), Some("root"));
    assert_eq!(record.field("sip"), Some("10.0.0.1"));
    assert_eq!(record.field("sport"), Some("50022"));
    assert_eq!(record.field("pid"), Some("4242"));

    // And: Shutdown kills the source and returns the signal cause
    let _ = stop_tx.send(());
    let cause = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("daemon should stop")
        .expect("run task should not panic")
        .expect("run should succeed");
    assert!(matches!(cause, ShutdownCause::Signal("SIGTERM")));
}
