//! CLI argument definitions for sshwatch-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use sshwatch_core::config::WatcherConfig;

/// SSH authentication log watcher.
///
/// Follows the system sshd log source, extracts login and krb5
/// authorization events, and writes one JSON record per line to stdout.
/// Control tasks are read as JSON lines from stdin; closing stdin stops
/// the daemon.
#[derive(Parser, Debug)]
#[command(name = "sshwatch-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to sshwatch.toml configuration file.
    ///
    /// When omitted, built-in defaults plus `SSHWATCH_*` environment
    /// overrides are used.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,

    /// Override PID file path (takes precedence over config file).
    #[arg(long)]
    pub pid_file: Option<String>,
}

impl DaemonCli {
    /// Apply CLI overrides on top of file and environment values.
    pub fn apply_overrides(&self, config: &mut WatcherConfig) {
        if let Some(level) = &self.log_level {
            config.general.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.general.log_format = format.clone();
        }
        if let Some(pid_file) = &self.pid_file {
            config.general.pid_file = pid_file.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_is_optional() {
        let cli = DaemonCli::try_parse_from(["sshwatch-daemon"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.validate);
    }

    #[test]
    fn overrides_are_parsed() {
        let cli = DaemonCli::try_parse_from([
            "sshwatch-daemon",
            "--config",
            "/etc/sshwatch/sshwatch.toml",
            "--log-level",
            "debug",
            "--log-format",
            "pretty",
            "--pid-file",
            "/run/sshwatch.pid",
            "--validate",
        ])
        .unwrap();
        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("/etc/sshwatch/sshwatch.toml"))
        );
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.log_format.as_deref(), Some("pretty"));
        assert_eq!(cli.pid_file.as_deref(), Some("/run/sshwatch.pid"));
        assert!(cli.validate);
    }

    #[test]
    fn apply_overrides_replaces_only_given_flags() {
        let cli = DaemonCli::try_parse_from(["sshwatch-daemon", "--log-format", "pretty"]).unwrap();
        let mut config = WatcherConfig::default();
        config.general.log_level = "warn".to_owned();
        cli.apply_overrides(&mut config);
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.general.log_level, "warn");
        assert!(config.general.pid_file.is_empty());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        DaemonCli::command().debug_assert();
    }
}
