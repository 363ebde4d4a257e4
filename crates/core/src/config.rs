//! 설정 관리 -- sshwatch.toml 파싱 및 런타임 설정
//!
//! [`WatcherConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SSHWATCH_SUPERVISOR_RESTART_BACKOFF_SECS=5` 형식)
//! 3. 설정 파일 (`sshwatch.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), sshwatch_core::error::WatcherError> {
//! use sshwatch_core::config::WatcherConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = WatcherConfig::load("sshwatch.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = WatcherConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, WatcherError};

/// sshwatch 통합 설정
///
/// `sshwatch.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 소스 설정
    #[serde(default)]
    pub source: SourceConfig,
    /// 수퍼바이저 설정
    #[serde(default)]
    pub supervisor: SupervisorConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl WatcherConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, WatcherError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일(없으면 기본값)에 환경변수 오버라이드까지 적용하고, 검증은 하지 않습니다.
    ///
    /// 호출자가 CLI 오버라이드를 적용한 뒤 [`validate`](Self::validate)를 한 번 호출합니다.
    pub async fn resolve(path: Option<&Path>) -> Result<Self, WatcherError> {
        let mut config = match path {
            Some(path) => Self::from_file(path).await?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드, 검증 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, WatcherError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WatcherError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                WatcherError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, WatcherError> {
        toml::from_str(toml_str).map_err(|e| {
            WatcherError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SSHWATCH_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SSHWATCH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SSHWATCH_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.pid_file, "SSHWATCH_GENERAL_PID_FILE");

        // Source
        override_string(
            &mut self.source.journal_command,
            "SSHWATCH_SOURCE_JOURNAL_COMMAND",
        );
        override_string(
            &mut self.source.journal_match,
            "SSHWATCH_SOURCE_JOURNAL_MATCH",
        );
        override_string(&mut self.source.tail_command, "SSHWATCH_SOURCE_TAIL_COMMAND");
        override_string(
            &mut self.source.auth_log_path,
            "SSHWATCH_SOURCE_AUTH_LOG_PATH",
        );
        override_string(
            &mut self.source.secure_log_path,
            "SSHWATCH_SOURCE_SECURE_LOG_PATH",
        );

        // Supervisor
        override_u64(
            &mut self.supervisor.restart_backoff_secs,
            "SSHWATCH_SUPERVISOR_RESTART_BACKOFF_SECS",
        );
        override_usize(
            &mut self.supervisor.max_line_length,
            "SSHWATCH_SUPERVISOR_MAX_LINE_LENGTH",
        );

        // Metrics
        override_bool(&mut self.metrics.enabled, "SSHWATCH_METRICS_ENABLED");
        override_string(&mut self.metrics.listen_addr, "SSHWATCH_METRICS_LISTEN_ADDR");
        override_u16(&mut self.metrics.port, "SSHWATCH_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), WatcherError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        let commands = [
            ("source.journal_command", &self.source.journal_command),
            ("source.tail_command", &self.source.tail_command),
            ("source.auth_log_path", &self.source.auth_log_path),
            ("source.secure_log_path", &self.source.secure_log_path),
        ];
        for (field, value) in commands {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty".to_owned()));
            }
        }

        for (field, value) in [
            ("source.auth_log_path", &self.source.auth_log_path),
            ("source.secure_log_path", &self.source.secure_log_path),
        ] {
            validate_log_path(field, value)?;
        }

        if self.supervisor.restart_backoff_secs == 0 {
            return Err(invalid(
                "supervisor.restart_backoff_secs",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.supervisor.max_line_length == 0 {
            return Err(invalid(
                "supervisor.max_line_length",
                "must be greater than 0".to_owned(),
            ));
        }

        if self.metrics.enabled && self.metrics.endpoint != "/metrics" {
            return Err(invalid(
                "metrics.endpoint",
                "only '/metrics' is supported".to_owned(),
            ));
        }

        Ok(())
    }
}

/// 로그 파일 경로는 절대 경로여야 하고 `..` 컴포넌트를 포함하지 않아야 합니다.
fn validate_log_path(field: &str, value: &str) -> Result<(), WatcherError> {
    let path = Path::new(value);
    if path.components().any(|c| c == Component::ParentDir) {
        return Err(invalid(
            field,
            format!("path '{value}' contains path traversal pattern '..'"),
        ));
    }
    if !path.is_absolute() {
        return Err(invalid(
            field,
            format!("path '{value}' must be an absolute path"),
        ));
    }
    Ok(())
}

fn invalid(field: &str, reason: String) -> WatcherError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// PID 파일 경로 (빈 문자열이면 비활성)
    pub pid_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            pid_file: String::new(),
        }
    }
}

/// 로그 소스 설정
///
/// 소스 선택 우선순위(journal → auth.log → secure)는 고정이며,
/// 명령 이름과 파일 경로만 바꿀 수 있습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// 구조화 저널 조회 명령
    pub journal_command: String,
    /// 저널 매치 표현식
    pub journal_match: String,
    /// 파일 추적 명령
    pub tail_command: String,
    /// BSD 스타일 인증 로그 경로
    pub auth_log_path: String,
    /// Linux 스타일 secure 로그 경로
    pub secure_log_path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            journal_command: "journalctl".to_owned(),
            journal_match: "_COMM=sshd".to_owned(),
            tail_command: "tail".to_owned(),
            auth_log_path: "/var/log/auth.log".to_owned(),
            secure_log_path: "/var/log/secure".to_owned(),
        }
    }
}

/// 수퍼바이저 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// 재시작 사이 대기 시간 (초)
    pub restart_backoff_secs: u64,
    /// 최대 라인 길이 (바이트), 초과 라인은 버림
    pub max_line_length: usize,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            restart_backoff_secs: 10,
            max_line_length: 64 * 1024, // 64KB
        }
    }
}

/// 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 포트
    pub port: u16,
    /// 스크레이프 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9464,
            endpoint: "/metrics".to_owned(),
        }
    }
}

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
