//! 로그 파이프라인 설정
//!
//! [`PipelineConfig`]는 core의 [`SourceConfig`](sshwatch_core::config::SourceConfig)와
//! [`SupervisorConfig`](sshwatch_core::config::SupervisorConfig)를 합쳐
//! 파이프라인이 실제로 사용하는 평탄한 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use sshwatch_core::config::WatcherConfig;
//! use sshwatch_log_pipeline::config::PipelineConfig;
//!
//! let core_config = WatcherConfig::default();
//! let config = PipelineConfig::from_core(&core_config);
//! ```

use std::path::{Component, Path};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sshwatch_core::config::WatcherConfig;

use crate::error::LogPipelineError;

/// 로그 파이프라인 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
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
    /// 재시작 사이 대기 시간 (초)
    pub restart_backoff_secs: u64,
    /// 최대 라인 길이 (바이트)
    pub max_line_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_core(&WatcherConfig::default())
    }
}

impl PipelineConfig {
    /// core의 `WatcherConfig`에서 파이프라인 설정을 생성합니다.
    pub fn from_core(core: &WatcherConfig) -> Self {
        Self {
            journal_command: core.source.journal_command.clone(),
            journal_match: core.source.journal_match.clone(),
            tail_command: core.source.tail_command.clone(),
            auth_log_path: core.source.auth_log_path.clone(),
            secure_log_path: core.source.secure_log_path.clone(),
            restart_backoff_secs: core.supervisor.restart_backoff_secs,
            max_line_length: core.supervisor.max_line_length,
        }
    }

    /// 재시작 대기 시간을 `Duration`으로 반환합니다.
    pub fn restart_backoff(&self) -> Duration {
        Duration::from_secs(self.restart_backoff_secs)
    }

    /// 로그 파일 경로가 안전한지 검증합니다.
    ///
    /// 절대 경로여야 하고 `..` 컴포넌트를 포함하지 않아야 합니다.
    fn validate_log_path(field: &str, path_str: &str) -> Result<(), LogPipelineError> {
        let path = Path::new(path_str);

        if path.components().any(|c| c == Component::ParentDir) {
            return Err(LogPipelineError::Config {
                field: field.to_owned(),
                reason: format!("path '{path_str}' contains path traversal pattern '..'"),
            });
        }

        if !path.is_absolute() {
            return Err(LogPipelineError::Config {
                field: field.to_owned(),
                reason: format!("path '{path_str}' must be an absolute path"),
            });
        }

        Ok(())
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        for (field, value) in [
            ("journal_command", &self.journal_command),
            ("tail_command", &self.tail_command),
        ] {
            if value.trim().is_empty() {
                return Err(LogPipelineError::Config {
                    field: field.to_owned(),
                    reason: "must not be empty".to_owned(),
                });
            }
        }

        Self::validate_log_path("auth_log_path", &self.auth_log_path)?;
        Self::validate_log_path("secure_log_path", &self.secure_log_path)?;

        if self.restart_backoff_secs == 0 {
            return Err(LogPipelineError::Config {
                field: "restart_backoff_secs".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.max_line_length == 0 {
            return Err(LogPipelineError::Config {
                field: "max_line_length".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

/// 파이프라인 설정 빌더
#[derive(Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 저널 조회 명령을 설정합니다.
    pub fn journal_command(mut self, command: impl Into<String>) -> Self {
        self.config.journal_command = command.into();
        self
    }

    /// 파일 추적 명령을 설정합니다.
    pub fn tail_command(mut self, command: impl Into<String>) -> Self {
        self.config.tail_command = command.into();
        self
    }

    /// 인증 로그 경로를 설정합니다.
    pub fn auth_log_path(mut self, path: impl Into<String>) -> Self {
        self.config.auth_log_path = path.into();
        self
    }

    /// secure 로그 경로를 설정합니다.
    pub fn secure_log_path(mut self, path: impl Into<String>) -> Self {
        self.config.secure_log_path = path.into();
        self
    }

    /// 재시작 대기 시간(초)을 설정합니다.
    pub fn restart_backoff_secs(mut self, secs: u64) -> Self {
        self.config.restart_backoff_secs = secs;
        self
    }

    /// 최대 라인 길이를 설정합니다.
    pub fn max_line_length(mut self, len: usize) -> Self {
        self.config.max_line_length = len;
        self
    }

    /// 설정을 검증하고 `PipelineConfig`를 생성합니다.
    pub fn build(self) -> Result<PipelineConfig, LogPipelineError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
