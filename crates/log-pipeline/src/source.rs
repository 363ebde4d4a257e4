//! 로그 소스 선택
//!
//! 고정된 우선순위로 사용 가능한 로그 소스를 찾습니다.
//!
//! 1. 구조화 저널 조회 도구 (`journalctl -f _COMM=sshd -o json`)
//! 2. BSD 스타일 인증 로그 (`tail -F /var/log/auth.log`)
//! 3. Linux 스타일 secure 로그 (`tail -F /var/log/secure`)
//!
//! 아무것도 없으면 [`LogPipelineError::NoLogSource`]를 반환하며,
//! 수퍼바이저는 재시도 없이 정지합니다.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::LogPipelineError;

/// 로그 라인 형식
///
/// 사이클마다 한 번 결정되며, 정규화기의 분기 기준이 됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 라인당 JSON 객체 하나 (journal)
    Structured,
    /// 전통적인 syslog 텍스트 라인
    Freeform,
}

impl LogFormat {
    /// 메트릭 레이블 등에 쓰이는 문자열 표현
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Freeform => "freeform",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 선택된 로그 소스 -- 실행할 명령 템플릿과 형식 태그
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSource {
    /// 실행할 프로그램
    pub program: String,
    /// 프로그램 인자
    pub args: Vec<String>,
    /// 출력 라인 형식
    pub format: LogFormat,
}

impl LogSource {
    /// 저널 소스를 생성합니다.
    pub fn journal(command: &str, match_expr: &str) -> Self {
        let mut args = vec!["-f".to_owned()];
        if !match_expr.is_empty() {
            args.push(match_expr.to_owned());
        }
        args.extend(["-o".to_owned(), "json".to_owned()]);
        Self {
            program: command.to_owned(),
            args,
            format: LogFormat::Structured,
        }
    }

    /// 파일 추적 소스를 생성합니다.
    pub fn tail(command: &str, path: &str) -> Self {
        Self {
            program: command.to_owned(),
            args: vec!["-F".to_owned(), path.to_owned()],
            format: LogFormat::Freeform,
        }
    }
}

impl fmt::Display for LogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// 호스트 환경 조회 trait
///
/// 선택 로직을 실제 파일 시스템과 분리하여 테스트에서 교체할 수 있게 합니다.
pub trait HostLookup: Send + Sync {
    /// 명령이 실행 가능한지 확인합니다.
    fn command_available(&self, name: &str) -> bool;

    /// 경로가 존재하는지 확인합니다.
    fn path_exists(&self, path: &str) -> bool;
}

/// 실제 호스트를 조회하는 [`HostLookup`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl SystemLookup {
    fn is_executable(path: &Path) -> bool {
        use std::os::unix::fs::PermissionsExt;

        match std::fs::metadata(path) {
            Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }
}

impl HostLookup for SystemLookup {
    fn command_available(&self, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        // 경로가 포함된 이름은 PATH 검색 없이 직접 확인
        if name.contains('/') {
            return Self::is_executable(Path::new(name));
        }
        let Some(paths) = std::env::var_os("PATH") else {
            return false;
        };
        std::env::split_paths(&paths).any(|dir| Self::is_executable(&dir.join(name)))
    }

    fn path_exists(&self, path: &str) -> bool {
        std::fs::metadata(path).is_ok()
    }
}

/// 우선순위에 따라 로그 소스를 선택합니다.
pub fn select_source(
    config: &PipelineConfig,
    lookup: &impl HostLookup,
) -> Result<LogSource, LogPipelineError> {
    if lookup.command_available(&config.journal_command) {
        return Ok(LogSource::journal(
            &config.journal_command,
            &config.journal_match,
        ));
    }

    for path in [&config.auth_log_path, &config.secure_log_path] {
        if lookup.path_exists(path) {
            return Ok(LogSource::tail(&config.tail_command, path));
        }
    }

    Err(LogPipelineError::NoLogSource)
}
