//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 로그 파이프라인 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<LogPipelineError> for WatcherError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use sshwatch_core::error::{SinkError, WatcherError};

/// 로그 파이프라인 도메인 에러
///
/// 소스 선택, 자식 프로세스 생성, 라인 파싱, 싱크 전송 등
/// 파이프라인 내부의 모든 에러 상황을 포괄합니다.
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 로그 라인 파싱 실패 (정규화 경계에서 "엔트리 없음"으로 흡수됨)
    #[error("parse error: {format}: {reason}")]
    Parse {
        /// 라인 형식 (structured, freeform)
        format: String,
        /// 실패 사유
        reason: String,
    },

    /// 사용 가능한 로그 소스가 없음
    #[error("no supported log source available")]
    NoLogSource,

    /// 자식 프로세스 생성 실패
    #[error("failed to spawn '{program}': {reason}")]
    Spawn {
        /// 실행하려던 프로그램
        program: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 출력 싱크 전송 실패
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl From<LogPipelineError> for WatcherError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::Sink(e) => WatcherError::Sink(e),
            LogPipelineError::Io(e) => WatcherError::Io(e),
            other => WatcherError::Pipeline(other.to_string()),
        }
    }
}
