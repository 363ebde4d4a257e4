//! journal JSON 라인 파서
//!
//! `journalctl -o json`이 출력하는 라인당 JSON 객체 하나를 [`Entry`]로 변환합니다.
//! 필요한 필드는 `MESSAGE`, `_PID`, `__REALTIME_TIMESTAMP` 세 개뿐이며,
//! 나머지 필드는 무시합니다.
//!
//! # 사용 예시
//! ```ignore
//! use sshwatch_log_pipeline::parser::JournalParser;
//!
//! let parser = JournalParser::new();
//! let entry = parser.parse(r#"{"MESSAGE":"hi","_PID":"1","__REALTIME_TIMESTAMP":"1700000000000000"}"#)?;
//! assert_eq!(entry.timestamp, "1700000000");
//! ```

use serde::Deserialize;
use sshwatch_core::types::Entry;

use super::timestamp::micros_to_epoch_secs;
use crate::error::LogPipelineError;

/// journal 레코드의 필요한 필드만 담는 역직렬화 대상
///
/// 누락된 필드는 빈 문자열로 채워집니다.
#[derive(Debug, Default, Deserialize)]
struct JournalRecord {
    #[serde(rename = "MESSAGE", default)]
    message: String,
    #[serde(rename = "_PID", default)]
    pid: String,
    #[serde(rename = "__REALTIME_TIMESTAMP", default)]
    realtime_timestamp: String,
}

/// journal JSON 파서
#[derive(Debug, Clone, Copy, Default)]
pub struct JournalParser;

impl JournalParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// JSON 라인 하나를 파싱합니다.
    ///
    /// JSON이 아니거나 필드 타입이 문자열이 아니면 에러를 반환합니다.
    pub fn parse(&self, line: &str) -> Result<Entry, LogPipelineError> {
        let record: JournalRecord =
            serde_json::from_str(line).map_err(|e| LogPipelineError::Parse {
                format: "structured".to_owned(),
                reason: e.to_string(),
            })?;

        Ok(Entry {
            message: record.message,
            pid: record.pid,
            timestamp: micros_to_epoch_secs(&record.realtime_timestamp),
        })
    }
}
