//! BSD syslog 텍스트 라인 파서
//!
//! `tail -F /var/log/auth.log` 형식의 라인을 [`Entry`]로 변환합니다.
//!
//! # 라인 형식
//! ```text
//! MON DAY HH:MM:SS HOSTNAME sshd[PID]: MESSAGE...
//! ```
//!
//! 다섯 번째 토큰이 `sshd[<숫자>]`(선택적 `:`)가 아니면 sshd와 무관한 라인으로 보고 버립니다.
//! syslog에는 연도가 없으므로 현재 UTC 연도를 주입합니다.
//!
//! # 사용 예시
//! ```ignore
//! use sshwatch_log_pipeline::parser::SyslogParser;
//!
//! let parser = SyslogParser::new().with_year(2024);
//! let entry = parser.parse("Jan 2 15:04:05 host sshd[42]: Connection closed")?;
//! assert_eq!(entry.pid, "42");
//! ```

use sshwatch_core::types::Entry;

use super::timestamp::{current_year, syslog_date_to_epoch};
use crate::error::LogPipelineError;

/// 최소 토큰 수: 날짜 3 + 호스트 1 + 프로세스 1 + 메시지 1
const MIN_FIELDS: usize = 6;

/// 프로세스 토큰 인덱스
const PROCESS_FIELD: usize = 4;

/// BSD syslog 파서
#[derive(Debug, Clone, Copy, Default)]
pub struct SyslogParser {
    /// 고정 연도 (없으면 현재 UTC 연도)
    year: Option<i32>,
}

impl SyslogParser {
    /// 현재 연도를 사용하는 파서를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 주입할 연도를 고정합니다.
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// `sshd[1234]` 또는 `sshd[1234]:`에서 PID를 추출합니다.
    fn sshd_pid(token: &str) -> Option<&str> {
        let rest = token.strip_prefix("sshd[")?;
        let rest = rest.strip_suffix(':').unwrap_or(rest);
        let pid = rest.strip_suffix(']')?;
        if pid.is_empty() || !pid.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(pid)
    }

    /// 텍스트 라인 하나를 파싱합니다.
    ///
    /// 날짜를 해석하지 못하면 타임스탬프는 빈 문자열이 됩니다.
    pub fn parse(&self, line: &str) -> Result<Entry, LogPipelineError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            return Err(LogPipelineError::Parse {
                format: "freeform".to_owned(),
                reason: format!(
                    "expected at least {MIN_FIELDS} fields, got {}",
                    fields.len()
                ),
            });
        }

        let pid = Self::sshd_pid(fields[PROCESS_FIELD]).ok_or_else(|| {
            LogPipelineError::Parse {
                format: "freeform".to_owned(),
                reason: format!("not an sshd line: '{}'", fields[PROCESS_FIELD]),
            }
        })?;

        let date = fields[..3].join(" ");
        let year = self.year.unwrap_or_else(current_year);
        let timestamp = syslog_date_to_epoch(&date, year)
            .map(|secs| secs.to_string())
            .unwrap_or_default();

        Ok(Entry {
            message: fields[MIN_FIELDS - 1..].join(" "),
            pid: pid.to_owned(),
            timestamp,
        })
    }
}
