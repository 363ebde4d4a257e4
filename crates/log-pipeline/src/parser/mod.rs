//! 라인 정규화 모듈 -- journal JSON, BSD syslog 형식별 파서
//!
//! [`LineNormalizer`]는 사이클마다 한 번 선택된 [`LogFormat`]에 따라
//! 원시 라인을 [`Entry`]로 변환합니다. 정규화에 실패한 라인은 에러가 아니라
//! "엔트리 없음"으로 처리되어 조용히 버려집니다.
//!
//! # 지원 형식
//! - journal JSON ([`JournalParser`])
//! - BSD syslog 텍스트 ([`SyslogParser`])
//!
//! # 사용 예시
//! ```ignore
//! use sshwatch_log_pipeline::parser::LineNormalizer;
//! use sshwatch_log_pipeline::source::LogFormat;
//!
//! let normalizer = LineNormalizer::for_format(LogFormat::Freeform);
//! let entry = normalizer.normalize("Jan 2 15:04:05 host sshd[1]: hello");
//! ```

pub mod journal;
pub mod syslog;
pub mod timestamp;

pub use journal::JournalParser;
pub use syslog::SyslogParser;

use sshwatch_core::metrics as m;
use sshwatch_core::types::Entry;

use crate::error::LogPipelineError;
use crate::source::LogFormat;

/// 형식별 라인 정규화기
#[derive(Debug, Clone, Copy)]
pub enum LineNormalizer {
    /// journal JSON 라인
    Structured(JournalParser),
    /// BSD syslog 텍스트 라인
    Freeform(SyslogParser),
}

impl LineNormalizer {
    /// 형식에 맞는 기본 정규화기를 생성합니다.
    pub fn for_format(format: LogFormat) -> Self {
        match format {
            LogFormat::Structured => Self::Structured(JournalParser::new()),
            LogFormat::Freeform => Self::Freeform(SyslogParser::new()),
        }
    }

    /// 이 정규화기가 처리하는 형식
    pub fn format(&self) -> LogFormat {
        match self {
            Self::Structured(_) => LogFormat::Structured,
            Self::Freeform(_) => LogFormat::Freeform,
        }
    }

    /// 라인을 파싱하고 실패 사유를 그대로 반환합니다.
    pub fn parse(&self, line: &str) -> Result<Entry, LogPipelineError> {
        match self {
            Self::Structured(parser) => parser.parse(line),
            Self::Freeform(parser) => parser.parse(line),
        }
    }

    /// 라인을 엔트리로 정규화합니다. 실패하면 `None`.
    pub fn normalize(&self, line: &str) -> Option<Entry> {
        match self.parse(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                match self {
                    // journal 출력이 JSON이 아닌 것은 드문 일
                    Self::Structured(_) => {
                        tracing::warn!(error = %e, "when parsing a line, an error occurred");
                    }
                    // auth.log에는 sshd와 무관한 라인이 대부분
                    Self::Freeform(_) => tracing::trace!(error = %e, "line dropped"),
                }
                metrics::counter!(m::LINES_DROPPED_TOTAL, m::LABEL_FORMAT => self.format().as_str())
                    .increment(1);
                None
            }
        }
    }
}
