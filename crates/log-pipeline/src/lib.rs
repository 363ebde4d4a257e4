#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`source`]: 우선순위 기반 로그 소스 선택
//! - [`parser`]: journal JSON, BSD syslog 라인 정규화 및 타임스탬프 변환
//! - [`extractor`]: 로그인/인가 이벤트 패턴 추출
//! - [`record`]: 이벤트를 출력 레코드로 변환
//! - [`process`]: 자식 프로세스 추상화 (tokio::process 구현 포함)
//! - [`child`]: 수퍼바이저와 Control Loop가 공유하는 활성 자식 핸들
//! - [`supervisor`]: 선택/실행/스트리밍/정리/대기 상태 머신
//! - [`control`]: 태스크 수신 실패 시 자식 종료
//! - [`config`]: 파이프라인 설정 (core 설정에서 파생)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//!                   ┌──────────── ActiveChild (mutex) ────────────┐
//!                   │                                             │
//! Supervisor -> spawn child -> stdout lines -> normalize -> extract -> RecordSink
//!                                                                 │
//! ControlLoop <- TaskSource ── error ──> kill ────────────────────┘
//! ```

pub mod child;
pub mod config;
pub mod control;
pub mod error;
pub mod extractor;
pub mod parser;
pub mod process;
pub mod record;
pub mod source;
pub mod supervisor;

// --- 주요 타입 re-export ---

// 수퍼바이저 / Control Loop
pub use control::ControlLoop;
pub use supervisor::{StopReason, Supervisor, SupervisorState};

// 설정
pub use config::{PipelineConfig, PipelineConfigBuilder};

// 에러
pub use error::LogPipelineError;

// 소스 선택
pub use source::{LogFormat, LogSource, HostLookup, SystemLookup, select_source};

// 정규화 / 추출
pub use extractor::{CertifyEvent, LoginEvent, SshdEvent, SshdExtractor};
pub use parser::{JournalParser, LineNormalizer, SyslogParser};
pub use record::build_record;

// 자식 프로세스
pub use child::ActiveChild;
pub use process::{ChildExit, ChildProcess, ProcessSpawner, TokioSpawner};
