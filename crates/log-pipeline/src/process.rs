//! 자식 프로세스 추상화
//!
//! [`ProcessSpawner`]와 [`ChildProcess`] trait은 수퍼바이저를 실제 프로세스와 분리하여,
//! 운영 환경에서는 [`TokioSpawner`]를, 테스트에서는 가짜 구현을 사용할 수 있게 합니다.
//!
//! # 아키텍처
//!
//! ```text
//! ┌──────────────┐
//! │  Supervisor  │
//! └──────┬───────┘
//!        │ spawn(LogSource)
//!        ▼
//! ┌──────────────┐      stdout (AsyncRead)
//! │ProcessSpawner│ ───────────────────────▶ line reader
//! └──────┬───────┘
//!        │ ChildProcess (kill / wait)
//!        ▼
//!   ActiveChild (mutex)
//! ```

use std::fmt;
use std::future::Future;
use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncRead;
use tokio::process::{Child, ChildStdout, Command};

use crate::error::LogPipelineError;
use crate::source::LogSource;

/// 자식 프로세스 종료 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildExit {
    /// 종료 코드 (시그널로 종료되면 없음)
    pub code: Option<i32>,
    /// 종료시킨 시그널 번호
    pub signal: Option<i32>,
    /// 정상 종료 여부
    pub success: bool,
}

impl From<ExitStatus> for ChildExit {
    fn from(status: ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;

        Self {
            code: status.code(),
            signal: status.signal(),
            success: status.success(),
        }
    }
}

impl fmt::Display for ChildExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit status: {code}"),
            (None, Some(signal)) => write!(f, "signal: {signal}"),
            (None, None) => f.write_str("unknown exit status"),
        }
    }
}

/// 실행 중인 자식 프로세스
pub trait ChildProcess: Send + 'static {
    /// OS 프로세스 ID (이미 회수되었으면 없음)
    fn id(&self) -> Option<u32>;

    /// 강제 종료 신호를 보냅니다. 종료를 기다리지 않습니다.
    fn start_kill(&mut self) -> io::Result<()>;

    /// 프로세스가 끝날 때까지 기다려 종료 상태를 회수합니다.
    fn wait(&mut self) -> impl Future<Output = io::Result<ChildExit>> + Send;
}

/// 로그 소스 프로세스 생성기
pub trait ProcessSpawner: Send + Sync + 'static {
    /// 생성되는 자식 프로세스 타입
    type Child: ChildProcess;
    /// 자식의 표준 출력 스트림 타입
    type Stdout: AsyncRead + Unpin + Send + 'static;

    /// 소스 명령을 실행하고 표준 출력 스트림을 돌려받습니다.
    fn spawn(&self, source: &LogSource) -> Result<(Self::Child, Self::Stdout), LogPipelineError>;
}

impl ChildProcess for Child {
    fn id(&self) -> Option<u32> {
        Child::id(self)
    }

    fn start_kill(&mut self) -> io::Result<()> {
        Child::start_kill(self)
    }

    async fn wait(&mut self) -> io::Result<ChildExit> {
        Child::wait(self).await.map(ChildExit::from)
    }
}

/// `tokio::process` 기반 생성기
///
/// stdout만 파이프로 연결하고 stdin/stderr는 `/dev/null`로 보냅니다.
/// 핸들이 drop되면 자식도 함께 종료됩니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

impl ProcessSpawner for TokioSpawner {
    type Child = Child;
    type Stdout = ChildStdout;

    fn spawn(&self, source: &LogSource) -> Result<(Child, ChildStdout), LogPipelineError> {
        let mut child = Command::new(&source.program)
            .args(&source.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LogPipelineError::Spawn {
                program: source.program.clone(),
                reason: e.to_string(),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| LogPipelineError::Spawn {
            program: source.program.clone(),
            reason: "stdout was not captured".to_owned(),
        })?;

        Ok((child, stdout))
    }
}
