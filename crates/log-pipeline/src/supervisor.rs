//! 서브프로세스 수퍼바이저 -- 로그 소스 선택, 자식 실행, 라인 스트리밍, 재시작을 관리합니다.
//!
//! # 상태 전이
//! ```text
//! Selecting -> Spawning -> Streaming -> Draining -> Backoff -> Selecting ...
//!     |            |
//!     +------------+--> Stopped (소스 없음, 실행 실패, 취소)
//! ```
//!
//! - 스트림 종료(EOF, 읽기 에러)와 싱크 전송 실패는 모두 Draining으로 이어지며,
//!   자식을 종료/회수한 뒤 고정 간격만큼 대기하고 소스 선택부터 다시 시작합니다.
//! - 로그 소스가 없거나 자식 실행에 실패하면 재시도 없이 정지합니다.
//! - 취소 토큰이 발동하면 어느 상태에서든 자식을 정리하고 정지합니다.
//!
//! 현재 상태는 [`Supervisor::subscribe_state`]로 관찰할 수 있습니다.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use sshwatch_core::metrics as m;
use sshwatch_core::pipeline::RecordSink;

use crate::child::ActiveChild;
use crate::config::PipelineConfig;
use crate::error::LogPipelineError;
use crate::extractor::SshdExtractor;
use crate::parser::LineNormalizer;
use crate::process::{ChildProcess, ProcessSpawner};
use crate::record::build_record;
use crate::source::{HostLookup, SystemLookup, select_source};

/// 수퍼바이저 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// 로그 소스 선택 중
    Selecting,
    /// 자식 프로세스 실행 중
    Spawning,
    /// 자식 출력을 읽는 중
    Streaming,
    /// 자식 종료 및 회수 중
    Draining,
    /// 재시작 전 대기 중
    Backoff,
    /// 종료됨 (더 이상 재시작하지 않음)
    Stopped,
}

impl SupervisorState {
    /// 상태 이름
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Selecting => "selecting",
            Self::Spawning => "spawning",
            Self::Streaming => "streaming",
            Self::Draining => "draining",
            Self::Backoff => "backoff",
            Self::Stopped => "stopped",
        }
    }
}

/// 수퍼바이저가 정지한 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// 사용 가능한 로그 소스 없음
    NoLogSource,
    /// 자식 프로세스 실행 실패
    SpawnFailed,
    /// 외부 취소 (시그널, Control Loop 종료)
    Cancelled,
}

/// 스트리밍 한 사이클의 종료 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamEnd {
    Eof,
    ReadError,
    SinkFailed,
    Cancelled,
}

/// 라인 하나를 읽은 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineRead {
    Line,
    TooLong(usize),
    Eof,
}

/// 최대 길이를 넘는 라인은 버퍼에 담지 않고 다음 개행까지 건너뜁니다.
///
/// 반환 시 `buf`에는 개행(`\n`, `\r\n`)을 뺀 라인이 들어 있습니다.
/// 마지막 라인에 개행이 없어도 하나의 라인으로 취급합니다.
async fn read_line_limited<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_len: usize,
) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let mut overflow: Option<usize> = None;

    loop {
        let (used, complete) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(match overflow {
                    Some(len) => LineRead::TooLong(len),
                    None if buf.is_empty() => LineRead::Eof,
                    None => LineRead::Line,
                });
            }

            let (chunk, used, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (&available[..i], i + 1, true),
                None => (available, available.len(), false),
            };

            match overflow.as_mut() {
                Some(len) => *len += chunk.len(),
                None if buf.len() + chunk.len() > max_len => {
                    overflow = Some(buf.len() + chunk.len());
                    buf.clear();
                }
                None => buf.extend_from_slice(chunk),
            }
            (used, complete)
        };
        reader.consume(used);

        if complete {
            if let Some(len) = overflow {
                return Ok(LineRead::TooLong(len));
            }
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
            return Ok(LineRead::Line);
        }
    }
}

/// 서브프로세스 수퍼바이저
///
/// # 사용 예시
/// ```ignore
/// use sshwatch_log_pipeline::{PipelineConfig, Supervisor, TokioSpawner};
///
/// let supervisor = Supervisor::new(PipelineConfig::default(), TokioSpawner, sink)?;
/// let active = supervisor.active_child();   // Control Loop와 공유
/// let reason = supervisor.run().await;
/// ```
pub struct Supervisor<S: ProcessSpawner, K, P = SystemLookup> {
    config: PipelineConfig,
    spawner: S,
    sink: K,
    lookup: P,
    extractor: SshdExtractor,
    active: ActiveChild<S::Child>,
    state_tx: watch::Sender<SupervisorState>,
    cancel: CancellationToken,
}

impl<S, K> Supervisor<S, K, SystemLookup>
where
    S: ProcessSpawner,
    K: RecordSink,
{
    /// 실제 호스트를 조회하는 수퍼바이저를 생성합니다.
    pub fn new(config: PipelineConfig, spawner: S, sink: K) -> Result<Self, LogPipelineError> {
        config.validate()?;
        let (state_tx, _) = watch::channel(SupervisorState::Selecting);
        Ok(Self {
            config,
            spawner,
            sink,
            lookup: SystemLookup,
            extractor: SshdExtractor::new()?,
            active: ActiveChild::new(),
            state_tx,
            cancel: CancellationToken::new(),
        })
    }
}

impl<S, K, P> Supervisor<S, K, P>
where
    S: ProcessSpawner,
    K: RecordSink,
    P: HostLookup,
{
    /// 소스 조회기를 교체합니다.
    pub fn with_lookup<Q: HostLookup>(self, lookup: Q) -> Supervisor<S, K, Q> {
        Supervisor {
            config: self.config,
            spawner: self.spawner,
            sink: self.sink,
            lookup,
            extractor: self.extractor,
            active: self.active,
            state_tx: self.state_tx,
            cancel: self.cancel,
        }
    }

    /// 외부 취소 토큰을 연결합니다.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 활성 자식 핸들 (Control Loop와 공유)
    pub fn active_child(&self) -> ActiveChild<S::Child> {
        self.active.clone()
    }

    /// 상태 변화를 구독합니다.
    pub fn subscribe_state(&self) -> watch::Receiver<SupervisorState> {
        self.state_tx.subscribe()
    }

    /// 현재 상태
    pub fn state(&self) -> SupervisorState {
        *self.state_tx.borrow()
    }

    fn set_state(&self, state: SupervisorState) {
        trace!(state = state.as_str(), "supervisor state");
        self.state_tx.send_replace(state);
    }

    fn stop(&self, reason: StopReason) -> StopReason {
        self.set_state(SupervisorState::Stopped);
        info!(reason = ?reason, "supervisor stopped");
        reason
    }

    /// 정지할 때까지 선택 → 실행 → 스트리밍 → 정리 → 대기 사이클을 반복합니다.
    pub async fn run(&self) -> StopReason {
        loop {
            if self.cancel.is_cancelled() {
                return self.stop(StopReason::Cancelled);
            }

            self.set_state(SupervisorState::Selecting);
            let source = match select_source(&self.config, &self.lookup) {
                Ok(source) => source,
                Err(e) => {
                    error!(error = %e, "no supported log source");
                    return self.stop(StopReason::NoLogSource);
                }
            };
            info!(command = %source, format = %source.format, "selected log source");

            self.set_state(SupervisorState::Spawning);
            let (child, stdout) = match self.spawner.spawn(&source) {
                Ok(spawned) => spawned,
                Err(e) => {
                    error!(error = %e, "spawn subprocess failed");
                    return self.stop(StopReason::SpawnFailed);
                }
            };
            metrics::counter!(m::CHILD_SPAWNS_TOTAL, m::LABEL_FORMAT => source.format.as_str())
                .increment(1);
            info!(pid = child.id(), "spawned log source subprocess");
            if let Some(mut stale) = self.active.install(child) {
                warn!(pid = stale.id(), "replacing a subprocess that was never drained");
                if let Err(e) = stale.start_kill() {
                    debug!(pid = stale.id(), error = %e, "kill signal not delivered");
                }
            }

            self.set_state(SupervisorState::Streaming);
            let normalizer = LineNormalizer::for_format(source.format);
            let end = self.stream(stdout, normalizer).await;
            debug!(end = ?end, "stream ended");

            self.set_state(SupervisorState::Draining);
            self.drain().await;

            if end == StreamEnd::Cancelled {
                return self.stop(StopReason::Cancelled);
            }

            self.set_state(SupervisorState::Backoff);
            let backoff = self.config.restart_backoff();
            debug!(secs = backoff.as_secs(), "waiting before restart");
            tokio::select! {
                _ = self.cancel.cancelled() => return self.stop(StopReason::Cancelled),
                _ = tokio::time::sleep(backoff) => {}
            }
        }
    }

    /// 자식 출력을 라인 단위로 읽어 레코드를 싱크로 보냅니다.
    async fn stream(&self, stdout: S::Stdout, normalizer: LineNormalizer) -> StreamEnd {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::with_capacity(1024);

        loop {
            let read = tokio::select! {
                _ = self.cancel.cancelled() => return StreamEnd::Cancelled,
                read = read_line_limited(&mut reader, &mut buf, self.config.max_line_length) => read,
            };

            match read {
                Ok(LineRead::Line) => {}
                Ok(LineRead::TooLong(len)) => {
                    warn!(
                        len,
                        max = self.config.max_line_length,
                        "line exceeds max length, dropped"
                    );
                    metrics::counter!(m::LINES_DROPPED_TOTAL, m::LABEL_FORMAT => normalizer.format().as_str())
                        .increment(1);
                    continue;
                }
                Ok(LineRead::Eof) => return StreamEnd::Eof,
                Err(e) => {
                    error!(error = %e, "when reading a line, an error occurred");
                    return StreamEnd::ReadError;
                }
            }

            metrics::counter!(m::LINES_READ_TOTAL).increment(1);
            let line = String::from_utf8_lossy(&buf);
            trace!(line = %line, "read line");

            let Some(entry) = normalizer.normalize(&line) else {
                continue;
            };
            let Some(event) = self.extractor.extract(&entry.message) else {
                trace!(message = %entry.message, "no sshd event in message");
                continue;
            };

            let record = build_record(event, &entry);
            let data_type = record.data_type;
            if let Err(e) = self.sink.send_record(record).await {
                error!(error = %e, "failed to send record");
                metrics::counter!(m::SINK_FAILURES_TOTAL).increment(1);
                return StreamEnd::SinkFailed;
            }
            metrics::counter!(m::RECORDS_SENT_TOTAL, m::LABEL_DATA_TYPE => data_type.to_string())
                .increment(1);
        }
    }

    /// 활성 자식을 꺼내 강제 종료하고 회수합니다.
    ///
    /// 잠금은 핸들을 꺼내는 동안만 잡고, 종료 대기는 잠금 밖에서 합니다.
    async fn drain(&self) {
        let Some(mut child) = self.active.take() else {
            debug!("subprocess already released");
            return;
        };

        let pid = child.id();
        if let Err(e) = child.start_kill() {
            debug!(pid, error = %e, "kill signal not delivered");
        }

        match child.wait().await {
            Ok(exit) if exit.success => info!(pid, status = %exit, "subprocess exited"),
            Ok(exit) => error!(pid, status = %exit, "subprocess exited with error"),
            Err(e) => error!(pid, error = %e, "failed to wait for subprocess"),
        }
        metrics::counter!(m::CHILD_EXITS_TOTAL).increment(1);
    }
}
