//! 협력자 trait -- 출력 싱크와 태스크 소스의 경계 정의
//!
//! 파이프라인은 레코드를 어디로 보내는지, 태스크를 어디서 받는지 알지 못합니다.
//! 데몬은 표준 입출력 구현을, 테스트는 mpsc 채널 구현을 사용합니다.

use std::future::Future;

use tokio::sync::mpsc;

use crate::error::{SinkError, TaskError};
use crate::types::{Record, Task};

/// 출력 싱크 trait
///
/// 레코드를 한 건씩 받아 성공/실패를 반환합니다.
/// 실패는 현재 사이클 동안 다운스트림을 사용할 수 없다는 의미로 해석됩니다.
pub trait RecordSink: Send + Sync + 'static {
    /// 레코드 한 건을 전송합니다.
    fn send_record(&self, record: Record) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// 태스크 소스 trait
///
/// 불투명한 제어 태스크 또는 에러를 반환합니다.
pub trait TaskSource: Send + 'static {
    /// 다음 태스크를 기다립니다.
    fn receive_task(&mut self) -> impl Future<Output = Result<Task, TaskError>> + Send;
}

impl RecordSink for mpsc::Sender<Record> {
    async fn send_record(&self, record: Record) -> Result<(), SinkError> {
        self.send(record).await.map_err(|_| SinkError::Closed)
    }
}

impl TaskSource for mpsc::Receiver<Task> {
    async fn receive_task(&mut self) -> Result<Task, TaskError> {
        self.recv().await.ok_or(TaskError::Closed)
    }
}
