//! Control Loop -- 외부 태스크 소스를 기다리다 수신 에러가 나면 활성 자식을 종료합니다.
//!
//! 태스크의 의미는 다루지 않습니다. 수신 실패는 호스트 측 종료 또는 연결 끊김으로 보고,
//! 자식 프로세스가 출력 닫힘을 스스로 알아채기를 기다리지 않고 즉시 종료시킵니다.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use sshwatch_core::error::TaskError;
use sshwatch_core::pipeline::TaskSource;

use crate::child::ActiveChild;
use crate::process::ChildProcess;

/// 태스크 수신 루프
pub struct ControlLoop<T, C> {
    tasks: T,
    active: ActiveChild<C>,
    cancel: Option<CancellationToken>,
}

impl<T, C> ControlLoop<T, C>
where
    T: TaskSource,
    C: ChildProcess,
{
    /// 수퍼바이저와 같은 활성 자식 핸들을 공유하는 루프를 생성합니다.
    pub fn new(tasks: T, active: ActiveChild<C>) -> Self {
        Self {
            tasks,
            active,
            cancel: None,
        }
    }

    /// 루프가 끝날 때 함께 취소할 토큰을 연결합니다.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// 수신 에러가 날 때까지 태스크를 받습니다.
    ///
    /// 항상 종료 원인이 된 에러를 반환합니다.
    pub async fn run(mut self) -> TaskError {
        info!("control loop started");
        let err = loop {
            match self.tasks.receive_task().await {
                Ok(task) => debug!(
                    data_type = task.data_type,
                    object_name = task.object_name.as_str(),
                    "received task"
                ),
                Err(e) => break e,
            }
        };

        error!(error = %err, "when receiving task, an error occurred");
        let killed = self.active.kill();
        debug!(killed, "control loop released active subprocess");
        if let Some(cancel) = &self.cancel {
            cancel.cancel();
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use tokio::sync::mpsc;

    use super::*;
    use crate::process::ChildExit;
    use sshwatch_core::types::Task;

    struct FlagChild(Arc<AtomicBool>);

    impl ChildProcess for FlagChild {
        fn id(&self) -> Option<u32> {
            None
        }

        fn start_kill(&mut self) -> io::Result<()> {
            self.0.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn wait(&mut self) -> io::Result<ChildExit> {
            Ok(ChildExit {
                code: Some(0),
                signal: None,
                success: true,
            })
        }
    }

    #[tokio::test]
    async fn receive_error_kills_active_child_and_cancels() {
        let killed = Arc::new(AtomicBool::new(false));
        let active = ActiveChild::new();
        active.install(FlagChild(Arc::clone(&killed)));
        let cancel = CancellationToken::new();

        let (tx, rx) = mpsc::channel::<Task>(4);
        tx.send(Task::default()).await.unwrap();
        tx.send(Task::default()).await.unwrap();
        drop(tx);

        let err = ControlLoop::new(rx, active.clone())
            .with_cancellation(cancel.clone())
            .run()
            .await;

        assert!(matches!(err, TaskError::Closed));
        assert!(killed.load(Ordering::SeqCst));
        assert!(!active.is_active());
        assert!(cancel.is_cancelled());
    }

    #[tokio::test]
    async fn receive_error_without_child_is_clean() {
        let (tx, rx) = mpsc::channel::<Task>(1);
        drop(tx);
        let err = ControlLoop::new(rx, ActiveChild::<FlagChild>::new())
            .run()
            .await;
        assert!(matches!(err, TaskError::Closed));
    }
}
