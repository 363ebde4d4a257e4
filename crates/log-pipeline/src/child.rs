//! 활성 자식 프로세스 핸들
//!
//! 수퍼바이저와 Control Loop가 공유하는 유일한 가변 상태입니다.
//! 모든 접근(설치, 회수, 종료)은 하나의 뮤텍스를 거치며,
//! 임계 구역은 핸들 교체와 시그널 전송뿐입니다. 프로세스 종료 대기는
//! 항상 잠금 밖에서 수행합니다.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::process::ChildProcess;

/// 공유 자식 프로세스 핸들
///
/// 복제하면 같은 슬롯을 가리킵니다.
pub struct ActiveChild<C> {
    slot: Arc<Mutex<Option<C>>>,
}

impl<C> Clone for ActiveChild<C> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<C> Default for ActiveChild<C> {
    fn default() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }
}

impl<C: ChildProcess> ActiveChild<C> {
    /// 빈 핸들을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<C>> {
        // 임계 구역에서 패닉이 나도 슬롯 자체는 일관된 상태
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 새 자식을 등록합니다. 이전 자식이 남아 있으면 반환합니다.
    pub fn install(&self, child: C) -> Option<C> {
        self.lock().replace(child)
    }

    /// 등록된 자식을 꺼냅니다.
    pub fn take(&self) -> Option<C> {
        self.lock().take()
    }

    /// 자식이 등록되어 있는지 확인합니다.
    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    /// 등록된 자식을 꺼내 강제 종료 신호를 보냅니다.
    ///
    /// 이미 비어 있으면 아무것도 하지 않고 `false`를 반환합니다.
    /// 꺼낸 핸들은 drop되며, 회수는 핸들 구현(`kill_on_drop`)에 맡깁니다.
    pub fn kill(&self) -> bool {
        let Some(mut child) = self.take() else {
            return false;
        };
        let pid = child.id();
        if let Err(e) = child.start_kill() {
            tracing::debug!(pid, error = %e, "kill signal not delivered");
        } else {
            tracing::info!(pid, "killed log source subprocess");
        }
        true
    }
}
