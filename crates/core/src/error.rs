//! 에러 타입 -- 도메인별 에러 정의

/// sshwatch 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum WatcherError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파이프라인 처리 에러 (소스 선택, 자식 프로세스 등)
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// 출력 싱크 에러
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// 태스크 수신 에러
    #[error("task error: {0}")]
    Task(#[from] TaskError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 출력 싱크 에러
///
/// 싱크 에러는 현재 사이클 동안 다운스트림을 더 이상 사용할 수 없음을 뜻합니다.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// 레코드 직렬화 실패
    #[error("failed to encode record: {0}")]
    Encode(String),

    /// 다운스트림 쓰기 실패
    #[error("downstream write failed: {0}")]
    Io(#[from] std::io::Error),

    /// 다운스트림 채널이 닫힘
    #[error("downstream closed")]
    Closed,
}

/// 태스크 수신 에러
///
/// Control Loop 에서 어떤 수신 에러든 종료 신호로 취급합니다.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// 태스크 스트림이 끝남
    #[error("task stream closed")]
    Closed,

    /// 태스크 디코딩 실패
    #[error("failed to decode task: {0}")]
    Decode(String),

    /// 태스크 스트림 읽기 실패
    #[error("task stream read failed: {0}")]
    Io(#[from] std::io::Error),
}
