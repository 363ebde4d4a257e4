//! 메트릭 상수 및 설명 등록
//!
//! 모든 Prometheus 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `sshwatch_`
//! - 접미어: `_total` (counter), `_seconds` (gauge/latency)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(sshwatch_core::metrics::LINES_READ_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 로그 형식 레이블 키 (structured, freeform)
pub const LABEL_FORMAT: &str = "format";

/// 데이터 유형 레이블 키 (4000, 4001)
pub const LABEL_DATA_TYPE: &str = "data_type";

// ─── Log Pipeline 메트릭 ────────────────────────────────────────────

/// 자식 프로세스에서 읽은 라인 수 (counter)
pub const LINES_READ_TOTAL: &str = "sshwatch_lines_read_total";

/// 엔트리로 정규화되지 못하고 버려진 라인 수 (counter, label: format)
pub const LINES_DROPPED_TOTAL: &str = "sshwatch_lines_dropped_total";

/// 싱크로 전송된 레코드 수 (counter, label: data_type)
pub const RECORDS_SENT_TOTAL: &str = "sshwatch_records_sent_total";

/// 싱크 전송 실패 수 (counter)
pub const SINK_FAILURES_TOTAL: &str = "sshwatch_sink_failures_total";

/// 자식 프로세스 생성 수 (counter, label: format)
pub const CHILD_SPAWNS_TOTAL: &str = "sshwatch_child_spawns_total";

/// 자식 프로세스 종료 수 (counter)
pub const CHILD_EXITS_TOTAL: &str = "sshwatch_child_exits_total";

// ─── Daemon 메트릭 ──────────────────────────────────────────────────

/// Daemon: 가동 시간 (gauge, 초)
pub const DAEMON_UPTIME_SECONDS: &str = "sshwatch_daemon_uptime_seconds";

/// Daemon: 빌드 정보 (gauge, 항상 1, label: version)
pub const DAEMON_BUILD_INFO: &str = "sshwatch_daemon_build_info";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        LINES_READ_TOTAL,
        "Total number of raw lines read from the log source subprocess"
    );
    describe_counter!(
        LINES_DROPPED_TOTAL,
        "Total number of lines that did not normalize into an entry"
    );
    describe_counter!(
        RECORDS_SENT_TOTAL,
        "Total number of records forwarded to the output sink"
    );
    describe_counter!(
        SINK_FAILURES_TOTAL,
        "Total number of output sink send failures"
    );
    describe_counter!(
        CHILD_SPAWNS_TOTAL,
        "Total number of log source subprocesses spawned"
    );
    describe_counter!(
        CHILD_EXITS_TOTAL,
        "Total number of log source subprocesses reaped"
    );

    describe_gauge!(DAEMON_UPTIME_SECONDS, "sshwatch daemon uptime in seconds");
    describe_gauge!(
        DAEMON_BUILD_INFO,
        "Build information (always 1, with version label)"
    );
}
