//! 도메인 타입 -- 파이프라인 전역에서 사용되는 공통 타입
//!
//! 로그 라인은 [`Entry`]로 정규화되고, 추출된 이벤트는 [`Record`]로 변환되어
//! 출력 싱크로 전달됩니다.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 정규화된 로그 엔트리
///
/// 로그 형식(journal JSON, syslog 텍스트)과 무관하게 한 라인을 같은 모양으로 표현합니다.
/// 라인 하나당 최대 하나의 엔트리가 만들어지고, 레코드 변환 후 버려집니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    /// 로그 본문
    pub message: String,
    /// 소스가 보고한 프로세스 ID (비어 있을 수 있음)
    pub pid: String,
    /// Unix epoch 초 문자열 (비어 있거나 숫자가 아닐 수 있음)
    pub timestamp: String,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] sshd[{}]: {}", self.timestamp, self.pid, self.message)
    }
}

/// 레코드 데이터 유형
///
/// 숫자 태그가 필드 이름 집합을 유일하게 결정합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// SSH 로그인 시도 (4000)
    SshLogin,
    /// krb5 kuserok 인가 (4001)
    SshCertify,
}

impl DataType {
    /// 와이어 상의 숫자 태그를 반환합니다.
    pub const fn code(self) -> i32 {
        match self {
            Self::SshLogin => 4000,
            Self::SshCertify => 4001,
        }
    }

    /// 숫자 태그에서 데이터 유형을 찾습니다.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            4000 => Some(Self::SshLogin),
            4001 => Some(Self::SshCertify),
            _ => None,
        }
    }

    /// 이 유형의 레코드가 가지는 필드 이름 목록
    pub const fn field_names(self) -> &'static [&'static str] {
        match self {
            Self::SshLogin => &[
                "status", "types", "invalid", "user", "sip", "sport", "extra", "pid", "rawlog",
            ],
            Self::SshCertify => &["authorized", "principal", "pid", "rawlog"],
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 출력 레코드
///
/// 추출된 이벤트 하나당 한 번 만들어지며, 싱크로 전송하면 소유권이 넘어갑니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// 숫자 데이터 유형 태그 ([`DataType::code`])
    pub data_type: i32,
    /// Unix epoch 초
    pub timestamp: i64,
    /// 필드 맵 (키 유일, 순서 무관)
    pub fields: HashMap<String, String>,
}

impl Record {
    /// 필드 값을 조회합니다.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// 외부 태스크 소스가 전달하는 제어 태스크
///
/// 태스크 의미는 이 크레이트의 관심사가 아니며, 수신 실패 경로만 파이프라인에 영향을 줍니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    /// 태스크 유형
    pub data_type: i32,
    /// 대상 객체 이름
    pub object_name: String,
    /// 태스크 본문
    pub data: String,
    /// 요청 토큰
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_codes() {
        assert_eq!(DataType::SshLogin.code(), 4000);
        assert_eq!(DataType::SshCertify.code(), 4001);
        assert_eq!(DataType::from_code(4001), Some(DataType::SshCertify));
        assert_eq!(DataType::from_code(1), None);
    }

    #[test]
    fn field_name_sets_are_disjoint_except_shared_keys() {
        let login = DataType::SshLogin.field_names();
        let certify = DataType::SshCertify.field_names();
        let shared: Vec<_> = login.iter().filter(|k| certify.contains(k)).collect();
        assert_eq!(shared, vec![&"pid", &"rawlog"]);
    }

    #[test]
    fn record_serializes_as_json_object() {
        let mut fields = HashMap::new();
        fields.insert("principal".to_owned(), "alice@EXAMPLE.COM".to_owned());
        let record = Record {
            data_type: DataType::SshCertify.code(),
            timestamp: 1_700_000_000,
            fields,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["data_type"], 4001);
        assert_eq!(json["timestamp"], 1_700_000_000_i64);
        assert_eq!(json["fields"]["principal"], "alice@EXAMPLE.COM");
    }

    #[test]
    fn task_missing_fields_default() {
        let task: Task = serde_json::from_str(r#"{"data_type": 1060}"#).unwrap();
        assert_eq!(task.data_type, 1060);
        assert!(task.token.is_empty());
    }

    #[test]
    fn entry_display() {
        let entry = Entry {
            message: "Connection closed".to_owned(),
            pid: "42".to_owned(),
            timestamp: "1700000000".to_owned(),
        };
        assert_eq!(entry.to_string(), "[1700000000] sshd[42]: Connection closed");
    }
}
