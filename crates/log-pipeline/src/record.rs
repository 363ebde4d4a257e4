//! 레코드 빌더 -- 추출된 이벤트와 엔트리 메타데이터를 출력 레코드로 변환합니다.

use std::collections::HashMap;

use sshwatch_core::types::{DataType, Entry, Record};

use crate::extractor::SshdEvent;
use crate::parser::timestamp::now_epoch_secs;

/// 엔트리 타임스탬프를 정수로 해석합니다. 실패하면 현재 시각.
pub fn resolve_timestamp(timestamp: &str) -> i64 {
    timestamp.parse::<i64>().unwrap_or_else(|_| now_epoch_secs())
}

/// 이벤트 하나를 레코드로 변환합니다.
pub fn build_record(event: SshdEvent, entry: &Entry) -> Record {
    let (data_type, mut fields) = match event {
        SshdEvent::Login(login) => (
            DataType::SshLogin,
            HashMap::from([
                ("status".to_owned(), login.accepted.to_string()),
                ("types".to_owned(), login.method),
                ("invalid".to_owned(), login.invalid_user.to_string()),
                ("user".to_owned(), login.user),
                ("sip".to_owned(), login.source_ip),
                ("sport".to_owned(), login.source_port),
                ("extra".to_owned(), login.extra),
            ]),
        ),
        SshdEvent::Certify(certify) => (
            DataType::SshCertify,
            HashMap::from([
                ("authorized".to_owned(), certify.authorized_user),
                ("principal".to_owned(), certify.principal),
            ]),
        ),
    };
    fields.insert("pid".to_owned(), entry.pid.clone());
    fields.insert("rawlog".to_owned(), entry.message.clone());

    Record {
        data_type: data_type.code(),
        timestamp: resolve_timestamp(&entry.timestamp),
        fields,
    }
}
