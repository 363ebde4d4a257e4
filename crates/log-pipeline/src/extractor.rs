//! sshd 이벤트 추출기
//!
//! 정규화된 메시지를 두 가지 고정 패턴과 비교하여 구조화된 이벤트를 추출합니다.
//!
//! - 로그인: `Accepted|Failed <method> for [invalid user ]<user> from <ip> port <port> ssh2[:] <extra>`
//! - 인가: `Authorized to <user>, krb5 principal <principal> (krb5_kuserok)`
//!
//! 두 패턴 모두 전체 라인에 고정(anchored)되어 있으며 서로 배타적입니다.
//! 로그인 패턴을 먼저 시도합니다.

use regex::Regex;

use crate::error::LogPipelineError;

/// 토큰 문자 클래스: 영숫자, `-`, `_`, `.`, `@`
const LOGIN_PATTERN: &str = r"^(Accepted|Failed)\s+([a-zA-Z0-9\-_.@]+)\s+for\s+(invalid user\s+)?([a-zA-Z0-9\-_.@]*)\s+from\s+([a-zA-Z0-9\-_.@]+)\s+port\s+([a-zA-Z0-9\-_.@]+)\s+ssh2:?\s*(.*)$";

const CERTIFY_PATTERN: &str = r"^Authorized to\s+([a-zA-Z0-9\-_.@]*),\s*krb5 principal\s+([a-zA-Z0-9\-_.@]+)\s+\(krb5_kuserok\)$";

/// SSH 인증 시도 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginEvent {
    /// `Accepted`이면 true
    pub accepted: bool,
    /// 인증 방식 (publickey, password, none 등)
    pub method: String,
    /// `invalid user` 표시가 있으면 true
    pub invalid_user: bool,
    /// 사용자 이름 (비어 있을 수 있음)
    pub user: String,
    /// 접속 IP
    pub source_ip: String,
    /// 접속 포트
    pub source_port: String,
    /// 뒤따르는 자유 텍스트 (키 지문 등)
    pub extra: String,
}

/// krb5 kuserok 인가 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertifyEvent {
    /// 인가된 로컬 사용자 (비어 있을 수 있음)
    pub authorized_user: String,
    /// krb5 principal
    pub principal: String,
}

/// 추출된 sshd 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshdEvent {
    Login(LoginEvent),
    Certify(CertifyEvent),
}

/// sshd 메시지 이벤트 추출기
///
/// 정규식은 생성 시 한 번만 컴파일됩니다.
#[derive(Debug, Clone)]
pub struct SshdExtractor {
    login: Regex,
    certify: Regex,
}

impl SshdExtractor {
    /// 정규식을 컴파일하여 추출기를 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        Ok(Self {
            login: Regex::new(LOGIN_PATTERN)?,
            certify: Regex::new(CERTIFY_PATTERN)?,
        })
    }

    /// 로그인 이벤트 추출을 시도합니다.
    pub fn parse_login(&self, message: &str) -> Option<LoginEvent> {
        let caps = self.login.captures(message)?;
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str()).to_owned();

        Some(LoginEvent {
            accepted: &caps[1] == "Accepted",
            method: group(2),
            invalid_user: caps.get(3).is_some(),
            user: group(4),
            source_ip: group(5),
            source_port: group(6),
            extra: group(7),
        })
    }

    /// 인가 이벤트 추출을 시도합니다.
    pub fn parse_certify(&self, message: &str) -> Option<CertifyEvent> {
        let caps = self.certify.captures(message)?;
        Some(CertifyEvent {
            authorized_user: caps[1].to_owned(),
            principal: caps[2].to_owned(),
        })
    }

    /// 로그인 → 인가 순서로 이벤트를 추출합니다.
    pub fn extract(&self, message: &str) -> Option<SshdEvent> {
        if let Some(login) = self.parse_login(message) {
            return Some(SshdEvent::Login(login));
        }
        self.parse_certify(message).map(SshdEvent::Certify)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SshdExtractor {
        SshdExtractor::new().unwrap()
    }

    #[test]
    fn login_accepted_publickey_with_fingerprint() {
        let event = extractor()
            .parse_login("Accepted publickey for zhanglei.sec from 10.87.61.221 port 50998 ssh2: RSA SHA256:l9nMCPKgwkWtfRKH4INyvpU3e+PIXtdKsm3jrvXRuMo")
            .unwrap();
        assert_eq!(
            event,
            LoginEvent {
                accepted: true,
                method: "publickey".to_owned(),
                invalid_user: false,
                user: "zhanglei.sec".to_owned(),
                source_ip: "10.87.61.221".to_owned(),
                source_port: "50998".to_owned(),
                extra: "RSA SHA256:l9nMCPKgwkWtfRKH4INyvpU3e+PIXtdKsm3jrvXRuMo".to_owned(),
            }
        );
    }

    #[test]
    fn login_accepted_gssapi() {
        let event = extractor()
            .parse_login("Accepted gssapi-with-mic for zhanglei.sec from 10.2.222.166 port 57302 ssh2")
            .unwrap();
        assert!(event.accepted);
        assert_eq!(event.method, "gssapi-with-mic");
        assert_eq!(event.source_port, "57302");
        assert!(event.extra.is_empty());
    }

    #[test]
    fn login_failed_password() {
        let event = extractor()
            .parse_login("Failed password for zhanglei.sec from 10.2.222.166 port 57294 ssh2")
            .unwrap();
        assert!(!event.accepted);
        assert_eq!(event.method, "password");
        assert!(!event.invalid_user);
        assert_eq!(event.user, "zhanglei.sec");
    }

    #[test]
    fn login_empty_user_is_preserved() {
        let event = extractor()
            .parse_login("Failed none for  from 10.2.222.166 port 57294 ssh2")
            .unwrap();
        assert!(!event.accepted);
        assert_eq!(event.method, "none");
        assert_eq!(event.user, "");
        assert_eq!(event.source_ip, "10.2.222.166");
        assert_eq!(event.source_port, "57294");
        assert_eq!(event.extra, "");
    }

    #[test]
    fn login_invalid_user() {
        let event = extractor()
            .parse_login("Failed password for invalid user zhanglei.sec from 10.2.222.166 port 57294 ssh2")
            .unwrap();
        assert!(event.invalid_user);
        assert_eq!(event.user, "zhanglei.sec");
    }

    #[test]
    fn certify_same_user() {
        let event = extractor()
            .parse_certify("Authorized to zhanglei.sec, krb5 principal zhanglei.sec@BYTEDANCE.COM (krb5_kuserok)")
            .unwrap();
        assert_eq!(event.authorized_user, "zhanglei.sec");
        assert_eq!(event.principal, "zhanglei.sec@BYTEDANCE.COM");
    }

    #[test]
    fn certify_different_user() {
        let event = extractor()
            .parse_certify("Authorized to tiger, krb5 principal zhanglei.sec@BYTEDANCE.COM (krb5_kuserok)")
            .unwrap();
        assert_eq!(event.authorized_user, "tiger");
        assert_eq!(event.principal, "zhanglei.sec@BYTEDANCE.COM");
    }

    #[test]
    fn unrelated_messages_do_not_match() {
        let extractor = extractor();
        for input in [
            "Some random log message",
            "Connection closed by 10.2.222.166",
            "",
        ] {
            assert!(extractor.parse_login(input).is_none(), "login matched {input:?}");
            assert!(extractor.parse_certify(input).is_none(), "certify matched {input:?}");
            assert!(extractor.extract(input).is_none());
        }
    }

    #[test]
    fn patterns_are_anchored() {
        let extractor = extractor();
        assert!(
            extractor
                .parse_login("prefix Failed password for root from 1.2.3.4 port 22 ssh2")
                .is_none()
        );
        assert!(
            extractor
                .parse_certify("Authorized to tiger, krb5 principal a@B (krb5_kuserok) trailing")
                .is_none()
        );
    }

    #[test]
    fn extract_dispatches_by_pattern() {
        let extractor = extractor();
        assert!(matches!(
            extractor.extract("Accepted password for root from 1.2.3.4 port 22 ssh2"),
            Some(SshdEvent::Login(_))
        ));
        assert!(matches!(
            extractor.extract("Authorized to , krb5 principal a@B (krb5_kuserok)"),
            Some(SshdEvent::Certify(CertifyEvent { ref authorized_user, .. })) if authorized_user.is_empty()
        ));
    }
}
