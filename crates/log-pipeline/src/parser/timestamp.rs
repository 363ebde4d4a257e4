//! 타임스탬프 정규화
//!
//! 소스별 타임스탬프 표현을 Unix epoch 초 문자열로 변환합니다.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Utc};

/// syslog 날짜 레이아웃 (한 자리 일자, 공백 패딩 일자)
const SYSLOG_DATE_FORMATS: &[&str] = &["%Y %b %d %H:%M:%S", "%Y %b %e %H:%M:%S"];

/// 월/일 파싱용 기준 연도 (윤년이라 `Feb 29`도 받아들임)
const LEAP_REFERENCE_YEAR: i32 = 2000;

/// 마이크로초 단위 타임스탬프 문자열을 초 단위로 자릅니다.
///
/// 뒤의 6자리를 제거합니다. 6자리 이하이면 `"0"`을 반환합니다.
pub fn micros_to_epoch_secs(micros: &str) -> String {
    if micros.len() <= 6 {
        return "0".to_owned();
    }
    // 멀티바이트 문자 경계에 걸리면 숫자 타임스탬프가 아니므로 빈 문자열
    micros
        .get(..micros.len() - 6)
        .unwrap_or_default()
        .to_owned()
}

/// 연도 없는 syslog 날짜(`Jan 2 15:04:05`)를 epoch 초로 변환합니다.
///
/// `year`를 주입하고 UTC로 해석합니다. 평년의 `Feb 29`는 3월 1일로 넘어갑니다.
/// 두 레이아웃 모두 실패하면 `None`.
pub fn syslog_date_to_epoch(date: &str, year: i32) -> Option<i64> {
    let with_year = format!("{LEAP_REFERENCE_YEAR} {date}");
    let parsed = SYSLOG_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&with_year, fmt).ok())?;
    let day = parsed
        .date()
        .with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))?;
    Some(day.and_time(parsed.time()).and_utc().timestamp())
}

/// 현재 UTC 연도
pub fn current_year() -> i32 {
    Utc::now().year()
}

/// 현재 시각의 epoch 초
pub fn now_epoch_secs() -> i64 {
    Utc::now().timestamp()
}
