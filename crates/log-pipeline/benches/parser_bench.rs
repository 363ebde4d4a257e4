//! 라인 정규화 + 이벤트 추출 벤치마크
//!
//! journal JSON, BSD syslog 정규화와 sshd 패턴 추출, 레코드 변환까지의 처리량을 측정합니다.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use sshwatch_log_pipeline::parser::{JournalParser, LineNormalizer, SyslogParser};
use sshwatch_log_pipeline::{SshdExtractor, build_record};

/// journal 로그인 라인
const JOURNAL_LOGIN: &str = r#"{"__CURSOR":"s=7f1c;i=1a2b","__REALTIME_TIMESTAMP":"1700000000123456","__MONOTONIC_TIMESTAMP":"123456789","_BOOT_ID":"8c1f","PRIORITY":"6","_UID":"0","_GID":"0","_COMM":"sshd","_EXE":"/usr/sbin/sshd","_PID":"4242","MESSAGE":"Accepted publickey for zhanglei.sec from 10.87.61.221 port 50998 ssh2: RSA SHA256:l9nMCPKgwkWtfRKH4INyvpU3e+PIXtdKsm3jrvXRuMo"}"#;

/// journal 무관 라인
const JOURNAL_NOISE: &str = r#"{"__REALTIME_TIMESTAMP":"1700000000123456","_COMM":"sshd","_PID":"4242","MESSAGE":"Connection closed by 10.2.222.166 port 57294 [preauth]"}"#;

/// syslog 로그인 라인
const SYSLOG_LOGIN: &str = "Jan  2 15:04:05 bastion-01 sshd[4242]: Failed password for invalid user admin from 10.2.222.166 port 57294 ssh2";

/// syslog 인가 라인
const SYSLOG_CERTIFY: &str = "Nov 14 22:13:20 bastion-01 sshd[4243]: Authorized to tiger, krb5 principal zhanglei.sec@BYTEDANCE.COM (krb5_kuserok)";

/// sshd와 무관한 syslog 라인
const SYSLOG_CRON: &str =
    "Jan  2 15:04:05 bastion-01 CRON[991]: pam_unix(cron:session): session opened for user root";

fn bench_normalize(c: &mut Criterion) {
    let journal = JournalParser::new();
    let syslog = SyslogParser::new().with_year(2024);

    let mut group = c.benchmark_group("normalize");
    group.throughput(Throughput::Elements(1));

    group.bench_function("journal_login", |b| {
        b.iter(|| journal.parse(black_box(JOURNAL_LOGIN)).unwrap())
    });
    group.bench_function("syslog_login", |b| {
        b.iter(|| syslog.parse(black_box(SYSLOG_LOGIN)).unwrap())
    });
    group.bench_function("syslog_rejected", |b| {
        b.iter(|| syslog.parse(black_box(SYSLOG_CRON)).is_err())
    });

    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let extractor = SshdExtractor::new().unwrap();

    let mut group = c.benchmark_group("extract");
    group.throughput(Throughput::Elements(1));

    for (name, message) in [
        (
            "login",
            "Accepted publickey for zhanglei.sec from 10.87.61.221 port 50998 ssh2: RSA SHA256:l9nM",
        ),
        (
            "certify",
            "Authorized to tiger, krb5 principal zhanglei.sec@BYTEDANCE.COM (krb5_kuserok)",
        ),
        ("no_match", "Connection closed by 10.2.222.166 port 57294"),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), message, |b, msg| {
            b.iter(|| extractor.extract(black_box(msg)))
        });
    }

    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let extractor = SshdExtractor::new().unwrap();
    let journal = LineNormalizer::Structured(JournalParser::new());
    let syslog = LineNormalizer::Freeform(SyslogParser::new().with_year(2024));

    let journal_lines: Vec<&str> = [JOURNAL_LOGIN, JOURNAL_NOISE]
        .iter()
        .copied()
        .cycle()
        .take(1000)
        .collect();
    let syslog_lines: Vec<&str> = [SYSLOG_LOGIN, SYSLOG_CERTIFY, SYSLOG_CRON]
        .iter()
        .copied()
        .cycle()
        .take(1000)
        .collect();

    let mut group = c.benchmark_group("end_to_end");
    group.throughput(Throughput::Elements(1000));

    for (name, normalizer, lines) in [
        ("journal_1000", &journal, &journal_lines),
        ("syslog_1000", &syslog, &syslog_lines),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut records = 0usize;
                for line in lines {
                    let Some(entry) = normalizer.parse(black_box(line)).ok() else {
                        continue;
                    };
                    if let Some(event) = extractor.extract(&entry.message) {
                        black_box(build_record(event, &entry));
                        records += 1;
                    }
                }
                records
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_extract, bench_end_to_end);
criterion_main!(benches);
