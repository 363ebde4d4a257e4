#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use sshwatch_core::types::DataType;
use sshwatch_log_pipeline::{LineNormalizer, LogFormat, SshdExtractor, build_record};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    structured: bool,
    line: String,
}

fuzz_target!(|input: FuzzInput| {
    let format = if input.structured {
        LogFormat::Structured
    } else {
        LogFormat::Freeform
    };
    let normalizer = LineNormalizer::for_format(format);
    let Ok(extractor) = SshdExtractor::new() else {
        return;
    };

    let Ok(entry) = normalizer.parse(&input.line) else {
        return;
    };
    if let Some(event) = extractor.extract(&entry.message) {
        let record = build_record(event, &entry);

        // 필드 이름 집합은 데이터 유형이 결정한다
        let data_type = DataType::from_code(record.data_type).expect("known data type");
        assert_eq!(record.fields.len(), data_type.field_names().len());
        for key in data_type.field_names() {
            assert!(record.fields.contains_key(*key));
        }
    }
});
