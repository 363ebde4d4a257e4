#![no_main]

use libfuzzer_sys::fuzz_target;
use sshwatch_log_pipeline::parser::JournalParser;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        let parser = JournalParser::new();

        // 임의의 JSON(또는 비 JSON)에 대해 패닉 없이 끝나야 한다
        let _ = parser.parse(line);
    }
});
