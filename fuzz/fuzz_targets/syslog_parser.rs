#![no_main]

use libfuzzer_sys::fuzz_target;
use sshwatch_log_pipeline::parser::SyslogParser;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = std::str::from_utf8(data) {
        let parser = SyslogParser::new().with_year(2024);

        // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
        let _ = parser.parse(line);
    }
});
