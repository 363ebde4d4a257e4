#![no_main]

use libfuzzer_sys::fuzz_target;
use sshwatch_log_pipeline::{SshdEvent, SshdExtractor};

fuzz_target!(|data: &[u8]| {
    let Ok(message) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(extractor) = SshdExtractor::new() else {
        return;
    };

    match extractor.extract(message) {
        Some(SshdEvent::Login(login)) => {
            assert!(message.starts_with(if login.accepted { "Accepted" } else { "Failed" }));
        }
        Some(SshdEvent::Certify(_)) => assert!(message.starts_with("Authorized to")),
        None => {}
    }
});
