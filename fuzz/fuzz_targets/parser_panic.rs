#![no_main]
use cxxblame_log::{Settings, ToolOutputParser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Text path: lossy conversion keeps inputs that are "almost" text.
    let s = String::from_utf8_lossy(data);
    let _ = cxxblame_log::parse(&s);

    // Streaming path: raw bytes, so invalid UTF-8 reaches the reader too.
    let driver = ToolOutputParser::new(Settings::default());
    let _ = driver.parse_reader(data);
});
