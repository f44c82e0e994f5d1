#![no_main]
use compat_uri::{escape_data_string, unescape_data_string};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let escaped = escape_data_string(data);
    assert!(escaped.is_ascii());
    assert_eq!(unescape_data_string(&escaped), data);
});
