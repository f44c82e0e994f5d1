#![no_main]
use compat_uri::Uri;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(u1) = Uri::parse(data) else {
        return;
    };
    let s1 = u1.absolute_uri().unwrap();
    let u2 = Uri::parse(s1).unwrap();

    assert_eq!(u1.scheme(), u2.scheme());
    assert_eq!(u1.host(), u2.host());
    assert_eq!(u1.port(), u2.port());

    // The canonical form is a fixed point.
    assert_eq!(u2.absolute_uri().unwrap(), s1);
    assert_eq!(u1, u2);
});
