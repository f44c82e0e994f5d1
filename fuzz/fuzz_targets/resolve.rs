#![no_main]
use compat_uri::{Uri, UriKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let Ok(base) = Uri::parse(data.0) else {
        return;
    };
    let Ok(r) = Uri::parse_with_kind(data.1, UriKind::RelativeOrAbsolute) else {
        return;
    };

    let Ok(u1) = Uri::combine_uri(&base, &r) else {
        return;
    };
    assert!(u1.is_absolute_uri());
    assert_eq!(Uri::combine(&base, data.1).unwrap(), u1);

    let u2 = Uri::parse(u1.absolute_uri().unwrap()).unwrap();
    assert_eq!(u1, u2);

    if let Ok(rel) = base.make_relative_uri(&u1) {
        let back = Uri::combine_uri(&base, &rel).unwrap();
        assert_eq!(back.absolute_path(), u1.absolute_path());
    }
});
