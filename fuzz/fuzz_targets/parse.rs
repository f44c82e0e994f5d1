#![no_main]
use compat_uri::{Components, Uri, UriFormat, UriKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Ok(u) = Uri::parse_with_kind(data, UriKind::RelativeOrAbsolute) else {
        return;
    };
    assert_eq!(u.original_string(), data);
    if !u.is_absolute_uri() {
        assert!(u.scheme().is_err());
        return;
    }

    let abs = u.absolute_uri().unwrap();
    let parts = [
        u.get_components(Components::SCHEME_AND_SERVER, UriFormat::UriEscaped),
        u.get_components(Components::USER_INFO, UriFormat::UriEscaped),
        u.get_components(Components::PATH_AND_QUERY, UriFormat::UriEscaped),
        u.get_components(Components::FRAGMENT, UriFormat::UriEscaped),
    ];
    for part in parts {
        part.unwrap();
    }
    let _ = u.host_name_type().unwrap();
    let _ = u.local_path().unwrap();
    let _ = u.to_string();
    assert!(abs.len() >= u.scheme().unwrap().len());
});
