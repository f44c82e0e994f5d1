#![cfg(feature = "serde")]

use compat_uri::Uri;

#[test]
fn round_trip() {
    let u = Uri::parse("HTTP://h/a").unwrap();
    let json = serde_json::to_string(&u).unwrap();
    assert_eq!(json, r#""HTTP://h/a""#);
    let back: Uri = serde_json::from_str(&json).unwrap();
    assert_eq!(back, u);
    assert_eq!(back.original_string(), "HTTP://h/a");
}

#[test]
fn relative_and_invalid() {
    let u: Uri = serde_json::from_str(r#""a/b""#).unwrap();
    assert!(!u.is_absolute_uri());
    assert_eq!(serde_json::to_string(&u).unwrap(), r#""a/b""#);

    assert!(serde_json::from_str::<Uri>(r#""http://a b/""#).is_err());
}
