use compat_uri::{HostNameType, Uri};

#[test]
fn unicode_host() {
    let u = Uri::parse("http://bücher.de/").unwrap();
    assert_eq!(u.host(), Ok("bücher.de"));
    assert_eq!(u.idn_host(), Ok("xn--bcher-kva.de"));
    assert_eq!(u.host_name_type(), Ok(HostNameType::Dns));
    assert_eq!(u.original_string(), "http://bücher.de/");
}

#[test]
fn unicode_path_is_escaped() {
    let u = Uri::parse("http://h/ü").unwrap();
    assert_eq!(u.absolute_path(), Ok("/%C3%BC"));
    assert_eq!(u.to_string(), "http://h/ü");

    // Escaped and raw forms of the same character agree.
    let u = Uri::parse("http://h/%C3%BCü").unwrap();
    assert_eq!(u.absolute_path(), Ok("/%C3%BC%C3%BC"));
}

#[test]
fn bidi_controls_are_escaped() {
    let u = Uri::parse("http://h/a\u{200E}b").unwrap();
    assert_eq!(u.absolute_path(), Ok("/a%E2%80%8Eb"));
}

#[test]
fn ascii_input_is_left_alone() {
    let u = Uri::parse("http://h/%C3%BC").unwrap();
    assert_eq!(u.absolute_path(), Ok("/%C3%BC"));
    assert_eq!(u.original_string(), "http://h/%C3%BC");
}

#[test]
fn dos_path_escapes_non_iri_chars_once() {
    let u = Uri::parse("c:\\dir\\a\u{200E}.txt").unwrap();
    assert_eq!(u.absolute_uri(), Ok("file:///c:/dir/a%E2%80%8E.txt"));
    assert_eq!(u.absolute_path(), Ok("c:/dir/a%E2%80%8E.txt"));
    assert_eq!(u.local_path().as_deref(), Ok("c:\\dir\\a\u{200E}.txt"));

    let v = Uri::parse(u.absolute_uri().unwrap()).unwrap();
    assert_eq!(u, v);
}

#[test]
fn dos_path_keeps_unicode_letters() {
    let u = Uri::parse("c:\\dir\\ü.txt").unwrap();
    assert_eq!(u.absolute_uri(), Ok("file:///c:/dir/%C3%BC.txt"));
    assert_eq!(u.local_path().as_deref(), Ok("c:\\dir\\ü.txt"));
}

#[cfg(not(windows))]
#[test]
fn unix_path_escapes_non_iri_chars_once() {
    let u = Uri::parse("/tmp/\u{FFFC}").unwrap();
    assert_eq!(u.absolute_uri(), Ok("file:///tmp/%EF%BF%BC"));
    assert_eq!(u.local_path().as_deref(), Ok("/tmp/\u{FFFC}"));
    assert_eq!(u, Uri::parse("file:///tmp/%EF%BF%BC").unwrap());
}
