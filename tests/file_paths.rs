use compat_uri::{HostNameType, Uri, UriKind, UriPartial};

#[test]
fn explicit_dos_path() {
    let u = Uri::parse("file:///c:/temp/x.txt").unwrap();
    assert_eq!(u.is_file(), Ok(true));
    assert_eq!(u.is_unc(), Ok(false));
    assert_eq!(u.host(), Ok(""));
    assert_eq!(u.is_loopback(), Ok(true));
    assert_eq!(u.absolute_path(), Ok("/c:/temp/x.txt"));
    assert_eq!(u.local_path(), Ok(r"c:\temp\x.txt".into()));
    assert_eq!(u.absolute_uri(), Ok("file:///c:/temp/x.txt"));
    assert_eq!(u.segments().unwrap(), ["/", "c:/", "temp/", "x.txt"]);
}

#[test]
fn implicit_dos_path() {
    let u = Uri::parse(r"c:\temp\x.txt").unwrap();
    assert_eq!(u.is_file(), Ok(true));
    assert_eq!(u.scheme(), Ok("file"));
    assert_eq!(u.absolute_path(), Ok("c:/temp/x.txt"));
    assert_eq!(u.local_path(), Ok(r"c:\temp\x.txt".into()));
    assert_eq!(u.absolute_uri(), Ok("file:///c:/temp/x.txt"));
    assert_eq!(u.original_string(), r"c:\temp\x.txt");

    let u = Uri::parse(r"c:\a\..\b").unwrap();
    assert_eq!(u.local_path(), Ok(r"c:\b".into()));

    // A drive path is absolute even when relative input is allowed.
    let u = Uri::parse_with_kind(r"c:\x", UriKind::RelativeOrAbsolute).unwrap();
    assert!(u.is_absolute_uri());
}

#[test]
fn unc_paths() {
    let u = Uri::parse(r"\\server\share\f.txt").unwrap();
    assert_eq!(u.is_unc(), Ok(true));
    assert_eq!(u.is_file(), Ok(true));
    assert_eq!(u.host(), Ok("server"));
    assert_eq!(u.host_name_type(), Ok(HostNameType::Dns));
    assert_eq!(u.absolute_path(), Ok("/share/f.txt"));
    assert_eq!(u.local_path(), Ok(r"\\server\share\f.txt".into()));
    assert_eq!(u.absolute_uri(), Ok("file://server/share/f.txt"));

    let u = Uri::parse("file://server/share/f.txt").unwrap();
    assert_eq!(u.is_unc(), Ok(true));
    assert_eq!(u.local_path(), Ok(r"\\server\share\f.txt".into()));
    assert_eq!(
        u.get_left_part(UriPartial::Authority),
        Ok("file://server".into())
    );
}

#[cfg(not(windows))]
#[test]
fn unix_paths() {
    let u = Uri::parse("/usr/lib/x").unwrap();
    assert_eq!(u.is_file(), Ok(true));
    assert_eq!(u.is_unc(), Ok(false));
    assert_eq!(u.absolute_path(), Ok("/usr/lib/x"));
    assert_eq!(u.local_path(), Ok("/usr/lib/x".into()));
    assert_eq!(u.absolute_uri(), Ok("file:///usr/lib/x"));

    let u = Uri::parse_with_kind("/usr/lib/x", UriKind::RelativeOrAbsolute).unwrap();
    assert!(!u.is_absolute_uri());

    let u = Uri::parse("file:///usr/lib/x").unwrap();
    assert_eq!(u.absolute_path(), Ok("/usr/lib/x"));
    assert_eq!(u.local_path(), Ok("/usr/lib/x".into()));
}

#[test]
fn combine_against_files() {
    let base = Uri::parse("file:///c:/dir/x.txt").unwrap();
    let u = Uri::combine(&base, "y.txt").unwrap();
    assert_eq!(u.absolute_uri(), Ok("file:///c:/dir/y.txt"));
    let u = Uri::combine(&base, "/z.txt").unwrap();
    assert_eq!(u.absolute_uri(), Ok("file:///c:/z.txt"));
    let u = Uri::combine(&base, r"d:\other").unwrap();
    assert_eq!(u.local_path(), Ok(r"d:\other".into()));

    let base = Uri::parse(r"c:\dir\x.txt").unwrap();
    let u = Uri::combine(&base, "y.txt").unwrap();
    assert_eq!(u.local_path(), Ok(r"c:\dir\y.txt".into()));
    let u = Uri::combine(&base, "../y.txt").unwrap();
    assert_eq!(u.local_path(), Ok(r"c:\y.txt".into()));

    let base = Uri::parse(r"\\server\share\dir\f").unwrap();
    let u = Uri::combine(&base, "g").unwrap();
    assert_eq!(u.local_path(), Ok(r"\\server\share\dir\g".into()));
}
