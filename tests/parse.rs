use compat_uri::{
    Components, HostNameType, NotAbsoluteError, ParseErrorKind::*, ParseState, Uri, UriFormat,
    UriKind, UriPartial,
};

fn err(s: &str) -> compat_uri::ParseErrorKind {
    Uri::parse(s).unwrap_err().kind()
}

#[test]
fn parse_absolute() {
    let u = Uri::parse("https://example.com:443/a/b?q=1#frag").unwrap();
    assert_eq!(u.scheme(), Ok("https"));
    assert_eq!(u.host(), Ok("example.com"));
    assert_eq!(u.port(), Ok(Some(443)));
    assert_eq!(u.is_default_port(), Ok(true));
    assert_eq!(u.absolute_path(), Ok("/a/b"));
    assert_eq!(u.query(), Ok("?q=1"));
    assert_eq!(u.fragment(), Ok("#frag"));
    assert_eq!(u.host_name_type(), Ok(HostNameType::Dns));
    assert_eq!(u.authority(), Ok("example.com".into()));
    assert_eq!(u.user_info(), Ok(String::new()));
    assert_eq!(u.path_and_query(), Ok("/a/b?q=1"));
    assert_eq!(u.absolute_uri(), Ok("https://example.com/a/b?q=1#frag"));

    let u = Uri::parse("ftp://user:pw@ftp.is.co.za:2121/rfc/rfc1808.txt").unwrap();
    assert_eq!(u.scheme(), Ok("ftp"));
    assert_eq!(u.user_info(), Ok("user:pw".into()));
    assert_eq!(u.host(), Ok("ftp.is.co.za"));
    assert_eq!(u.port(), Ok(Some(2121)));
    assert_eq!(u.is_default_port(), Ok(false));
    assert_eq!(u.authority(), Ok("ftp.is.co.za:2121".into()));
    assert_eq!(u.segments().unwrap(), ["/", "rfc/", "rfc1808.txt"]);

    let u = Uri::parse("mailto:John.Doe@example.com").unwrap();
    assert_eq!(u.scheme(), Ok("mailto"));
    assert_eq!(u.user_info(), Ok("John.Doe".into()));
    assert_eq!(u.host(), Ok("example.com"));
    assert_eq!(u.port(), Ok(Some(25)));

    let u = Uri::parse("news:comp.infosystems.www.servers.unix").unwrap();
    assert_eq!(u.host(), Ok(""));
    assert_eq!(u.absolute_path(), Ok("comp.infosystems.www.servers.unix"));
    assert_eq!(u.port(), Ok(None));
}

#[test]
fn scheme_and_host_are_lowercased() {
    let u = Uri::parse("HTTP://Example.COM/Path").unwrap();
    assert_eq!(u.scheme(), Ok("http"));
    assert_eq!(u.host(), Ok("example.com"));
    assert_eq!(u.absolute_path(), Ok("/Path"));
    assert_eq!(u.absolute_uri(), Ok("http://example.com/Path"));
    assert_eq!(u.original_string(), "HTTP://Example.COM/Path");
}

#[test]
fn empty_path_becomes_root() {
    let u = Uri::parse("http://h").unwrap();
    assert_eq!(u.absolute_path(), Ok("/"));
    assert_eq!(u.absolute_uri(), Ok("http://h/"));
    assert_eq!(u.segments().unwrap(), ["/"]);
}

#[test]
fn dot_segments_are_removed() {
    let u = Uri::parse("http://h/a/./b/../c").unwrap();
    assert_eq!(u.absolute_path(), Ok("/a/c"));

    let u = Uri::parse("http://h/../../x").unwrap();
    assert_eq!(u.absolute_path(), Ok("/x"));

    let u = Uri::parse("http://h/a\\b").unwrap();
    assert_eq!(u.absolute_path(), Ok("/a/b"));
}

#[test]
fn escaped_path_stays_escaped() {
    let u = Uri::parse("http://h/a%2Fb").unwrap();
    assert_eq!(u.absolute_path(), Ok("/a%2Fb"));
    assert_eq!(
        u.get_components(Components::PATH | Components::KEEP_DELIMITER, UriFormat::Unescaped),
        Ok("/a/b".into())
    );
    assert_eq!(
        u.get_components(Components::PATH | Components::KEEP_DELIMITER, UriFormat::UriEscaped),
        Ok("/a%2Fb".into())
    );
}

#[test]
fn characters_are_escaped() {
    let u = Uri::parse("http://h/a b?c d#e f").unwrap();
    assert_eq!(u.absolute_path(), Ok("/a%20b"));
    assert_eq!(u.query(), Ok("?c%20d"));
    assert_eq!(u.fragment(), Ok("#e%20f"));
    assert_eq!(u.to_string(), "http://h/a b?c d#e f");
}

#[test]
fn ports() {
    let u = Uri::parse("http://h:8080/").unwrap();
    assert_eq!(u.port(), Ok(Some(8080)));
    assert_eq!(u.is_default_port(), Ok(false));
    assert_eq!(u.absolute_uri(), Ok("http://h:8080/"));

    let u = Uri::parse("http://h:80/").unwrap();
    assert_eq!(u.port(), Ok(Some(80)));
    assert_eq!(u.is_default_port(), Ok(true));
    assert_eq!(u.absolute_uri(), Ok("http://h/"));

    let u = Uri::parse("http://h:0/").unwrap();
    assert_eq!(u.port(), Ok(Some(0)));

    let u = Uri::parse("http://h:65535/").unwrap();
    assert_eq!(u.port(), Ok(Some(65535)));

    assert_eq!(err("http://h:65536/"), BadPort);
    assert_eq!(err("http://h:12x/"), BadPort);
}

#[test]
fn hosts() {
    let u = Uri::parse("http://0x7f.1/").unwrap();
    assert_eq!(u.host(), Ok("127.0.0.1"));
    assert_eq!(u.host_name_type(), Ok(HostNameType::Ipv4));
    assert_eq!(u.is_loopback(), Ok(true));

    let u = Uri::parse("http://[2001:DB8:0:0:0:0:0:1]:81/").unwrap();
    assert_eq!(u.host(), Ok("[2001:db8::1]"));
    assert_eq!(u.dns_safe_host(), Ok("2001:db8::1"));
    assert_eq!(u.idn_host(), Ok("2001:db8::1"));
    assert_eq!(u.host_name_type(), Ok(HostNameType::Ipv6));
    assert_eq!(u.is_loopback(), Ok(false));

    let u = Uri::parse("http://[fe80::1%eth0]/").unwrap();
    assert_eq!(u.host(), Ok("[fe80::1]"));
    assert_eq!(u.dns_safe_host(), Ok("fe80::1%eth0"));

    let u = Uri::parse("http://[::1]/").unwrap();
    assert_eq!(u.is_loopback(), Ok(true));

    let u = Uri::parse("http://LocalHost/").unwrap();
    assert_eq!(u.host(), Ok("localhost"));
    assert_eq!(u.is_loopback(), Ok(true));

    let u = Uri::parse("http://example.com/").unwrap();
    assert_eq!(u.is_loopback(), Ok(false));
}

#[test]
fn errors() {
    assert_eq!(err(""), EmptyUriString);
    assert_eq!(err("   "), EmptyUriString);
    assert_eq!(err("ab"), BadFormat);
    assert_eq!(err("foo"), BadFormat);
    assert_eq!(err("1ab:x"), BadScheme);
    assert_eq!(err("c:foo"), MustRootedPath);
    assert_eq!(err("http:x"), BadAuthority);
    assert_eq!(err("http://"), BadHostName);
    assert_eq!(err("http://a b/"), BadHostName);
    assert_eq!(err("http://h\\p"), BadAuthorityTerminator);

    let long = format!("x{}:y", "a".repeat(1100));
    assert_eq!(err(&long), SchemeLimit);

    let huge = format!("http://h/{}", "a".repeat(70_000));
    assert_eq!(err(&huge), SizeLimit);
}

#[test]
fn relative_or_absolute() {
    let u = Uri::parse_with_kind("a/b?c", UriKind::RelativeOrAbsolute).unwrap();
    assert!(!u.is_absolute_uri());
    assert_eq!(u.original_string(), "a/b?c");
    assert_eq!(u.to_string(), "a/b?c");
    assert_eq!(u.parse_state(), ParseState::Unparsed);
    assert_eq!(u.scheme(), Err(NotAbsoluteError::default()));
    assert_eq!(u.host(), Err(NotAbsoluteError::default()));
    assert_eq!(u.absolute_path(), Err(NotAbsoluteError::default()));

    let u = Uri::parse_with_kind("", UriKind::RelativeOrAbsolute).unwrap();
    assert!(!u.is_absolute_uri());

    let u = Uri::parse_with_kind("http:x", UriKind::RelativeOrAbsolute).unwrap();
    assert!(!u.is_absolute_uri());

    let u = Uri::parse_with_kind("http://h/", UriKind::RelativeOrAbsolute).unwrap();
    assert!(u.is_absolute_uri());

    assert_eq!(
        Uri::parse_with_kind("http://h/", UriKind::Relative).unwrap_err().kind(),
        CannotCreateRelative
    );
    assert_eq!(
        Uri::parse_with_kind("http://a b/", UriKind::RelativeOrAbsolute)
            .unwrap_err()
            .kind(),
        BadHostName
    );
}

#[test]
fn left_parts() {
    let u = Uri::parse("http://user@h:8080/a/b?q#f").unwrap();
    assert_eq!(u.get_left_part(UriPartial::Scheme), Ok("http://".into()));
    assert_eq!(u.get_left_part(UriPartial::Authority), Ok("http://user@h:8080".into()));
    assert_eq!(u.get_left_part(UriPartial::Path), Ok("http://user@h:8080/a/b".into()));
    assert_eq!(u.get_left_part(UriPartial::Query), Ok("http://user@h:8080/a/b?q".into()));

    let u = Uri::parse("news:comp.lang").unwrap();
    assert_eq!(u.get_left_part(UriPartial::Authority), Ok(String::new()));
}

#[test]
fn components() {
    let u = Uri::parse("http://user@h:8080/a?q#f").unwrap();
    assert_eq!(
        u.get_components(Components::SCHEME_AND_SERVER, UriFormat::UriEscaped),
        Ok("http://h:8080".into())
    );
    assert_eq!(
        u.get_components(Components::HOST_AND_PORT, UriFormat::UriEscaped),
        Ok("h:8080".into())
    );
    assert_eq!(
        u.get_components(Components::PATH_AND_QUERY, UriFormat::UriEscaped),
        Ok("/a?q".into())
    );
    assert_eq!(
        u.get_components(Components::QUERY, UriFormat::UriEscaped),
        Ok("q".into())
    );
    assert_eq!(
        u.get_components(Components::SCHEME, UriFormat::UriEscaped),
        Ok("http".into())
    );

    let u = Uri::parse("http://h/").unwrap();
    assert_eq!(
        u.get_components(Components::STRONG_PORT, UriFormat::UriEscaped),
        Ok("80".into())
    );
    assert_eq!(
        u.get_components(Components::PORT, UriFormat::UriEscaped),
        Ok(String::new())
    );
}

#[test]
fn whitespace_is_trimmed() {
    let u = Uri::parse(" \t http://h/a \r\n").unwrap();
    assert_eq!(u.absolute_uri(), Ok("http://h/a"));
    assert_eq!(u.original_string(), " \t http://h/a \r\n");
}

#[test]
fn unknown_schemes() {
    let u = Uri::parse("x-custom://Host:1234/a/../b").unwrap();
    assert_eq!(u.scheme(), Ok("x-custom"));
    assert_eq!(u.port(), Ok(Some(1234)));
    assert_eq!(u.absolute_path(), Ok("/b"));

    let u = Uri::parse("urn:isbn:0451450523").unwrap();
    assert_eq!(u.scheme(), Ok("urn"));
    assert_eq!(u.absolute_path(), Ok("isbn:0451450523"));
    assert_eq!(u.port(), Ok(None));
}

#[test]
fn user_escaped() {
    let u = Uri::parse_escaped("http://h/a%20b", UriKind::Absolute).unwrap();
    assert!(u.user_escaped());
    assert_eq!(u.absolute_path(), Ok("/a%20b"));

    let u = Uri::parse("http://h/a").unwrap();
    assert!(!u.user_escaped());
}
