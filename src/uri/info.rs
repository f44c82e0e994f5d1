//! Component offsets and canonical-form flags, computed on demand.

use crate::{
    flags::{Flags, HostType},
    host::{self, CanonicalHost},
    parse::{self, check_canonical, Check, Delim, Parsed, Scanner},
    pct_enc::{self, table},
    scheme::{SchemeSyntax, SyntaxFlags as S},
};
use alloc::string::String;

#[inline]
fn is_slash(x: u8) -> bool {
    x == b'/' || x == b'\\'
}

/// Offsets of the authority components, and the port.
#[derive(Clone, Debug)]
pub(crate) struct Info {
    pub(crate) user: usize,
    pub(crate) host: usize,
    pub(crate) path: usize,
    /// The explicit port, or the default one.
    pub(crate) port: u16,
    pub(crate) flags: Flags,
}

/// Offsets of the query and the fragment.
#[derive(Clone, Debug)]
pub(crate) struct Remaining {
    pub(crate) query: usize,
    pub(crate) fragment: usize,
    pub(crate) end: usize,
    pub(crate) flags: Flags,
}

/// The canonical host and what was learned computing it.
#[derive(Clone, Debug)]
pub(crate) struct HostString {
    pub(crate) host: String,
    pub(crate) scope_id: Option<String>,
    pub(crate) host_type: HostType,
    pub(crate) flags: Flags,
}

/// Locates userinfo, host, port and path.
pub(crate) fn create_info(
    s: &str,
    flags: Flags,
    host_type: HostType,
    authority_end: usize,
    syntax: &SchemeSyntax,
) -> Info {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let mut info = Info {
        user: authority_end,
        host: authority_end,
        path: authority_end,
        port: syntax.default_port().unwrap_or(0),
        flags: Flags::EMPTY,
    };
    let mut scheme_not_canonical = false;

    let mut idx;
    if flags.any(Flags::IMPLICIT_FILE) {
        idx = 0;
        if flags.any(Flags::UNC_PATH) {
            idx = 2;
            while idx < authority_end && is_slash(bytes[idx]) {
                idx += 1;
            }
        }
    } else {
        idx = syntax.name().len() + 1;
        if flags.any(Flags::AUTHORITY_FOUND) {
            if bytes.get(idx) == Some(&b'\\') || bytes.get(idx + 1) == Some(&b'\\') {
                scheme_not_canonical = true;
            }
            idx += 2;
            if flags.any(Flags::UNC_PATH | Flags::DOS_PATH) {
                while idx < authority_end && is_slash(bytes[idx]) {
                    scheme_not_canonical = true;
                    idx += 1;
                }
            }
        }
    }

    if host_type == HostType::Unknown || flags.any(Flags::DOS_PATH) {
        if scheme_not_canonical {
            info.flags |= Flags::SCHEME_NOT_CANONICAL;
        }
        return info;
    }

    info.user = idx;
    if host_type == HostType::Basic {
        info.host = idx;
        return info;
    }

    info.host = if flags.any(Flags::HAS_USER_INFO) {
        s[idx..authority_end].find('@').map_or(idx, |at| idx + at + 1)
    } else {
        idx
    };
    if scheme_not_canonical {
        info.flags |= Flags::SCHEME_NOT_CANONICAL;
    }

    idx = authority_end;
    if idx < len && bytes[idx] == b':' {
        idx += 1;
        let digits = bytes[idx..].iter().take_while(|x| x.is_ascii_digit()).count();
        let port = s[idx..idx + digits]
            .bytes()
            .fold(0u32, |acc, x| (acc * 10 + u32::from(x - b'0')).min(u32::from(u16::MAX)));
        if digits > 0 && bytes[idx] == b'0' {
            // Leading zero.
            info.flags |= Flags::PORT_NOT_CANONICAL | Flags::E_PORT_NOT_CANONICAL;
        }
        let port = port as u16;
        if digits > 0 && Some(port) != syntax.default_port() {
            info.port = port;
            info.flags |= Flags::NOT_DEFAULT_PORT;
        } else {
            info.flags |= Flags::PORT_NOT_CANONICAL | Flags::E_PORT_NOT_CANONICAL;
        }
        idx += digits;
    }
    info.path = idx;
    info
}

/// Scans path, query and fragment for their canonical form.
pub(crate) fn parse_remaining(
    s: &str,
    flags: Flags,
    info: &Info,
    syntax: &SchemeSyntax,
) -> Remaining {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let sc = Scanner::new(flags, syntax);
    let mut cf = Flags::EMPTY;

    if sc.implicit_file {
        cf |= Flags::SCHEME_NOT_CANONICAL;
    } else {
        let name = syntax.name();
        let n = name.len();
        if s.get(..n) != Some(name)
            || (flags.any(Flags::AUTHORITY_FOUND)
                && (n + 3 >= len || bytes[n + 1] != b'/' || bytes[n + 2] != b'/'))
        {
            cf |= Flags::SCHEME_NOT_CANONICAL;
        }
    }

    if flags.any(Flags::HAS_USER_INFO) {
        let (res, _) = check_canonical(s, info.user, info.host, Delim::Char(b'@'), &sc);
        if !res.has(Check::DISPLAY_CANONICAL) {
            cf |= Flags::USER_NOT_CANONICAL;
        }
        if !res.has(Check::ESCAPED_CANONICAL) || res.has(Check::BACKSLASH_IN_PATH) {
            cf |= Flags::E_USER_NOT_CANONICAL;
        }
    }

    // Path.
    let delim = if sc.implicit_file || (!sc.may_have_query && !sc.may_have_fragment) {
        Delim::None
    } else if sc.may_have_query {
        Delim::Char(b'?')
    } else {
        Delim::Char(b'#')
    };
    let (mut res, mut idx) = check_canonical(s, info.path, len, delim, &sc);

    if flags.any(Flags::AUTHORITY_FOUND)
        && syntax.has(S::PATH_IS_ROOTED)
        && (info.path == len || !is_slash(bytes[info.path]))
    {
        cf |= Flags::FIRST_SLASH_ABSENT;
    }

    let unescape_dots = syntax.has(S::UNESCAPE_DOTS_AND_SLASHES);
    let convert_slashes = syntax.has(S::CONVERT_PATH_SLASHES);
    let compress = syntax.has(S::COMPRESS_PATH);
    if flags.any(Flags::DOS_PATH)
        || (flags.any(Flags::AUTHORITY_FOUND) && (compress || convert_slashes || unescape_dots))
    {
        if res.has(Check::DOT_SLASH_ESCAPED) && unescape_dots {
            cf |= Flags::PATH_NOT_CANONICAL | Flags::E_PATH_NOT_CANONICAL;
        }
        if convert_slashes && res.has(Check::BACKSLASH_IN_PATH) {
            cf |= Flags::PATH_NOT_CANONICAL | Flags::E_PATH_NOT_CANONICAL;
        }
        if compress && (cf.any(Flags::E_PATH_NOT_CANONICAL) || res.has(Check::DOT_SLASH_ATTN)) {
            cf |= Flags::SHOULD_BE_COMPRESSED;
        }
        if res.has(Check::BACKSLASH_IN_PATH) {
            cf |= Flags::BACKSLASH_IN_PATH;
        }
    } else if res.has(Check::BACKSLASH_IN_PATH) {
        cf |= Flags::E_PATH_NOT_CANONICAL;
    }

    if !res.has(Check::DISPLAY_CANONICAL)
        && (!sc.implicit_file || flags.any(Flags::USER_ESCAPED) || res.has(Check::RESERVED_FOUND))
    {
        cf |= Flags::PATH_NOT_CANONICAL;
    }
    if sc.implicit_file && (res.has(Check::RESERVED_FOUND) || res.has(Check::ESCAPED_CANONICAL)) {
        res.remove(Check::ESCAPED_CANONICAL);
    }
    if !res.has(Check::ESCAPED_CANONICAL) {
        cf |= Flags::E_PATH_NOT_CANONICAL;
    }

    let query = idx;
    if idx < len && bytes[idx] == b'?' {
        let delim = if sc.may_have_fragment {
            Delim::Char(b'#')
        } else {
            Delim::Eol
        };
        let (res, end) = check_canonical(s, idx + 1, len, delim, &sc);
        idx = end;
        if !res.has(Check::DISPLAY_CANONICAL) {
            cf |= Flags::QUERY_NOT_CANONICAL;
        }
        if !res.has(Check::ESCAPED_CANONICAL) || res.has(Check::BACKSLASH_IN_PATH) {
            cf |= Flags::E_QUERY_NOT_CANONICAL;
        }
    }

    let fragment = idx;
    if idx < len && bytes[idx] == b'#' {
        let (res, end) = check_canonical(s, idx + 1, len, Delim::Eol, &sc);
        idx = end;
        if !res.has(Check::DISPLAY_CANONICAL) {
            cf |= Flags::FRAGMENT_NOT_CANONICAL;
        }
        if !res.has(Check::ESCAPED_CANONICAL) || res.has(Check::BACKSLASH_IN_PATH) {
            cf |= Flags::E_FRAGMENT_NOT_CANONICAL;
        }
    }

    Remaining {
        query,
        fragment,
        end: idx,
        flags: cf,
    }
}

/// The host as written, without userinfo and port.
pub(crate) fn raw_host<'a>(s: &'a str, info: &Info, authority_end: usize) -> &'a str {
    &s[info.host..authority_end.max(info.host)]
}

/// Canonicalizes the host found while parsing.
pub(crate) fn create_host(
    s: &str,
    flags: Flags,
    host_type: HostType,
    authority_end: usize,
    info: &Info,
    syntax: &SchemeSyntax,
) -> HostString {
    let raw = raw_host(s, info, authority_end);
    let canonical = if flags.any(Flags::DOS_PATH) {
        host::canonicalize("", HostType::Basic, false)
    } else {
        host::canonicalize(raw, host_type, syntax.is_v1_unknown())
    };
    finish_host(raw, canonical, host_type, flags, syntax)
}

/// Validates a host supplied by a scheme's extension.
///
/// An answer that does not parse as a host is kept as an opaque basic host.
pub(crate) fn host_from_extension(
    raw: &str,
    answer: &str,
    flags: Flags,
    syntax: &SchemeSyntax,
) -> HostString {
    let scan_flags = flags & !(Flags::HAS_USER_INFO | Flags::CANONICAL_DNS_HOST | Flags::IDN_HOST);
    let host_type = match parse::check_authority(answer, 0, scan_flags, syntax) {
        Ok((end, host_type, _)) if end == answer.len() && host_type != HostType::Unknown => host_type,
        _ => {
            log::debug!("host extension answered {answer:?}, keeping it as a basic host");
            HostType::Basic
        }
    };
    let mut out = finish_host(
        raw,
        host::canonicalize(answer, host_type, syntax.is_v1_unknown()),
        host_type,
        flags & !Flags::CANONICAL_DNS_HOST,
        syntax,
    );
    if out.host != raw {
        out.flags |= Flags::HOST_NOT_CANONICAL | Flags::E_HOST_NOT_CANONICAL;
    }
    out
}

fn finish_host(
    raw: &str,
    canonical: CanonicalHost,
    host_type: HostType,
    flags: Flags,
    syntax: &SchemeSyntax,
) -> HostString {
    let CanonicalHost {
        mut host,
        loopback,
        scope_id,
    } = canonical;
    let mut hflags = Flags::EMPTY;
    if loopback {
        hflags |= Flags::LOOPBACK_HOST;
    }

    if host_type == HostType::Basic && !host.is_empty() {
        let sc = Scanner::new(flags, syntax);
        let (mut res, _) = check_canonical(&host, 0, host.len(), Delim::None, &sc);
        if !res.has(Check::DISPLAY_CANONICAL) && (!sc.implicit_file || res.has(Check::RESERVED_FOUND)) {
            hflags |= Flags::HOST_NOT_CANONICAL;
        }
        if sc.implicit_file && (res.has(Check::RESERVED_FOUND) || res.has(Check::ESCAPED_CANONICAL)) {
            res.remove(Check::ESCAPED_CANONICAL);
        }
        if !res.has(Check::ESCAPED_CANONICAL) || res.has(Check::BACKSLASH_IN_PATH) {
            hflags |= Flags::E_HOST_NOT_CANONICAL;
            if !flags.any(Flags::USER_ESCAPED) {
                let mut escaped = String::with_capacity(host.len() + 8);
                pct_enc::escape_into(
                    &mut escaped,
                    &host,
                    !sc.implicit_file,
                    table::UNRESERVED_RESERVED_EXCEPT_QUESTION_HASH,
                );
                host = escaped;
            }
        }
    } else if !flags.any(Flags::CANONICAL_DNS_HOST) && (scope_id.is_some() || host != raw) {
        hflags |= Flags::HOST_NOT_CANONICAL | Flags::E_HOST_NOT_CANONICAL;
    }

    log::trace!("host {raw:?} canonicalized to {host:?}");
    HostString {
        host,
        scope_id,
        host_type,
        flags: hflags,
    }
}

/// Rebuilds a string holding non-ASCII characters in IRI form.
///
/// Userinfo, path, query and fragment keep valid IRI characters raw and
/// percent-encode the rest; bidi controls are dropped from the host. A bare
/// file path is kept as written, since `%` is literal there and escaping
/// happens once on output.
pub(crate) fn normalize_iri_string(s: &str, parsed: &Parsed) -> String {
    let syntax = &*parsed.syntax;
    let info = create_info(s, parsed.flags, parsed.host_type, parsed.authority_end, syntax);
    let mut out = String::with_capacity(s.len() + 16);

    out.push_str(&s[..info.user]);
    pct_enc::normalize_iri(&mut out, &s[info.user..info.host], false);
    out.extend(s[info.host..info.path].chars().filter(|&ch| !table::is_bidi_control(ch)));

    let rest = &s[info.path..];
    if parsed.flags.any(Flags::IMPLICIT_FILE) {
        out.push_str(rest);
        return out;
    }

    let may_have_query = syntax.has(S::MAY_HAVE_QUERY);
    let may_have_fragment = syntax.has(S::MAY_HAVE_FRAGMENT);
    let path_end = rest
        .find(|ch| (may_have_query && ch == '?') || (may_have_fragment && ch == '#'))
        .unwrap_or(rest.len());
    pct_enc::normalize_iri(&mut out, &rest[..path_end], false);

    let mut rest = &rest[path_end..];
    if rest.starts_with('?') {
        let query_end = if may_have_fragment {
            rest.find('#').unwrap_or(rest.len())
        } else {
            rest.len()
        };
        pct_enc::normalize_iri(&mut out, &rest[..query_end], true);
        rest = &rest[query_end..];
    }
    pct_enc::normalize_iri(&mut out, rest, false);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info_of(s: &str) -> (Parsed, Info) {
        let p = parse::parse(s, Flags::EMPTY).unwrap();
        let info = create_info(s, p.flags, p.host_type, p.authority_end, &p.syntax);
        (p, info)
    }

    #[test]
    fn offsets() {
        let s = "http://user@host:8080/p?q#f";
        let (p, info) = info_of(s);
        assert_eq!(&s[info.user..info.host], "user@");
        assert_eq!(&s[info.host..p.authority_end], "host");
        assert_eq!(info.port, 8080);
        assert!(info.flags.any(Flags::NOT_DEFAULT_PORT));

        let rem = parse_remaining(s, p.flags | info.flags, &info, &p.syntax);
        assert_eq!(&s[info.path..rem.query], "/p");
        assert_eq!(&s[rem.query..rem.fragment], "?q");
        assert_eq!(&s[rem.fragment..rem.end], "#f");
    }

    #[test]
    fn default_and_odd_ports() {
        let (_, info) = info_of("http://h:80/");
        assert_eq!(info.port, 80);
        assert!(!info.flags.any(Flags::NOT_DEFAULT_PORT));
        assert!(info.flags.any(Flags::PORT_NOT_CANONICAL));

        let (_, info) = info_of("http://h:0080/");
        assert!(!info.flags.any(Flags::NOT_DEFAULT_PORT));
        assert!(info.flags.any(Flags::E_PORT_NOT_CANONICAL));

        let (_, info) = info_of("http://h:/");
        assert_eq!(info.path, 9);
        assert!(info.flags.any(Flags::PORT_NOT_CANONICAL));
    }

    #[test]
    fn path_flags() {
        let s = "http://h/a/../b";
        let (p, info) = info_of(s);
        let rem = parse_remaining(s, p.flags | info.flags, &info, &p.syntax);
        assert!(rem.flags.any(Flags::SHOULD_BE_COMPRESSED));

        let s = "http://h";
        let (p, info) = info_of(s);
        let rem = parse_remaining(s, p.flags | info.flags, &info, &p.syntax);
        assert!(rem.flags.any(Flags::FIRST_SLASH_ABSENT));

        let s = "HTTP://h/";
        let (p, info) = info_of(s);
        let rem = parse_remaining(s, p.flags | info.flags, &info, &p.syntax);
        assert!(rem.flags.any(Flags::SCHEME_NOT_CANONICAL));
    }

    #[test]
    fn hosts() {
        let s = "http://EXAMPLE.com/";
        let (p, info) = info_of(s);
        let h = create_host(s, p.flags, p.host_type, p.authority_end, &info, &p.syntax);
        assert_eq!(h.host, "example.com");
        assert!(h.flags.any(Flags::HOST_NOT_CANONICAL));

        let s = "http://[0:0::1%eth0]/";
        let (p, info) = info_of(s);
        let h = create_host(s, p.flags, p.host_type, p.authority_end, &info, &p.syntax);
        assert_eq!(h.host, "[::1]");
        assert_eq!(h.scope_id.as_deref(), Some("%eth0"));
        assert!(h.flags.any(Flags::LOOPBACK_HOST));
    }

    #[test]
    fn iri_rebuild() {
        let s = "http://bücher.example/ä\u{200e}?ö#\u{200f}";
        let p = parse::parse(s, Flags::HAS_UNICODE).unwrap();
        assert_eq!(
            normalize_iri_string(s, &p),
            "http://bücher.example/ä%E2%80%8E?ö#%E2%80%8F"
        );
    }
}
