//! Scheme detection and authority scanning.
//!
//! Parsing an absolute URI happens in two eager steps. The first finds the
//! scheme, or recognizes a bare file path. The second locates the end of
//! the authority and classifies the host. Everything else is computed on
//! demand from the offsets recorded here.

use crate::{
    error::ParseErrorKind as Kind,
    flags::{Flags, HostType},
    host, ip,
    pct_enc::{self, table},
    scheme::{self, SchemeSyntax, Syntax, SyntaxFlags as S},
};

/// Whether bare `/path` strings are taken as file paths.
pub(crate) const IS_WINDOWS: bool = cfg!(windows);

#[inline]
fn is_slash(x: u8) -> bool {
    x == b'/' || x == b'\\'
}

/// The outcome of the eager parsing steps.
#[derive(Clone, Debug)]
pub(crate) struct Parsed {
    pub(crate) syntax: Syntax,
    pub(crate) flags: Flags,
    pub(crate) host_type: HostType,
    /// Index just past the host, or where the path starts when there is
    /// no authority.
    pub(crate) authority_end: usize,
}

/// Parses the scheme and the authority of a trimmed, non-empty string.
pub(crate) fn parse(s: &str, flags: Flags) -> Result<Parsed, Kind> {
    let (syntax, found, idx) = parse_scheme(s)?;
    parse_minimal(s, syntax, flags | found, idx)
}

/// Finds the scheme, or detects an implicit file path.
///
/// Returns the syntax, the path flags found and the index where the rest
/// of the URI starts.
pub(crate) fn parse_scheme(s: &str) -> Result<(Syntax, Flags, usize), Kind> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let implicit = Flags::IMPLICIT_FILE | Flags::AUTHORITY_FOUND;

    if !IS_WINDOWS && bytes.first() == Some(&b'/') && !bytes.get(1).copied().is_some_and(is_slash) {
        return Ok((Syntax::BuiltIn(&scheme::UNIX_FILE), implicit | Flags::UNIX_PATH, 0));
    }

    let colon = s.find(':');
    if len < 3 || colon == Some(0) {
        return Err(Kind::BadFormat);
    }

    if matches!(bytes[1], b':' | b'|') {
        if !bytes[0].is_ascii_alphabetic() {
            return Err(if bytes[1] == b':' {
                Kind::BadScheme
            } else {
                Kind::BadFormat
            });
        }
        if !is_slash(bytes[2]) {
            return Err(Kind::MustRootedPath);
        }
        return Ok((Syntax::BuiltIn(&scheme::FILE), implicit | Flags::DOS_PATH, 0));
    }

    if is_slash(bytes[0]) {
        if !is_slash(bytes[1]) {
            return Err(Kind::BadFormat);
        }
        let mut i = 2;
        while i < len && is_slash(bytes[i]) {
            i += 1;
        }
        return Ok((Syntax::BuiltIn(&scheme::FILE), implicit | Flags::UNC_PATH, i));
    }

    let colon = colon.ok_or(Kind::BadFormat)?;
    let syntax = scheme::resolve(&s[..colon])?;
    Ok((syntax, Flags::EMPTY, colon + 1))
}

/// Locates the authority and classifies the host, starting at `idx`.
pub(crate) fn parse_minimal(
    s: &str,
    mut syntax: Syntax,
    mut flags: Flags,
    mut idx: usize,
) -> Result<Parsed, Kind> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let done = |syntax, flags, host_type, authority_end| {
        Ok(Parsed {
            syntax,
            flags,
            host_type,
            authority_end,
        })
    };

    if !IS_WINDOWS && flags.any(Flags::UNIX_PATH) {
        return done(syntax, flags, HostType::Basic, idx);
    }

    // A file-like path after an explicit scheme: `file:///c:/x`, `file://server/share`.
    if syntax.has(S::ALLOW_EMPTY_HOST.or(S::ALLOW_DOS_PATH))
        && !flags.any(Flags::IMPLICIT_FILE)
        && idx + 1 < len
    {
        let mut i = idx;
        while i < len && is_slash(bytes[i]) {
            i += 1;
        }
        let slashes = i - idx;
        let file_like = syntax.has(S::FILE_LIKE);

        if file_like || slashes <= 3 {
            if slashes >= 2 {
                flags |= Flags::AUTHORITY_FOUND;
            }
            if i + 1 < len && matches!(bytes[i + 1], b':' | b'|') && bytes[i].is_ascii_alphabetic() {
                if i + 2 >= len || !is_slash(bytes[i + 2]) {
                    if file_like {
                        return Err(Kind::MustRootedPath);
                    }
                } else {
                    flags |= Flags::DOS_PATH;
                    if syntax.has(S::MUST_HAVE_AUTHORITY) {
                        flags |= Flags::AUTHORITY_FOUND;
                    }
                    idx = if i != idx && slashes != 2 { i - 1 } else { i };
                }
            } else if file_like
                && slashes >= 2
                && slashes != 3
                && i < len
                && bytes[i] != b'?'
                && bytes[i] != b'#'
            {
                flags |= Flags::UNC_PATH;
                idx = i;
            } else if !IS_WINDOWS && file_like && slashes == 3 && bytes[i - 1] == b'/' {
                syntax = Syntax::BuiltIn(&scheme::UNIX_FILE);
                flags |= Flags::UNIX_PATH | Flags::AUTHORITY_FOUND;
                idx += 2;
            }
        }
    }

    if !flags.any(Flags::DOS_PATH | Flags::UNC_PATH | Flags::UNIX_PATH) {
        if idx + 2 <= len {
            let (first, second) = (bytes[idx], bytes[idx + 1]);
            if syntax.has(S::MUST_HAVE_AUTHORITY) {
                if !is_slash(first) || !is_slash(second) {
                    return Err(Kind::BadAuthority);
                }
                flags |= Flags::AUTHORITY_FOUND;
                idx += 2;
            } else if syntax.has(S::OPTIONAL_AUTHORITY)
                && (flags.any(Flags::AUTHORITY_FOUND) || (first == b'/' && second == b'/'))
            {
                flags |= Flags::AUTHORITY_FOUND;
                idx += 2;
            } else if !syntax.has(S::MAIL_TO_LIKE) {
                return done(syntax, flags, HostType::Unknown, idx);
            }
        } else if syntax.has(S::MUST_HAVE_AUTHORITY) {
            return Err(Kind::BadAuthority);
        } else if !syntax.has(S::MAIL_TO_LIKE) {
            return done(syntax, flags, HostType::Unknown, idx);
        }
    }

    if flags.any(Flags::DOS_PATH) {
        let host_type = if flags.any(Flags::AUTHORITY_FOUND) {
            HostType::Basic
        } else {
            HostType::Unknown
        };
        return done(syntax, flags, host_type, idx);
    }

    let (end, host_type, flags) = check_authority(s, idx, flags, &syntax)?;
    match bytes.get(end) {
        Some(b'\\') if !flags.any(Flags::IMPLICIT_FILE) && !syntax.has(S::ALLOW_DOS_PATH) => {
            return Err(Kind::BadAuthorityTerminator);
        }
        Some(b'/')
            if !IS_WINDOWS
                && !flags.any(Flags::IMPLICIT_FILE)
                && flags.any(Flags::UNC_PATH)
                && matches!(syntax, Syntax::BuiltIn(f) if core::ptr::eq(f, &scheme::FILE)) =>
        {
            syntax = Syntax::BuiltIn(&scheme::UNIX_FILE);
        }
        _ => {}
    }
    log::trace!("authority of {s:?} ends at {end} with a {host_type:?} host");
    done(syntax, flags, host_type, end)
}

/// Scans `[userinfo@]host[:port]` starting at `idx`.
///
/// Returns the index just past the host, the host type and the updated
/// flags. Schemes that take any host fall back to a basic host when the
/// authority matches none of the known host forms.
pub(crate) fn check_authority(
    s: &str,
    idx: usize,
    mut flags: Flags,
    syntax: &SchemeSyntax,
) -> Result<(usize, HostType, Flags), Kind> {
    let bytes = s.as_bytes();
    let len = bytes.len();
    let file_like = syntax.has(S::FILE_LIKE);
    let v1_unknown = syntax.is_v1_unknown();

    // Empty authority.
    if idx == len || matches!(bytes[idx], b'/' | b'?' | b'#') || (bytes[idx] == b'\\' && file_like) {
        if !syntax.has(S::ALLOW_EMPTY_HOST) {
            return Err(Kind::BadHostName);
        }
        flags.remove(Flags::UNC_PATH);
        if flags.any(Flags::IMPLICIT_FILE) {
            return Err(Kind::BadHostName);
        }
        return Ok((idx, HostType::Basic, flags));
    }

    let mut start = idx;
    if syntax.has(S::MAY_HAVE_USER_INFO) {
        let mut i = idx;
        while i + 1 < len {
            match bytes[i] {
                b'?' | b'#' | b'\\' | b'/' => break,
                b'@' => {
                    flags |= Flags::HAS_USER_INFO;
                    start = i + 1;
                    break;
                }
                _ => i += 1,
            }
        }
    }

    let not_implicit_file = !flags.any(Flags::IMPLICIT_FILE);
    let mut host_type = None;
    let mut end = len;
    let first = bytes.get(start).copied();

    if first == Some(b'[') && syntax.has(S::ALLOW_IPV6_HOST) {
        if let Some(lit) = ip::parse_v6_literal(&bytes[start..]) {
            let after = start + lit.len;
            if bytes.get(after).map_or(true, |&x| ip::is_host_terminator(x)) {
                host_type = Some(HostType::Ipv6);
                end = after;
            }
        }
    } else if first.is_some_and(|x| x.is_ascii_digit()) && syntax.has(S::ALLOW_IPV4_HOST) {
        let parsed = if v1_unknown {
            ip::parse_v4_strict(&bytes[start..])
        } else {
            ip::parse_v4_lenient(&bytes[start..])
        };
        if let Some((_, n)) = parsed {
            host_type = Some(HostType::Ipv4);
            end = start + n;
        }
    }

    if host_type.is_none() && syntax.has(S::ALLOW_DNS_HOST) {
        // IRI-aware schemes only take the Unicode-capable scan when they
        // have something to gain from it.
        let has_unicode = flags.any(Flags::HAS_UNICODE) && syntax.allows_iri();
        let scan = if !syntax.allows_iri() {
            host::scan_dns(s, start, false)
        } else if has_unicode || syntax.has(S::ALLOW_IDN) {
            host::scan_dns(s, start, true)
        } else {
            None
        };
        if let Some(name) = scan {
            host_type = Some(HostType::Dns);
            end = name.end;
            if name.has_unicode {
                flags |= Flags::IDN_HOST;
            } else if !name.has_upper {
                flags |= Flags::CANONICAL_DNS_HOST;
            }
        }
    }

    if host_type.is_none() && syntax.has(S::ALLOW_UNC_HOST) {
        if let Some(unc_end) = host::scan_unc(s, start, not_implicit_file) {
            if unc_end - start <= host::MAX_UNC_LEN {
                host_type = Some(HostType::Unc);
                end = unc_end;
            }
        }
    }

    if end < len && bytes[end] == b'\\' && host_type.is_some() && !file_like {
        // A backslash after the host is only a separator for file paths.
        if v1_unknown {
            return Err(Kind::BadHostName);
        }
        if syntax.has(S::ALLOW_ANY_OTHER_HOST) {
            host_type = None;
        }
    } else if end < len && bytes[end] == b':' {
        if syntax.has(S::MAY_HAVE_PORT) {
            let mut port = 0u32;
            let mut i = end + 1;
            while i < len {
                let x = bytes[i];
                if matches!(x, b'/' | b'?' | b'#') {
                    break;
                }
                if !x.is_ascii_digit() {
                    if syntax.has(S::ALLOW_ANY_OTHER_HOST) && !v1_unknown {
                        host_type = None;
                        break;
                    }
                    return Err(Kind::BadPort);
                }
                port = port * 10 + u32::from(x - b'0');
                if port > 0xffff {
                    if syntax.has(S::ALLOW_ANY_OTHER_HOST) && !v1_unknown {
                        host_type = None;
                        break;
                    }
                    return Err(Kind::BadPort);
                }
                i += 1;
            }
        } else {
            host_type = None;
        }
    }

    if let Some(host_type) = host_type {
        return Ok((end, host_type, flags));
    }

    flags.remove(Flags::HAS_USER_INFO);
    if syntax.has(S::ALLOW_ANY_OTHER_HOST) {
        let end = bytes[idx..]
            .iter()
            .position(|&x| matches!(x, b'/' | b'?' | b'#'))
            .map_or(len, |n| idx + n);
        return Ok((end, HostType::Basic, flags));
    }

    if v1_unknown {
        // Only `.` or `..` are let through as a host.
        let mut dots = 0;
        let mut i = idx;
        while i < len {
            match bytes[i] {
                b'.' => {
                    dots += 1;
                    if dots > 2 {
                        return Err(Kind::BadHostName);
                    }
                }
                b'/' | b'?' | b'#' if dots > 0 => {
                    return Ok((i, HostType::Basic, flags));
                }
                _ => return Err(Kind::BadHostName),
            }
            i += 1;
        }
        return Ok((len, HostType::Basic, flags));
    }

    if syntax.has(S::MUST_HAVE_AUTHORITY) || syntax.has(S::MAIL_TO_LIKE) {
        return Err(Kind::BadHostName);
    }
    // An optional authority that is not understood is left to the path.
    Ok((idx, HostType::Unknown, flags))
}

/// What [`check_canonical`] found in a component.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Check(u8);

impl Check {
    pub(crate) const ESCAPED_CANONICAL: Check = Check(1 << 0);
    pub(crate) const DISPLAY_CANONICAL: Check = Check(1 << 1);
    pub(crate) const DOT_SLASH_ATTN: Check = Check(1 << 2);
    pub(crate) const DOT_SLASH_ESCAPED: Check = Check(1 << 3);
    pub(crate) const BACKSLASH_IN_PATH: Check = Check(1 << 4);
    pub(crate) const RESERVED_FOUND: Check = Check(1 << 5);
    pub(crate) const NOT_IRI_CANONICAL: Check = Check(1 << 6);

    #[inline]
    pub(crate) const fn has(self, other: Check) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    fn set(&mut self, other: Check) {
        self.0 |= other.0;
    }

    #[inline]
    pub(crate) fn remove(&mut self, other: Check) {
        self.0 &= !other.0;
    }
}

/// How a component is terminated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Delim {
    /// The component runs to the end of the given range.
    None,
    /// The component is the last one of the URI.
    Eol,
    /// The component ends at this character.
    Char(u8),
}

/// The parts of a URI's state that affect [`check_canonical`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct Scanner {
    pub(crate) implicit_file: bool,
    pub(crate) may_have_query: bool,
    pub(crate) may_have_fragment: bool,
    pub(crate) has_unicode: bool,
    pub(crate) iri: bool,
}

impl Scanner {
    pub(crate) fn new(flags: Flags, syntax: &SchemeSyntax) -> Self {
        Self {
            implicit_file: flags.any(Flags::IMPLICIT_FILE),
            may_have_query: syntax.has(S::MAY_HAVE_QUERY),
            may_have_fragment: syntax.has(S::MAY_HAVE_FRAGMENT),
            has_unicode: flags.any(Flags::HAS_UNICODE),
            iri: syntax.allows_iri(),
        }
    }
}

/// Scans `s[idx..end]` up to the delimiter and reports whether it is
/// canonical for display and for escaped output.
///
/// Returns the findings and the index where the scan stopped.
pub(crate) fn check_canonical(
    s: &str,
    mut idx: usize,
    end: usize,
    delim: Delim,
    sc: &Scanner,
) -> (Check, usize) {
    let bytes = s.as_bytes();
    let mut res = Check::default();
    let mut needs_escaping = false;
    let mut found_escaping = false;

    while idx < end {
        let Some(ch) = s[idx..].chars().next() else {
            break;
        };
        let next = bytes.get(idx + 1).copied().filter(|_| idx + 1 < end);

        if ch <= '\x1f' || ('\x7f'..='\u{9f}').contains(&ch) {
            needs_escaping = true;
            found_escaping = true;
            res.set(Check::RESERVED_FOUND);
        } else if ch > '~' {
            if sc.iri && !table::is_iri_char(ch, true) {
                res.set(Check::NOT_IRI_CANONICAL);
            }
            needs_escaping = true;
        } else if delim == Delim::Char(ch as u8) {
            break;
        } else if delim == Delim::Char(b'?') && ch == '#' && sc.may_have_fragment {
            break;
        } else if ch == '?' {
            if sc.implicit_file || (!sc.may_have_query && delim != Delim::Eol) {
                res.set(Check::RESERVED_FOUND);
                found_escaping = true;
                needs_escaping = true;
            }
        } else if ch == '#' {
            needs_escaping = true;
            if sc.implicit_file || !sc.may_have_fragment {
                res.set(Check::RESERVED_FOUND);
                found_escaping = true;
            }
        } else if ch == '/' || ch == '\\' {
            if ch == '\\' {
                res.set(Check::BACKSLASH_IN_PATH);
            }
            if !res.has(Check::DOT_SLASH_ATTN) && next.is_some_and(is_slash) {
                res.set(Check::DOT_SLASH_ATTN);
            }
        } else if ch == '.' {
            if !res.has(Check::DOT_SLASH_ATTN)
                && (idx + 1 == end || matches!(next, Some(b'.' | b'/' | b'\\' | b'?' | b'#')))
            {
                res.set(Check::DOT_SLASH_ATTN);
            }
        } else if (ch <= '"' && ch != '!')
            || ('['..='^').contains(&ch)
            || matches!(ch, '<' | '>' | '`')
        {
            if !needs_escaping {
                needs_escaping = true;
            }
            if sc.has_unicode {
                res.set(Check::NOT_IRI_CANONICAL);
            }
        } else if ('{'..='}').contains(&ch) {
            needs_escaping = true;
        } else if ch == '%' {
            if !found_escaping {
                found_escaping = true;
            }
            match pct_enc::decode_hex_pair(bytes, idx + 1).filter(|_| idx + 2 < end) {
                Some(x) => {
                    if matches!(x, b'.' | b'/' | b'\\') {
                        res.set(Check::DOT_SLASH_ESCAPED);
                    }
                    idx += 2;
                }
                None => needs_escaping = true,
            }
        }
        idx += ch.len_utf8();
    }

    if found_escaping {
        if !needs_escaping {
            res.set(Check::ESCAPED_CANONICAL);
        }
    } else {
        res.set(Check::DISPLAY_CANONICAL);
        if !needs_escaping {
            res.set(Check::ESCAPED_CANONICAL);
        }
    }
    (res, idx)
}
