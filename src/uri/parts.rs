//! Component selection and reconstruction.

use super::Abs;
use crate::{
    flags::{Flags, HostType},
    parse::IS_WINDOWS,
    path,
    pct_enc::{self, table, UnescapeMode as Mode},
    scheme::SyntaxFlags as S,
};
use alloc::string::{String, ToString};
use core::{fmt, fmt::Write, ops::BitOr};

/// A set of URI components to retrieve with [`Uri::get_components`].
///
/// The single-component constants are bit flags that combine with `|`.
///
/// [`Uri::get_components`]: crate::Uri::get_components
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Components(u32);

impl Components {
    /// The scheme.
    pub const SCHEME: Self = Self(1 << 0);
    /// The userinfo.
    pub const USER_INFO: Self = Self(1 << 1);
    /// The host.
    pub const HOST: Self = Self(1 << 2);
    /// The port, when it differs from the default.
    pub const PORT: Self = Self(1 << 3);
    /// The path.
    pub const PATH: Self = Self(1 << 4);
    /// The query.
    pub const QUERY: Self = Self(1 << 5);
    /// The fragment.
    pub const FRAGMENT: Self = Self(1 << 6);
    /// The port, including a default one.
    pub const STRONG_PORT: Self = Self(1 << 7);
    /// Keeps the delimiter of a component requested alone,
    /// such as the `?` of a query.
    pub const KEEP_DELIMITER: Self = Self(0x4000_0000);

    /// Host and port, with the default port spelled out.
    pub const HOST_AND_PORT: Self = Self(Self::HOST.0 | Self::STRONG_PORT.0);
    /// Userinfo, host and port, with the default port spelled out.
    pub const STRONG_AUTHORITY: Self = Self(Self::USER_INFO.0 | Self::HOST_AND_PORT.0);
    /// Scheme, host and port.
    pub const SCHEME_AND_SERVER: Self = Self(Self::SCHEME.0 | Self::HOST.0 | Self::PORT.0);
    /// Everything a request line needs: scheme, host, port, path and query.
    pub const HTTP_REQUEST_URL: Self =
        Self(Self::SCHEME_AND_SERVER.0 | Self::PATH.0 | Self::QUERY.0);
    /// Path and query.
    pub const PATH_AND_QUERY: Self = Self(Self::PATH.0 | Self::QUERY.0);
    /// Every component.
    pub const ABSOLUTE_URI: Self =
        Self(Self::HTTP_REQUEST_URL.0 | Self::USER_INFO.0 | Self::FRAGMENT.0);

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Checks whether all components of `other` are in the set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the set without the components of `other`.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    #[inline]
    const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Components {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for Components {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Components({:#x})", self.0)
    }
}

/// How retrieved components are escaped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UriFormat {
    /// Escaped as required by RFC 3986.
    UriEscaped,
    /// Every percent-encoded octet decoded.
    Unescaped,
    /// Decoded, except for octets that would change the meaning of
    /// the URI when shown raw.
    SafeUnescaped,
}

/// The internal formats: the public ones plus the legacy display form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Format {
    Escaped,
    Unescaped,
    SafeUnescaped,
    Display,
}

impl From<UriFormat> for Format {
    fn from(format: UriFormat) -> Self {
        match format {
            UriFormat::UriEscaped => Format::Escaped,
            UriFormat::Unescaped => Format::Unescaped,
            UriFormat::SafeUnescaped => Format::SafeUnescaped,
        }
    }
}

type C = Components;

impl<'a> Abs<'a> {
    /// Retrieves a set of components in the given format.
    pub(crate) fn parts(&self, mut parts: C, format: Format) -> String {
        if parts == C::SCHEME {
            return self.syntax.name().into();
        }
        self.remaining();
        if parts.intersects(C::HOST) {
            self.host();
        }
        let info = self.info();
        let flags = self.flags();

        if parts == C::PORT || parts == C::STRONG_PORT {
            let strong = parts == C::STRONG_PORT && self.syntax.default_port().is_some();
            return if flags.any(Flags::NOT_DEFAULT_PORT) || strong {
                info.port.to_string()
            } else {
                String::new()
            };
        }
        if parts.intersects(C::STRONG_PORT) {
            parts = parts | C::PORT;
        }

        if parts == C::HOST
            && (format == Format::Escaped
                || !flags.any(Flags::HOST_NOT_CANONICAL | Flags::E_HOST_NOT_CANONICAL))
        {
            return self.host().host.clone();
        }

        let mut nc = if format == Format::Escaped {
            flags.escaped_non_canonical() | (flags & Flags::SCHEME_NOT_CANONICAL).bits()
        } else {
            flags.display_non_canonical()
        };
        if parts.intersects(C::PATH)
            && (flags.any(
                Flags::SHOULD_BE_COMPRESSED | Flags::FIRST_SLASH_ABSENT | Flags::BACKSLASH_IN_PATH,
            ) || self.has_piped_drive())
        {
            nc |= C::PATH.0;
        }

        if parts.0 & nc == 0 {
            if let Some(out) = self.parts_from_string(parts) {
                return out;
            }
        }
        self.recreate(parts, nc, format)
    }

    /// Checks for a drive written as `c|`.
    fn has_piped_drive(&self) -> bool {
        if !self.flags().any(Flags::DOS_PATH) {
            return false;
        }
        let s = self.s();
        let start = self.info().path;
        let secured = path::secured_index(&s[start..], true);
        s.as_bytes().get(start + secured - 1) == Some(&b'|')
    }

    /// Slices canonical components directly out of the string.
    fn parts_from_string(&self, parts: C) -> Option<String> {
        let s = self.s();
        let info = self.info();
        let rem = self.remaining();
        let flags = self.flags();
        let has_user_info = flags.any(Flags::HAS_USER_INFO);
        let explicit_port = flags.any(Flags::NOT_DEFAULT_PORT) || self.syntax.default_port().is_none();
        let join = |a: &str, b: &str| {
            let mut out = String::with_capacity(a.len() + b.len());
            out.push_str(a);
            out.push_str(b);
            out
        };
        let with_port = |a: &str| {
            let mut out = String::from(a);
            write!(out, ":{}", info.port).unwrap();
            out
        };
        let from = |start: usize, end: usize| {
            if start >= end {
                String::new()
            } else {
                s[start..end].into()
            }
        };

        let out = match parts.without(C::KEEP_DELIMITER) {
            p if p == C::SCHEME_AND_SERVER => {
                if has_user_info {
                    join(&s[..info.user], &s[info.host..info.path])
                } else {
                    s[..info.path].into()
                }
            }
            p if p == C::HOST_AND_PORT => {
                if !has_user_info {
                    self.strong_authority(explicit_port)
                } else if explicit_port {
                    s[info.host..info.path].into()
                } else {
                    with_port(&s[info.host..info.path])
                }
            }
            p if p == C::ABSOLUTE_URI => s[..rem.end].into(),
            p if p == C::HTTP_REQUEST_URL => {
                if has_user_info {
                    join(&s[..info.user], &s[info.host..rem.fragment])
                } else {
                    s[..rem.fragment].into()
                }
            }
            p if p == C::SCHEME_AND_SERVER | C::USER_INFO => s[..info.path].into(),
            p if p == C::ABSOLUTE_URI.without(C::FRAGMENT) => s[..rem.fragment].into(),
            p if p == C::SCHEME => {
                if parts == C::SCHEME {
                    self.syntax.name().into()
                } else {
                    s[..info.user].into()
                }
            }
            p if p == C::HOST => {
                let mut end = info.path;
                if flags.any(Flags::NOT_DEFAULT_PORT | Flags::PORT_NOT_CANONICAL) {
                    end = s[info.host..info.path].rfind(':').map_or(end, |i| info.host + i);
                }
                from(info.host, end)
            }
            p if p == C::PATH => {
                let start = if parts == C::PATH
                    && flags.any(Flags::AUTHORITY_FOUND)
                    && rem.end > info.path
                    && s.as_bytes()[info.path] == b'/'
                {
                    info.path + 1
                } else {
                    info.path
                };
                from(start, rem.query)
            }
            p if p == C::QUERY => {
                let start = rem.query + usize::from(parts == C::QUERY);
                from(start, rem.fragment)
            }
            p if p == C::FRAGMENT => {
                let start = rem.fragment + usize::from(parts == C::FRAGMENT);
                from(start, rem.end)
            }
            p if p == C::USER_INFO | C::HOST | C::PORT => from(info.user, info.path),
            p if p == C::STRONG_AUTHORITY => self.strong_authority(explicit_port),
            p if p == C::PATH_AND_QUERY => s[info.path..rem.fragment].into(),
            p if p == C::HTTP_REQUEST_URL | C::FRAGMENT => {
                if has_user_info {
                    join(&s[..info.user], &s[info.host..rem.end])
                } else {
                    s[..rem.end].into()
                }
            }
            p if p == C::PATH_AND_QUERY | C::FRAGMENT => s[info.path..rem.end].into(),
            p if p == C::USER_INFO => {
                if !has_user_info {
                    return Some(String::new());
                }
                let end = if parts == C::USER_INFO {
                    info.host - 1
                } else {
                    info.host
                };
                from(info.user, end)
            }
            _ => return None,
        };
        Some(out)
    }

    fn strong_authority(&self, explicit_port: bool) -> String {
        let s = self.s();
        let info = self.info();
        let mut out = String::from(&s[info.user..info.path]);
        if !explicit_port {
            write!(out, ":{}", info.port).unwrap();
        }
        out
    }

    /// Rebuilds the requested components one by one, transforming those
    /// that are flagged in `nc`.
    fn recreate(&self, parts: C, nc: u32, format: Format) -> String {
        let s = self.s();
        let info = self.info();
        let rem = self.remaining();
        let flags = self.flags();
        let user_escaped = flags.any(Flags::USER_ESCAPED);
        let is_nc = |c: C| nc & c.0 != 0;
        let safe_mode = if user_escaped {
            Mode::UNESCAPE
        } else {
            Mode::ESCAPE_UNESCAPE
        };
        let mut dest = String::with_capacity(s.len() + 16);

        if parts.intersects(C::SCHEME) {
            dest.push_str(self.syntax.name());
            if parts != C::SCHEME {
                dest.push(':');
                if flags.any(Flags::AUTHORITY_FOUND) {
                    dest.push_str("//");
                }
            }
        }

        if parts.intersects(C::USER_INFO) && flags.any(Flags::HAS_USER_INFO) {
            let slice = &s[info.user..info.host];
            if is_nc(C::USER_INFO) {
                match format {
                    Format::Escaped if !user_escaped => pct_enc::escape_into(
                        &mut dest,
                        slice,
                        true,
                        table::UNRESERVED_RESERVED_EXCEPT_QUESTION_HASH,
                    ),
                    Format::SafeUnescaped => {
                        let user = slice.strip_suffix('@').unwrap_or(slice);
                        pct_enc::unescape_into(&mut dest, user, &['@', '/', '\\'], safe_mode, false);
                        dest.push('@');
                    }
                    Format::Unescaped => pct_enc::unescape_into(
                        &mut dest,
                        slice,
                        &[],
                        Mode::UNESCAPE | Mode::UNESCAPE_ALL,
                        false,
                    ),
                    _ => dest.push_str(slice),
                }
            } else {
                dest.push_str(slice);
            }
            if parts == C::USER_INFO {
                dest.pop();
            }
        }

        if parts.intersects(C::HOST) {
            let host = self.host();
            if !host.host.is_empty() {
                let mode = if format != Format::Escaped
                    && host.host_type == HostType::Basic
                    && is_nc(C::HOST)
                {
                    if format == Format::Unescaped {
                        Mode::UNESCAPE | Mode::UNESCAPE_ALL
                    } else {
                        safe_mode
                    }
                } else {
                    Mode::COPY_ONLY
                };
                pct_enc::unescape_into(&mut dest, &host.host, &['/', '?', '#'], mode, false);
            }
        }

        if parts.intersects(C::PORT)
            && (flags.any(Flags::NOT_DEFAULT_PORT)
                || (parts.intersects(C::STRONG_PORT) && self.syntax.default_port().is_some()))
        {
            write!(dest, ":{}", info.port).unwrap();
        }

        if parts.intersects(C::PATH) {
            self.canonical_path(&mut dest, format);
            if parts == C::PATH {
                if flags.any(Flags::AUTHORITY_FOUND) && dest.starts_with('/') {
                    dest.remove(0);
                }
                return dest;
            }
        }

        if parts.intersects(C::QUERY) && rem.query < rem.fragment {
            if parts != C::QUERY {
                dest.push('?');
            }
            let slice = &s[rem.query + 1..rem.fragment];
            if is_nc(C::QUERY) {
                self.push_tail(&mut dest, slice, format, table::UNRESERVED_RESERVED_EXCEPT_HASH, true);
            } else {
                dest.push_str(slice);
            }
        }

        if parts.intersects(C::FRAGMENT) && rem.fragment < rem.end {
            if parts != C::FRAGMENT {
                dest.push('#');
            }
            let slice = &s[rem.fragment + 1..rem.end];
            if is_nc(C::FRAGMENT) {
                self.push_tail(&mut dest, slice, format, table::UNRESERVED_RESERVED, false);
            } else {
                dest.push_str(slice);
            }
        }

        dest
    }

    /// Pushes a non-canonical query or fragment.
    fn push_tail(
        &self,
        dest: &mut String,
        slice: &str,
        format: Format,
        escape_table: table::Table,
        is_query: bool,
    ) {
        let user_escaped = self.flags().any(Flags::USER_ESCAPED);
        let safe_mode = if user_escaped {
            Mode::UNESCAPE
        } else {
            Mode::ESCAPE_UNESCAPE
        };
        let mode = match format {
            Format::Escaped if !user_escaped => {
                pct_enc::escape_into(dest, slice, true, escape_table);
                return;
            }
            Format::Escaped => Mode::COPY_ONLY,
            Format::Display => safe_mode | Mode::V1_TO_STRING,
            Format::Unescaped => Mode::UNESCAPE | Mode::UNESCAPE_ALL,
            Format::SafeUnescaped => safe_mode,
        };
        pct_enc::unescape_into(dest, slice, &['#'], mode, is_query);
    }

    /// Pushes the path, compressed and escaped as the format requires.
    ///
    /// A rooted path whose leading slash is missing gets one.
    pub(crate) fn canonical_path(&self, dest: &mut String, format: Format) {
        let s = self.s();
        let info = self.info();
        let rem = self.remaining();
        let flags = self.flags();
        let syntax = self.syntax;

        if flags.any(Flags::FIRST_SLASH_ABSENT) {
            dest.push('/');
        }
        if info.path == rem.query {
            return;
        }

        let start = dest.len();
        let raw = &s[info.path..rem.query];
        let secured = path::secured_index(raw, flags.any(Flags::DOS_PATH));
        let implicit = flags.any(Flags::IMPLICIT_FILE);
        let user_escaped = flags.any(Flags::USER_ESCAPED);
        let compress = flags.any(Flags::SHOULD_BE_COMPRESSED);
        let unescape_dots = syntax.has(S::UNESCAPE_DOTS_AND_SLASHES)
            && flags.any(Flags::PATH_NOT_CANONICAL)
            && !implicit;
        let dots: &[char] = if syntax.has(S::CONVERT_PATH_SLASHES) {
            &['.', '/', '\\']
        } else {
            &['.', '/']
        };

        if compress && unescape_dots {
            dest.push_str(&pct_enc::unescape_only(raw, dots));
        } else if format == Format::Escaped
            && !compress
            && flags.any(Flags::E_PATH_NOT_CANONICAL)
            && !user_escaped
        {
            let fixed;
            let raw = if secured != 0 && raw.as_bytes()[secured - 1] == b'|' {
                fixed = [&raw[..secured - 1], ":", &raw[secured..]].concat();
                &fixed
            } else {
                raw
            };
            pct_enc::escape_into(
                dest,
                raw,
                !implicit,
                table::UNRESERVED_RESERVED_EXCEPT_QUESTION_HASH,
            );
        } else {
            dest.push_str(raw);
        }

        if format == Format::Escaped
            && !IS_WINDOWS
            && flags.any(Flags::BACKSLASH_IN_PATH)
            && !syntax.has(S::CONVERT_PATH_SLASHES)
            && syntax.has(S::FILE_LIKE)
            && !implicit
        {
            // `\` stays in a Unix file path, as `%5C`.
            let copy = dest.split_off(start);
            pct_enc::escape_into(dest, &copy, true, table::UNRESERVED_RESERVED);
        }

        let offset = start + secured;
        if secured != 0 && dest.as_bytes().get(offset - 1) == Some(&b'|') {
            dest.replace_range(offset - 1..offset, ":");
        }

        if compress && dest.len() > offset {
            path::compress(dest, offset, syntax);
            if dest.as_bytes().get(start) == Some(&b'\\') {
                dest.replace_range(start..start + 1, "/");
            }
            if format == Format::Escaped && !user_escaped && flags.any(Flags::E_PATH_NOT_CANONICAL) {
                let copy = dest.split_off(start);
                pct_enc::escape_into(
                    dest,
                    &copy,
                    !implicit,
                    table::UNRESERVED_RESERVED_EXCEPT_QUESTION_HASH,
                );
            }
        }

        if format == Format::SafeUnescaped && implicit && !user_escaped {
            // Compare a bare file path in the form its escaped string reparses to:
            // `%` is literal and characters outside the IRI set stay encoded.
            let copy = dest.split_off(start);
            for ch in copy.chars() {
                if ch == '%' || (ch > '~' && !table::is_iri_char(ch, false)) {
                    pct_enc::push_escaped(dest, ch);
                } else {
                    dest.push(ch);
                }
            }
        }

        if format != Format::Escaped && flags.any(Flags::PATH_NOT_CANONICAL) {
            let safe_mode = if user_escaped {
                Mode::UNESCAPE
            } else {
                Mode::ESCAPE_UNESCAPE
            };
            let mode = match format {
                Format::Unescaped if implicit => Mode::COPY_ONLY,
                Format::Unescaped => Mode::UNESCAPE | Mode::UNESCAPE_ALL,
                Format::Display if implicit => (safe_mode | Mode::V1_TO_STRING).without(Mode::UNESCAPE),
                Format::Display => safe_mode | Mode::V1_TO_STRING,
                _ if implicit => safe_mode.without(Mode::UNESCAPE),
                _ => safe_mode,
            };
            if mode != Mode::COPY_ONLY {
                let copy = dest.split_off(start);
                pct_enc::unescape_into(dest, &copy, &['?', '#'], mode, false);
            }
        }
    }

    /// The path as the local file system spells it.
    pub(crate) fn local_path(&self) -> String {
        let rem = self.remaining();
        let flags = self.flags();
        if !flags.is_unc_or_dos_path() {
            return self.parts(C::PATH | C::KEEP_DELIMITER, Format::Unescaped);
        }

        let host = self.host();
        let flags = self.flags();
        let s = self.s();
        let info = self.info();
        let is_unc = flags.any(Flags::UNC_PATH);
        let is_dos = flags.any(Flags::DOS_PATH);
        let implicit = flags.any(Flags::IMPLICIT_FILE);
        let is_slash = |i: usize| matches!(s.as_bytes().get(i), Some(b'/' | b'\\'));

        let mut out;
        if !flags.any(Flags::HOST_NOT_CANONICAL | Flags::PATH_NOT_CANONICAL | Flags::SHOULD_BE_COMPRESSED) {
            let start = if is_unc {
                info.host.saturating_sub(2)
            } else {
                info.path
            };
            let whole = implicit
                && info.host == (if is_dos { 0 } else { 2 })
                && rem.query == rem.end;
            out = if whole {
                String::from(s)
            } else if is_dos && is_slash(start) {
                String::from(&s[start + 1..rem.query])
            } else {
                String::from(&s[start..rem.query])
            };
        } else {
            out = String::with_capacity(host.host.len() + 3 + rem.query - info.path);
            let mut start = info.path;
            if is_unc {
                out.push_str("\\\\");
                out.push_str(&host.host);
            } else if is_slash(start) {
                start += 1;
            }
            let path_start = out.len();
            let mode = if flags.any(Flags::PATH_NOT_CANONICAL) && !implicit {
                Mode::UNESCAPE | Mode::UNESCAPE_ALL
            } else {
                Mode::COPY_ONLY
            };
            pct_enc::unescape_into(&mut out, &s[start..rem.query], &[], mode, true);
            if flags.any(Flags::SHOULD_BE_COMPRESSED) {
                let from = if is_dos { path_start + 2 } else { path_start };
                if out.len() > from {
                    path::compress(&mut out, from, self.syntax);
                }
            }
        }

        if is_dos && out.as_bytes().get(1) == Some(&b'|') {
            out.replace_range(1..2, ":");
        }
        out.replace('/', "\\")
    }
}
