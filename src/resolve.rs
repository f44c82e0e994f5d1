//! Combining a base URI with a relative reference.

use crate::{
    error::ParseError,
    flags::{Flags, HostType},
    path,
    pct_enc::table,
    scheme::{Scheme, SyntaxFlags as S},
    uri::{Abs, Components as C, Format, Uri, UriKind},
};
use alloc::string::String;

/// An error occurred when combining a base URI with a relative reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CombineError {
    /// The base is a relative reference.
    BaseNotAbsolute,
    /// The relative reference, or the combined result, failed to parse.
    Parse(ParseError),
}

impl From<ParseError> for CombineError {
    fn from(e: ParseError) -> Self {
        CombineError::Parse(e)
    }
}

#[cfg(feature = "impl-error")]
impl std::error::Error for CombineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CombineError::BaseNotAbsolute => None,
            CombineError::Parse(e) => Some(e),
        }
    }
}

impl Uri {
    /// Resolves a relative reference against `base`.
    ///
    /// An absolute `relative` is returned as is. A reference that names
    /// the scheme of the base (`http:page`) is resolved as if the scheme
    /// were absent. Dot segments of the merged path are removed.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `base` is relative or if the reference, or the
    /// combined string, does not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use compat_uri::Uri;
    ///
    /// let base = Uri::parse("http://example.com/foo/bar")?;
    /// assert_eq!(Uri::combine(&base, "baz")?.to_string(), "http://example.com/foo/baz");
    /// assert_eq!(Uri::combine(&base, "../baz")?.to_string(), "http://example.com/baz");
    /// assert_eq!(Uri::combine(&base, "?q")?.to_string(), "http://example.com/foo/bar?q");
    /// assert_eq!(Uri::combine(&base, "//other/x")?.to_string(), "http://other/x");
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn combine(base: &Uri, relative: &str) -> Result<Uri, CombineError> {
        base.absolute().map_err(|_| CombineError::BaseNotAbsolute)?;
        let relative = Uri::parse_with_kind(relative, UriKind::RelativeOrAbsolute)?;
        Self::combine_uri(base, &relative)
    }

    /// Resolves a parsed relative reference against `base`.
    ///
    /// # Errors
    ///
    /// Same as [`combine`](Self::combine).
    pub fn combine_uri(base: &Uri, relative: &Uri) -> Result<Uri, CombineError> {
        let abs = base.absolute().map_err(|_| CombineError::BaseNotAbsolute)?;
        if relative.is_absolute_uri() {
            return Ok(relative.clone());
        }

        let user_escaped = relative.user_escaped();
        match resolve(abs, relative.original_string(), user_escaped) {
            Some(s) => {
                log::trace!(
                    "combined {:?} with {:?} into {s:?}",
                    base.original_string(),
                    relative.original_string()
                );
                Ok(Uri::create(&s, user_escaped, UriKind::Absolute)?)
            }
            None => Ok(base.clone()),
        }
    }

    /// Like [`combine`](Self::combine), discarding the error.
    #[must_use]
    pub fn try_combine(base: &Uri, relative: &str) -> Option<Uri> {
        Self::combine(base, relative).ok()
    }
}

/// Computes the absolute string a relative reference stands for.
///
/// Returns `None` when the result is the base itself.
fn resolve(base: Abs<'_>, relative: &str, user_escaped: bool) -> Option<String> {
    let flags = base.flags();
    let syntax = base.syntax;
    let implicit = flags.any(Flags::IMPLICIT_FILE);
    let rel = relative.trim_matches(table::is_lws);

    if rel.is_empty() {
        let format = if base.uri().user_escaped() {
            Format::Escaped
        } else {
            Format::SafeUnescaped
        };
        return Some(base.parts(C::ABSOLUTE_URI, format));
    }

    if rel.starts_with('#') && !implicit && syntax.has(S::MAY_HAVE_FRAGMENT) {
        let mut out = base.parts(C::ABSOLUTE_URI.without(C::FRAGMENT), Format::Escaped);
        out.push_str(rel);
        return Some(out);
    }

    if rel.starts_with('?') && !implicit && syntax.has(S::MAY_HAVE_QUERY) {
        let mut out = base.parts(
            C::ABSOLUTE_URI.without(C::QUERY).without(C::FRAGMENT),
            Format::Escaped,
        );
        out.push_str(rel);
        return Some(out);
    }

    let b = rel.as_bytes();
    if b.len() >= 3
        && matches!(b[1], b':' | b'|')
        && b[0].is_ascii_alphabetic()
        && matches!(b[2], b'/' | b'\\')
    {
        if implicit {
            return Some(rel.into());
        }
        if syntax.has(S::ALLOW_DOS_PATH) {
            let rooted = syntax.has(S::PATH_IS_ROOTED);
            let prefix = match (flags.any(Flags::AUTHORITY_FOUND), rooted) {
                (true, true) => ":///",
                (true, false) => "://",
                (false, true) => ":/",
                (false, false) => ":",
            };
            return Some([syntax.name(), prefix, rel].concat());
        }
    }

    combined_string(base, rel, user_escaped)
}

/// Strips a scheme equal to the base's from the reference, then merges.
fn combined_string(base: Abs<'_>, mut rel: &str, user_escaped: bool) -> Option<String> {
    for (i, x) in rel.bytes().enumerate() {
        match x {
            b'/' | b'\\' | b'?' | b'#' => break,
            b':' => {
                if i < 2 || Scheme::new(&rel[..i]).is_none() {
                    break;
                }
                if !rel[..i].eq_ignore_ascii_case(base.syntax.name()) {
                    return Some(rel.into());
                }
                rel = &rel[i + 1..];
                if rel.is_empty() {
                    return None;
                }
                break;
            }
            _ => {}
        }
    }

    let format = if user_escaped {
        Format::Escaped
    } else {
        Format::SafeUnescaped
    };
    Some(merge(base, rel, format))
}

fn is_slash(x: Option<&u8>) -> bool {
    matches!(x, Some(b'/' | b'\\'))
}

/// Merges a non-empty reference that has no scheme into the base.
fn merge(base: Abs<'_>, rel: &str, format: Format) -> String {
    let flags = base.flags();
    let syntax = base.syntax;
    let implicit = flags.any(Flags::IMPLICIT_FILE);
    let b = rel.as_bytes();
    let first_slash = is_slash(b.first());
    let network = first_slash && is_slash(b.get(1));

    if flags.any(Flags::DOS_PATH) && first_slash && !network {
        // A rooted path keeps the drive.
        let orig = base.uri().original_string();
        let mut colon = orig.find(':');
        if !implicit {
            colon = colon.and_then(|i| orig[i + 1..].find(':').map(|j| i + 1 + j));
        }
        if let Some(i) = colon {
            return [&orig[..=i], rel].concat();
        }
    }

    if syntax.is_file() && first_slash {
        if network {
            return if implicit {
                rel.into()
            } else {
                ["file:", rel].concat()
            };
        }
        if flags.any(Flags::UNC_PATH) {
            let path = base.parts(C::PATH | C::KEEP_DELIMITER, Format::Unescaped);
            let share = match path[1.min(path.len())..].find('/') {
                Some(i) => &path[..i + 1],
                None => &path[..],
            };
            return if implicit {
                let host = base.parts(C::HOST, Format::Unescaped);
                ["\\\\", host.as_str(), share, rel].concat()
            } else {
                let host = base.parts(C::HOST, format);
                ["file://", host.as_str(), share, rel].concat()
            };
        }
        return ["file://", rel].concat();
    }

    let convert = syntax.has(S::CONVERT_PATH_SLASHES);
    let ipv6 = base.host().host_type == HostType::Ipv6;
    let bracketed = || {
        let dns = base.uri().dns_safe_host().unwrap_or_default();
        let mut out = base.parts(C::SCHEME | C::USER_INFO, format);
        out.push('[');
        out.push_str(dns);
        out.push(']');
        out.push_str(&base.parts(C::PORT | C::KEEP_DELIMITER, format));
        out
    };

    if b.first() == Some(&b'/') || (b.first() == Some(&b'\\') && convert) {
        if b.get(1) == Some(&b'/') {
            return [syntax.name(), ":", rel].concat();
        }
        let mut out = if ipv6 {
            bracketed()
        } else {
            base.parts(C::SCHEME_AND_SERVER | C::USER_INFO, format)
        };
        if b[0] == b'\\' {
            out.push('/');
            out.push_str(&rel[1..]);
        } else {
            out.push_str(rel);
        }
        return out;
    }

    let left_format = if implicit { Format::Unescaped } else { format };
    let mut path = base.parts(C::PATH | C::KEEP_DELIMITER, left_format);
    let secured = path::secured_index(&path, flags.any(Flags::DOS_PATH));
    path.truncate(path.rfind('/').map_or(0, |i| i + 1));
    let merged_at = path.len();
    path.push_str(rel);

    let split = path[merged_at..].find(|ch| {
        (ch == '?' && syntax.has(S::MAY_HAVE_QUERY))
            || (ch == '#' && !implicit && syntax.has(S::MAY_HAVE_FRAGMENT))
    });
    let extra = match split {
        Some(i) => path.split_off(merged_at + i),
        None => String::new(),
    };

    let left = if ipv6 {
        if implicit {
            let dns = base.uri().dns_safe_host().unwrap_or_default();
            ["\\\\[", dns, "]"].concat()
        } else {
            bracketed()
        }
    } else if implicit {
        if flags.any(Flags::DOS_PATH) {
            if path.len() > 3 {
                path::compress(&mut path, 3, syntax);
            }
            path.push_str(&extra);
            return path.get(1..).unwrap_or_default().into();
        }
        let host = base.parts(C::HOST, Format::Unescaped);
        if !crate::parse::IS_WINDOWS && flags.any(Flags::UNIX_PATH) {
            host
        } else {
            ["\\\\", host.as_str()].concat()
        }
    } else {
        base.parts(C::SCHEME_AND_SERVER | C::USER_INFO, format)
    };

    if path.len() > secured {
        path::compress(&mut path, secured, syntax);
    }
    [left.as_str(), path.as_str(), extra.as_str()].concat()
}

/// Computes the relative path that leads from `from` to `to`.
///
/// Both paths are expected to be rooted.
pub(crate) fn path_difference(from: &str, to: &str, case_sensitive: bool) -> String {
    let (a, b) = (from.as_bytes(), to.as_bytes());
    let eq = |x: u8, y: u8| {
        if case_sensitive {
            x == y
        } else {
            x.eq_ignore_ascii_case(&y)
        }
    };

    let mut i = 0;
    let mut last_slash = None;
    while i < a.len() && i < b.len() && eq(a[i], b[i]) {
        if a[i] == b'/' {
            last_slash = Some(i);
        }
        i += 1;
    }

    if i == 0 {
        return to.into();
    }
    if i == a.len() && i == b.len() {
        return String::new();
    }

    let mut rel = String::new();
    for &x in &a[i..] {
        if x == b'/' {
            rel.push_str("../");
        }
    }
    let start = last_slash.map_or(0, |si| si + 1);
    if rel.is_empty() && b.len() == start {
        return "./".into();
    }
    rel.push_str(&to[start..]);
    rel
}

/// Checks whether the first segment of a relative path holds a colon,
/// which would make it read as a scheme.
pub(crate) fn has_colon_in_first_segment(s: &str) -> bool {
    s.bytes()
        .find(|x| matches!(x, b':' | b'\\' | b'/' | b'?' | b'#'))
        == Some(b':')
}
