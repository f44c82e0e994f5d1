#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A URI parser and canonicalizer compatible with the lenient, Windows-aware
//! URI handling found in many HTTP stacks.
//!
//! Besides RFC 3986 URIs, the parser accepts DOS paths (`c:\dir\file`),
//! UNC paths (`\\server\share`), rooted Unix paths (`/usr/lib`, outside
//! Windows), Internationalized Resource Identifiers, and a number of
//! non-canonical host forms such as `0x7f.1`. Scheme and authority are
//! validated on construction; the rest is canonicalized lazily.
//!
//! See the documentation of [`Uri`] for more details.
//!
//! # Examples
//!
//! ```
//! use compat_uri::{Uri, UriKind};
//!
//! let uri = Uri::parse("HTTP://Example.COM:80/a/./b/../c?x#y")?;
//! assert_eq!(uri.absolute_uri()?, "http://example.com/a/c?x#y");
//! assert!(uri.is_default_port()?);
//!
//! let file = Uri::parse(r"c:\temp\x.txt")?;
//! assert!(file.is_file()?);
//! assert_eq!(file.local_path()?, r"c:\temp\x.txt");
//!
//! let rel = Uri::parse_with_kind("../up", UriKind::RelativeOrAbsolute)?;
//! assert!(!rel.is_absolute_uri());
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! # Feature flags
//!
//! - `impl-error` (default): implements [`std::error::Error`] for the error types.
//!
//! - `serde`: implements `Serialize` and `Deserialize` for [`Uri`], as a string.
//!
//! # Logging
//!
//! Parse phases are traced and rejected inputs are reported at the debug
//! level through the [`log`] facade. No logger is installed by this crate.

extern crate alloc;

mod error;
mod flags;
mod fmt;
mod host;
mod ip;
mod parse;
mod path;
pub mod pct_enc;
mod resolve;
pub mod scheme;
mod uri;

pub use error::{NotAbsoluteError, ParseError, ParseErrorKind};
pub use pct_enc::{escape_data_string, unescape_data_string};
pub use resolve::CombineError;
pub use uri::{Components, HostNameType, ParseState, Uri, UriFormat, UriKind, UriPartial};

use alloc::string::String;

/// Determines the kind of a host name.
///
/// IPv6 addresses may be given with or without brackets. Returns
/// [`HostNameType::Unknown`] for anything that is not a valid host.
///
/// # Examples
///
/// ```
/// use compat_uri::{check_host_name, HostNameType};
///
/// assert_eq!(check_host_name("example.com"), HostNameType::Dns);
/// assert_eq!(check_host_name("10.0.0.1"), HostNameType::Ipv4);
/// assert_eq!(check_host_name("[::1]"), HostNameType::Ipv6);
/// assert_eq!(check_host_name("fe80::1"), HostNameType::Ipv6);
/// assert_eq!(check_host_name("a b"), HostNameType::Unknown);
/// ```
#[must_use]
pub fn check_host_name(name: &str) -> HostNameType {
    if name.is_empty() {
        return HostNameType::Unknown;
    }
    let bytes = name.as_bytes();
    let len = bytes.len();

    if bytes[0] == b'[' && bytes[len - 1] == b']' {
        return match ip::parse_v6_literal(bytes) {
            Some(lit) if lit.len == len => HostNameType::Ipv6,
            _ => HostNameType::Unknown,
        };
    }
    if matches!(ip::parse_v4_lenient(bytes), Some((_, end)) if end == len) {
        return HostNameType::Ipv4;
    }
    let is_dns = |iri| matches!(host::scan_dns(name, 0, iri), Some(dns) if dns.end == len);
    if is_dns(false) || is_dns(true) {
        return HostNameType::Dns;
    }
    if ip::parse_v6_bare(bytes).is_some() {
        return HostNameType::Ipv6;
    }
    HostNameType::Unknown
}

/// Checks whether a string is a valid scheme name.
///
/// A scheme name starts with an ASCII letter, continues with letters,
/// digits, `+`, `-` or `.`, and is at most 1024 characters long.
#[must_use]
pub fn check_scheme_name(name: &str) -> bool {
    scheme::Scheme::new(name).is_some()
}

/// Percent-encodes a character.
///
/// Returns `None` if the character is above U+00FF.
///
/// # Examples
///
/// ```
/// assert_eq!(compat_uri::hex_escape(' ').as_deref(), Some("%20"));
/// assert_eq!(compat_uri::hex_escape('\u{ff}').as_deref(), Some("%FF"));
/// assert_eq!(compat_uri::hex_escape('\u{100}'), None);
/// ```
#[must_use]
pub fn hex_escape(ch: char) -> Option<String> {
    let x = u8::try_from(ch).ok()?;
    let mut out = String::with_capacity(3);
    pct_enc::push_pct_encoded(&mut out, x);
    Some(out)
}

/// Decodes the character at `*index`, advancing the index past it.
///
/// A `%XX` escape decodes to the character with that code (U+0000 to
/// U+00FF); anything else is returned as is. Returns `None` if `*index`
/// is at or past the end.
///
/// # Examples
///
/// ```
/// let s = "%41b";
/// let mut i = 0;
/// assert_eq!(compat_uri::hex_unescape(s, &mut i), Some('A'));
/// assert_eq!(i, 3);
/// assert_eq!(compat_uri::hex_unescape(s, &mut i), Some('b'));
/// assert_eq!(compat_uri::hex_unescape(s, &mut i), None);
/// ```
pub fn hex_unescape(s: &str, index: &mut usize) -> Option<char> {
    let i = *index;
    let rest = s.get(i..)?;
    let ch = rest.chars().next()?;
    if ch == '%' {
        if let Some(x) = pct_enc::decode_hex_pair(s.as_bytes(), i + 1) {
            *index = i + 3;
            return Some(char::from(x));
        }
    }
    *index = i + ch.len_utf8();
    Some(ch)
}

/// Checks whether a `%XX` escape starts at `index`.
#[must_use]
pub fn is_hex_encoding(s: &str, index: usize) -> bool {
    pct_enc::is_escape_at(s.as_bytes(), index)
}

/// Checks whether a character is a hexadecimal digit.
#[must_use]
pub fn is_hex_digit(ch: char) -> bool {
    ch.is_ascii_hexdigit()
}

/// Returns the value of a hexadecimal digit.
#[must_use]
pub fn from_hex(digit: char) -> Option<u8> {
    u8::try_from(digit).ok().and_then(pct_enc::decode_hexdigit)
}
