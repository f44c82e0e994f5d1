//! Percent-encoding and decoding of URI components.

pub mod table;

use alloc::string::String;
use core::{ops::BitOr, str};
use table::Table;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Pushes a byte as an uppercase percent-encoded octet.
#[inline]
pub(crate) fn push_pct_encoded(dest: &mut String, x: u8) {
    dest.push('%');
    dest.push(HEX_DIGITS[(x >> 4) as usize] as char);
    dest.push(HEX_DIGITS[(x & 15) as usize] as char);
}

/// Decodes a hexadecimal digit.
#[inline]
pub(crate) const fn decode_hexdigit(x: u8) -> Option<u8> {
    match x {
        b'0'..=b'9' => Some(x - b'0'),
        b'A'..=b'F' => Some(x - b'A' + 10),
        b'a'..=b'f' => Some(x - b'a' + 10),
        _ => None,
    }
}

/// Decodes the two hexadecimal digits at `bytes[i..i + 2]`.
#[inline]
pub(crate) fn decode_hex_pair(bytes: &[u8], i: usize) -> Option<u8> {
    match bytes.get(i..i + 2) {
        Some(&[hi, lo]) => Some((decode_hexdigit(hi)? << 4) | decode_hexdigit(lo)?),
        _ => None,
    }
}

/// Checks whether `s[i..]` starts with a valid percent-encoded octet.
#[inline]
pub(crate) fn is_escape_at(bytes: &[u8], i: usize) -> bool {
    bytes.get(i) == Some(&b'%') && decode_hex_pair(bytes, i + 1).is_some()
}

/// Decodes a run of percent-encoded octets starting at `i` into one
/// UTF-8 character, returning the character and the number of octets.
fn decode_escaped_utf8(bytes: &[u8], i: usize) -> Option<(char, usize)> {
    let first = decode_hex_pair(bytes, i + 1)?;
    let len = match first {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => return None,
    };
    let mut buf = [first, 0, 0, 0];
    for (k, slot) in buf.iter_mut().enumerate().take(len).skip(1) {
        let j = i + k * 3;
        if bytes.get(j) != Some(&b'%') {
            return None;
        }
        *slot = decode_hex_pair(bytes, j + 1)?;
    }
    let ch = str::from_utf8(&buf[..len]).ok()?.chars().next()?;
    Some((ch, len))
}

/// Pushes the percent-encoded UTF-8 bytes of a character.
pub(crate) fn push_escaped(dest: &mut String, ch: char) {
    let mut buf = [0; 4];
    for &x in ch.encode_utf8(&mut buf).as_bytes() {
        push_pct_encoded(dest, x);
    }
}

/// Escapes every character not allowed by `table`.
///
/// With `check_existing`, a `%` that already starts a valid octet is kept,
/// otherwise it is escaped as `%25`.
pub(crate) fn escape_into(dest: &mut String, s: &str, check_existing: bool, table: Table) {
    let bytes = s.as_bytes();
    for (i, ch) in s.char_indices() {
        if ch == '%' && check_existing && decode_hex_pair(bytes, i + 1).is_some() {
            dest.push('%');
        } else if table.allows(ch) {
            dest.push(ch);
        } else {
            push_escaped(dest, ch);
        }
    }
}

/// How [`unescape_into`] treats its input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct UnescapeMode(u8);

impl UnescapeMode {
    /// Copies the input verbatim.
    pub(crate) const COPY_ONLY: Self = Self(0);
    /// Escapes reserved and control characters, keeps existing octets.
    pub(crate) const ESCAPE: Self = Self(1);
    /// Decodes octets that are safe to show unescaped.
    pub(crate) const UNESCAPE: Self = Self(2);
    pub(crate) const ESCAPE_UNESCAPE: Self = Self(3);
    /// Leaves raw control characters alone when escaping.
    pub(crate) const V1_TO_STRING: Self = Self(4);
    /// Decodes every valid octet, including reserved characters.
    pub(crate) const UNESCAPE_ALL: Self = Self(8);

    #[inline]
    const fn has(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[inline]
    pub(crate) const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for UnescapeMode {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Unescapes (and optionally escapes) a component.
///
/// Characters in `rsvd` are never decoded and, in an escaping mode,
/// are escaped when found raw.
pub(crate) fn unescape_into(
    dest: &mut String,
    s: &str,
    rsvd: &[char],
    mode: UnescapeMode,
    is_query: bool,
) {
    let escape = mode.has(UnescapeMode::ESCAPE);
    let unescape = mode.has(UnescapeMode::UNESCAPE) || mode.has(UnescapeMode::UNESCAPE_ALL);
    let all = mode.has(UnescapeMode::UNESCAPE_ALL);

    if !escape && !unescape {
        dest.push_str(s);
        return;
    }

    let bytes = s.as_bytes();
    let mut i = 0;
    while let Some(ch) = s[i..].chars().next() {
        if ch == '%' {
            match decode_hex_pair(bytes, i + 1) {
                Some(x) if unescape && x < 0x80 => {
                    let c = x as char;
                    let keep = !all
                        && (c == '%' || rsvd.contains(&c) || table::is_not_safe_for_unescape(c));
                    if keep {
                        dest.push_str(&s[i..i + 3]);
                    } else {
                        dest.push(c);
                    }
                    i += 3;
                }
                Some(_) if unescape => match decode_escaped_utf8(bytes, i) {
                    Some((c, n)) if all || table::is_iri_char(c, is_query) => {
                        dest.push(c);
                        i += n * 3;
                    }
                    _ => {
                        dest.push_str(&s[i..i + 3]);
                        i += 3;
                    }
                },
                Some(_) => {
                    dest.push_str(&s[i..i + 3]);
                    i += 3;
                }
                None => {
                    dest.push_str(if escape { "%25" } else { "%" });
                    i += 1;
                }
            }
            continue;
        }

        if escape
            && (rsvd.contains(&ch)
                || (!mode.has(UnescapeMode::V1_TO_STRING) && table::is_control(ch)))
        {
            push_escaped(dest, ch);
        } else {
            dest.push(ch);
        }
        i += ch.len_utf8();
    }
}

/// Decodes only the octets that stand for one of `chars`.
pub(crate) fn unescape_only(s: &str, chars: &[char]) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while let Some(ch) = s[i..].chars().next() {
        if ch == '%' {
            if let Some(x) = decode_hex_pair(bytes, i + 1) {
                if chars.contains(&(x as char)) {
                    out.push(x as char);
                    i += 3;
                    continue;
                }
            }
        }
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

/// Brings a component containing non-ASCII characters into IRI form.
///
/// Valid IRI characters are kept raw, octets that decode to one are
/// unescaped, and every other non-ASCII character is percent-encoded.
pub(crate) fn normalize_iri(dest: &mut String, s: &str, is_query: bool) {
    let bytes = s.as_bytes();
    let mut i = 0;
    while let Some(ch) = s[i..].chars().next() {
        if ch == '%' {
            if let Some(x) = decode_hex_pair(bytes, i + 1) {
                let n = match decode_escaped_utf8(bytes, i) {
                    Some((c, n)) if x >= 0x80 => {
                        if table::is_iri_char(c, is_query) {
                            dest.push(c);
                            i += n * 3;
                            continue;
                        }
                        n
                    }
                    _ => 1,
                };
                dest.push_str(&s[i..i + n * 3]);
                i += n * 3;
                continue;
            }
        }

        if !ch.is_ascii() && !table::is_iri_char(ch, is_query) {
            push_escaped(dest, ch);
        } else {
            dest.push(ch);
        }
        i += ch.len_utf8();
    }
}

/// Percent-encodes every character that is not unreserved.
///
/// # Examples
///
/// ```
/// use compat_uri::pct_enc::escape_data_string;
///
/// assert_eq!(escape_data_string("a b/ü"), "a%20b%2F%C3%BC");
/// ```
#[must_use]
pub fn escape_data_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s, false, table::UNRESERVED);
    out
}

/// Decodes every percent-encoded octet that forms valid UTF-8.
///
/// Octets that do not decode to a character are left as they are.
///
/// # Examples
///
/// ```
/// use compat_uri::pct_enc::unescape_data_string;
///
/// assert_eq!(unescape_data_string("a%20b%2F%C3%BC%FF"), "a b/ü%FF");
/// ```
#[must_use]
pub fn unescape_data_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    unescape_into(&mut out, s, &[], UnescapeMode::UNESCAPE_ALL, false);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unescape(s: &str, rsvd: &[char], mode: UnescapeMode) -> String {
        let mut out = String::new();
        unescape_into(&mut out, s, rsvd, mode, false);
        out
    }

    #[test]
    fn escape() {
        let mut out = String::new();
        escape_into(&mut out, "/a b%41%zz", true, table::UNRESERVED_RESERVED);
        assert_eq!(out, "/a%20b%41%25zz");

        out.clear();
        escape_into(&mut out, "%41", false, table::UNRESERVED_RESERVED);
        assert_eq!(out, "%2541");
    }

    #[test]
    fn safe_unescape() {
        let mode = UnescapeMode::ESCAPE_UNESCAPE;
        assert_eq!(unescape("/a%2Fb%20c", &['?', '#'], mode), "/a%2Fb c");
        assert_eq!(unescape("%3F%3a%25", &['?', '#'], mode), "%3F:%25");
        assert_eq!(unescape("%C3%A9%FF", &[], mode), "é%FF");
        assert_eq!(unescape("a#b", &['#'], mode), "a%23b");
        assert_eq!(unescape("100%", &[], mode), "100%25");
    }

    #[test]
    fn unescape_all() {
        let mode = UnescapeMode::UNESCAPE_ALL;
        assert_eq!(unescape("/a%2Fb%3F%25", &['?'], mode), "/a/b?%");
        assert_eq!(unescape("%E2%82", &[], mode), "%E2%82");
    }

    #[test]
    fn only() {
        assert_eq!(unescape_only("a%2e%2F%5Cb%41", &['.', '/', '\\']), "a./\\b%41");
    }

    #[test]
    fn iri() {
        let mut out = String::new();
        normalize_iri(&mut out, "/ü%C3%A9%41\u{200f}%E2%80%8F", false);
        assert_eq!(out, "/üé%41%E2%80%8F%E2%80%8F");
    }
}
