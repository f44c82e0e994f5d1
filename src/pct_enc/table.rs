//! Character tables and classifiers used for escaping decisions.
//!
//! The table constants in this module are documented with
//! the ABNF notation of [RFC 5234].
//!
//! [RFC 5234]: https://datatracker.ietf.org/doc/html/rfc5234

/// A table specifying the ASCII characters allowed unencoded in a string.
#[derive(Clone, Copy, Debug)]
pub struct Table(u64, u64);

impl Table {
    /// Creates a table that only allows the given bytes.
    ///
    /// # Panics
    ///
    /// Panics if any of the bytes is not ASCII or equals `b'%'`.
    #[must_use]
    pub const fn new(mut bytes: &[u8]) -> Self {
        let mut table = 0;
        while let [cur, rem @ ..] = bytes {
            assert!(
                !matches!(cur, b'%' | 128..),
                "cannot allow non-ASCII byte or %"
            );
            table |= 1u128.wrapping_shl(*cur as u32);
            bytes = rem;
        }
        Self(table as u64, (table >> 64) as u64)
    }

    /// Combines two tables into one.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0, self.1 | other.1)
    }

    /// Subtracts `other` from this table.
    #[must_use]
    pub const fn sub(self, other: Self) -> Self {
        Self(self.0 & !other.0, self.1 & !other.1)
    }

    /// Checks whether the given character is allowed unencoded by the table.
    ///
    /// Non-ASCII characters are never allowed.
    #[inline]
    #[must_use]
    pub const fn allows(self, ch: char) -> bool {
        let x = ch as u32;
        let table = if x < 64 {
            self.0
        } else if x < 128 {
            self.1
        } else {
            return false;
        };
        table & 1u64.wrapping_shl(x) != 0
    }
}

const fn new(bytes: &[u8]) -> Table {
    Table::new(bytes)
}

/// `ALPHA = %x41-5A / %x61-7A`
pub const ALPHA: Table = new(b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz");

/// `DIGIT = %x30-39`
pub const DIGIT: Table = new(b"0123456789");

/// `scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
pub const SCHEME: Table = ALPHA.or(DIGIT).or(new(b"+-."));

/// `unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"`
pub const UNRESERVED: Table = ALPHA.or(DIGIT).or(new(b"-._~"));

/// `gen-delims = ":" / "/" / "?" / "#" / "[" / "]" / "@"`
pub const GEN_DELIMS: Table = new(b":/?#[]@");

/// `sub-delims = "!" / "$" / "&" / "'" / "(" / ")"
///             / "*" / "+" / "," / ";" / "="`
pub const SUB_DELIMS: Table = new(b"!$&'()*+,;=");

/// `reserved = gen-delims / sub-delims`
pub const RESERVED: Table = GEN_DELIMS.or(SUB_DELIMS);

/// `unreserved / reserved`
///
/// What may appear unescaped in a fragment.
pub const UNRESERVED_RESERVED: Table = UNRESERVED.or(RESERVED);

/// `unreserved / reserved` without `"#"`.
///
/// What may appear unescaped in a query.
pub const UNRESERVED_RESERVED_EXCEPT_HASH: Table = UNRESERVED_RESERVED.sub(new(b"#"));

/// `unreserved / reserved` without `"?"` and `"#"`.
///
/// What may appear unescaped in userinfo and path.
pub const UNRESERVED_RESERVED_EXCEPT_QUESTION_HASH: Table =
    UNRESERVED_RESERVED.sub(new(b"?#"));

/// C0 controls, DEL and C1 controls.
#[inline]
pub const fn is_control(ch: char) -> bool {
    matches!(ch, '\0'..='\x1f' | '\x7f'..='\u{9f}')
}

/// Whitespace that is trimmed around a URI string.
#[inline]
pub const fn is_lws(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

/// Bidirectional formatting characters, which are never kept in an IRI.
#[inline]
pub const fn is_bidi_control(ch: char) -> bool {
    matches!(ch, '\u{200e}' | '\u{200f}' | '\u{202a}'..='\u{202e}')
}

const fn is_ucschar(x: u32) -> bool {
    matches!(x, 0xa0..=0xd7ff | 0xf900..=0xfdcf | 0xfdf0..=0xffef)
        || (x >= 0x10000 && x <= 0xdffff && (x & 0xffff) <= 0xfffd)
        || (x >= 0xe1000 && x <= 0xefffd)
}

const fn is_iprivate(x: u32) -> bool {
    (x >= 0xe000 && x <= 0xf8ff) || (x >= 0xf0000 && (x & 0xffff) <= 0xfffd)
}

/// Checks whether a non-ASCII character may appear unencoded in an IRI
/// component. Private-use characters are only allowed in the query.
#[inline]
pub const fn is_iri_char(ch: char, is_query: bool) -> bool {
    let x = ch as u32;
    !is_bidi_control(ch) && (is_ucschar(x) || (is_query && is_iprivate(x)))
}

/// Characters that must stay escaped when a component is unescaped
/// without losing its meaning.
#[inline]
pub const fn is_not_safe_for_unescape(ch: char) -> bool {
    is_control(ch)
        || matches!(
            ch,
            ';' | '=' | '?' | '@' | '#'..='&' | '+' | ',' | '/' | '\\'
        )
}

/// Characters excluded from URIs that must be escaped wherever they appear.
#[inline]
pub const fn needs_escaping(ch: char) -> bool {
    matches!(
        ch,
        '\0'..=' ' | '"' | '<' | '>' | '[' | '\\' | ']' | '^' | '`' | '{' | '|' | '}' | '\x7f'..
    )
}
