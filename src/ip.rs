//! IPv4 and IPv6 address parsing and formatting.

use crate::pct_enc;
use alloc::string::String;
use core::fmt::Write;

/// Characters that end a host in an authority.
#[inline]
pub(crate) fn is_host_terminator(x: u8) -> bool {
    matches!(x, b'/' | b'\\' | b':' | b'?' | b'#')
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

enum Seg {
    // *1":" 1*4HEXDIG
    Normal(u16, bool),
    // "::"
    Ellipsis,
    // *1":" 1*4HEXDIG "."
    MaybeV4(bool),
    // ":"
    SingleColon,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Reader { bytes, pos: 0 }
    }

    fn has_remaining(&self) -> bool {
        self.pos < self.bytes.len()
    }

    fn peek(&self, i: usize) -> Option<u8> {
        self.bytes.get(self.pos + i).copied()
    }

    fn skip(&mut self, n: usize) {
        self.pos += n;
        debug_assert!(self.pos <= self.bytes.len());
    }

    fn read_str(&mut self, s: &str) -> bool {
        if self.bytes[self.pos..].starts_with(s.as_bytes()) {
            self.skip(s.len());
            true
        } else {
            false
        }
    }

    fn read_v6(&mut self) -> Option<[u16; 8]> {
        let mut segs = [0; 8];
        let mut ellipsis_idx = 8;

        let mut i = 0;
        while i < 8 {
            match self.read_v6_segment() {
                Some(Seg::Normal(seg, colon)) => {
                    if colon == (i == 0 || i == ellipsis_idx) {
                        // Leading colon, triple colons, or no colon.
                        return None;
                    }
                    segs[i] = seg;
                    i += 1;
                }
                Some(Seg::Ellipsis) => {
                    if ellipsis_idx != 8 {
                        // Multiple ellipses.
                        return None;
                    }
                    ellipsis_idx = i;
                }
                Some(Seg::MaybeV4(colon)) => {
                    if i > 6 || colon == (i == ellipsis_idx) {
                        // Not enough space, triple colons, or no colon.
                        return None;
                    }
                    let octets = self.read_v4()?.to_be_bytes();
                    segs[i] = u16::from_be_bytes([octets[0], octets[1]]);
                    segs[i + 1] = u16::from_be_bytes([octets[2], octets[3]]);
                    i += 2;
                    break;
                }
                Some(Seg::SingleColon) => return None,
                None => break,
            }
        }

        if ellipsis_idx == 8 {
            if i != 8 {
                // Too short.
                return None;
            }
        } else if i == 8 {
            // Eliding nothing.
            return None;
        } else {
            // Shift the segments after the ellipsis to the right.
            for j in (ellipsis_idx..i).rev() {
                segs[8 - (i - j)] = segs[j];
                segs[j] = 0;
            }
        }

        Some(segs)
    }

    fn read_v6_segment(&mut self) -> Option<Seg> {
        let colon = self.read_str(":");
        let first = match self.peek(0) {
            Some(x) => x,
            None => return colon.then_some(Seg::SingleColon),
        };

        let mut x = match pct_enc::decode_hexdigit(first) {
            Some(v) => v as u16,
            None => {
                return colon.then(|| {
                    if first == b':' {
                        self.skip(1);
                        Seg::Ellipsis
                    } else {
                        Seg::SingleColon
                    }
                });
            }
        };
        let mut i = 1;

        while i < 4 {
            let Some(b) = self.peek(i) else {
                self.skip(i);
                return Some(Seg::Normal(x, colon));
            };
            match pct_enc::decode_hexdigit(b) {
                Some(v) => {
                    x = (x << 4) | v as u16;
                    i += 1;
                }
                None if b == b'.' => return Some(Seg::MaybeV4(colon)),
                None => break,
            }
        }
        self.skip(i);
        Some(Seg::Normal(x, colon))
    }

    fn read_v4(&mut self) -> Option<u32> {
        let mut addr = self.read_v4_octet()? << 24;
        for i in (0..3).rev() {
            if !self.read_str(".") {
                return None;
            }
            addr |= self.read_v4_octet()? << (i * 8);
        }
        Some(addr)
    }

    fn read_v4_octet(&mut self) -> Option<u32> {
        let mut res = self.peek_digit(0)?;
        if res == 0 {
            self.skip(1);
            return Some(0);
        }

        for i in 1..3 {
            let Some(x) = self.peek_digit(i) else {
                self.skip(i);
                return Some(res);
            };
            res = res * 10 + x;
        }
        self.skip(3);

        u8::try_from(res).is_ok().then_some(res)
    }

    fn peek_digit(&self, i: usize) -> Option<u32> {
        self.peek(i).and_then(|x| (x as char).to_digit(10))
    }

    /// Reads one part of a non-canonical IPv4 address: decimal, `0x` hex
    /// or `0`-prefixed octal.
    fn read_v4_part(&mut self) -> Option<u64> {
        let (radix, skip) = match (self.peek(0), self.peek(1)) {
            (Some(b'0'), Some(b'x' | b'X')) => (16, 2),
            (Some(b'0'), Some(b'0'..=b'9')) => (8, 1),
            _ => (10, 0),
        };
        self.skip(skip);

        let start = self.pos;
        let mut value: u64 = 0;
        while let Some(d) = self.peek(0).and_then(|x| (x as char).to_digit(radix)) {
            value = value * radix as u64 + d as u64;
            if value > u32::MAX as u64 {
                return None;
            }
            self.skip(1);
        }
        (self.pos > start || skip == 1).then_some(value)
    }

    fn at_host_end(&self) -> bool {
        self.peek(0).map_or(true, is_host_terminator)
    }
}

/// Parses a dotted-quad IPv4 address in canonical decimal form.
///
/// Returns the address and the number of bytes consumed. The address must
/// be followed by the end of input or a host terminator.
pub(crate) fn parse_v4_strict(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut reader = Reader::new(bytes);
    let addr = reader.read_v4()?;
    reader.at_host_end().then_some((addr, reader.pos))
}

/// Parses an IPv4 address in any of the forms accepted by `inet_aton`:
/// one to four parts, each decimal, hexadecimal or octal.
///
/// Returns the address and the number of bytes consumed.
pub(crate) fn parse_v4_lenient(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut reader = Reader::new(bytes);
    let mut parts = [0u64; 4];
    let mut n = 0;
    loop {
        if n == 4 {
            return None;
        }
        parts[n] = reader.read_v4_part()?;
        n += 1;
        if !reader.read_str(".") {
            break;
        }
    }
    if !reader.at_host_end() {
        return None;
    }

    let addr = match n {
        1 => parts[0],
        2 if parts[0] <= 0xff && parts[1] <= 0xff_ffff => parts[0] << 24 | parts[1],
        3 if parts[0] <= 0xff && parts[1] <= 0xff && parts[2] <= 0xffff => {
            parts[0] << 24 | parts[1] << 16 | parts[2]
        }
        4 if parts.iter().all(|&p| p <= 0xff) => {
            parts[0] << 24 | parts[1] << 16 | parts[2] << 8 | parts[3]
        }
        _ => return None,
    };
    Some((addr as u32, reader.pos))
}

/// A bracketed IPv6 literal found in an authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct V6Literal {
    pub(crate) segments: [u16; 8],
    /// Bounds of the zone id, including the leading `%`, relative to the
    /// start of the literal (the `[`).
    pub(crate) zone: Option<(usize, usize)>,
    /// Length of the literal including both brackets.
    pub(crate) len: usize,
}

/// Parses an IPv6 literal starting at the `[`.
pub(crate) fn parse_v6_literal(bytes: &[u8]) -> Option<V6Literal> {
    if bytes.first() != Some(&b'[') {
        return None;
    }
    let mut reader = Reader::new(&bytes[1..]);
    let segments = reader.read_v6()?;

    let mut zone = None;
    if reader.peek(0) == Some(b'%') {
        let start = reader.pos;
        reader.skip(1);
        while let Some(x) = reader.peek(0) {
            if x.is_ascii_alphanumeric() || matches!(x, b'-' | b'.' | b'_' | b'~' | b'%') {
                reader.skip(1);
            } else {
                break;
            }
        }
        if reader.pos == start + 1 {
            return None;
        }
        zone = Some((start + 1, reader.pos + 1));
    }

    if !reader.read_str("]") {
        return None;
    }
    Some(V6Literal {
        segments,
        zone,
        len: reader.pos + 1,
    })
}

/// Parses a bare IPv6 address, without brackets, filling the whole input.
pub(crate) fn parse_v6_bare(bytes: &[u8]) -> Option<[u16; 8]> {
    let mut reader = Reader::new(bytes);
    let segments = reader.read_v6()?;
    (!reader.has_remaining()).then_some(segments)
}

pub(crate) fn write_v4(buf: &mut String, addr: u32) {
    let [a, b, c, d] = addr.to_be_bytes();
    write!(buf, "{a}.{b}.{c}.{d}").unwrap();
}

/// Writes an IPv6 address in the RFC 5952 form, without brackets.
// Taken from `impl Display for Ipv6Addr`.
pub(crate) fn write_v6(buf: &mut String, segments: [u16; 8]) {
    if let [0, 0, 0, 0, 0, 0xffff, ab, cd] = segments {
        let [a, b] = ab.to_be_bytes();
        let [c, d] = cd.to_be_bytes();
        write!(buf, "::ffff:{a}.{b}.{c}.{d}").unwrap();
    } else {
        #[derive(Copy, Clone, Default)]
        struct Span {
            start: usize,
            len: usize,
        }

        let zeroes = {
            let mut longest = Span::default();
            let mut current = Span::default();

            for (i, &segment) in segments.iter().enumerate() {
                if segment == 0 {
                    if current.len == 0 {
                        current.start = i;
                    }
                    current.len += 1;
                    if current.len > longest.len {
                        longest = current;
                    }
                } else {
                    current = Span::default();
                }
            }

            longest
        };

        fn write_subslice(buf: &mut String, chunk: &[u16]) {
            if let Some((first, tail)) = chunk.split_first() {
                write!(buf, "{first:x}").unwrap();
                for segment in tail {
                    write!(buf, ":{segment:x}").unwrap();
                }
            }
        }

        if zeroes.len > 1 {
            write_subslice(buf, &segments[..zeroes.start]);
            buf.push_str("::");
            write_subslice(buf, &segments[zeroes.start + zeroes.len..]);
        } else {
            write_subslice(buf, &segments);
        }
    }
}

pub(crate) fn is_v4_loopback(addr: u32) -> bool {
    addr >> 24 == 127
}

pub(crate) fn is_v6_loopback(segments: [u16; 8]) -> bool {
    match segments {
        [0, 0, 0, 0, 0, 0, 0, 1] => true,
        [0, 0, 0, 0, 0, 0xffff, hi, _] => hi >> 8 == 127,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(s: &str) -> Option<String> {
        parse_v4_lenient(s.as_bytes()).map(|(addr, _)| {
            let mut buf = String::new();
            write_v4(&mut buf, addr);
            buf
        })
    }

    fn v6(s: &str) -> Option<String> {
        parse_v6_literal(s.as_bytes()).map(|lit| {
            let mut buf = String::new();
            write_v6(&mut buf, lit.segments);
            buf
        })
    }

    #[test]
    fn lenient_v4() {
        assert_eq!(v4("127.0.0.1").as_deref(), Some("127.0.0.1"));
        assert_eq!(v4("0x7f.1").as_deref(), Some("127.0.0.1"));
        assert_eq!(v4("017.0.0.1").as_deref(), Some("15.0.0.1"));
        assert_eq!(v4("3232235777").as_deref(), Some("192.168.1.1"));
        assert_eq!(v4("1.2.3.4/x").as_deref(), Some("1.2.3.4"));
        assert_eq!(v4("256.1.1.1"), None);
        assert_eq!(v4("1.2.3.4.5"), None);
        assert_eq!(v4("1.2.3.4a"), None);
        assert_eq!(v4("1..2"), None);
        assert_eq!(v4("09.1.1.1"), None);
    }

    #[test]
    fn strict_v4() {
        assert_eq!(parse_v4_strict(b"10.0.0.1:80"), Some((0x0a00_0001, 8)));
        assert_eq!(parse_v4_strict(b"010.0.0.1"), None);
        assert_eq!(parse_v4_strict(b"10.0.1"), None);
    }

    #[test]
    fn literal_v6() {
        assert_eq!(v6("[::1]").as_deref(), Some("::1"));
        assert_eq!(v6("[2001:DB8:0:0:0:0:0:1]").as_deref(), Some("2001:db8::1"));
        assert_eq!(v6("[::ffff:127.0.0.1]").as_deref(), Some("::ffff:127.0.0.1"));
        assert_eq!(v6("[1:0:0:1:0:0:0:1]").as_deref(), Some("1:0:0:1::1"));
        assert_eq!(v6("[::1"), None);
        assert_eq!(v6("[1:2]"), None);
        assert_eq!(v6("[fe80::1%]"), None);

        let lit = parse_v6_literal(b"[fe80::1%eth0]:80").unwrap();
        assert_eq!(lit.zone, Some((8, 13)));
        assert_eq!(lit.len, 14);
    }

    #[test]
    fn loopback() {
        assert!(is_v4_loopback(0x7f00_0001));
        assert!(is_v6_loopback([0, 0, 0, 0, 0, 0, 0, 1]));
        assert!(is_v6_loopback([0, 0, 0, 0, 0, 0xffff, 0x7f00, 1]));
        assert!(!is_v6_loopback([0, 0, 0, 0, 0, 0, 0, 2]));
    }
}
