//! Host name validation, canonicalization and IDNA conversion.

use crate::{flags::HostType, ip, pct_enc::table};
use alloc::string::String;

/// The longest DNS name accepted.
const MAX_DNS_LEN: usize = 255;
/// The longest label of a DNS name.
const MAX_LABEL_LEN: usize = 63;
/// The longest UNC server name accepted.
pub(crate) const MAX_UNC_LEN: usize = 256;

#[inline]
fn is_label_separator(ch: char, iri: bool) -> bool {
    ch == '.' || (iri && matches!(ch, '\u{3002}' | '\u{ff0e}' | '\u{ff61}'))
}

/// Result of scanning a DNS name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DnsName {
    /// Index just past the name.
    pub(crate) end: usize,
    /// Whether an uppercase ASCII letter was seen.
    pub(crate) has_upper: bool,
    /// Whether a non-ASCII character was seen.
    pub(crate) has_unicode: bool,
}

/// Scans a DNS name starting at `start`, stopping at a host terminator.
///
/// Labels are made of ASCII letters, digits, `-` and `_`; with `iri`,
/// valid IRI characters are accepted too, as are the ideographic dots.
/// A single trailing dot is allowed.
pub(crate) fn scan_dns(s: &str, start: usize, iri: bool) -> Option<DnsName> {
    let mut label_len = 0;
    let mut labels = 0;
    let mut has_upper = false;
    let mut has_unicode = false;
    let mut end = s.len();

    for (i, ch) in s[start..].char_indices() {
        if ch.is_ascii() && ip::is_host_terminator(ch as u8) {
            end = start + i;
            break;
        }
        if is_label_separator(ch, iri) {
            if label_len == 0 {
                return None;
            }
            labels += 1;
            label_len = 0;
        } else if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            has_upper |= ch.is_ascii_uppercase();
            label_len += 1;
        } else if iri && !ch.is_ascii() && table::is_iri_char(ch, false) {
            has_unicode = true;
            label_len += 1;
        } else {
            return None;
        }
        if label_len > MAX_LABEL_LEN {
            return None;
        }
    }

    if label_len == 0 && labels == 0 {
        return None;
    }
    if end - start > MAX_DNS_LEN {
        return None;
    }
    Some(DnsName {
        end,
        has_upper,
        has_unicode,
    })
}

/// Scans a UNC server name starting at `start`.
///
/// The first label may not be all digits; later labels start with a
/// letter or digit. Returns the index just past the name.
pub(crate) fn scan_unc(s: &str, start: usize, not_implicit_file: bool) -> Option<usize> {
    let is_end = |ch: char| {
        ch == '/' || ch == '\\' || (not_implicit_file && matches!(ch, ':' | '?' | '#'))
    };

    let mut chars = s[start..].char_indices();
    let mut end = s.len();
    let mut valid_short_name = false;
    let mut prev_dot = false;

    // First label: may consist of '-' or '_' but not of digits only.
    for (i, ch) in chars.by_ref() {
        if is_end(ch) {
            end = start + i;
            return (valid_short_name && end > start).then_some(end);
        }
        if ch == '.' {
            prev_dot = true;
            break;
        }
        if ch.is_alphabetic() || ch == '-' || ch == '_' {
            valid_short_name = true;
        } else if !ch.is_ascii_digit() {
            return None;
        }
    }
    if !valid_short_name {
        return None;
    }

    for (i, ch) in chars {
        if is_end(ch) {
            end = start + i;
            break;
        }
        if ch == '.' {
            if !valid_short_name || prev_dot {
                return None;
            }
            valid_short_name = false;
            prev_dot = true;
            continue;
        }
        prev_dot = false;
        if ch == '-' || ch == '_' {
            if !valid_short_name {
                return None;
            }
        } else if ch.is_alphabetic() || ch.is_ascii_digit() {
            valid_short_name = true;
        } else {
            return None;
        }
    }

    // The last label may end with a dot.
    (valid_short_name || prev_dot).then_some(end)
}

/// The canonical form of a host and what it tells about the URI.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct CanonicalHost {
    pub(crate) host: String,
    pub(crate) loopback: bool,
    /// IPv6 zone id including its `%`.
    pub(crate) scope_id: Option<String>,
}

fn is_loopback_name(name: &str) -> bool {
    name.eq_ignore_ascii_case("localhost") || name.eq_ignore_ascii_case("loopback")
}

/// Computes the canonical form of a host that has passed validation.
pub(crate) fn canonicalize(raw: &str, host_type: HostType, strict_v4: bool) -> CanonicalHost {
    let mut out = CanonicalHost::default();
    match host_type {
        HostType::Ipv6 => match ip::parse_v6_literal(raw.as_bytes()) {
            Some(lit) => {
                out.host.push('[');
                ip::write_v6(&mut out.host, lit.segments);
                out.host.push(']');
                out.loopback = ip::is_v6_loopback(lit.segments);
                out.scope_id = lit.zone.map(|(a, b)| raw[a..b].into());
            }
            None => out.host.push_str(raw),
        },
        HostType::Ipv4 => {
            let parsed = if strict_v4 {
                ip::parse_v4_strict(raw.as_bytes())
            } else {
                ip::parse_v4_lenient(raw.as_bytes())
            };
            match parsed {
                Some((addr, _)) => {
                    ip::write_v4(&mut out.host, addr);
                    out.loopback = ip::is_v4_loopback(addr);
                }
                None => out.host.push_str(raw),
            }
        }
        HostType::Dns | HostType::Unc => {
            out.host = if raw.is_ascii() {
                raw.to_ascii_lowercase()
            } else {
                raw.chars()
                    .map(|ch| match ch {
                        '\u{3002}' | '\u{ff0e}' | '\u{ff61}' => '.',
                        ch => ch,
                    })
                    .flat_map(char::to_lowercase)
                    .collect()
            };
            out.loopback = is_loopback_name(&out.host);
        }
        HostType::Basic => {
            out.host.push_str(raw);
            out.loopback = raw.is_empty();
        }
        HostType::Unknown => {}
    }
    out
}

/// Converts a canonical host to its ASCII-compatible form.
///
/// Unicode labels are mapped and become `xn--` punycode labels; a host
/// that cannot be mapped is returned as is. IPv6 hosts lose their
/// brackets and regain their zone id.
pub(crate) fn to_idn(host: &str, scope_id: Option<&str>) -> String {
    if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        let mut out = String::from(inner);
        if let Some(scope) = scope_id {
            out.push_str(scope);
        }
        return out;
    }
    if host.is_ascii() {
        return host.into();
    }
    match idna::domain_to_ascii(host) {
        Ok(ascii) => ascii,
        Err(e) => {
            log::debug!("no ASCII form for host {host:?}: {e:?}");
            host.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dns() {
        let name = scan_dns("Example.COM:80", 0, false).unwrap();
        assert_eq!(name.end, 11);
        assert!(name.has_upper);

        assert_eq!(scan_dns("a.b.", 0, false).map(|n| n.end), Some(4));
        assert_eq!(scan_dns("a..b", 0, false), None);
        assert_eq!(scan_dns(".a", 0, false), None);
        assert_eq!(scan_dns("a b", 0, false), None);
        assert_eq!(scan_dns("bücher.de", 0, false), None);

        let name = scan_dns("bücher.de/x", 0, true).unwrap();
        assert_eq!(name.end, "bücher.de".len());
        assert!(name.has_unicode);

        let long_label = "a".repeat(64);
        assert_eq!(scan_dns(&long_label, 0, false), None);
    }

    #[test]
    fn unc() {
        assert_eq!(scan_unc("server\\share", 0, false), Some(6));
        assert_eq!(scan_unc("my-srv.corp/x", 0, true), Some(11));
        assert_eq!(scan_unc("1234\\x", 0, false), None);
        assert_eq!(scan_unc("a..b/", 0, true), None);
        assert_eq!(scan_unc("srv.", 0, true), Some(4));
    }

    #[test]
    fn canonical() {
        let h = canonicalize("LocalHost", HostType::Dns, false);
        assert_eq!(h.host, "localhost");
        assert!(h.loopback);

        let h = canonicalize("0x7F.1", HostType::Ipv4, false);
        assert_eq!(h.host, "127.0.0.1");
        assert!(h.loopback);

        let h = canonicalize("[FE80::1%eth0]", HostType::Ipv6, false);
        assert_eq!(h.host, "[fe80::1]");
        assert_eq!(h.scope_id.as_deref(), Some("%eth0"));
        assert!(!h.loopback);

        assert!(canonicalize("", HostType::Basic, false).loopback);
    }

    #[test]
    fn idn() {
        assert_eq!(to_idn("bücher.de", None), "xn--bcher-kva.de");
        assert_eq!(to_idn("例え.テスト", None), "xn--r8jz45g.xn--zckzah");
        assert_eq!(to_idn("[fe80::1]", Some("%4")), "fe80::1%4");
        assert_eq!(to_idn("example.com", None), "example.com");
    }
}
