mod info;
mod parts;

pub use parts::{Components, UriFormat};

use crate::{
    error::{NotAbsoluteError, ParseError, ParseErrorKind as Kind},
    flags::{Flags, HostType},
    host,
    parse::{self, Parsed},
    pct_enc::{self, table, UnescapeMode},
    resolve,
    scheme::{RawComponents, SchemeSyntax, Syntax, SyntaxFlags as S},
};
use alloc::{string::String, vec::Vec};
use core::{
    cell::RefCell,
    hash::{Hash, Hasher},
};
use info::{HostString, Info, Remaining};
use once_cell::sync::OnceCell;
pub(crate) use parts::Format;

/// Inputs longer than this are rejected.
const MAX_URI_LEN: usize = 0xfff0 - 1;

/// What kind of URI a constructor accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UriKind {
    /// Either kind; the input decides.
    #[default]
    RelativeOrAbsolute,
    /// Only an absolute URI.
    Absolute,
    /// Only a relative reference.
    Relative,
}

/// The kind of a host, as reported by [`Uri::host_name_type`] and
/// [`check_host_name`].
///
/// [`check_host_name`]: crate::check_host_name
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostNameType {
    /// No host, or a host that matches no other kind.
    Unknown,
    /// An opaque host, such as a UNC server name that is not a DNS name.
    Basic,
    /// A DNS name.
    Dns,
    /// An IPv4 address.
    Ipv4,
    /// An IPv6 address.
    Ipv6,
}

/// The leftmost part of a URI to keep in [`Uri::get_left_part`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UriPartial {
    /// Up to and including the scheme delimiter.
    Scheme,
    /// Up to the end of the authority.
    Authority,
    /// Up to the end of the path.
    Path,
    /// Up to the end of the query.
    Query,
}

/// How far parsing of a [`Uri`] has gone.
///
/// Scheme and authority are parsed on construction. Path, query and
/// fragment are scanned on first access to any of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParseState {
    /// A relative reference, which is never parsed.
    Unparsed,
    /// Scheme and authority are known.
    MinimalParsed,
    /// Every component has been scanned.
    FullyParsed,
}

#[derive(Clone, Default)]
struct Cache {
    absolute_uri: OnceCell<String>,
    path: OnceCell<String>,
    path_and_query: OnceCell<String>,
    query: OnceCell<String>,
    fragment: OnceCell<String>,
    remote_url: OnceCell<String>,
    idn_host: OnceCell<String>,
    display: OnceCell<String>,
}

/// A parsed URI, absolute or relative.
///
/// Absolute URIs have their scheme and authority validated on
/// construction; path, query and fragment are accepted as written and
/// canonicalized when first asked for. Every accessor other than
/// [`original_string`], [`is_absolute_uri`], [`user_escaped`] and
/// [`Display`] requires an absolute URI and returns [`NotAbsoluteError`]
/// on a relative one.
///
/// Computed components are cached. A `Uri` can be shared between threads;
/// concurrent first reads may compute a component twice, and the first
/// result to be published is kept.
///
/// # Examples
///
/// ```
/// use compat_uri::Uri;
///
/// let uri = Uri::parse("https://example.com:443/a/b?q=1#frag")?;
/// assert_eq!(uri.scheme()?, "https");
/// assert_eq!(uri.host()?, "example.com");
/// assert_eq!(uri.port()?, Some(443));
/// assert!(uri.is_default_port()?);
/// assert_eq!(uri.absolute_path()?, "/a/b");
/// assert_eq!(uri.query()?, "?q=1");
/// assert_eq!(uri.fragment()?, "#frag");
/// # Ok::<_, Box<dyn std::error::Error>>(())
/// ```
///
/// [`original_string`]: Self::original_string
/// [`is_absolute_uri`]: Self::is_absolute_uri
/// [`user_escaped`]: Self::user_escaped
/// [`Display`]: core::fmt::Display
#[derive(Clone)]
pub struct Uri {
    /// The working string: trimmed, and rebuilt in IRI form when the
    /// input holds non-ASCII characters.
    string: String,
    /// The input, when it differs from `string`.
    original: Option<String>,
    /// `None` for a relative reference.
    syntax: Option<Syntax>,
    flags: Flags,
    host_type: HostType,
    authority_end: usize,
    info: OnceCell<Info>,
    remaining: OnceCell<Remaining>,
    host: OnceCell<HostString>,
    cache: Cache,
}

/// A view of an absolute URI.
#[derive(Clone, Copy)]
pub(crate) struct Abs<'a> {
    uri: &'a Uri,
    pub(crate) syntax: &'a SchemeSyntax,
}

impl Uri {
    /// Parses an absolute URI.
    ///
    /// Leading and trailing whitespace is ignored. A bare DOS path
    /// (`c:\dir`), UNC path (`\\server\share`) or, outside Windows, a
    /// rooted Unix path (`/usr/lib`) is taken as a `file` URI.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the scheme or the authority is malformed.
    /// Path, query and fragment are never rejected.
    pub fn parse(s: &str) -> Result<Uri, ParseError> {
        Self::create(s, false, UriKind::Absolute)
    }

    /// Parses a URI of the given kind.
    ///
    /// With [`UriKind::RelativeOrAbsolute`], input that has no valid scheme
    /// is kept as a relative reference. A bare Unix path is relative unless
    /// [`UriKind::Absolute`] is asked for.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the input cannot be a URI of the requested kind.
    pub fn parse_with_kind(s: &str, kind: UriKind) -> Result<Uri, ParseError> {
        Self::create(s, false, kind)
    }

    /// Parses a URI the caller has already escaped.
    ///
    /// Escaped output of such a URI reproduces the input instead of
    /// escaping it further.
    ///
    /// # Errors
    ///
    /// Same as [`parse_with_kind`](Self::parse_with_kind).
    pub fn parse_escaped(s: &str, kind: UriKind) -> Result<Uri, ParseError> {
        Self::create(s, true, kind)
    }

    pub(crate) fn create(s: &str, user_escaped: bool, kind: UriKind) -> Result<Uri, ParseError> {
        let res = Self::init(s, user_escaped, kind);
        if let Err(e) = &res {
            log::debug!("rejected {s:?} as {kind:?}: {:?}", e.kind());
        }
        res
    }

    fn relative(s: &str, flags: Flags) -> Uri {
        log::trace!("keeping {s:?} as a relative reference");
        Uri {
            string: s.into(),
            original: None,
            syntax: None,
            flags: flags & Flags::USER_ESCAPED,
            host_type: HostType::Unknown,
            authority_end: 0,
            info: OnceCell::new(),
            remaining: OnceCell::new(),
            host: OnceCell::new(),
            cache: Cache::default(),
        }
    }

    fn init(input: &str, user_escaped: bool, kind: UriKind) -> Result<Uri, ParseError> {
        let mut flags = if user_escaped {
            Flags::USER_ESCAPED
        } else {
            Flags::EMPTY
        };
        let escaped = flags;
        let relative_or = |k: Kind| {
            if kind != UriKind::Absolute && k.allows_relative() {
                Ok(Uri::relative(input, escaped))
            } else {
                Err(ParseError::new(k))
            }
        };

        if input.len() > MAX_URI_LEN {
            return Err(ParseError::new(Kind::SizeLimit));
        }
        let trimmed = input.trim_matches(table::is_lws);
        if trimmed.is_empty() {
            return relative_or(Kind::EmptyUriString);
        }
        if !trimmed.is_ascii() {
            flags |= Flags::HAS_UNICODE;
        }

        let (syntax, found, idx) = match parse::parse_scheme(trimmed) {
            Ok(x) => x,
            Err(k) => return relative_or(k),
        };
        log::trace!("{trimmed:?} has scheme {:?}", syntax.name());

        if found.any(Flags::IMPLICIT_FILE) && kind != UriKind::Absolute {
            // A network-path or absolute-path reference wins over an
            // implicit file path, except for `\\server` and DOS paths.
            let relative = if found.any(Flags::DOS_PATH) {
                kind == UriKind::Relative
            } else {
                kind == UriKind::Relative
                    || !input.starts_with("\\\\")
                    || (!parse::IS_WINDOWS && found.any(Flags::UNIX_PATH))
            };
            if relative {
                return Ok(Uri::relative(input, escaped));
            }
        }

        if !syntax.allows_iri() {
            flags.remove(Flags::HAS_UNICODE);
        }
        let parsed = match parse::parse_minimal(trimmed, syntax, flags | found, idx) {
            Ok(p) => p,
            Err(k) => return relative_or(k),
        };
        if kind == UriKind::Relative {
            return Err(ParseError::new(Kind::CannotCreateRelative));
        }

        let (string, parsed) = if parsed.flags.any(Flags::HAS_UNICODE) {
            let string = info::normalize_iri_string(trimmed, &parsed);
            log::trace!("rebuilt {trimmed:?} as {string:?}");
            let parsed = parse::parse(&string, flags)?;
            (string, parsed)
        } else {
            (String::from(trimmed), parsed)
        };

        let Parsed {
            syntax,
            flags,
            host_type,
            authority_end,
        } = parsed;
        Ok(Uri {
            original: (string != input).then(|| input.into()),
            string,
            syntax: Some(syntax),
            flags,
            host_type,
            authority_end,
            info: OnceCell::new(),
            remaining: OnceCell::new(),
            host: OnceCell::new(),
            cache: Cache::default(),
        })
    }

    pub(crate) fn absolute(&self) -> Result<Abs<'_>, NotAbsoluteError> {
        match &self.syntax {
            Some(syntax) => Ok(Abs {
                uri: self,
                syntax: &**syntax,
            }),
            None => Err(NotAbsoluteError(())),
        }
    }

    /// Returns the string the URI was created from, exactly as given.
    #[must_use]
    pub fn original_string(&self) -> &str {
        self.original.as_deref().unwrap_or(&self.string)
    }

    /// Checks whether the URI is absolute.
    #[must_use]
    pub fn is_absolute_uri(&self) -> bool {
        self.syntax.is_some()
    }

    /// Checks whether the URI was created from an already escaped string.
    #[must_use]
    pub fn user_escaped(&self) -> bool {
        self.flags.any(Flags::USER_ESCAPED)
    }

    /// Returns how far the URI has been parsed.
    #[must_use]
    pub fn parse_state(&self) -> ParseState {
        if self.syntax.is_none() {
            ParseState::Unparsed
        } else if self.remaining.get().is_some() {
            ParseState::FullyParsed
        } else {
            ParseState::MinimalParsed
        }
    }

    /// Returns the lowercase scheme name.
    ///
    /// This never triggers parsing of the path.
    pub fn scheme(&self) -> Result<&str, NotAbsoluteError> {
        Ok(self.absolute()?.syntax.name())
    }

    /// Returns the canonical host.
    ///
    /// DNS names are lowercased, IP addresses are normalized and IPv6
    /// addresses keep their brackets but lose their zone id.
    pub fn host(&self) -> Result<&str, NotAbsoluteError> {
        Ok(&self.absolute()?.host().host)
    }

    /// Returns a host fit for name resolution.
    ///
    /// IPv6 addresses lose their brackets and regain their zone id;
    /// escaped basic hosts are decoded.
    pub fn dns_safe_host(&self) -> Result<&str, NotAbsoluteError> {
        let abs = self.absolute()?;
        let host = abs.host();
        let flags = abs.flags();
        if host.host_type == HostType::Ipv6
            || (host.host_type == HostType::Basic
                && flags.any(Flags::HOST_NOT_CANONICAL | Flags::E_HOST_NOT_CANONICAL))
        {
            self.idn_host()
        } else {
            Ok(&host.host)
        }
    }

    /// Returns the host in its ASCII-compatible form.
    ///
    /// Unicode DNS labels are converted to punycode.
    pub fn idn_host(&self) -> Result<&str, NotAbsoluteError> {
        let abs = self.absolute()?;
        Ok(self.cache.idn_host.get_or_init(|| {
            let host = abs.host();
            match host.host_type {
                HostType::Dns | HostType::Ipv6 => host::to_idn(&host.host, host.scope_id.as_deref()),
                HostType::Basic
                    if abs
                        .flags()
                        .any(Flags::HOST_NOT_CANONICAL | Flags::E_HOST_NOT_CANONICAL) =>
                {
                    let mut out = String::with_capacity(host.host.len());
                    pct_enc::unescape_into(
                        &mut out,
                        &host.host,
                        &[],
                        UnescapeMode::UNESCAPE | UnescapeMode::UNESCAPE_ALL,
                        false,
                    );
                    out
                }
                _ => host.host.clone(),
            }
        }))
    }

    /// Returns the kind of the host.
    pub fn host_name_type(&self) -> Result<HostNameType, NotAbsoluteError> {
        let abs = self.absolute()?;
        let host_type = if abs.syntax.extension().is_some() {
            abs.host().host_type
        } else {
            abs.host_type()
        };
        Ok(match host_type {
            HostType::Dns => HostNameType::Dns,
            HostType::Ipv4 => HostNameType::Ipv4,
            HostType::Ipv6 => HostNameType::Ipv6,
            HostType::Basic | HostType::Unc => HostNameType::Basic,
            HostType::Unknown => HostNameType::Unknown,
        })
    }

    /// Returns the port, or the default port of the scheme when none is
    /// given.
    ///
    /// Returns `None` if neither exists.
    pub fn port(&self) -> Result<Option<u16>, NotAbsoluteError> {
        let abs = self.absolute()?;
        if abs.flags().any(Flags::NOT_DEFAULT_PORT) {
            Ok(Some(abs.info().port))
        } else {
            Ok(abs.syntax.default_port())
        }
    }

    /// Checks whether the port is the default port of the scheme.
    pub fn is_default_port(&self) -> Result<bool, NotAbsoluteError> {
        Ok(!self.absolute()?.flags().any(Flags::NOT_DEFAULT_PORT))
    }

    /// Returns the escaped path.
    ///
    /// A path written as a bare DOS path comes without a leading slash,
    /// while `file:///c:/dir` keeps it.
    pub fn absolute_path(&self) -> Result<&str, NotAbsoluteError> {
        let path = self.rooted_path()?;
        Ok(if self.is_implicit_dos_path() {
            path.strip_prefix('/').unwrap_or(path)
        } else {
            path
        })
    }

    fn rooted_path(&self) -> Result<&str, NotAbsoluteError> {
        let abs = self.absolute()?;
        Ok(self
            .cache
            .path
            .get_or_init(|| abs.parts(Components::PATH | Components::KEEP_DELIMITER, Format::Escaped)))
    }

    fn is_implicit_dos_path(&self) -> bool {
        self.flags.all(Flags::IMPLICIT_FILE | Flags::DOS_PATH)
    }

    /// Returns the whole URI, escaped.
    pub fn absolute_uri(&self) -> Result<&str, NotAbsoluteError> {
        let abs = self.absolute()?;
        Ok(self
            .cache
            .absolute_uri
            .get_or_init(|| abs.parts(Components::ABSOLUTE_URI, Format::Escaped)))
    }

    /// Returns the escaped path and query.
    pub fn path_and_query(&self) -> Result<&str, NotAbsoluteError> {
        let abs = self.absolute()?;
        let s = self
            .cache
            .path_and_query
            .get_or_init(|| abs.parts(Components::PATH_AND_QUERY, Format::Escaped));
        Ok(if self.is_implicit_dos_path() {
            s.strip_prefix('/').unwrap_or(s)
        } else {
            s
        })
    }

    /// Returns the escaped query with its leading `?`, or an empty string.
    pub fn query(&self) -> Result<&str, NotAbsoluteError> {
        let abs = self.absolute()?;
        Ok(self
            .cache
            .query
            .get_or_init(|| abs.parts(Components::QUERY | Components::KEEP_DELIMITER, Format::Escaped)))
    }

    /// Returns the escaped fragment with its leading `#`, or an empty string.
    pub fn fragment(&self) -> Result<&str, NotAbsoluteError> {
        let abs = self.absolute()?;
        Ok(self.cache.fragment.get_or_init(|| {
            abs.parts(Components::FRAGMENT | Components::KEEP_DELIMITER, Format::Escaped)
        }))
    }

    /// Returns the escaped userinfo without its `@`, or an empty string.
    pub fn user_info(&self) -> Result<String, NotAbsoluteError> {
        Ok(self.absolute()?.parts(Components::USER_INFO, Format::Escaped))
    }

    /// Returns the host and the port, if it is not the default one.
    pub fn authority(&self) -> Result<String, NotAbsoluteError> {
        Ok(self
            .absolute()?
            .parts(Components::HOST | Components::PORT, Format::Escaped))
    }

    /// Splits the path after each `/`.
    ///
    /// # Examples
    ///
    /// ```
    /// use compat_uri::Uri;
    ///
    /// let uri = Uri::parse("http://h/a/b/c.txt")?;
    /// assert_eq!(uri.segments()?, ["/", "a/", "b/", "c.txt"]);
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn segments(&self) -> Result<Vec<&str>, NotAbsoluteError> {
        let path = self.rooted_path()?;
        Ok(path.split_inclusive('/').collect())
    }

    /// Returns the path as the local file system spells it.
    ///
    /// DOS and UNC paths use backslashes and have their escapes decoded;
    /// UNC paths start with `\\host`. Other paths are returned unescaped.
    pub fn local_path(&self) -> Result<String, NotAbsoluteError> {
        Ok(self.absolute()?.local_path())
    }

    /// Checks whether the scheme is `file`.
    pub fn is_file(&self) -> Result<bool, NotAbsoluteError> {
        Ok(self.absolute()?.syntax.is_file())
    }

    /// Checks whether the URI is a UNC path.
    pub fn is_unc(&self) -> Result<bool, NotAbsoluteError> {
        self.absolute()?;
        Ok(self.flags.any(Flags::UNC_PATH))
    }

    /// Checks whether the host refers to the local machine.
    pub fn is_loopback(&self) -> Result<bool, NotAbsoluteError> {
        let abs = self.absolute()?;
        let _ = abs.host();
        Ok(abs.flags().any(Flags::LOOPBACK_HOST))
    }

    /// Returns the URI up to and including the given part, escaped.
    ///
    /// The authority part is empty for URIs without an authority and for
    /// DOS paths.
    pub fn get_left_part(&self, part: UriPartial) -> Result<String, NotAbsoluteError> {
        let abs = self.absolute()?;
        let non_path = Components::SCHEME
            | Components::USER_INFO
            | Components::HOST
            | Components::PORT;
        let parts = match part {
            UriPartial::Scheme => Components::SCHEME | Components::KEEP_DELIMITER,
            UriPartial::Authority => {
                if !abs.flags().any(Flags::AUTHORITY_FOUND) || abs.flags().any(Flags::DOS_PATH) {
                    return Ok(String::new());
                }
                non_path
            }
            UriPartial::Path => non_path | Components::PATH,
            UriPartial::Query => non_path | Components::PATH | Components::QUERY,
        };
        Ok(abs.parts(parts, Format::Escaped))
    }

    /// Returns the given components in the given format.
    ///
    /// # Examples
    ///
    /// ```
    /// use compat_uri::{Components, Uri, UriFormat};
    ///
    /// let uri = Uri::parse("http://h/a%2Fb%20c")?;
    /// assert_eq!(uri.get_components(Components::PATH, UriFormat::UriEscaped)?, "a%2Fb%20c");
    /// assert_eq!(uri.get_components(Components::PATH, UriFormat::SafeUnescaped)?, "a%2Fb c");
    /// assert_eq!(uri.get_components(Components::PATH, UriFormat::Unescaped)?, "a/b c");
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn get_components(
        &self,
        components: Components,
        format: UriFormat,
    ) -> Result<String, NotAbsoluteError> {
        Ok(self.absolute()?.parts(components, format.into()))
    }

    /// Computes the relative reference that leads from `self` to `uri`.
    ///
    /// If the two URIs differ in scheme, host or port, `uri` itself is
    /// returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use compat_uri::Uri;
    ///
    /// let from = Uri::parse("http://h/a/b/c")?;
    /// let to = Uri::parse("http://h/a/d")?;
    /// assert_eq!(from.make_relative_uri(&to)?.original_string(), "../d");
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn make_relative_uri(&self, uri: &Uri) -> Result<Uri, NotAbsoluteError> {
        let this = self.absolute()?;
        let other = uri.absolute()?;
        if this.syntax.name() != other.syntax.name()
            || self.host()? != uri.host()?
            || self.port()? != uri.port()?
        {
            return Ok(uri.clone());
        }

        let other_path = uri.absolute_path()?;
        let mut rel = resolve::path_difference(
            self.absolute_path()?,
            other_path,
            !this.flags().is_unc_or_dos_path(),
        );
        if resolve::has_colon_in_first_segment(&rel)
            && !(other.flags().any(Flags::DOS_PATH) && other_path == rel)
        {
            rel.insert_str(0, "./");
        }
        rel.push_str(&other.parts(Components::QUERY | Components::FRAGMENT, Format::Escaped));
        Ok(Uri::relative(&rel, Flags::EMPTY))
    }

    /// The comparison key: scheme, host, port, path and query, plus the
    /// userinfo for mailto-like schemes.
    fn remote_url(&self, abs: Abs<'_>) -> &str {
        self.cache.remote_url.get_or_init(|| {
            let mut parts = Components::HTTP_REQUEST_URL;
            if abs.syntax.has(S::MAIL_TO_LIKE) {
                parts = parts | Components::USER_INFO;
            }
            let key = abs.parts(parts, Format::SafeUnescaped);
            // A raw `\` and `%5C` name the same character.
            if key.contains('\\') {
                key.replace('\\', "%5C")
            } else {
                key
            }
        })
    }

    pub(crate) fn display_str(&self) -> &str {
        match self.absolute() {
            Ok(abs) => self
                .cache
                .display
                .get_or_init(|| abs.parts(Components::ABSOLUTE_URI, Format::Display)),
            Err(_) => &self.string,
        }
    }

    fn equals(&self, a: Abs<'_>, other: &Uri, b: Abs<'_>) -> bool {
        let ignore_case = a.flags().is_unc_or_dos_path() && b.flags().is_unc_or_dos_path();
        let same_str = if ignore_case {
            self.string.eq_ignore_ascii_case(&other.string)
        } else {
            self.string == other.string
        };
        if same_str && self.user_escaped() == other.user_escaped() {
            return true;
        }

        if a.host().host != b.host().host || self.port().ok() != other.port().ok() {
            return false;
        }
        if a.syntax.has(S::MAIL_TO_LIKE) != b.syntax.has(S::MAIL_TO_LIKE) {
            return false;
        }

        let (x, y) = (self.remote_url(a), other.remote_url(b));
        if ignore_case {
            x.eq_ignore_ascii_case(y)
        } else {
            x == y
        }
    }
}

impl<'a> Abs<'a> {
    #[inline]
    pub(crate) fn s(&self) -> &'a str {
        &self.uri.string
    }

    pub(crate) fn uri(&self) -> &'a Uri {
        self.uri
    }

    pub(crate) fn info(&self) -> &'a Info {
        let uri = self.uri;
        uri.info.get_or_init(|| {
            info::create_info(&uri.string, uri.flags, uri.host_type, uri.authority_end, self.syntax)
        })
    }

    pub(crate) fn remaining(&self) -> &'a Remaining {
        let info = self.info();
        let uri = self.uri;
        uri.remaining.get_or_init(|| {
            let rem = info::parse_remaining(&uri.string, uri.flags | info.flags, info, self.syntax);
            log::trace!(
                "scanned the rest of {:?}: query at {}, fragment at {}",
                uri.string,
                rem.query,
                rem.fragment
            );
            rem
        })
    }

    pub(crate) fn host(&self) -> &'a HostString {
        let uri = self.uri;
        if let Some(host) = uri.host.get() {
            return host;
        }
        let host = self.create_host();
        // A host published by a nested extension call wins over this one.
        uri.host.get_or_init(|| host)
    }

    /// Builds the host string, asking the scheme's extension first.
    ///
    /// The extension runs outside of any lock. Building the host of an
    /// instance from within its own extension call yields a basic host.
    fn create_host(&self) -> HostString {
        let uri = self.uri;
        let info = self.info();
        let flags = uri.flags | info.flags;
        let s = self.s();

        let Some(ext) = self.syntax.extension() else {
            return info::create_host(s, flags, uri.host_type, uri.authority_end, info, self.syntax);
        };

        let raw = info::raw_host(s, info, uri.authority_end);
        let Some(_guard) = HostGuard::enter(uri) else {
            log::debug!("host of {s:?} requested while its extension runs, using a basic host");
            return info::create_host(s, flags, HostType::Basic, uri.authority_end, info, self.syntax);
        };
        let user_info = &s[info.user..info.host];
        let components = RawComponents {
            scheme: self.syntax.name(),
            user_info: user_info.strip_suffix('@').unwrap_or(user_info),
            host: raw,
            port: flags.any(Flags::NOT_DEFAULT_PORT).then_some(info.port),
        };
        match ext.host(&components) {
            Some(answer) => info::host_from_extension(raw, &answer, flags, self.syntax),
            None => info::create_host(s, flags, uri.host_type, uri.authority_end, info, self.syntax),
        }
    }

    /// All flags computed so far.
    pub(crate) fn flags(&self) -> Flags {
        let uri = self.uri;
        let mut flags = uri.flags | self.info().flags;
        if let Some(rem) = uri.remaining.get() {
            flags |= rem.flags;
        }
        if let Some(host) = uri.host.get() {
            flags |= host.flags;
        }
        flags
    }

    pub(crate) fn host_type(&self) -> HostType {
        self.uri.host.get().map_or(self.uri.host_type, |h| h.host_type)
    }
}

std::thread_local! {
    static BUILDING_HOST: RefCell<Vec<usize>> = RefCell::new(Vec::new());
}

/// Marks an instance whose host is being built on this thread.
struct HostGuard(usize);

impl HostGuard {
    fn enter(uri: &Uri) -> Option<HostGuard> {
        let key = uri as *const Uri as usize;
        BUILDING_HOST.with(|building| {
            let mut building = building.borrow_mut();
            if building.contains(&key) {
                None
            } else {
                building.push(key);
                Some(HostGuard(key))
            }
        })
    }
}

impl Drop for HostGuard {
    fn drop(&mut self) {
        let key = self.0;
        BUILDING_HOST.with(|building| building.borrow_mut().retain(|&k| k != key));
    }
}

impl PartialEq for Uri {
    /// Compares scheme, host, port, path and query; the fragment is
    /// ignored, and so is the userinfo unless the scheme is mailto-like.
    ///
    /// Paths of DOS and UNC URIs compare without regard to case.
    fn eq(&self, other: &Uri) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        match (self.absolute(), other.absolute()) {
            (Ok(a), Ok(b)) => self.equals(a, other, b),
            (Err(_), Err(_)) => self.original_string() == other.original_string(),
            _ => false,
        }
    }
}

impl Eq for Uri {}

impl Hash for Uri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.absolute() {
            Ok(abs) => {
                let url = self.remote_url(abs);
                if abs.flags().is_unc_or_dos_path() {
                    url.to_ascii_lowercase().hash(state);
                } else {
                    url.hash(state);
                }
            }
            Err(_) => self.original_string().hash(state),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Uri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.original_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Uri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <alloc::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        Uri::parse_with_kind(&s, UriKind::RelativeOrAbsolute).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests;
