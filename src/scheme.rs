//! Scheme syntaxes and the process-wide scheme registry.
//!
//! Every absolute [`Uri`] carries a [`SchemeSyntax`]: plain data describing
//! what the scheme allows (an authority, a port, DOS paths, ...). The parser
//! consults these capability flags; syntaxes have no behavior of their own
//! apart from an optional [`HostExtension`].
//!
//! [`Uri`]: crate::Uri

use crate::{error::ParseErrorKind, pct_enc::table};
use alloc::{borrow::Cow, string::String, sync::Arc};
use core::{
    fmt,
    ops::{BitOr, Deref},
};
use once_cell::sync::Lazy;
use ref_cast::{ref_cast_custom, RefCastCustom};
use std::{collections::HashMap, sync::RwLock};

/// The longest scheme name accepted.
pub(crate) const MAX_SCHEME_LEN: usize = 1024;

/// Once this many unknown schemes are cached, the cache starts over.
const MAX_UNKNOWN_CACHED: usize = 512;

/// Capability flags of a scheme syntax.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntaxFlags(u32);

impl SyntaxFlags {
    /// No capabilities.
    pub const EMPTY: Self = Self(0);
    /// An authority introduced by `//` is required.
    pub const MUST_HAVE_AUTHORITY: Self = Self(1 << 0);
    /// An authority introduced by `//` may be present.
    pub const OPTIONAL_AUTHORITY: Self = Self(1 << 1);
    /// The authority may carry `userinfo@`.
    pub const MAY_HAVE_USER_INFO: Self = Self(1 << 2);
    /// The authority may carry `:port`.
    pub const MAY_HAVE_PORT: Self = Self(1 << 3);
    /// A path may follow the authority.
    pub const MAY_HAVE_PATH: Self = Self(1 << 4);
    /// A `?query` may be present.
    pub const MAY_HAVE_QUERY: Self = Self(1 << 5);
    /// A `#fragment` may be present.
    pub const MAY_HAVE_FRAGMENT: Self = Self(1 << 6);
    /// The host may be empty.
    pub const ALLOW_EMPTY_HOST: Self = Self(1 << 7);
    /// The host may be a UNC server name.
    pub const ALLOW_UNC_HOST: Self = Self(1 << 8);
    /// The host may be a DNS name.
    pub const ALLOW_DNS_HOST: Self = Self(1 << 9);
    /// The host may be an IPv4 address.
    pub const ALLOW_IPV4_HOST: Self = Self(1 << 10);
    /// The host may be a bracketed IPv6 address.
    pub const ALLOW_IPV6_HOST: Self = Self(1 << 11);
    /// DNS, IPv4 and IPv6 hosts.
    pub const ALLOW_INTERNET_HOST: Self = Self(Self::ALLOW_DNS_HOST.0
        | Self::ALLOW_IPV4_HOST.0
        | Self::ALLOW_IPV6_HOST.0);
    /// Anything up to the path is accepted as an opaque host.
    pub const ALLOW_ANY_OTHER_HOST: Self = Self(1 << 12);
    /// The scheme behaves like `file`.
    pub const FILE_LIKE: Self = Self(1 << 13);
    /// The scheme behaves like `mailto`: the authority has no `//`.
    pub const MAIL_TO_LIKE: Self = Self(1 << 14);
    /// The generic syntax given to schemes nobody registered.
    pub const V1_UNKNOWN: Self = Self(1 << 15);
    /// A DOS path such as `c:/dir` may follow the scheme.
    pub const ALLOW_DOS_PATH: Self = Self(1 << 16);
    /// The path always starts with `/`.
    pub const PATH_IS_ROOTED: Self = Self(1 << 17);
    /// Backslashes in the path are taken as slashes.
    pub const CONVERT_PATH_SLASHES: Self = Self(1 << 18);
    /// Dot segments are removed from the path.
    pub const COMPRESS_PATH: Self = Self(1 << 19);
    /// Dot segments are removed the way a file system would.
    pub const CANONICALIZE_AS_FILE_PATH: Self = Self(1 << 20);
    /// Escaped dots and slashes in the path are decoded before compression.
    pub const UNESCAPE_DOTS_AND_SLASHES: Self = Self(1 << 21);
    /// Unicode host names are converted with IDNA.
    pub const ALLOW_IDN: Self = Self(1 << 22);
    /// Non-ASCII characters are handled as IRI characters.
    pub const ALLOW_IRI_PARSING: Self = Self(1 << 23);

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Combines two flag sets.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Removes the flags of `other`.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Checks whether all flags of `other` are set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Checks whether any flag of `other` is set.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for SyntaxFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl fmt::Debug for SyntaxFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SyntaxFlags({:#x})", self.0)
    }
}

type F = SyntaxFlags;

const HTTP_FLAGS: F = F::MUST_HAVE_AUTHORITY
    .or(F::MAY_HAVE_USER_INFO)
    .or(F::MAY_HAVE_PORT)
    .or(F::MAY_HAVE_PATH)
    .or(F::MAY_HAVE_QUERY)
    .or(F::MAY_HAVE_FRAGMENT)
    .or(F::ALLOW_UNC_HOST)
    .or(F::ALLOW_INTERNET_HOST)
    .or(F::PATH_IS_ROOTED)
    .or(F::CONVERT_PATH_SLASHES)
    .or(F::COMPRESS_PATH)
    .or(F::CANONICALIZE_AS_FILE_PATH)
    .or(F::ALLOW_IDN)
    .or(F::ALLOW_IRI_PARSING);

const FTP_FLAGS: F = HTTP_FLAGS.without(F::MAY_HAVE_QUERY);

const FILE_FLAGS: F = F::MUST_HAVE_AUTHORITY
    .or(F::ALLOW_EMPTY_HOST)
    .or(F::ALLOW_UNC_HOST)
    .or(F::ALLOW_INTERNET_HOST)
    .or(F::MAY_HAVE_PATH)
    .or(F::MAY_HAVE_FRAGMENT)
    .or(F::MAY_HAVE_QUERY)
    .or(F::FILE_LIKE)
    .or(F::ALLOW_DOS_PATH)
    .or(F::PATH_IS_ROOTED)
    .or(F::CONVERT_PATH_SLASHES)
    .or(F::COMPRESS_PATH)
    .or(F::CANONICALIZE_AS_FILE_PATH)
    .or(F::UNESCAPE_DOTS_AND_SLASHES)
    .or(F::ALLOW_IDN)
    .or(F::ALLOW_IRI_PARSING);

const UNIX_FILE_FLAGS: F = FILE_FLAGS.without(F::CONVERT_PATH_SLASHES);

const MAILTO_FLAGS: F = F::ALLOW_EMPTY_HOST
    .or(F::MAY_HAVE_USER_INFO)
    .or(F::MAY_HAVE_PORT)
    .or(F::MAY_HAVE_PATH)
    .or(F::MAY_HAVE_FRAGMENT)
    .or(F::MAY_HAVE_QUERY)
    .or(F::ALLOW_UNC_HOST)
    .or(F::ALLOW_INTERNET_HOST)
    .or(F::MAIL_TO_LIKE)
    .or(F::ALLOW_IDN)
    .or(F::ALLOW_IRI_PARSING);

const NEWS_FLAGS: F = F::MAY_HAVE_PATH
    .or(F::MAY_HAVE_FRAGMENT)
    .or(F::ALLOW_IRI_PARSING);

// gopher, nntp and telnet share this.
const GOPHER_FLAGS: F = F::MUST_HAVE_AUTHORITY
    .or(F::MAY_HAVE_USER_INFO)
    .or(F::MAY_HAVE_PORT)
    .or(F::MAY_HAVE_PATH)
    .or(F::MAY_HAVE_FRAGMENT)
    .or(F::ALLOW_UNC_HOST)
    .or(F::ALLOW_INTERNET_HOST)
    .or(F::PATH_IS_ROOTED)
    .or(F::ALLOW_IDN)
    .or(F::ALLOW_IRI_PARSING);

const LDAP_FLAGS: F = GOPHER_FLAGS
    .or(F::ALLOW_EMPTY_HOST)
    .or(F::MAY_HAVE_QUERY);

const NET_PIPE_FLAGS: F = F::MUST_HAVE_AUTHORITY
    .or(F::MAY_HAVE_PATH)
    .or(F::MAY_HAVE_QUERY)
    .or(F::MAY_HAVE_FRAGMENT)
    .or(F::ALLOW_INTERNET_HOST)
    .or(F::PATH_IS_ROOTED)
    .or(F::CONVERT_PATH_SLASHES)
    .or(F::COMPRESS_PATH)
    .or(F::CANONICALIZE_AS_FILE_PATH)
    .or(F::UNESCAPE_DOTS_AND_SLASHES)
    .or(F::ALLOW_IDN)
    .or(F::ALLOW_IRI_PARSING);

const NET_TCP_FLAGS: F = NET_PIPE_FLAGS.or(F::MAY_HAVE_PORT);

const UNKNOWN_FLAGS: F = F::V1_UNKNOWN
    .or(F::OPTIONAL_AUTHORITY)
    .or(F::MAY_HAVE_USER_INFO)
    .or(F::MAY_HAVE_PORT)
    .or(F::MAY_HAVE_PATH)
    .or(F::MAY_HAVE_QUERY)
    .or(F::MAY_HAVE_FRAGMENT)
    .or(F::ALLOW_EMPTY_HOST)
    .or(F::ALLOW_UNC_HOST)
    .or(F::ALLOW_INTERNET_HOST)
    .or(F::ALLOW_DOS_PATH)
    .or(F::CONVERT_PATH_SLASHES)
    .or(F::COMPRESS_PATH)
    .or(F::ALLOW_IDN)
    .or(F::ALLOW_IRI_PARSING);

/// A validated scheme name.
///
/// A scheme name starts with an ASCII letter, continues with letters,
/// digits, `+`, `-` or `.`, and is at most 1024 characters long.
///
/// # Examples
///
/// ```
/// use compat_uri::scheme::Scheme;
///
/// assert_eq!(Scheme::new("svn+ssh").unwrap().as_str(), "svn+ssh");
/// assert!(Scheme::new("1abc").is_none());
/// ```
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct Scheme {
    inner: str,
}

impl Scheme {
    #[ref_cast_custom]
    #[inline]
    const fn new_validated(scheme: &str) -> &Scheme;

    /// Converts a string slice to `&Scheme`, returning `None` if it is not
    /// a valid scheme name.
    #[must_use]
    pub fn new(s: &str) -> Option<&Scheme> {
        validate(s).ok().map(|()| Scheme::new_validated(s))
    }

    /// Returns the scheme name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }
}

impl fmt::Debug for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

fn validate(s: &str) -> Result<(), ParseErrorKind> {
    match s.as_bytes() {
        [first, rem @ ..]
            if first.is_ascii_alphabetic() && rem.iter().all(|&x| table::SCHEME.allows(x as char)) =>
        {
            if s.len() > MAX_SCHEME_LEN {
                Err(ParseErrorKind::SchemeLimit)
            } else {
                Ok(())
            }
        }
        _ => Err(ParseErrorKind::BadScheme),
    }
}

/// Raw components handed to a [`HostExtension`].
#[derive(Clone, Copy, Debug)]
pub struct RawComponents<'a> {
    /// The lowercase scheme name.
    pub scheme: &'a str,
    /// The userinfo as written, without the trailing `@`.
    pub user_info: &'a str,
    /// The host as written.
    pub host: &'a str,
    /// The port, if one is given and differs from the default.
    pub port: Option<u16>,
}

/// Host computation supplied by a custom scheme.
///
/// The hook receives a snapshot of the raw components and never the URI
/// itself. Its answer is validated like any other host; anything that is
/// not a valid host is kept as an opaque basic host.
///
/// The host is cached once per instance and the first value published wins.
/// If the hook reaches the same instance's host again, that inner call gets
/// a basic host built from the raw text, and it is this degraded host that
/// is cached for good. The outer hook's answer is then dropped.
pub trait HostExtension: Send + Sync {
    /// Returns the host to expose, or `None` to keep the parsed one.
    fn host(&self, components: &RawComponents<'_>) -> Option<String>;
}

/// The syntax of a scheme: its name, default port and capabilities.
#[derive(Clone)]
pub struct SchemeSyntax {
    name: Cow<'static, str>,
    default_port: Option<u16>,
    flags: SyntaxFlags,
    extension: Option<Arc<dyn HostExtension>>,
}

impl SchemeSyntax {
    const fn builtin(name: &'static str, default_port: Option<u16>, flags: SyntaxFlags) -> Self {
        Self {
            name: Cow::Borrowed(name),
            default_port,
            flags,
            extension: None,
        }
    }

    /// Creates a syntax to be passed to [`register`].
    ///
    /// The name is filled in at registration.
    #[must_use]
    pub const fn new(default_port: Option<u16>, flags: SyntaxFlags) -> Self {
        Self::builtin("", default_port, flags)
    }

    /// Attaches a host extension to the syntax.
    #[must_use]
    pub fn with_extension(mut self, extension: Arc<dyn HostExtension>) -> Self {
        self.extension = Some(extension);
        self
    }

    /// Returns the lowercase scheme name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the default port of the scheme.
    #[must_use]
    pub fn default_port(&self) -> Option<u16> {
        self.default_port
    }

    /// Returns the capability flags.
    #[must_use]
    pub fn flags(&self) -> SyntaxFlags {
        self.flags
    }

    #[inline]
    pub(crate) fn has(&self, flags: SyntaxFlags) -> bool {
        self.flags.contains(flags)
    }

    pub(crate) fn extension(&self) -> Option<&dyn HostExtension> {
        self.extension.as_deref()
    }

    pub(crate) fn is_file(&self) -> bool {
        self.name == "file"
    }

    pub(crate) fn is_v1_unknown(&self) -> bool {
        self.has(F::V1_UNKNOWN)
    }

    pub(crate) fn allows_iri(&self) -> bool {
        self.has(F::ALLOW_IRI_PARSING)
    }
}

impl fmt::Debug for SchemeSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeSyntax")
            .field("name", &self.name)
            .field("default_port", &self.default_port)
            .field("flags", &self.flags)
            .field("extension", &self.extension.is_some())
            .finish()
    }
}

pub(crate) static HTTP: SchemeSyntax = SchemeSyntax::builtin("http", Some(80), HTTP_FLAGS);
pub(crate) static HTTPS: SchemeSyntax = SchemeSyntax::builtin("https", Some(443), HTTP_FLAGS);
pub(crate) static WS: SchemeSyntax = SchemeSyntax::builtin("ws", Some(80), HTTP_FLAGS);
pub(crate) static WSS: SchemeSyntax = SchemeSyntax::builtin("wss", Some(443), HTTP_FLAGS);
pub(crate) static FTP: SchemeSyntax = SchemeSyntax::builtin("ftp", Some(21), FTP_FLAGS);
pub(crate) static FILE: SchemeSyntax = SchemeSyntax::builtin("file", None, FILE_FLAGS);
pub(crate) static UNIX_FILE: SchemeSyntax = SchemeSyntax::builtin("file", None, UNIX_FILE_FLAGS);
pub(crate) static MAILTO: SchemeSyntax = SchemeSyntax::builtin("mailto", Some(25), MAILTO_FLAGS);
pub(crate) static NEWS: SchemeSyntax = SchemeSyntax::builtin("news", None, NEWS_FLAGS);
pub(crate) static NNTP: SchemeSyntax = SchemeSyntax::builtin("nntp", Some(119), GOPHER_FLAGS);
pub(crate) static GOPHER: SchemeSyntax = SchemeSyntax::builtin("gopher", Some(70), GOPHER_FLAGS);
pub(crate) static TELNET: SchemeSyntax = SchemeSyntax::builtin("telnet", Some(23), GOPHER_FLAGS);
pub(crate) static LDAP: SchemeSyntax = SchemeSyntax::builtin("ldap", Some(389), LDAP_FLAGS);
pub(crate) static UUID: SchemeSyntax = SchemeSyntax::builtin("uuid", None, NEWS_FLAGS);
pub(crate) static NET_TCP: SchemeSyntax = SchemeSyntax::builtin("net.tcp", Some(808), NET_TCP_FLAGS);
pub(crate) static NET_PIPE: SchemeSyntax = SchemeSyntax::builtin("net.pipe", None, NET_PIPE_FLAGS);

/// A handle to a syntax: either built in or held by the registry.
#[derive(Clone)]
pub(crate) enum Syntax {
    BuiltIn(&'static SchemeSyntax),
    Shared(Arc<SchemeSyntax>),
}

impl Deref for Syntax {
    type Target = SchemeSyntax;

    fn deref(&self) -> &SchemeSyntax {
        match self {
            Syntax::BuiltIn(s) => s,
            Syntax::Shared(s) => s,
        }
    }
}

impl fmt::Debug for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

type SyntaxMap = RwLock<HashMap<String, Arc<SchemeSyntax>>>;

static REGISTERED: Lazy<SyntaxMap> = Lazy::new(Default::default);
static UNKNOWN: Lazy<SyntaxMap> = Lazy::new(Default::default);

fn builtin(s: &str) -> Option<&'static SchemeSyntax> {
    let syntax = match s.len() {
        2 if s.eq_ignore_ascii_case("ws") => &WS,
        3 if s.eq_ignore_ascii_case("wss") => &WSS,
        3 if s.eq_ignore_ascii_case("ftp") => &FTP,
        4 if s.eq_ignore_ascii_case("http") => &HTTP,
        4 if s.eq_ignore_ascii_case("file") => &FILE,
        4 if s.eq_ignore_ascii_case("uuid") => &UUID,
        4 if s.eq_ignore_ascii_case("nntp") => &NNTP,
        4 if s.eq_ignore_ascii_case("ldap") => &LDAP,
        4 if s.eq_ignore_ascii_case("news") => &NEWS,
        5 if s.eq_ignore_ascii_case("https") => &HTTPS,
        6 if s.eq_ignore_ascii_case("mailto") => &MAILTO,
        6 if s.eq_ignore_ascii_case("gopher") => &GOPHER,
        6 if s.eq_ignore_ascii_case("telnet") => &TELNET,
        7 if s.eq_ignore_ascii_case("net.tcp") => &NET_TCP,
        8 if s.eq_ignore_ascii_case("net.pipe") => &NET_PIPE,
        _ => return None,
    };
    Some(syntax)
}

/// Resolves a candidate scheme name to its syntax.
///
/// Well-known schemes are matched without allocating. Any other valid name
/// is lowercased and looked up among registered syntaxes, then in the cache
/// of unknown schemes, which is populated with the generic syntax on a miss.
pub(crate) fn resolve(candidate: &str) -> Result<Syntax, ParseErrorKind> {
    if let Some(syntax) = builtin(candidate) {
        return Ok(Syntax::BuiltIn(syntax));
    }
    validate(candidate)?;

    let name = candidate.to_ascii_lowercase();
    if let Some(syntax) = read(&REGISTERED).get(&name) {
        return Ok(Syntax::Shared(syntax.clone()));
    }
    if let Some(syntax) = read(&UNKNOWN).get(&name) {
        return Ok(Syntax::Shared(syntax.clone()));
    }

    let syntax = Arc::new(SchemeSyntax {
        name: Cow::Owned(name.clone()),
        default_port: None,
        flags: UNKNOWN_FLAGS,
        extension: None,
    });

    let mut cache = write(&UNKNOWN);
    if cache.len() >= MAX_UNKNOWN_CACHED {
        log::debug!("unknown scheme cache full, clearing {} entries", cache.len());
        cache.clear();
    }
    log::debug!("caching generic syntax for unknown scheme {name:?}");
    // Two threads may race here; the descriptors are equal so the last write wins.
    cache.insert(name, syntax.clone());
    Ok(Syntax::Shared(syntax))
}

fn read(map: &SyntaxMap) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<SchemeSyntax>>> {
    map.read().unwrap_or_else(|e| e.into_inner())
}

fn write(map: &SyntaxMap) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<SchemeSyntax>>> {
    map.write().unwrap_or_else(|e| e.into_inner())
}

/// An error returned by [`register`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegisterError {
    /// The name is not a valid scheme name.
    InvalidName,
    /// The name is a built-in scheme or has been registered before.
    AlreadyRegistered,
}

#[cfg(feature = "impl-error")]
impl std::error::Error for RegisterError {}

/// Registers a custom scheme syntax under `name`.
///
/// Registered syntaxes live for the rest of the process. Any URI parsed
/// afterwards with this scheme uses the given capabilities.
///
/// # Examples
///
/// ```
/// use compat_uri::{scheme::{self, SchemeSyntax, SyntaxFlags}, Uri};
///
/// let flags = SyntaxFlags::MUST_HAVE_AUTHORITY
///     | SyntaxFlags::MAY_HAVE_PORT
///     | SyntaxFlags::MAY_HAVE_PATH
///     | SyntaxFlags::ALLOW_DNS_HOST
///     | SyntaxFlags::PATH_IS_ROOTED;
/// scheme::register("doc-example", SchemeSyntax::new(Some(7000), flags)).unwrap();
///
/// let uri = Uri::parse("doc-example://host/a").unwrap();
/// assert_eq!(uri.port().unwrap(), Some(7000));
/// ```
pub fn register(name: &str, mut syntax: SchemeSyntax) -> Result<(), RegisterError> {
    validate(name).map_err(|_| RegisterError::InvalidName)?;
    if builtin(name).is_some() {
        return Err(RegisterError::AlreadyRegistered);
    }

    let name = name.to_ascii_lowercase();
    let mut map = write(&REGISTERED);
    if map.contains_key(&name) {
        return Err(RegisterError::AlreadyRegistered);
    }
    syntax.name = Cow::Owned(name.clone());
    log::debug!("registering syntax for scheme {name:?}");
    map.insert(name.clone(), Arc::new(syntax));
    drop(map);

    write(&UNKNOWN).remove(&name);
    Ok(())
}

/// Checks whether a scheme name has been registered or is built in.
#[must_use]
pub fn is_known(name: &str) -> bool {
    builtin(name).is_some() || read(&REGISTERED).contains_key(&name.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_ignore_case() {
        let syntax = resolve("HtTpS").unwrap();
        assert_eq!(syntax.name(), "https");
        assert_eq!(syntax.default_port(), Some(443));
        assert!(syntax.has(F::CANONICALIZE_AS_FILE_PATH));
        assert!(!syntax.has(F::UNESCAPE_DOTS_AND_SLASHES));

        assert!(resolve("FILE").unwrap().has(F::ALLOW_DOS_PATH));
        assert!(!UNIX_FILE.has(F::CONVERT_PATH_SLASHES));
    }

    #[test]
    fn unknown_schemes_are_cached() {
        let a = resolve("X-Test-Cached").unwrap();
        assert_eq!(a.name(), "x-test-cached");
        assert!(a.is_v1_unknown());
        let b = resolve("x-test-cached").unwrap();
        match (a, b) {
            (Syntax::Shared(a), Syntax::Shared(b)) => assert!(Arc::ptr_eq(&a, &b)),
            _ => panic!("expected cached syntaxes"),
        }
    }

    #[test]
    fn invalid_names() {
        assert_eq!(resolve("1http").unwrap_err(), ParseErrorKind::BadScheme);
        assert_eq!(resolve("ht_tp").unwrap_err(), ParseErrorKind::BadScheme);
        assert_eq!(resolve("").unwrap_err(), ParseErrorKind::BadScheme);
        let long = "a".repeat(MAX_SCHEME_LEN + 1);
        assert_eq!(resolve(&long).unwrap_err(), ParseErrorKind::SchemeLimit);
    }

    #[test]
    fn registration() {
        let syntax = SchemeSyntax::new(Some(1234), F::MUST_HAVE_AUTHORITY | F::ALLOW_DNS_HOST);
        assert_eq!(register("x-unit-reg", syntax.clone()), Ok(()));
        assert_eq!(
            register("X-Unit-Reg", syntax.clone()),
            Err(RegisterError::AlreadyRegistered)
        );
        assert_eq!(register("http", syntax.clone()), Err(RegisterError::AlreadyRegistered));
        assert_eq!(register("9p", syntax), Err(RegisterError::InvalidName));
        assert!(is_known("x-unit-reg"));
        assert_eq!(resolve("x-unit-reg").unwrap().default_port(), Some(1234));
    }
}
