//! Error types.

/// Detailed cause of a [`ParseError`].
///
/// The declaration order matters: every kind up to and including
/// [`EmptyUriString`] still allows the input to be taken as a relative
/// reference when the caller accepts one.
///
/// [`EmptyUriString`]: ParseErrorKind::EmptyUriString
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParseErrorKind {
    /// The input has no recognizable scheme and is not a file path.
    BadFormat,
    /// The scheme contains a character outside `[A-Za-z0-9+-.]`
    /// or does not start with a letter.
    BadScheme,
    /// The scheme requires an authority but no `//` follows it.
    BadAuthority,
    /// The input is empty or consists of whitespace only.
    EmptyUriString,
    /// The scheme is longer than 1024 characters.
    SchemeLimit,
    /// The input is longer than 65519 bytes.
    SizeLimit,
    /// A drive letter is not followed by a path separator.
    MustRootedPath,
    /// The host is missing or malformed.
    BadHostName,
    /// The port is not a number in `0..=65535`.
    BadPort,
    /// The authority is terminated by a backslash in a scheme
    /// that does not take DOS paths.
    BadAuthorityTerminator,
    /// A relative URI was requested but the input is absolute.
    CannotCreateRelative,
}

impl ParseErrorKind {
    pub(crate) fn allows_relative(self) -> bool {
        self <= ParseErrorKind::EmptyUriString
    }
}

/// An error occurred when parsing a URI: the input string is malformed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParseError {
    pub(crate) kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(kind: ParseErrorKind) -> Self {
        Self { kind }
    }

    /// Returns the detailed cause of the error.
    #[must_use]
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }
}

impl From<ParseErrorKind> for ParseError {
    fn from(kind: ParseErrorKind) -> Self {
        Self::new(kind)
    }
}

/// An operation that requires an absolute URI was called on a relative one.
///
/// This is a usage error rather than a malformed input, so it is kept apart
/// from [`ParseError`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NotAbsoluteError(pub(crate) ());

#[cfg(feature = "impl-error")]
impl std::error::Error for ParseError {}

#[cfg(feature = "impl-error")]
impl std::error::Error for NotAbsoluteError {}
