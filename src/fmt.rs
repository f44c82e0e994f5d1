use crate::{
    error::{NotAbsoluteError, ParseError, ParseErrorKind},
    resolve::CombineError,
    scheme::RegisterError,
    Uri,
};
use core::fmt;

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind {
            ParseErrorKind::BadFormat => "the format of the URI could not be determined",
            ParseErrorKind::BadScheme => "the URI scheme is not valid",
            ParseErrorKind::BadAuthority => "the authority is missing or malformed",
            ParseErrorKind::EmptyUriString => "the URI is empty",
            ParseErrorKind::SchemeLimit => "the URI scheme is longer than 1024 characters",
            ParseErrorKind::SizeLimit => "the URI is longer than 65519 bytes",
            ParseErrorKind::MustRootedPath => "a drive letter must be followed by a path separator",
            ParseErrorKind::BadHostName => "the hostname could not be parsed",
            ParseErrorKind::BadPort => "the port is not valid",
            ParseErrorKind::BadAuthorityTerminator => "the authority is terminated by an invalid character",
            ParseErrorKind::CannotCreateRelative => "a relative URI cannot be created from an absolute one",
        };
        f.write_str(msg)
    }
}

impl fmt::Display for NotAbsoluteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("this operation is not supported for a relative URI")
    }
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RegisterError::InvalidName => "the scheme name is not valid",
            RegisterError::AlreadyRegistered => "the scheme has already been registered",
        };
        f.write_str(msg)
    }
}

impl fmt::Display for CombineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombineError::BaseNotAbsolute => f.write_str("the base URI is not absolute"),
            CombineError::Parse(e) => write!(f, "failed to combine: {e}"),
        }
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_absolute_uri() {
            return f
                .debug_struct("Uri")
                .field("relative", &self.original_string())
                .finish();
        }
        f.debug_struct("Uri")
            .field("scheme", &self.scheme().unwrap_or_default())
            .field("host", &self.host().unwrap_or_default())
            .field("port", &self.port().ok().flatten())
            .field("path", &self.absolute_path().unwrap_or_default())
            .field("query", &self.query().unwrap_or_default())
            .field("fragment", &self.fragment().unwrap_or_default())
            .finish()
    }
}

/// Formats the URI for display: unreserved and non-ASCII characters are
/// unescaped where that keeps the meaning, and bidi controls are removed.
impl fmt::Display for Uri {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_str())
    }
}
