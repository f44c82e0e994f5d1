use core::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// Per-URI parse flags.
///
/// The low seven bits line up with [`Components`] so that the
/// "not canonical" bits of a request can be checked with one mask;
/// the escaped counterparts sit six bits higher.
///
/// [`Components`]: crate::Components
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Flags(u32);

impl Flags {
    pub(crate) const EMPTY: Flags = Flags(0);

    // Display form differs from the raw slice.
    pub(crate) const SCHEME_NOT_CANONICAL: Flags = Flags(1 << 0);
    pub(crate) const USER_NOT_CANONICAL: Flags = Flags(1 << 1);
    pub(crate) const HOST_NOT_CANONICAL: Flags = Flags(1 << 2);
    pub(crate) const PORT_NOT_CANONICAL: Flags = Flags(1 << 3);
    pub(crate) const PATH_NOT_CANONICAL: Flags = Flags(1 << 4);
    pub(crate) const QUERY_NOT_CANONICAL: Flags = Flags(1 << 5);
    pub(crate) const FRAGMENT_NOT_CANONICAL: Flags = Flags(1 << 6);
    pub(crate) const CANONICAL_MASK: u32 = 0x7f;

    // Escaped form differs from the raw slice.
    pub(crate) const E_USER_NOT_CANONICAL: Flags = Flags(1 << 7);
    pub(crate) const E_HOST_NOT_CANONICAL: Flags = Flags(1 << 8);
    pub(crate) const E_PORT_NOT_CANONICAL: Flags = Flags(1 << 9);
    pub(crate) const E_PATH_NOT_CANONICAL: Flags = Flags(1 << 10);
    pub(crate) const E_QUERY_NOT_CANONICAL: Flags = Flags(1 << 11);
    pub(crate) const E_FRAGMENT_NOT_CANONICAL: Flags = Flags(1 << 12);
    pub(crate) const E_CANONICAL_MASK: u32 = 0x1f80;

    pub(crate) const SHOULD_BE_COMPRESSED: Flags = Flags(1 << 13);
    pub(crate) const FIRST_SLASH_ABSENT: Flags = Flags(1 << 14);
    pub(crate) const BACKSLASH_IN_PATH: Flags = Flags(1 << 15);

    pub(crate) const USER_ESCAPED: Flags = Flags(1 << 16);
    pub(crate) const AUTHORITY_FOUND: Flags = Flags(1 << 17);
    pub(crate) const HAS_USER_INFO: Flags = Flags(1 << 18);
    pub(crate) const LOOPBACK_HOST: Flags = Flags(1 << 19);
    pub(crate) const NOT_DEFAULT_PORT: Flags = Flags(1 << 20);
    pub(crate) const CANONICAL_DNS_HOST: Flags = Flags(1 << 21);

    pub(crate) const DOS_PATH: Flags = Flags(1 << 22);
    pub(crate) const UNC_PATH: Flags = Flags(1 << 23);
    pub(crate) const UNIX_PATH: Flags = Flags(1 << 24);
    pub(crate) const IMPLICIT_FILE: Flags = Flags(1 << 25);
    pub(crate) const IDN_HOST: Flags = Flags(1 << 26);
    pub(crate) const HAS_UNICODE: Flags = Flags(1 << 27);

    #[inline]
    pub(crate) const fn bits(self) -> u32 {
        self.0
    }

    /// Checks whether any of the bits in `other` is set.
    #[inline]
    pub(crate) const fn any(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    /// Checks whether all of the bits in `other` are set.
    #[inline]
    pub(crate) const fn all(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub(crate) fn remove(&mut self, other: Flags) {
        self.0 &= !other.0;
    }

    /// Display non-canonical bits, aligned with `Components`.
    #[inline]
    pub(crate) const fn display_non_canonical(self) -> u32 {
        self.0 & Self::CANONICAL_MASK
    }

    /// Escaped non-canonical bits, aligned with `Components`.
    #[inline]
    pub(crate) const fn escaped_non_canonical(self) -> u32 {
        (self.0 & Self::E_CANONICAL_MASK) >> 6
    }

    /// Whether the path compares without regard to case.
    #[inline]
    pub(crate) const fn is_unc_or_dos_path(self) -> bool {
        self.any(Flags(Self::DOS_PATH.0 | Self::UNC_PATH.0))
    }
}

impl BitOr for Flags {
    type Output = Flags;

    #[inline]
    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Flags {
    type Output = Flags;

    #[inline]
    fn bitand(self, rhs: Flags) -> Flags {
        Flags(self.0 & rhs.0)
    }
}

impl Not for Flags {
    type Output = Flags;

    #[inline]
    fn not(self) -> Flags {
        Flags(!self.0)
    }
}

/// The kind of host found while scanning the authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum HostType {
    Ipv6,
    Ipv4,
    Dns,
    Unc,
    Basic,
    Unknown,
}
