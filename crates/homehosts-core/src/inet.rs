//! Address codec.
//!
//! Converts between the textual address column of a hosts file and the binary
//! network-order payloads stored in `h_addr_list`. Only the two families a hosts
//! file can carry are representable.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Linux `AF_INET`.
pub const AF_INET: i32 = 2;
/// Linux `AF_INET6`.
pub const AF_INET6: i32 = 10;

/// Width of an IPv4 payload (`sizeof(struct in_addr)`).
pub const INADDRSZ: usize = 4;
/// Width of an IPv6 payload (`sizeof(struct in6_addr)`).
pub const IN6ADDRSZ: usize = 16;

/// Address family of a query or record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Inet,
    Inet6,
}

impl AddressFamily {
    /// Map a C `AF_*` constant. Anything other than `AF_INET`/`AF_INET6` is `None`.
    #[must_use]
    pub const fn from_raw(af: i32) -> Option<Self> {
        match af {
            AF_INET => Some(Self::Inet),
            AF_INET6 => Some(Self::Inet6),
            _ => None,
        }
    }

    /// The C `AF_*` constant for this family (`h_addrtype`).
    #[must_use]
    pub const fn raw(self) -> i32 {
        match self {
            Self::Inet => AF_INET,
            Self::Inet6 => AF_INET6,
        }
    }

    /// Payload width in bytes (`h_length`).
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Inet => INADDRSZ,
            Self::Inet6 => IN6ADDRSZ,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Inet => "inet",
            Self::Inet6 => "inet6",
        }
    }
}

/// A binary address tagged with its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostAddr {
    V4([u8; INADDRSZ]),
    V6([u8; IN6ADDRSZ]),
}

impl HostAddr {
    #[must_use]
    pub const fn family(&self) -> AddressFamily {
        match self {
            Self::V4(_) => AddressFamily::Inet,
            Self::V6(_) => AddressFamily::Inet6,
        }
    }

    /// Network-order payload bytes.
    #[must_use]
    pub fn octets(&self) -> &[u8] {
        match self {
            Self::V4(b) => b,
            Self::V6(b) => b,
        }
    }

    /// Build from a family and a raw payload, as received from `gethostbyaddr_r`.
    ///
    /// Returns `None` when the payload width does not match the family.
    #[must_use]
    pub fn from_raw_parts(family: AddressFamily, bytes: &[u8]) -> Option<Self> {
        match family {
            AddressFamily::Inet => bytes.try_into().ok().map(Self::V4),
            AddressFamily::Inet6 => bytes.try_into().ok().map(Self::V6),
        }
    }
}

impl fmt::Display for HostAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V4(b) => Ipv4Addr::from(*b).fmt(f),
            Self::V6(b) => Ipv6Addr::from(*b).fmt(f),
        }
    }
}

/// Parse an address token, trying IPv4 first and then IPv6.
///
/// Same contract as two chained `inet_pton` calls: dotted quads with exactly four
/// decimal octets (no leading zeros), IPv6 with `::` compression and an optional
/// embedded IPv4 tail. Returns `None` for anything else.
pub fn parse_addr(src: &[u8]) -> Option<HostAddr> {
    let s = core::str::from_utf8(src).ok()?;
    if let Ok(v4) = s.parse::<Ipv4Addr>() {
        return Some(HostAddr::V4(v4.octets()));
    }
    s.parse::<Ipv6Addr>().ok().map(|v6| HostAddr::V6(v6.octets()))
}

/// Parse an address token only if it belongs to `family`.
#[inline]
pub fn parse_addr_in(src: &[u8], family: AddressFamily) -> Option<HostAddr> {
    parse_addr(src).filter(|a| a.family() == family)
}

/// Canonical text form of a binary payload (`inet_ntop`).
#[must_use]
pub fn format_addr(family: AddressFamily, src: &[u8]) -> Option<String> {
    HostAddr::from_raw_parts(family, src).map(|a| a.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_constants_match_linux() {
        assert_eq!(AddressFamily::Inet.raw(), 2);
        assert_eq!(AddressFamily::Inet6.raw(), 10);
        assert_eq!(AddressFamily::from_raw(2), Some(AddressFamily::Inet));
        assert_eq!(AddressFamily::from_raw(10), Some(AddressFamily::Inet6));
        assert_eq!(AddressFamily::from_raw(0), None);
        assert_eq!(AddressFamily::from_raw(1), None);
    }

    #[test]
    fn widths() {
        assert_eq!(AddressFamily::Inet.width(), 4);
        assert_eq!(AddressFamily::Inet6.width(), 16);
    }

    #[test]
    fn parse_ipv4_dotted_quad() {
        assert_eq!(
            parse_addr(b"192.168.1.10"),
            Some(HostAddr::V4([192, 168, 1, 10]))
        );
    }

    #[test]
    fn parse_ipv6_loopback() {
        let mut expected = [0u8; 16];
        expected[15] = 1;
        assert_eq!(parse_addr(b"::1"), Some(HostAddr::V6(expected)));
    }

    #[test]
    fn parse_ipv6_mapped_ipv4() {
        let addr = parse_addr(b"::ffff:10.0.0.1").unwrap();
        assert_eq!(addr.family(), AddressFamily::Inet6);
        assert_eq!(&addr.octets()[12..], &[10, 0, 0, 1]);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_addr(b"").is_none());
        assert!(parse_addr(b"localhost").is_none());
        assert!(parse_addr(b"1.2.3").is_none());
        assert!(parse_addr(b"1.2.3.256").is_none());
        assert!(parse_addr(b"1.2.3.4.5").is_none());
        assert!(parse_addr(b"01.2.3.4").is_none());
        assert!(parse_addr(b"1::2::3").is_none());
        assert!(parse_addr(&[0xff, 0xfe]).is_none());
    }

    #[test]
    fn parse_in_family_filters() {
        assert!(parse_addr_in(b"10.0.0.1", AddressFamily::Inet).is_some());
        assert!(parse_addr_in(b"10.0.0.1", AddressFamily::Inet6).is_none());
        assert!(parse_addr_in(b"fe80::1", AddressFamily::Inet6).is_some());
        assert!(parse_addr_in(b"fe80::1", AddressFamily::Inet).is_none());
    }

    #[test]
    fn from_raw_parts_checks_width() {
        assert_eq!(
            HostAddr::from_raw_parts(AddressFamily::Inet, &[127, 0, 0, 1]),
            Some(HostAddr::V4([127, 0, 0, 1]))
        );
        assert!(HostAddr::from_raw_parts(AddressFamily::Inet, &[0; 16]).is_none());
        assert!(HostAddr::from_raw_parts(AddressFamily::Inet6, &[0; 4]).is_none());
    }

    #[test]
    fn format_canonical_text() {
        assert_eq!(
            format_addr(AddressFamily::Inet, &[10, 1, 2, 3]).as_deref(),
            Some("10.1.2.3")
        );
        let mut v6 = [0u8; 16];
        v6[0] = 0xfe;
        v6[1] = 0x80;
        v6[15] = 1;
        assert_eq!(
            format_addr(AddressFamily::Inet6, &v6).as_deref(),
            Some("fe80::1")
        );
        assert!(format_addr(AddressFamily::Inet6, &[1, 2, 3, 4]).is_none());
    }
}
