//! IPv4 CIDR arithmetic.
//!
//! This file contains the address helpers the prefix analyzer is built on:
//! parsing `A.B.C.D/M` strings, counting the addresses a mask covers and
//! walking the `/28` sub-blocks of a subnet in ascending order.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use super::AnalyzerError;

/// Prefix length of a delegated prefix
pub const PREFIX_LEN: u8 = 28;

/// Number of addresses in one delegated `/28` prefix
pub const ADDRESSES_PER_PREFIX: u64 = 16;

/// An IPv4 network: base address plus prefix length.
///
/// The host bits of `base` are always zero; every constructor masks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cidr4 {
    base: u32,
    prefix_len: u8,
}

impl Cidr4 {
    /// Build a network from an address and prefix length, clearing host bits.
    pub fn new(addr: Ipv4Addr, prefix_len: u8) -> Result<Self, AnalyzerError> {
        if prefix_len > 32 {
            return Err(AnalyzerError::InvalidCidr {
                input: format!("{}/{}", addr, prefix_len),
            });
        }
        Ok(Self {
            base: u32::from(addr) & netmask(prefix_len),
            prefix_len,
        })
    }

    pub fn base(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.base)
    }

    pub fn network_u32(&self) -> u32 {
        self.base
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Number of addresses covered, network and broadcast included
    pub fn total_addresses(&self) -> u64 {
        total_addresses(self.prefix_len)
    }

    /// Last address of the network, as a number
    pub fn last_u32(&self) -> u32 {
        self.base | !netmask(self.prefix_len)
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & netmask(self.prefix_len) == self.base
    }

    /// True when `other` lies entirely inside this network
    pub fn contains_cidr(&self, other: &Cidr4) -> bool {
        other.prefix_len >= self.prefix_len && self.contains(other.base())
    }
}

impl fmt::Display for Cidr4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base(), self.prefix_len)
    }
}

impl FromStr for Cidr4 {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cidr(s)
    }
}

/// Network mask with the top `prefix_len` bits set
fn netmask(prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        len => u32::MAX << (32 - u32::from(len.min(32))),
    }
}

/// Parse an `A.B.C.D/M` string into a [`Cidr4`].
///
/// Every octet must be a decimal number in `[0, 255]` and the mask a decimal
/// number in `[0, 32]`. Host bits set in the address are cleared, so
/// `10.0.0.7/24` parses as `10.0.0.0/24`.
///
/// # Examples
/// ```
/// use aws_subnet_exporter::ip::parse_cidr;
///
/// let cidr = parse_cidr("172.16.1.0/24").unwrap();
/// assert_eq!(cidr.prefix_len(), 24);
/// assert_eq!(cidr.to_string(), "172.16.1.0/24");
/// assert!(parse_cidr("172.16.0.0").is_err());
/// ```
pub fn parse_cidr(input: &str) -> Result<Cidr4, AnalyzerError> {
    let invalid = || AnalyzerError::InvalidCidr {
        input: input.to_string(),
    };

    let (addr, mask) = input.split_once('/').ok_or_else(invalid)?;

    // u8::from_str accepts a leading '+', which is not valid CIDR notation
    if mask.is_empty() || !mask.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let prefix_len: u8 = mask.parse().map_err(|_| invalid())?;
    if prefix_len > 32 {
        return Err(invalid());
    }

    let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
    Cidr4::new(addr, prefix_len)
}

/// Parse a bare IPv4 address as reported for an interface.
pub fn parse_address(input: &str) -> Result<Ipv4Addr, AnalyzerError> {
    input.parse().map_err(|_| AnalyzerError::InvalidAddress {
        input: input.to_string(),
    })
}

/// Number of addresses covered by a mask: `2^(32 - prefix_len)`.
///
/// This is the raw count; the platform's reserved addresses are accounted for
/// separately by the analyzer.
pub fn total_addresses(prefix_len: u8) -> u64 {
    1u64 << (32 - u32::from(prefix_len.min(32)))
}

/// Usable host count of a CIDR block, excluding network and broadcast.
///
/// Mirrors the classic host-count formula without special-casing small
/// networks, so `/31` yields 0 and `/32` yields -1.
///
/// # Examples
/// ```
/// use aws_subnet_exporter::ip::calculate_max_ips;
///
/// assert_eq!(calculate_max_ips("172.16.0.0/24").unwrap(), 254);
/// assert_eq!(calculate_max_ips("192.168.1.1/32").unwrap(), -1);
/// ```
pub fn calculate_max_ips(cidr: &str) -> Result<i64, AnalyzerError> {
    let cidr = parse_cidr(cidr)?;
    Ok(cidr.total_addresses() as i64 - 2)
}

/// Lazy, ascending walk over the `/28` sub-blocks of a subnet.
#[derive(Debug, Clone)]
pub struct CandidatePrefixes {
    next: u64,
    end: u64,
}

impl Iterator for CandidatePrefixes {
    type Item = Cidr4;

    fn next(&mut self) -> Option<Cidr4> {
        if self.next >= self.end {
            return None;
        }
        // next < end <= 2^32, so the cast is lossless
        let base = self.next as u32;
        self.next += ADDRESSES_PER_PREFIX;
        Some(Cidr4 {
            base,
            prefix_len: PREFIX_LEN,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end.saturating_sub(self.next) / ADDRESSES_PER_PREFIX) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CandidatePrefixes {}

/// Enumerate every `/28` sub-block of `subnet`, starting at its base address.
///
/// Arithmetic runs over the full 32-bit address space, so the walk carries
/// across octet boundaries (`10.0.0.240/28` is followed by `10.0.1.0/28`).
/// A subnet narrower than `/28` has no candidates.
pub fn enumerate_candidate_prefixes(subnet: &Cidr4) -> CandidatePrefixes {
    if subnet.prefix_len > PREFIX_LEN {
        return CandidatePrefixes { next: 0, end: 0 };
    }
    let start = u64::from(subnet.base);
    CandidatePrefixes {
        next: start,
        end: start + subnet.total_addresses(),
    }
}
