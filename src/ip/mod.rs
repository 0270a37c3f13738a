//! IPv4 address arithmetic and `/28` prefix availability.
//!
//! `cidr` holds the pure address helpers; `analyzer` turns a subnet and its
//! attached interfaces into a [`SubnetOccupancy`] record.

pub mod analyzer;
pub mod cidr;

pub use analyzer::{analyze_subnet, SubnetOccupancy, RESERVED_PER_SUBNET};
pub use cidr::{
    calculate_max_ips, enumerate_candidate_prefixes, parse_address, parse_cidr, total_addresses,
    CandidatePrefixes, Cidr4, ADDRESSES_PER_PREFIX, PREFIX_LEN,
};

/// Malformed subnet or interface data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyzerError {
    #[error("Invalid CIDR block: {input:?}")]
    InvalidCidr { input: String },

    #[error("Invalid IPv4 address: {input:?}")]
    InvalidAddress { input: String },

    #[error("Delegated prefix {prefix} does not lie within subnet {subnet}")]
    PrefixOutsideSubnet { prefix: Cidr4, subnet: Cidr4 },

    #[error("Delegated prefix {prefix} is not a /28")]
    UnsupportedPrefixLength { prefix: Cidr4 },
}
