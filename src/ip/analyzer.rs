//! Prefix availability analysis.
//!
//! Given a subnet CIDR and the network interfaces attached to it, this file
//! works out which `/28` prefixes are already delegated, which are still
//! free to delegate (no delegated prefix and no individually-assigned
//! address inside them), and the address occupancy counts derived from that.

use std::collections::{BTreeSet, HashSet};

use crate::inventory::NetworkInterface;

use super::cidr::{
    enumerate_candidate_prefixes, parse_cidr, Cidr4, ADDRESSES_PER_PREFIX, PREFIX_LEN,
};
use super::AnalyzerError;

/// Addresses AWS reserves in every subnet: network, VPC router, DNS,
/// future use and broadcast.
pub const RESERVED_PER_SUBNET: u64 = 5;

/// Occupancy of a single subnet, computed fresh on every poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetOccupancy {
    pub total_addresses: u64,
    pub max_prefixes: u64,
    pub delegated_prefixes: BTreeSet<Cidr4>,
    /// Free `/28` prefixes in ascending base-address order
    pub available_prefixes: Vec<Cidr4>,
    pub interfaces_in_use: usize,
    pub allocated_addresses: u64,
    /// Negative only when the inventory over-reports usage
    pub free_addresses: i64,
}

impl SubnetOccupancy {
    pub fn used_prefixes(&self) -> usize {
        self.delegated_prefixes.len()
    }

    pub fn available_prefix_count(&self) -> usize {
        self.available_prefixes.len()
    }
}

/// Compute the occupancy of `cidr_block` from its attached interfaces.
///
/// Fails with [`AnalyzerError::InvalidCidr`] when the subnet CIDR does not
/// parse, and with [`AnalyzerError::PrefixOutsideSubnet`] or
/// [`AnalyzerError::UnsupportedPrefixLength`] when a delegated prefix is not
/// a `/28` inside the subnet. An empty interface list is valid: every
/// candidate prefix is then available.
///
/// # Examples
/// ```
/// use aws_subnet_exporter::ip::analyze_subnet;
///
/// let occupancy = analyze_subnet("172.16.0.0/24", &[]).unwrap();
/// assert_eq!(occupancy.max_prefixes, 16);
/// assert_eq!(occupancy.available_prefixes.len(), 16);
/// ```
pub fn analyze_subnet(
    cidr_block: &str,
    interfaces: &[NetworkInterface],
) -> Result<SubnetOccupancy, AnalyzerError> {
    let subnet = parse_cidr(cidr_block)?;
    let total_addresses = subnet.total_addresses();
    let max_prefixes = total_addresses / ADDRESSES_PER_PREFIX;

    let mut ips_in_use = HashSet::new();
    let mut prefixes_in_use = BTreeSet::new();
    for iface in interfaces {
        ips_in_use.extend(iface.private_ips.iter().copied());
        for prefix in &iface.delegated_prefixes {
            if prefix.prefix_len() != PREFIX_LEN {
                return Err(AnalyzerError::UnsupportedPrefixLength { prefix: *prefix });
            }
            if !subnet.contains_cidr(prefix) {
                return Err(AnalyzerError::PrefixOutsideSubnet {
                    prefix: *prefix,
                    subnet,
                });
            }
            prefixes_in_use.insert(*prefix);
        }
    }

    let allocated_addresses = ADDRESSES_PER_PREFIX * prefixes_in_use.len() as u64
        + ips_in_use.len() as u64
        + RESERVED_PER_SUBNET;

    // A /28 holds an address iff their top 28 bits agree, so one lookup per
    // candidate replaces sixteen address probes.
    let occupied_blocks: HashSet<u32> = ips_in_use
        .iter()
        .map(|ip| u32::from(*ip) & !(ADDRESSES_PER_PREFIX as u32 - 1))
        .collect();

    let available_prefixes: Vec<Cidr4> = enumerate_candidate_prefixes(&subnet)
        .take(max_prefixes as usize)
        .filter(|candidate| !prefixes_in_use.contains(candidate))
        .filter(|candidate| !occupied_blocks.contains(&candidate.network_u32()))
        .collect();

    log::debug!(
        "Subnet {}: {} total, {} allocated, {} interfaces, {}/{} prefixes delegated, {} available",
        subnet,
        total_addresses,
        allocated_addresses,
        interfaces.len(),
        prefixes_in_use.len(),
        max_prefixes,
        available_prefixes.len()
    );

    Ok(SubnetOccupancy {
        total_addresses,
        max_prefixes,
        delegated_prefixes: prefixes_in_use,
        available_prefixes,
        interfaces_in_use: interfaces.len(),
        allocated_addresses,
        free_addresses: total_addresses as i64 - allocated_addresses as i64,
    })
}
