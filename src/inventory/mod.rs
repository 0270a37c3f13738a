//! Subnet and network interface inventory.
//!
//! The poller only sees the [`InventoryFetcher`] trait; `ec2` provides the
//! implementation backed by the AWS EC2 API.

pub mod ec2;

use std::net::Ipv4Addr;

use async_trait::async_trait;

use crate::error::ExporterError;
use crate::ip::Cidr4;

pub use ec2::Ec2Fetcher;

/// Name reported for subnets without a `Name` tag
pub const MISSING_NAME_TAG: &str = "No name tag found";

/// Identity and cloud-reported capacity of one subnet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub subnet_id: String,
    pub vpc_id: String,
    pub availability_zone: String,
    pub name: String,
    pub cidr_block: String,
    /// Free addresses as reported by the cloud API
    pub available_ips: u64,
}

/// Addresses and delegated prefixes held by one attached interface
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkInterface {
    pub private_ips: Vec<Ipv4Addr>,
    pub delegated_prefixes: Vec<Cidr4>,
}

/// Read-only view of the cloud inventory
#[async_trait]
pub trait InventoryFetcher: Send + Sync {
    /// List subnets whose `Name` tag matches the glob `filter`.
    async fn list_subnets(&self, filter: &str) -> Result<Vec<Subnet>, ExporterError>;

    /// List the network interfaces attached to a subnet.
    async fn list_interfaces(&self, subnet_id: &str)
        -> Result<Vec<NetworkInterface>, ExporterError>;
}

/// Pick the value of the `Name` tag out of `(key, value)` pairs.
pub fn name_from_tags<'a, I>(tags: I) -> String
where
    I: IntoIterator<Item = (Option<&'a str>, Option<&'a str>)>,
{
    tags.into_iter()
        .find(|(key, _)| *key == Some("Name"))
        .and_then(|(_, value)| value)
        .unwrap_or(MISSING_NAME_TAG)
        .to_string()
}
