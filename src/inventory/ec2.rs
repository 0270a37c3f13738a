//! EC2-backed inventory.
//!
//! Subnets are listed with a `tag:Name` filter and interfaces with a
//! `subnet-id` filter. Both calls walk every result page.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ec2::config::Region;
use aws_sdk_ec2::types::{self, Filter};
use aws_sdk_ec2::Client;
use log::debug;

use super::{name_from_tags, InventoryFetcher, NetworkInterface, Subnet};
use crate::error::ExporterError;
use crate::ip::{parse_address, parse_cidr, AnalyzerError};

/// EC2 filter on the subnet `Name` tag
const NAME_TAG_FILTER: &str = "tag:Name";

/// EC2 filter on an interface's subnet
const SUBNET_ID_FILTER: &str = "subnet-id";

/// Inventory fetcher talking to the EC2 API
#[derive(Debug, Clone)]
pub struct Ec2Fetcher {
    client: Client,
}

impl Ec2Fetcher {
    /// Build a client for `region` using the ambient credential chain
    /// (environment, shared profile, web identity, instance metadata).
    pub async fn from_env(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::new(Client::new(&config))
    }

    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl InventoryFetcher for Ec2Fetcher {
    async fn list_subnets(&self, filter: &str) -> Result<Vec<Subnet>, ExporterError> {
        debug!("Describing subnets matching Name tag {:?}", filter);

        let mut pages = self
            .client
            .describe_subnets()
            .filters(
                Filter::builder()
                    .name(NAME_TAG_FILTER)
                    .values(filter)
                    .build(),
            )
            .into_paginator()
            .items()
            .send();

        let mut subnets = Vec::new();
        while let Some(item) = pages.next().await {
            let subnet = item.map_err(|e| ExporterError::transport("DescribeSubnets", e))?;
            subnets.push(convert_subnet(&subnet)?);
        }

        debug!("Found {} subnets", subnets.len());
        Ok(subnets)
    }

    async fn list_interfaces(
        &self,
        subnet_id: &str,
    ) -> Result<Vec<NetworkInterface>, ExporterError> {
        debug!("Describing network interfaces in subnet {}", subnet_id);

        let mut pages = self
            .client
            .describe_network_interfaces()
            .filters(
                Filter::builder()
                    .name(SUBNET_ID_FILTER)
                    .values(subnet_id)
                    .build(),
            )
            .into_paginator()
            .items()
            .send();

        let mut interfaces = Vec::new();
        while let Some(item) = pages.next().await {
            let iface =
                item.map_err(|e| ExporterError::transport("DescribeNetworkInterfaces", e))?;
            interfaces.push(convert_interface(subnet_id, &iface)?);
        }

        Ok(interfaces)
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ExporterError> {
    value.ok_or(ExporterError::MissingField {
        resource: "Subnet",
        field,
    })
}

/// Map an EC2 subnet description onto a [`Subnet`].
pub fn convert_subnet(subnet: &types::Subnet) -> Result<Subnet, ExporterError> {
    let subnet_id = required(subnet.subnet_id(), "SubnetId")?;
    debug!("Processing subnet: {}", subnet_id);

    let tags = subnet.tags().iter().map(|tag| (tag.key(), tag.value()));

    Ok(Subnet {
        subnet_id: subnet_id.to_string(),
        vpc_id: required(subnet.vpc_id(), "VpcId")?.to_string(),
        availability_zone: required(subnet.availability_zone(), "AvailabilityZone")?.to_string(),
        name: name_from_tags(tags),
        cidr_block: required(subnet.cidr_block(), "CidrBlock")?.to_string(),
        available_ips: subnet
            .available_ip_address_count()
            .map(|count| count.max(0) as u64)
            .ok_or(ExporterError::MissingField {
                resource: "Subnet",
                field: "AvailableIpAddressCount",
            })?,
    })
}

/// Map an EC2 network interface onto a [`NetworkInterface`].
///
/// Entries without an address are skipped; malformed ones fail the subnet.
pub fn convert_interface(
    subnet_id: &str,
    iface: &types::NetworkInterface,
) -> Result<NetworkInterface, ExporterError> {
    let invalid = |source: AnalyzerError| ExporterError::InvalidSubnet {
        subnet_id: subnet_id.to_string(),
        source,
    };

    let private_ips = iface
        .private_ip_addresses()
        .iter()
        .filter_map(|entry| entry.private_ip_address())
        .map(|ip| parse_address(ip).map_err(invalid))
        .collect::<Result<Vec<_>, _>>()?;

    let delegated_prefixes = iface
        .ipv4_prefixes()
        .iter()
        .filter_map(|entry| entry.ipv4_prefix())
        .map(|prefix| parse_cidr(prefix).map_err(invalid))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NetworkInterface {
        private_ips,
        delegated_prefixes,
    })
}
