//! Per-subnet gauges and their text exposition.
//!
//! The registry is owned by [`SubnetMetrics`] rather than registered
//! process-wide, so the poller and the HTTP server share it through an
//! `Arc`. Every gauge is keyed by the same label tuple and is overwritten on
//! each poll.

use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

use crate::error::ExporterError;
use crate::inventory::Subnet;
use crate::ip::SubnetOccupancy;

/// Prefix of every exported metric name
pub const METRIC_PREFIX: &str = "aws_subnet_exporter_";

/// Label names shared by all subnet gauges
pub const LABELS: [&str; 5] = ["vpcid", "subnetid", "cidrblock", "az", "name"];

/// Gauge registry for subnet occupancy
#[derive(Clone)]
pub struct SubnetMetrics {
    registry: Registry,
    available_ips: GaugeVec,
    max_ips: GaugeVec,
    used_prefixes: GaugeVec,
    available_prefixes: GaugeVec,
}

fn gauge_vec(registry: &Registry, name: &str, help: &str) -> Result<GaugeVec, ExporterError> {
    let gauge = GaugeVec::new(Opts::new(format!("{}{}", METRIC_PREFIX, name), help), &LABELS)
        .map_err(ExporterError::Register)?;
    registry
        .register(Box::new(gauge.clone()))
        .map_err(ExporterError::Register)?;
    Ok(gauge)
}

impl SubnetMetrics {
    /// Create a fresh registry holding the four subnet gauges.
    pub fn new() -> Result<Self, ExporterError> {
        let registry = Registry::new();
        Ok(Self {
            available_ips: gauge_vec(&registry, "available_ips", "Available IPs in subnets")?,
            max_ips: gauge_vec(&registry, "max_ips", "Max host IPs in subnet")?,
            used_prefixes: gauge_vec(&registry, "used_prefixes", "Used prefixes in subnets")?,
            available_prefixes: gauge_vec(
                &registry,
                "available_prefixes",
                "Available prefixes in subnets",
            )?,
            registry,
        })
    }

    /// Set all four gauges of one subnet's label tuple.
    pub fn publish(&self, subnet: &Subnet, occupancy: &SubnetOccupancy) {
        let labels = [
            subnet.vpc_id.as_str(),
            subnet.subnet_id.as_str(),
            subnet.cidr_block.as_str(),
            subnet.availability_zone.as_str(),
            subnet.name.as_str(),
        ];

        self.available_ips
            .with_label_values(&labels)
            .set(subnet.available_ips as f64);
        self.max_ips
            .with_label_values(&labels)
            .set(occupancy.total_addresses as f64);
        self.used_prefixes
            .with_label_values(&labels)
            .set(occupancy.used_prefixes() as f64);
        self.available_prefixes
            .with_label_values(&labels)
            .set(occupancy.available_prefix_count() as f64);
    }

    /// Serialize the current snapshot in the Prometheus text format.
    pub fn render(&self) -> Result<String, ExporterError> {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&families, &mut buffer)?;
        // The text encoder only writes UTF-8
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Content type of [`SubnetMetrics::render`] output
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}
