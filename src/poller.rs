//! Background poll loop.
//!
//! Each cycle lists the subnets matching the Name-tag filter, analyzes every
//! subnet against its attached interfaces and publishes the result. Any
//! failure ends the loop with an error; the caller is expected to exit so a
//! supervisor restarts the exporter instead of it serving stale gauges.

use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::watch;

use crate::error::ExporterError;
use crate::inventory::InventoryFetcher;
use crate::ip::analyze_subnet;
use crate::metrics::SubnetMetrics;

/// Run a single poll cycle and return how many subnets were published.
pub async fn run_cycle<F>(
    fetcher: &F,
    metrics: &SubnetMetrics,
    filter: &str,
) -> Result<usize, ExporterError>
where
    F: InventoryFetcher + ?Sized,
{
    let subnets = fetcher.list_subnets(filter).await?;
    if subnets.is_empty() {
        warn!("No subnets match Name tag filter {:?}", filter);
    }

    for subnet in &subnets {
        debug!("Processing subnet: {}", subnet.subnet_id);
        let interfaces = fetcher.list_interfaces(&subnet.subnet_id).await?;

        let occupancy = analyze_subnet(&subnet.cidr_block, &interfaces).map_err(|source| {
            ExporterError::InvalidSubnet {
                subnet_id: subnet.subnet_id.clone(),
                source,
            }
        })?;

        debug!(
            "Subnet {} ({}): {} interfaces, {} addresses allocated, {} free, {} prefixes used, {} available",
            subnet.subnet_id,
            subnet.name,
            occupancy.interfaces_in_use,
            occupancy.allocated_addresses,
            occupancy.free_addresses,
            occupancy.used_prefixes(),
            occupancy.available_prefix_count()
        );

        metrics.publish(subnet, &occupancy);
    }

    Ok(subnets.len())
}

/// Poll every `period` until `shutdown` flips to `true` or a cycle fails.
///
/// The first cycle runs immediately. Ticks missed while a slow cycle was
/// running are not coalesced.
pub async fn run<F>(
    fetcher: &F,
    metrics: &SubnetMetrics,
    filter: &str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), ExporterError>
where
    F: InventoryFetcher + ?Sized,
{
    info!("Starting subnet poller with period {:?}", period);
    let mut ticker = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let published = run_cycle(fetcher, metrics, filter).await?;
                debug!("Poll cycle published {} subnets", published);
            }
            changed = shutdown.changed() => {
                // A dropped sender counts as a shutdown request too
                if changed.is_err() || *shutdown.borrow() {
                    info!("Subnet poller stopped");
                    return Ok(());
                }
            }
        }
    }
}
