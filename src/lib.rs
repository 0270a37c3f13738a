//! # aws-subnet-exporter - Prometheus exporter for AWS subnet capacity
//!
//! This library provides the pieces of a long-running exporter that reports,
//! per subnet, how many IP addresses are left and how many `/28` prefixes can
//! still be delegated to network interfaces.
//!
//! ## Overview
//!
//! Every poll period the exporter lists the subnets whose `Name` tag matches
//! a glob, lists the network interfaces attached to each one and works out
//! which `/28` blocks are free: not delegated as a prefix and not holding any
//! individually-assigned address. The results are published as gauges on
//! `/metrics`.
//!
//! ## Architecture
//!
//! - `ip`: CIDR arithmetic and the prefix availability analyzer
//! - `inventory`: subnet and interface records, the fetcher trait and its EC2 implementation
//! - `metrics`: gauge registry and text exposition
//! - `poller`: the periodic fetch, analyze and publish loop
//! - `server`: `/metrics` and `/healthz` over HTTP
//! - `config` / `config_loader`: settings from defaults, YAML and flags
//!
//! ## Example Usage
//!
//! ```rust
//! use aws_subnet_exporter::inventory::NetworkInterface;
//! use aws_subnet_exporter::ip::{analyze_subnet, parse_cidr};
//!
//! let iface = NetworkInterface {
//!     private_ips: vec!["172.16.1.125".parse()?],
//!     delegated_prefixes: vec![parse_cidr("172.16.1.112/28")?],
//! };
//! let occupancy = analyze_subnet("172.16.1.0/24", &[iface])?;
//!
//! assert_eq!(occupancy.max_prefixes, 16);
//! assert_eq!(occupancy.used_prefixes(), 1);
//! assert_eq!(occupancy.available_prefixes.len(), 15);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Library errors are `thiserror` enums (`AnalyzerError`, `ExporterError`,
//! `ValidationError`). The binary reports them through `color_eyre` and
//! exits non-zero on the first failed poll cycle.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod inventory;
pub mod ip;
pub mod metrics;
pub mod poller;
pub mod server;

pub use error::ExporterError;
