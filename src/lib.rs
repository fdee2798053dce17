//! Post-processing for captured network traffic.
//!
//! - [`pipeline::generate`] turns a directory of `port_analysis_*.json`
//!   reports into one bar chart per device and protocol.
//! - [`dhcp::DhcpAckExtractor`] finds a device's address from the DHCP ACK
//!   in its capture file.

pub mod chart;
pub mod cli;
pub mod dhcp;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;
pub mod pipeline;

pub use error::{ReportError, Result};
