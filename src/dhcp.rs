//! Device address lookup from the DHCP ACK in a capture file.
//!
//! Packet inspection is left to `tshark`: it filters for option 53 = 5 and
//! prints `ip.dst`, one line per matching packet.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use tracing::{error, warn};

use crate::error::{ReportError, Result};

pub const DEFAULT_TSHARK: &str = "tshark";
pub const DHCP_ACK_FILTER: &str = "bootp.option.dhcp == 5";

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub program: PathBuf,
    pub display_filter: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_TSHARK),
            display_filter: DHCP_ACK_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureAddress {
    pub capture: PathBuf,
    pub address: Option<IpAddr>,
}

pub struct DhcpAckExtractor {
    config: ExtractorConfig,
}

impl DhcpAckExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn command(&self, capture: &Path) -> Command {
        let mut cmd = Command::new(&self.config.program);
        cmd.arg("-r")
            .arg(capture)
            .arg("-Y")
            .arg(&self.config.display_filter)
            .args(["-T", "fields", "-e", "ip.dst"]);
        cmd
    }

    /// Raw stdout of the filter run, or why it did not succeed.
    pub fn run(&self, capture: &Path) -> Result<String> {
        let program = self.config.program.display().to_string();
        let output = self
            .command(capture)
            .output()
            .map_err(|source| ReportError::ToolSpawn {
                program: program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ReportError::ToolFailed {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Destination address of the first DHCP ACK in `capture`.
    ///
    /// Never fails: tool errors and unusable output are logged and give `None`.
    pub fn extract_device_ip(&self, capture: &Path) -> Option<IpAddr> {
        let stdout = match self.run(capture) {
            Ok(stdout) => stdout,
            Err(e) => {
                error!(
                    "tshark failed during DHCP extraction on {}: {}",
                    capture.display(),
                    e
                );
                return None;
            }
        };
        match first_address(&stdout) {
            Ok(Some(ip)) => Some(ip),
            Ok(None) => {
                warn!("No DHCP ACK packet found in {}", capture.display());
                None
            }
            Err(e) => {
                error!("Unusable DHCP ACK address in {}: {}", capture.display(), e);
                None
            }
        }
    }

    pub fn extract_many<P: AsRef<Path>>(&self, captures: &[P]) -> Vec<CaptureAddress> {
        captures
            .iter()
            .map(|capture| CaptureAddress {
                capture: capture.as_ref().to_path_buf(),
                address: self.extract_device_ip(capture.as_ref()),
            })
            .collect()
    }
}

/// First address on the first non-empty line. A line can hold several
/// comma-separated values when a packet carries more than one IP header.
pub fn first_address(stdout: &str) -> Result<Option<IpAddr>> {
    let line = match stdout.lines().map(str::trim).find(|l| !l.is_empty()) {
        Some(line) => line,
        None => return Ok(None),
    };
    let field = line.split(',').next().unwrap_or(line).trim();
    field
        .parse()
        .map(Some)
        .map_err(|_| ReportError::InvalidAddress(field.to_string()))
}
