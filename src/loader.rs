use std::fs;
use std::path::{Path, PathBuf};

use tracing::{error, warn};

use crate::error::{ReportError, Result};
use crate::models::domain::DeviceReport;
use crate::models::dto::RawDeviceReport;

pub const REPORT_PREFIX: &str = "port_analysis_";
pub const REPORT_SUFFIX: &str = ".json";

#[derive(Debug, Clone)]
pub struct LoadedReport {
    pub source: PathBuf,
    pub report: DeviceReport,
}

pub fn is_report_file(name: &str) -> bool {
    name.starts_with(REPORT_PREFIX) && name.ends_with(REPORT_SUFFIX)
}

/// Load every `port_analysis_*.json` directly inside `dir`.
///
/// A file that cannot be read or parsed is logged and left out; only a
/// failure to list the directory itself is returned as an error.
pub fn load_reports(dir: &Path) -> Result<Vec<LoadedReport>> {
    let entries = fs::read_dir(dir).map_err(|source| ReportError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    // names are matched lossily; the real path is what gets opened
    let mut candidates: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => {
                let name = entry.file_name().to_string_lossy().into_owned();
                if is_report_file(&name) {
                    candidates.push((name, entry.path()));
                }
            }
            Err(e) => warn!("Skipping unreadable entry in {}: {}", dir.display(), e),
        }
    }
    candidates.sort();

    let mut reports = Vec::with_capacity(candidates.len());
    for (name, path) in candidates {
        match load_report(&path) {
            Ok(report) => reports.push(LoadedReport { source: path, report }),
            Err(e) => error!("Failed to read {}: {}", name, e),
        }
    }
    Ok(reports)
}

pub fn load_report(path: &Path) -> Result<DeviceReport> {
    let text = fs::read_to_string(path).map_err(ReportError::Io)?;
    let value: serde_json::Value = serde_json::from_str(&text).map_err(ReportError::Json)?;
    if !value.is_object() {
        return Err(ReportError::NotAnObject);
    }
    let raw: RawDeviceReport = serde_json::from_value(value).map_err(ReportError::Json)?;
    Ok(raw.into())
}
