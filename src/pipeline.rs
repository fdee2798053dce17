use std::path::{Path, PathBuf};

use multimap::MultiMap;
use tracing::{error, info, warn};

use crate::chart::{render_top_ports, ChartBackend, RenderOptions, RenderOutcome};
use crate::error::{ReportError, Result};
use crate::loader::{load_reports, LoadedReport};
use crate::models::domain::Protocol;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub reports: usize,
    pub saved: Vec<PathBuf>,
    pub empty: usize,
    pub malformed: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: RenderOutcome) {
        match outcome {
            RenderOutcome::Saved(path) => self.saved.push(path),
            RenderOutcome::Empty => self.empty += 1,
            RenderOutcome::Malformed(_) => self.malformed += 1,
        }
    }
}

/// Reports sharing a device name write to the same chart files.
pub fn warn_on_collisions(reports: &[LoadedReport]) -> usize {
    let by_name: MultiMap<&str, &Path> = reports
        .iter()
        .map(|r| (r.report.device_name.as_str(), r.source.as_path()))
        .collect();

    let mut names: Vec<_> = by_name
        .iter_all()
        .filter(|(_, sources)| sources.len() > 1)
        .collect();
    names.sort_by_key(|(name, _)| **name);

    for (name, sources) in &names {
        let files: Vec<String> = sources.iter().map(|p| p.display().to_string()).collect();
        warn!(
            "{} reports share device name '{}' ({}); the last one loaded overwrites the others' charts",
            sources.len(),
            name,
            files.join(", ")
        );
    }
    names.len()
}

/// Chart TCP and UDP for every report in `input_dir`.
pub fn generate(input_dir: &Path, options: &RenderOptions, backend: &dyn ChartBackend) -> Result<RunSummary> {
    if !input_dir.is_dir() {
        return Err(ReportError::MissingDirectory(input_dir.to_path_buf()));
    }

    let reports = load_reports(input_dir)?;
    warn_on_collisions(&reports);

    let mut summary = RunSummary {
        reports: reports.len(),
        ..RunSummary::default()
    };
    for loaded in &reports {
        let device = &loaded.report;
        for protocol in Protocol::ALL {
            match render_top_ports(
                device.summary(protocol),
                protocol,
                &device.device_name,
                options,
                backend,
            ) {
                Ok(outcome) => summary.record(outcome),
                Err(e) => {
                    error!(
                        "Could not plot {} ports for {}: {}",
                        protocol.label(),
                        device.device_name,
                        e
                    );
                    summary.failed += 1;
                }
            }
        }
    }

    info!(
        "Processed {} report(s): {} chart(s) saved, {} empty, {} malformed, {} failed",
        summary.reports,
        summary.saved.len(),
        summary.empty,
        summary.malformed,
        summary.failed
    );
    Ok(summary)
}
