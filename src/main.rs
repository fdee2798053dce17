use std::io;
use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info};

use portplot::chart::PngBackend;
use portplot::cli::{prompt_directory, Cli, Command, FindIpArgs, PlotArgs};
use portplot::dhcp::DhcpAckExtractor;
use portplot::{logging, pipeline, ReportError};

fn main() -> ExitCode {
    dotenv().ok();
    logging::init();

    let result = match Cli::parse().resolve() {
        Command::Plot(args) => plot(args),
        Command::FindIp(args) => find_ip(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn plot(args: PlotArgs) -> Result<(), ReportError> {
    let dir = match &args.dir {
        Some(dir) => dir.clone(),
        None => prompt_directory(io::stdin().lock(), io::stdout()).map_err(ReportError::Prompt)?,
    };
    pipeline::generate(&dir, &args.render_options(), &PngBackend::default())?;
    Ok(())
}

fn find_ip(args: FindIpArgs) -> Result<(), ReportError> {
    let extractor = DhcpAckExtractor::new(args.extractor_config());
    let results = extractor.extract_many(&args.captures);

    if args.json {
        let text = serde_json::to_string_pretty(&results).map_err(ReportError::Json)?;
        println!("{text}");
        return Ok(());
    }
    // captures without an address were already reported by the extractor
    for r in &results {
        if let Some(ip) = r.address {
            info!(success = true, "{} -> {}", r.capture.display(), ip);
        }
    }
    let found = results.iter().filter(|r| r.address.is_some()).count();
    info!("Resolved {} of {} capture(s)", found, results.len());
    Ok(())
}
