use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::chart::{RenderOptions, DEFAULT_OUTPUT_DIR, DEFAULT_TOP_N};
use crate::dhcp::{ExtractorConfig, DEFAULT_TSHARK, DHCP_ACK_FILTER};

#[derive(Parser, Debug)]
#[command(
    name = "portplot",
    version,
    about = "Per-device port usage charts from capture analysis reports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Chart the top TCP/UDP ports of every port_analysis_*.json (default)
    Plot(PlotArgs),
    /// Print the DHCP ACK destination address of each capture file
    FindIp(FindIpArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PlotArgs {
    /// Directory holding the port_analysis_*.json files; prompted for when omitted
    pub dir: Option<PathBuf>,

    /// Number of ports per chart [default: 10]
    #[arg(long, default_value_t = DEFAULT_TOP_N, value_parser = validate_top_n)]
    pub top_n: usize,

    /// Where the PNG files are written [default: plots]
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
}

impl Default for PlotArgs {
    fn default() -> Self {
        Self {
            dir: None,
            top_n: DEFAULT_TOP_N,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl PlotArgs {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            top_n: self.top_n,
            output_dir: self.output_dir.clone(),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FindIpArgs {
    /// Capture files (pcap/pcapng)
    #[arg(required = true)]
    pub captures: Vec<PathBuf>,

    /// tshark executable
    #[arg(long, default_value = DEFAULT_TSHARK)]
    pub tshark: PathBuf,

    /// Display filter selecting DHCP ACK packets
    #[arg(long, default_value = DHCP_ACK_FILTER)]
    pub display_filter: String,

    /// Print results as JSON instead of log lines
    #[arg(long)]
    pub json: bool,
}

impl FindIpArgs {
    pub fn extractor_config(&self) -> ExtractorConfig {
        ExtractorConfig {
            program: self.tshark.clone(),
            display_filter: self.display_filter.clone(),
        }
    }
}

fn validate_top_n(s: &str) -> Result<usize, String> {
    let val: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid integer"))?;
    if val == 0 {
        Err("top-n must be at least 1".to_string())
    } else if val > 1000 {
        Err("top-n must be at most 1000".to_string())
    } else {
        Ok(val)
    }
}

impl Cli {
    /// No subcommand behaves like `plot` with every default.
    pub fn resolve(self) -> Command {
        self.command
            .unwrap_or_else(|| Command::Plot(PlotArgs::default()))
    }
}

pub const BANNER: &str = "== Port Usage Plot Generator ==";
pub const PROMPT: &str = "Enter the path of the 'log' directory containing the JSON files: ";

/// Ask the operator for the input directory. Surrounding whitespace is dropped.
pub fn prompt_directory<R: BufRead, W: Write>(mut input: R, mut output: W) -> std::io::Result<PathBuf> {
    writeln!(output, "{BANNER}")?;
    write!(output, "{PROMPT}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(PathBuf::from(line.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    fn resolved(args: &[&str]) -> Command {
        parse(args).unwrap().resolve()
    }

    fn plot(args: &[&str]) -> PlotArgs {
        match resolved(args) {
            Command::Plot(p) => p,
            other => panic!("expected plot, got {other:?}"),
        }
    }

    #[test]
    fn test_no_arguments_prompts() {
        let p = plot(&["portplot"]);
        assert_eq!(p.dir, None);
        assert_eq!(p.top_n, 10);
        assert_eq!(p.output_dir, PathBuf::from("plots"));
    }

    #[test]
    fn test_plot_with_dir() {
        let p = plot(&["portplot", "plot", "log"]);
        assert_eq!(p.dir, Some(PathBuf::from("log")));
    }

    #[test]
    fn test_plot_flags() {
        let p = plot(&["portplot", "plot", "log", "--top-n", "5", "--output-dir", "out"]);
        assert_eq!(p.top_n, 5);
        assert_eq!(p.render_options().output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_top_n_zero_rejected() {
        assert!(parse(&["portplot", "plot", "--top-n", "0"]).is_err());
    }

    #[test]
    fn test_top_n_too_large_rejected() {
        assert!(parse(&["portplot", "plot", "--top-n", "5000"]).is_err());
    }

    #[test]
    fn test_top_n_not_a_number() {
        assert!(parse(&["portplot", "plot", "--top-n", "ten"]).is_err());
    }

    #[test]
    fn test_find_ip() {
        match resolved(&["portplot", "find-ip", "a.pcap", "b.pcap", "--json"]) {
            Command::FindIp(f) => {
                assert_eq!(f.captures.len(), 2);
                assert!(f.json);
                let config = f.extractor_config();
                assert_eq!(config.program, PathBuf::from("tshark"));
                assert_eq!(config.display_filter, "bootp.option.dhcp == 5");
            }
            other => panic!("expected find-ip, got {other:?}"),
        }
    }

    #[test]
    fn test_find_ip_custom_filter() {
        match resolved(&["portplot", "find-ip", "a.pcap", "--display-filter", "dhcp.option.dhcp == 5"]) {
            Command::FindIp(f) => assert_eq!(f.display_filter, "dhcp.option.dhcp == 5"),
            other => panic!("expected find-ip, got {other:?}"),
        }
    }

    #[test]
    fn test_find_ip_requires_capture() {
        assert!(parse(&["portplot", "find-ip"]).is_err());
    }

    #[test]
    fn test_prompt_trims_input() {
        let mut out = Vec::new();
        let dir = prompt_directory(&b"  ./log \n"[..], &mut out).unwrap();
        assert_eq!(dir, PathBuf::from("./log"));
        let shown = String::from_utf8(out).unwrap();
        assert_eq!(shown, format!("{BANNER}\n{PROMPT}"));
    }

    #[test]
    fn test_prompt_eof_gives_empty_path() {
        let dir = prompt_directory(&b""[..], Vec::new()).unwrap();
        assert_eq!(dir, PathBuf::from(""));
    }
}
