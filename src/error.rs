use std::path::PathBuf;
use std::process::ExitStatus;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("The folder '{}' does not exist.", .0.display())]
    MissingDirectory(PathBuf),
    #[error("cannot list {}: {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Io(#[source] std::io::Error),
    #[error("{0}")]
    Json(#[source] serde_json::Error),
    #[error("expected a JSON object at the top level")]
    NotAnObject,
    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("rendering {} failed: {reason}", path.display())]
    Render { path: PathBuf, reason: String },
    #[error("cannot run {program}: {source}")]
    ToolSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    ToolFailed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
    #[error("'{0}' is not an IP address")]
    InvalidAddress(String),
    #[error("cannot read operator input: {0}")]
    Prompt(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
