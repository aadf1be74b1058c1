use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    /// The `ceph` command could not be spawned, exited nonzero, timed out,
    /// or printed nothing.
    #[error("Command `{command}` failed: {reason}")]
    Invocation { command: String, reason: String },

    #[error("JSON error in `{command}` output: {source}")]
    Parse {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    /// Well-formed JSON that lacks a field or carries the wrong type.
    #[error("Unexpected `{command}` document shape: {reason}")]
    Shape { command: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExporterError {
    /// Stable label used for the failure counter.
    pub fn kind(&self) -> &'static str {
        match self {
            ExporterError::Invocation { .. } => "invocation",
            ExporterError::Parse { .. } => "parse",
            ExporterError::Shape { .. } => "shape",
            ExporterError::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, ExporterError>;
