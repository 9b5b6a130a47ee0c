//! CLI error types.

use ocean_api::ApiError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Positional arguments or required flags are missing.
    ///
    /// Carries the command namespace, e.g. `droplet.create` or
    /// `droplet.create.size` for a missing flag.
    #[error("({0}) command is missing required arguments")]
    MissingArgs(String),

    /// The user declined a confirmation prompt.
    #[error("operation aborted")]
    Aborted,

    /// Invalid argument value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Waiting for completion gave up.
    #[error("{0}")]
    Timeout(String),

    /// A waited-on operation reported failure.
    #[error("{0}")]
    Failed(String),

    /// Websocket stream failure.
    #[error("stream error: {0}")]
    Stream(String),

    /// A glob filter did not compile.
    #[error("unknown glob \"{0}\"")]
    UnknownGlob(String),

    /// App spec could not be parsed.
    #[error("parsing app spec: {0}")]
    SpecParse(String),

    /// Requested output column does not exist.
    #[error("unknown column \"{0}\"")]
    UnknownColumn(String),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML encoding or decoding failed.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Missing-arguments error for a command namespace.
    pub fn missing_args(ns: impl Into<String>) -> Self {
        Self::MissingArgs(ns.into())
    }
}
