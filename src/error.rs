//! Error types for aro-bootstrap.
//!
//! Each concern gets its own enum; [`Error`] wraps them so `?` works
//! everywhere with a single [`Result`] alias.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Azure(#[from] AzureError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Format problems in user-supplied names.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} '{value}' is too long: {len} characters (max {max})")]
    TooLong {
        field: &'static str,
        value: String,
        len: usize,
        max: usize,
    },

    #[error(
        "{field} '{value}' has invalid character '{ch}' at position {position}. Only a-z, 0-9, and '-' are allowed"
    )]
    InvalidChar {
        field: &'static str,
        value: String,
        ch: char,
        position: usize,
    },

    #[error("{field} '{value}' must not start or end with a hyphen")]
    HyphenBoundary { field: &'static str, value: String },

    #[error("location '{0}' is not a valid Azure region name")]
    InvalidLocation(String),
}

/// Problems with local configuration inputs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("pull secret file not found: {}", .0.display())]
    PullSecretMissing(PathBuf),

    #[error("failed to read pull secret {}: {source}", path.display())]
    PullSecretRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {field} '{value}': {reason}")]
    InvalidCidr {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("{field} {subnet} is not inside vnet {vnet}")]
    SubnetOutsideVnet {
        field: &'static str,
        subnet: String,
        vnet: String,
    },

    #[error("master subnet {master} overlaps worker subnet {worker}")]
    SubnetOverlap { master: String, worker: String },
}

/// Failures talking to Azure through the `az` CLI.
#[derive(Error, Debug)]
pub enum AzureError {
    #[error("az CLI not found ({0}). Install it from https://learn.microsoft.com/cli/azure/install-azure-cli")]
    CliNotFound(String),

    #[error("not logged in to Azure: {0}")]
    NotAuthenticated(String),

    #[error("az {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("failed to spawn az: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("unexpected output from az {command}: {reason}")]
    UnexpectedOutput { command: String, reason: String },

    #[error("service principal '{0}' not found")]
    ServicePrincipalNotFound(String),

    #[error("directory object for app {app_id} not visible after {attempts} attempts")]
    ObjectIdUnavailable { app_id: String, attempts: u32 },
}

/// Checkpoint persistence problems.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("failed to read checkpoint {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt checkpoint {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize checkpoint: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("checkpoint {} was written for a different configuration", .0.display())]
    Mismatch(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether a directory lookup failed only because a new object has not
    /// replicated yet.
    pub fn is_not_yet_visible(&self) -> bool {
        match self {
            Error::Azure(AzureError::CommandFailed { stderr, .. }) => {
                let stderr = stderr.to_ascii_lowercase();
                stderr.contains("does not exist") || stderr.contains("not found")
            }
            Error::Azure(AzureError::UnexpectedOutput { .. }) => true,
            _ => false,
        }
    }

    /// Suggested next command for errors the operator can fix directly.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::Azure(AzureError::NotAuthenticated(_)) => Some("run: az login"),
            Error::Azure(AzureError::CliNotFound(_)) => Some("install the Azure CLI or set ARO_AZ"),
            Error::Azure(AzureError::ObjectIdUnavailable { .. }) => {
                Some("re-run aro-bootstrap run to resume once the directory catches up")
            }
            Error::State(StateError::Mismatch(_)) | Error::State(StateError::Parse { .. }) => {
                Some("run: aro-bootstrap run --fresh")
            }
            _ => None,
        }
    }
}
