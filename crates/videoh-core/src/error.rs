//! Error types for the bundler.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("output '{key}' not found on deployment target '{target}'")]
    OutputNotFound { target: String, key: String },

    #[error("deployment target '{target}' is not deployed (status: {status})")]
    TargetNotDeployed { target: String, status: String },

    #[error("credential not found: {0}")]
    CredentialNotFound(String),

    #[error("build step '{step}' failed with exit code {}", .exit_code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string()))]
    BuildStepFailed { step: String, exit_code: Option<i32> },

    #[error("failed to publish {}: {source}", .path.display())]
    PublishFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
