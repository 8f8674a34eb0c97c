//! Execution backends for the vide-oh front-end bundler.
//!
//! Provides:
//! - A tokio process runner that streams child output to the console
//! - AWS CLI backed output and credential sources

pub mod aws;
pub mod process;

pub use aws::AwsCli;
pub use process::ProcessRunner;
pub use videoh_core::command::{CommandOutput, CommandRunner, CommandSpec, RunOutcome};
