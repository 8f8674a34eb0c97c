//! Core domain types and traits for the vide-oh front-end bundler.
//!
//! This crate contains:
//! - Deployment targets and output queries
//! - Credential records and the credential store trait
//! - The command runner capability used for every external process
//! - The generated configuration model and the front-end client config
//! - Packaging hook definitions (entries, build steps, paths)

pub mod client;
pub mod command;
pub mod credential;
pub mod error;
pub mod generated;
pub mod hook;
pub mod target;

pub use error::{Error, Result};
