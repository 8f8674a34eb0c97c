//! KDL configuration parsing for the vide-oh front-end bundler.
//!
//! This crate handles parsing of:
//! - Packaging hook definitions (bundle.kdl)
//! - Variable interpolation in build steps and literal values

pub mod error;
pub mod hook;
pub mod variables;

pub use error::{ConfigError, ConfigResult};
pub use hook::{load_hook_config, parse_hook_config};
pub use variables::HookContext;
