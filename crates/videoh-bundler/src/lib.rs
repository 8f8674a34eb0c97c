//! Packaging hook pipeline for the vide-oh front end.
//!
//! One packaging cycle runs these steps strictly in order:
//! 1. resolve deployment outputs
//! 2. resolve credentials
//! 3. write the generated configuration file
//! 4. install dependencies and build the front end
//! 5. copy the build output into the packaging directory
//!
//! Any failure aborts the cycle; nothing is retried.

pub mod build;
pub mod credentials;
pub mod emitter;
pub mod orchestrator;
pub mod outputs;
pub mod publish;

pub use build::{BuildInvoker, BuildResult, StepReport};
pub use credentials::CredentialResolver;
pub use emitter::emit;
pub use orchestrator::{BundleOrchestrator, BundleReport, ResolvedConfig};
pub use outputs::OutputResolver;
pub use publish::{PublishStats, publish};
