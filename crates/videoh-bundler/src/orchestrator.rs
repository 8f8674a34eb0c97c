//! Bundle orchestrator - runs one packaging cycle end to end.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use videoh_config::HookContext;
use videoh_core::Result;
use videoh_core::command::CommandRunner;
use videoh_core::credential::{CredentialStore, mask};
use videoh_core::generated::GeneratedConfig;
use videoh_core::hook::{HookConfig, ValueSource};
use videoh_core::target::OutputSource;

use crate::build::{BuildInvoker, BuildResult};
use crate::credentials::CredentialResolver;
use crate::emitter::emit;
use crate::outputs::OutputResolver;
use crate::publish::{PublishStats, publish};

/// Resolved configuration plus the keys that hold secrets.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: GeneratedConfig,
    pub secret_keys: Vec<String>,
}

impl ResolvedConfig {
    /// Copy of the configuration with secret values masked.
    pub fn masked(&self) -> GeneratedConfig {
        self.config
            .iter()
            .map(|(k, v)| {
                let value = if self.secret_keys.iter().any(|s| s == k) {
                    mask(v)
                } else {
                    v.to_string()
                };
                (k.to_string(), value)
            })
            .collect()
    }
}

/// Summary of a successful packaging cycle.
#[derive(Debug, Clone, Serialize)]
pub struct BundleReport {
    pub output_dir: PathBuf,
    pub env_file: PathBuf,
    pub keys: Vec<String>,
    pub build: BuildResult,
    pub published: PublishStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Runs the packaging hook: outputs, credentials, config file, build, publish.
pub struct BundleOrchestrator {
    hook: HookConfig,
    outputs: OutputResolver,
    credentials: CredentialResolver,
    builder: BuildInvoker,
}

impl BundleOrchestrator {
    pub fn new(
        hook: HookConfig,
        output_source: Arc<dyn OutputSource>,
        credential_store: Arc<dyn CredentialStore>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let outputs = OutputResolver::new(output_source)
            .strict(hook.strict_outputs)
            .require_deployed(hook.require_deployed);

        Self {
            outputs,
            credentials: CredentialResolver::new(credential_store),
            builder: BuildInvoker::new(runner),
            hook,
        }
    }

    pub fn hook(&self) -> &HookConfig {
        &self.hook
    }

    /// Resolve every entry of the hook into the generated configuration.
    ///
    /// All outputs are resolved before any credential; the result keeps the
    /// entry order of the hook.
    pub async fn resolve(&self, ctx: &HookContext) -> Result<ResolvedConfig> {
        let entries = &self.hook.entries;
        let mut values: Vec<Option<String>> = vec![None; entries.len()];
        let mut secret_keys = Vec::new();

        for (idx, entry) in entries.iter().enumerate() {
            if let ValueSource::Output(query) = &entry.source {
                values[idx] = Some(self.outputs.resolve(query).await?);
            }
        }

        for (idx, entry) in entries.iter().enumerate() {
            if let ValueSource::Credential { name } = &entry.source {
                let credential = self.credentials.resolve(name).await?;
                values[idx] = Some(credential.value);
                secret_keys.push(self.hook.prefixed(&entry.key));
            }
        }

        let config = entries
            .iter()
            .zip(values)
            .map(|(entry, value)| {
                let value = match (&entry.source, value) {
                    (ValueSource::Literal { value }, _) => ctx.interpolate(value),
                    (_, Some(value)) => value,
                    (_, None) => String::new(),
                };
                (self.hook.prefixed(&entry.key), value)
            })
            .collect();

        Ok(ResolvedConfig {
            config,
            secret_keys,
        })
    }

    /// Run one full packaging cycle into `output_dir`.
    pub async fn run(&self, output_dir: &Path) -> Result<BundleReport> {
        info!(
            output_dir = %output_dir.display(),
            project = %self.hook.project.display(),
            "Executing local bundling"
        );
        let started_at = Utc::now();

        let mut ctx = HookContext::new(&self.hook.project, output_dir);
        ctx.populate_env();

        let resolved = self.resolve(&ctx).await?;

        let env_file = self.hook.env_file_path();
        emit(&env_file, &resolved.config, self.hook.atomic_write)?;

        let build = self
            .builder
            .build(&self.hook.project, &self.hook.steps, &ctx)
            .await?;

        let published = publish(&self.hook.dist_path(), output_dir)?;

        let report = BundleReport {
            output_dir: output_dir.to_path_buf(),
            env_file,
            keys: resolved.config.keys().into_iter().map(String::from).collect(),
            build,
            published,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            files = report.published.files,
            duration_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "Bundling completed"
        );
        Ok(report)
    }

    /// Packaging hook entry point: `Ok(true)` once the output directory
    /// holds the publishable tree; every failure is returned as an error.
    pub async fn run_hook(&self, output_dir: &Path) -> Result<bool> {
        match self.run(output_dir).await {
            Ok(_) => Ok(true),
            Err(e) => {
                error!(error = %e, "Bundling failed");
                Err(e)
            }
        }
    }
}
