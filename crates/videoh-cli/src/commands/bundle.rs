//! Packaging hook commands.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use videoh_bundler::BundleOrchestrator;
use videoh_config::HookContext;
use videoh_core::client::ApiClientConfig;
use videoh_core::hook::HookConfig;
use videoh_executor::ProcessRunner;

use super::aws_client;

fn orchestrator(hook: HookConfig) -> BundleOrchestrator {
    let aws = aws_client(&hook);
    BundleOrchestrator::new(hook, aws.clone(), aws, Arc::new(ProcessRunner::new()))
}

/// Run the packaging hook and print its boolean outcome.
pub async fn run(hook: HookConfig, output_dir: &Path) -> Result<()> {
    let orchestrator = orchestrator(hook);
    let done = orchestrator
        .run_hook(output_dir)
        .await
        .with_context(|| format!("Bundling into {} failed", output_dir.display()))?;

    println!("{}", done);
    Ok(())
}

/// Resolve everything and print the generated configuration without
/// writing it or building.
pub async fn render(hook: HookConfig) -> Result<()> {
    let mut ctx = HookContext::new(&hook.project, Path::new("."));
    ctx.populate_env();
    let orchestrator = orchestrator(hook);
    let resolved = orchestrator.resolve(&ctx).await?;

    match ApiClientConfig::from_generated(&resolved.config, &orchestrator.hook().prefix) {
        Ok(client) => {
            let headers: Vec<_> = client
                .default_headers()
                .into_iter()
                .map(|(name, _)| name)
                .collect();
            info!(
                base_url = %client.base_url,
                websocket_url = ?client.websocket_url,
                headers = ?headers,
                "Front-end client settings are complete"
            )
        }
        Err(e) => warn!(error = %e, "Front-end client settings are incomplete"),
    }

    print!("{}", resolved.masked().render());
    Ok(())
}
