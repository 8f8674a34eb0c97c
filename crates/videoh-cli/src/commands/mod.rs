//! CLI command implementations.

pub mod bundle;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use videoh_bundler::OutputResolver;
use videoh_config::load_hook_config;
use videoh_core::hook::HookConfig;
use videoh_core::target::OutputQuery;
use videoh_executor::{AwsCli, ProcessRunner};

const DEFAULT_CONFIG: &str = "bundle.kdl";

/// AWS settings given on the command line; they win over the config file.
#[derive(Debug, Default)]
pub struct AwsOverrides {
    pub region: Option<String>,
    pub profile: Option<String>,
}

/// Load the hook configuration.
///
/// An explicit path must exist. Without one, `./bundle.kdl` is used when
/// present and the built-in vide-oh hook otherwise.
pub fn load_hook(path: Option<&Path>, aws: &AwsOverrides) -> Result<HookConfig> {
    let mut hook = match path {
        Some(path) => load_hook_config(path)
            .with_context(|| format!("Failed to load hook config: {}", path.display()))?,
        None if Path::new(DEFAULT_CONFIG).exists() => load_hook_config(Path::new(DEFAULT_CONFIG))
            .with_context(|| format!("Failed to load hook config: {}", DEFAULT_CONFIG))?,
        None => {
            info!("No {} found; using the built-in hook", DEFAULT_CONFIG);
            HookConfig::default()
        }
    };

    if aws.region.is_some() {
        hook.aws.region = aws.region.clone();
    }
    if aws.profile.is_some() {
        hook.aws.profile = aws.profile.clone();
    }

    Ok(hook)
}

/// AWS CLI client running through the local process runner.
pub fn aws_client(hook: &HookConfig) -> Arc<AwsCli> {
    Arc::new(AwsCli::new(Arc::new(ProcessRunner::new()), hook.aws.clone()))
}

pub async fn output(hook: HookConfig, stack: &str, key: &str) -> Result<()> {
    let resolver = OutputResolver::new(aws_client(&hook))
        .strict(hook.strict_outputs)
        .require_deployed(hook.require_deployed);

    let value = resolver.resolve(&OutputQuery::new(stack, key)).await?;
    println!("{}", value);
    Ok(())
}

pub fn validate(path: &Path) -> Result<()> {
    let hook = load_hook_config(path)
        .with_context(|| format!("Configuration error in {}", path.display()))?;

    println!(
        "Configuration is valid: {} entries, {} build steps",
        hook.entries.len(),
        hook.steps.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.kdl");
        std::fs::write(
            &path,
            "aws region=\"us-east-1\" profile=\"ci\"\nliteral \"A\" \"1\"\n",
        )
        .unwrap();

        let overrides = AwsOverrides {
            region: Some("eu-west-1".to_string()),
            profile: None,
        };
        let hook = load_hook(Some(&path), &overrides).unwrap();

        assert_eq!(hook.aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(hook.aws.profile.as_deref(), Some("ci"));
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.kdl");
        assert!(load_hook(Some(&path), &AwsOverrides::default()).is_err());
    }

    #[test]
    fn test_validate_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.kdl");
        std::fs::write(&path, "project \"fe\"\n").unwrap();
        assert!(validate(&path).is_err());

        std::fs::write(&path, "credential \"API_KEY\" name=\"videohApiKey\"\n").unwrap();
        assert!(validate(&path).is_ok());
    }
}
