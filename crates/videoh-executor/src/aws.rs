//! AWS CLI backed control-plane queries.
//!
//! Stack outputs come from CloudFormation and credentials from API Gateway
//! API keys. Both are read by running the `aws` binary through a
//! [`CommandRunner`].

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};
use videoh_core::command::{CommandOutput, CommandRunner, CommandSpec};
use videoh_core::credential::{Credential, CredentialStore};
use videoh_core::hook::AwsSettings;
use videoh_core::target::{DeploymentTarget, OutputQuery, OutputSource, TargetState};
use videoh_core::{Error, Result};

/// Client for the `aws` command-line tool.
pub struct AwsCli {
    runner: Arc<dyn CommandRunner>,
    /// Path to aws binary
    aws_bin: String,
    settings: AwsSettings,
}

impl AwsCli {
    pub fn new(runner: Arc<dyn CommandRunner>, settings: AwsSettings) -> Self {
        let aws_bin = std::env::var("AWS_CLI_BIN").unwrap_or_else(|_| "aws".to_string());
        Self::with_binary(runner, settings, aws_bin)
    }

    pub fn with_binary(
        runner: Arc<dyn CommandRunner>,
        settings: AwsSettings,
        aws_bin: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            aws_bin: aws_bin.into(),
            settings,
        }
    }

    fn command<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut spec = CommandSpec::new(&self.aws_bin).args(args);
        if let Some(region) = &self.settings.region {
            spec = spec.args(["--region", region.as_str()]);
        }
        if let Some(profile) = &self.settings.profile {
            spec = spec.args(["--profile", profile.as_str()]);
        }
        spec
    }

    fn describe_stack(&self, stack: &str, query: String) -> CommandSpec {
        self.command([
            "cloudformation".to_string(),
            "describe-stacks".to_string(),
            "--stack-name".to_string(),
            stack.to_string(),
            "--query".to_string(),
            query,
            "--output".to_string(),
            "text".to_string(),
        ])
    }
}

/// CloudFormation reports an unknown stack as a `ValidationError`.
fn is_missing_stack(stderr: &str) -> bool {
    stderr.contains("ValidationError") && stderr.contains("does not exist")
}

fn query_failed(operation: &str, output: &CommandOutput) -> Error {
    Error::QueryFailed(format!(
        "{} exited with {:?}: {}",
        operation,
        output.exit_code,
        output.stderr.trim()
    ))
}

/// Text output of a JMESPath query, with the CLI's `None` mapped to empty.
fn text_value(stdout: &str) -> String {
    let value = stdout.trim();
    if value == "None" {
        String::new()
    } else {
        value.to_string()
    }
}

#[async_trait]
impl OutputSource for AwsCli {
    fn name(&self) -> &'static str {
        "cloudformation"
    }

    async fn output(&self, query: &OutputQuery) -> Result<String> {
        let jmes = format!(
            "Stacks[0].Outputs[?OutputKey=='{}'].OutputValue",
            query.key
        );
        let spec = self.describe_stack(query.target.name(), jmes);
        let output = self.runner.capture(&spec).await?;

        if !output.success() {
            if !is_missing_stack(&output.stderr) {
                return Err(query_failed("describe-stacks", &output));
            }
            // Unknown stacks are reported as a miss
            warn!(
                target = %query.target,
                key = %query.key,
                stderr = %output.stderr.trim(),
                "Stack does not exist"
            );
            return Ok(String::new());
        }

        let value = text_value(&output.stdout);
        debug!(target = %query.target, key = %query.key, empty = value.is_empty(), "Fetched stack output");
        Ok(value)
    }

    async fn state(&self, target: &DeploymentTarget) -> Result<TargetState> {
        let spec = self.describe_stack(target.name(), "Stacks[0].StackStatus".to_string());
        let output = self.runner.capture(&spec).await?;

        if !output.success() {
            if !is_missing_stack(&output.stderr) {
                return Err(query_failed("describe-stacks", &output));
            }
            debug!(target = %target, stderr = %output.stderr.trim(), "Stack not found");
            return Ok(TargetState::Missing);
        }

        Ok(TargetState::classify(&output.stdout))
    }
}

#[async_trait]
impl CredentialStore for AwsCli {
    fn name(&self) -> &'static str {
        "apigateway"
    }

    async fn list(&self, name_filter: &str) -> Result<Vec<Credential>> {
        let spec = self.command([
            "apigateway".to_string(),
            "get-api-keys".to_string(),
            "--query".to_string(),
            format!("items[?name==`{}`]", name_filter),
            "--include-values".to_string(),
            "--output".to_string(),
            "json".to_string(),
        ]);
        let output = self.runner.capture(&spec).await?;

        if !output.success() {
            return Err(query_failed("get-api-keys", &output));
        }

        let keys: Option<Vec<Credential>> = serde_json::from_str(output.stdout.trim())
            .map_err(|e| Error::QueryFailed(format!("invalid get-api-keys output: {}", e)))?;
        let keys = keys.unwrap_or_default();

        info!(filter = %name_filter, count = keys.len(), "Listed API keys");
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use videoh_core::command::RunOutcome;

    /// Returns one canned output and records every command.
    struct ScriptedRunner {
        output: CommandOutput,
        calls: Mutex<Vec<CommandSpec>>,
    }

    impl ScriptedRunner {
        fn new(exit_code: i32, stdout: &str, stderr: &str) -> Arc<Self> {
            Arc::new(Self {
                output: CommandOutput {
                    exit_code: Some(exit_code),
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                },
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<CommandSpec> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for ScriptedRunner {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn capture(&self, spec: &CommandSpec) -> Result<CommandOutput> {
            self.calls.lock().unwrap().push(spec.clone());
            Ok(self.output.clone())
        }

        async fn stream(&self, _spec: &CommandSpec) -> Result<RunOutcome> {
            unimplemented!()
        }
    }

    const MISSING_STACK: &str = "An error occurred (ValidationError) when calling the \
         DescribeStacks operation: Stack with id nope does not exist";

    fn cli(runner: Arc<ScriptedRunner>) -> AwsCli {
        AwsCli::with_binary(runner, AwsSettings::default(), "aws")
    }

    #[tokio::test]
    async fn test_output_is_trimmed() {
        let runner = ScriptedRunner::new(0, "https://api.example\n", "");
        let value = cli(runner.clone())
            .output(&OutputQuery::new("vide-oh-dev", "ServiceEndpoint"))
            .await
            .unwrap();

        assert_eq!(value, "https://api.example");
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].to_string(),
            "aws cloudformation describe-stacks --stack-name vide-oh-dev \
             --query Stacks[0].Outputs[?OutputKey=='ServiceEndpoint'].OutputValue --output text"
        );
    }

    #[tokio::test]
    async fn test_output_miss_is_empty() {
        let none = ScriptedRunner::new(0, "None\n", "");
        let value = cli(none)
            .output(&OutputQuery::new("vide-oh-dev", "Missing"))
            .await
            .unwrap();
        assert_eq!(value, "");

        let unknown_stack = ScriptedRunner::new(255, "", MISSING_STACK);
        let value = cli(unknown_stack)
            .output(&OutputQuery::new("nope", "ServiceEndpoint"))
            .await
            .unwrap();
        assert_eq!(value, "");
    }

    #[tokio::test]
    async fn test_output_query_errors_are_not_misses() {
        let expired = ScriptedRunner::new(
            254,
            "",
            "An error occurred (ExpiredToken) when calling the DescribeStacks operation: \
             The security token included in the request is expired",
        );
        let err = cli(expired)
            .output(&OutputQuery::new("vide-oh-dev", "ServiceEndpoint"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::QueryFailed(msg) if msg.contains("ExpiredToken")));

        let denied = ScriptedRunner::new(254, "", "An error occurred (AccessDenied)");
        let err = cli(denied)
            .state(&DeploymentTarget::new("vide-oh-dev"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::QueryFailed(_)));
    }

    #[tokio::test]
    async fn test_region_and_profile_are_forwarded() {
        let runner = ScriptedRunner::new(0, "x", "");
        let settings = AwsSettings {
            region: Some("eu-west-1".to_string()),
            profile: Some("dev".to_string()),
        };
        let aws = AwsCli::with_binary(runner.clone(), settings, "/opt/aws");
        aws.output(&OutputQuery::new("s", "k")).await.unwrap();

        let spec = &runner.calls()[0];
        assert_eq!(spec.program, "/opt/aws");
        assert!(spec.to_string().ends_with("--region eu-west-1 --profile dev"));
    }

    #[tokio::test]
    async fn test_state_classification() {
        let runner = ScriptedRunner::new(0, "UPDATE_COMPLETE\n", "");
        let state = cli(runner)
            .state(&DeploymentTarget::new("vide-oh-dev"))
            .await
            .unwrap();
        assert!(state.is_deployed());

        let runner = ScriptedRunner::new(255, "", MISSING_STACK);
        let state = cli(runner)
            .state(&DeploymentTarget::new("gone"))
            .await
            .unwrap();
        assert_eq!(state, TargetState::Missing);
    }

    #[tokio::test]
    async fn test_list_api_keys() {
        let json = r#"[
            {"id": "k1", "name": "videohApiKey", "value": "abc123", "enabled": true}
        ]"#;
        let runner = ScriptedRunner::new(0, json, "");
        let keys = cli(runner.clone()).list("videohApiKey").await.unwrap();

        assert_eq!(keys, vec![Credential::new("videohApiKey", "abc123")]);
        let args = &runner.calls()[0].args;
        assert!(args.contains(&"items[?name==`videohApiKey`]".to_string()));
        assert!(args.contains(&"--include-values".to_string()));
    }

    #[tokio::test]
    async fn test_list_empty_and_null() {
        let keys = cli(ScriptedRunner::new(0, "[]\n", ""))
            .list("videohApiKey")
            .await
            .unwrap();
        assert!(keys.is_empty());

        let keys = cli(ScriptedRunner::new(0, "null\n", ""))
            .list("videohApiKey")
            .await
            .unwrap();
        assert!(keys.is_empty());
    }

    #[tokio::test]
    async fn test_list_failures() {
        let err = cli(ScriptedRunner::new(254, "", "AccessDenied"))
            .list("videohApiKey")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::QueryFailed(msg) if msg.contains("AccessDenied")));

        let err = cli(ScriptedRunner::new(0, "not json", ""))
            .list("videohApiKey")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::QueryFailed(_)));
    }
}
