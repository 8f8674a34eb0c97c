//! Runs the front-end build steps.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use videoh_config::HookContext;
use videoh_core::command::{CommandRunner, CommandSpec};
use videoh_core::hook::BuildStep;
use videoh_core::{Error, Result};

/// Timing and exit code of one finished step.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub name: String,
    pub command: String,
    pub exit_code: Option<i32>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Outcome of a build whose steps all exited 0.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildResult {
    pub steps: Vec<StepReport>,
}

impl BuildResult {
    pub fn succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.exit_code == Some(0))
    }
}

/// Runs build steps one after another inside the project directory.
pub struct BuildInvoker {
    runner: Arc<dyn CommandRunner>,
}

impl BuildInvoker {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Run `steps` in order. The first step that exits non-zero aborts the
    /// build with `BuildStepFailed`; later steps are never started.
    pub async fn build(
        &self,
        project_dir: &Path,
        steps: &[BuildStep],
        ctx: &HookContext,
    ) -> Result<BuildResult> {
        let mut result = BuildResult::default();

        for step in steps {
            let spec = CommandSpec::new(ctx.interpolate(&step.program))
                .args(ctx.interpolate_vec(&step.args))
                .current_dir(project_dir);

            info!(step = %step.name, command = %spec, "Running build step");
            let outcome = self.runner.stream(&spec).await?;

            if !outcome.succeeded() {
                error!(step = %step.name, exit_code = ?outcome.exit_code, "Build step failed");
                return Err(Error::BuildStepFailed {
                    step: step.name.clone(),
                    exit_code: outcome.exit_code,
                });
            }

            result.steps.push(StepReport {
                name: step.name.clone(),
                command: spec.to_string(),
                exit_code: outcome.exit_code,
                started_at: outcome.started_at,
                finished_at: outcome.finished_at,
            });
        }

        info!(steps = result.steps.len(), "Build succeeded");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use videoh_core::command::{CommandOutput, RunOutcome};
    use videoh_core::hook::default_steps;

    /// Exits with a scripted code per program+args and records every call.
    #[derive(Default)]
    struct StubRunner {
        exit_codes: HashMap<String, i32>,
        calls: Mutex<Vec<CommandSpec>>,
    }

    impl StubRunner {
        fn failing(command: &str, code: i32) -> Self {
            Self {
                exit_codes: HashMap::from([(command.to_string(), code)]),
                ..Default::default()
            }
        }

        fn commands(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|s| s.to_string()).collect()
        }
    }

    #[async_trait]
    impl CommandRunner for StubRunner {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn capture(&self, _spec: &CommandSpec) -> Result<CommandOutput> {
            unimplemented!()
        }

        async fn stream(&self, spec: &CommandSpec) -> Result<RunOutcome> {
            self.calls.lock().unwrap().push(spec.clone());
            let now = Utc::now();
            Ok(RunOutcome {
                exit_code: Some(*self.exit_codes.get(&spec.to_string()).unwrap_or(&0)),
                started_at: now,
                finished_at: now,
            })
        }
    }

    fn ctx() -> HookContext {
        HookContext::new(Path::new("/srv/fe"), Path::new("/asset-output"))
    }

    #[tokio::test]
    async fn test_steps_run_in_order_in_project_dir() {
        let runner = Arc::new(StubRunner::default());
        let invoker = BuildInvoker::new(runner.clone());

        let result = invoker
            .build(Path::new("/srv/fe"), &default_steps(), &ctx())
            .await
            .unwrap();

        assert!(result.succeeded());
        assert_eq!(runner.commands(), vec!["npm ci", "npm run build"]);
        let calls = runner.calls.lock().unwrap();
        assert!(calls
            .iter()
            .all(|c| c.working_dir.as_deref() == Some(Path::new("/srv/fe"))));
    }

    #[tokio::test]
    async fn test_failed_install_skips_build() {
        let runner = Arc::new(StubRunner::failing("npm ci", 1));
        let invoker = BuildInvoker::new(runner.clone());

        let err = invoker
            .build(Path::new("/srv/fe"), &default_steps(), &ctx())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::BuildStepFailed { step, exit_code: Some(1) } if step == "install"
        ));
        assert_eq!(runner.commands(), vec!["npm ci"]);
    }

    #[tokio::test]
    async fn test_step_arguments_are_interpolated() {
        let runner = Arc::new(StubRunner::default());
        let invoker = BuildInvoker::new(runner.clone());
        let steps = vec![BuildStep::new("copy", "cp", ["-r", "dist/.", "${output_dir}"])];

        invoker
            .build(Path::new("/srv/fe"), &steps, &ctx())
            .await
            .unwrap();
        assert_eq!(runner.commands(), vec!["cp -r dist/. /asset-output"]);
    }
}
