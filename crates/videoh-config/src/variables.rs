//! Variable interpolation for build steps and literal entries.
//!
//! Supports variables like:
//! - `${project}` - Front-end project directory
//! - `${output_dir}` - Directory the packaging step collects
//! - `${env.VAR_NAME}` - Environment variable

use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

// Regex for matching ${...} variables
static VAR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)?)\}").unwrap()
});

/// Values available to one packaging run.
#[derive(Debug, Clone, Default)]
pub struct HookContext {
    pub project: String,
    pub output_dir: String,
    pub env: HashMap<String, String>,
}

impl HookContext {
    pub fn new(project: &Path, output_dir: &Path) -> Self {
        Self {
            project: project.display().to_string(),
            output_dir: output_dir.display().to_string(),
            env: HashMap::new(),
        }
    }

    /// Populate environment variables from the current process environment.
    pub fn populate_env(&mut self) {
        for (key, value) in std::env::vars() {
            self.env.insert(key, value);
        }
    }

    /// Resolve a variable name to its value.
    pub fn resolve(&self, var_name: &str) -> Option<String> {
        let parts: Vec<&str> = var_name.split('.').collect();

        match parts.as_slice() {
            ["project"] => Some(self.project.clone()),
            ["output_dir"] => Some(self.output_dir.clone()),
            ["env", name] => self.env.get(*name).cloned(),
            _ => None,
        }
    }

    /// Interpolate all variables in a string. Unknown variables are left
    /// as written.
    pub fn interpolate(&self, input: &str) -> String {
        VAR_REGEX
            .replace_all(input, |caps: &regex::Captures| {
                let var_name = &caps[1];
                self.resolve(var_name)
                    .unwrap_or_else(|| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// Interpolate variables in a list of strings.
    pub fn interpolate_vec(&self, inputs: &[String]) -> Vec<String> {
        inputs.iter().map(|s| self.interpolate(s)).collect()
    }
}
