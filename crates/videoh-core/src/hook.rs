//! Packaging hook definitions.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::client::{API_KEY, REST_API_BASE_URL, WEBSOCKET_API_BASE_URL};
use crate::target::OutputQuery;

/// Full definition of one packaging hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookConfig {
    /// Front-end project directory.
    pub project: PathBuf,
    /// Generated configuration file, relative to the project.
    pub env_file: PathBuf,
    /// Build output directory, relative to the project.
    pub dist: PathBuf,
    /// Prefix prepended to every generated key.
    pub prefix: String,
    /// Treat an empty output value as `OutputNotFound`.
    pub strict_outputs: bool,
    /// Write the generated file through a temporary file and rename.
    pub atomic_write: bool,
    /// Check the target's lifecycle state before reading outputs.
    pub require_deployed: bool,
    /// Control-plane settings.
    pub aws: AwsSettings,
    /// Generated configuration entries, in file order.
    pub entries: Vec<ConfigEntry>,
    /// Build steps, run in order.
    pub steps: Vec<BuildStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwsSettings {
    pub region: Option<String>,
    pub profile: Option<String>,
}

/// One line of the generated configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    /// Key without the hook prefix.
    pub key: String,
    pub source: ValueSource,
}

/// Where an entry's value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueSource {
    /// A published output of a deployment target.
    Output(OutputQuery),
    /// A credential resolved by exact name.
    Credential { name: String },
    /// A fixed value (after variable interpolation).
    Literal { value: String },
}

/// An external command run inside the project directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStep {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
}

impl BuildStep {
    pub fn new<I, S>(name: impl Into<String>, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl ConfigEntry {
    pub fn output(key: impl Into<String>, target: &str, output_key: &str) -> Self {
        Self {
            key: key.into(),
            source: ValueSource::Output(OutputQuery::new(target, output_key)),
        }
    }

    pub fn credential(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source: ValueSource::Credential { name: name.into() },
        }
    }

    pub fn literal(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source: ValueSource::Literal {
                value: value.into(),
            },
        }
    }
}

/// Install then build with npm.
pub fn default_steps() -> Vec<BuildStep> {
    vec![
        BuildStep::new("install", "npm", ["ci"]),
        BuildStep::new("build", "npm", ["run", "build"]),
    ]
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            project: PathBuf::from("../vide-oh-fe"),
            env_file: PathBuf::from(".env"),
            dist: PathBuf::from("dist"),
            prefix: String::new(),
            strict_outputs: true,
            atomic_write: true,
            require_deployed: false,
            aws: AwsSettings::default(),
            entries: vec![
                ConfigEntry::output(REST_API_BASE_URL, "vide-oh-dev", "ServiceEndpoint"),
                ConfigEntry::credential(API_KEY, "videohApiKey"),
                ConfigEntry::output(
                    WEBSOCKET_API_BASE_URL,
                    "videoh-websocket",
                    "WebSocketApiEndpoint",
                ),
            ],
            steps: default_steps(),
        }
    }
}

impl HookConfig {
    /// Absolute or project-relative path of the generated file.
    pub fn env_file_path(&self) -> PathBuf {
        join_relative(&self.project, &self.env_file)
    }

    /// Absolute or project-relative path of the build output.
    pub fn dist_path(&self) -> PathBuf {
        join_relative(&self.project, &self.dist)
    }

    /// Entries backed by deployment outputs.
    pub fn output_queries(&self) -> impl Iterator<Item = &OutputQuery> {
        self.entries.iter().filter_map(|e| match &e.source {
            ValueSource::Output(query) => Some(query),
            _ => None,
        })
    }

    /// Names of the credentials this hook needs, in entry order.
    pub fn credential_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match &e.source {
            ValueSource::Credential { name } => Some(name.as_str()),
            _ => None,
        })
    }

    /// Key as written to the generated file.
    pub fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

fn join_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
