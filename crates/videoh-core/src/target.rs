//! Deployment targets and their published outputs.

use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A previously provisioned stack, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct DeploymentTarget(String);

impl DeploymentTarget {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// A request for one published output of one deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputQuery {
    pub target: DeploymentTarget,
    pub key: String,
}

impl OutputQuery {
    pub fn new(target: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            target: DeploymentTarget::new(target),
            key: key.into(),
        }
    }
}

impl std::fmt::Display for OutputQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.target, self.key)
    }
}

/// Lifecycle state of a deployment target as reported by the control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    /// A stable `*_COMPLETE` state; outputs are readable.
    Deployed(String),
    /// An operation is still running against the target.
    InProgress(String),
    /// Creation or an update failed and was not recovered.
    Failed(String),
    /// The target was deleted.
    Deleted,
    /// The control plane does not know the target.
    Missing,
}

impl TargetState {
    /// Classify a raw control-plane status such as `UPDATE_COMPLETE`.
    pub fn classify(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "" | "None" => TargetState::Missing,
            "DELETE_COMPLETE" => TargetState::Deleted,
            "ROLLBACK_COMPLETE" => TargetState::Failed(raw.to_string()),
            s if s.ends_with("_IN_PROGRESS") => TargetState::InProgress(s.to_string()),
            s if s.ends_with("_FAILED") => TargetState::Failed(s.to_string()),
            s if s.ends_with("_COMPLETE") => TargetState::Deployed(s.to_string()),
            s => TargetState::Failed(s.to_string()),
        }
    }

    pub fn is_deployed(&self) -> bool {
        matches!(self, TargetState::Deployed(_))
    }
}

impl std::fmt::Display for TargetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetState::Deployed(s) | TargetState::InProgress(s) | TargetState::Failed(s) => {
                write!(f, "{}", s)
            }
            TargetState::Deleted => write!(f, "deleted"),
            TargetState::Missing => write!(f, "missing"),
        }
    }
}

/// Trait for infrastructure control planes that publish stack outputs.
#[async_trait]
pub trait OutputSource: Send + Sync {
    /// Name of this source.
    fn name(&self) -> &'static str;

    /// Fetch the raw value of an output.
    ///
    /// A miss is reported as an empty string, not an error; callers decide
    /// whether an empty value is acceptable.
    async fn output(&self, query: &OutputQuery) -> Result<String>;

    /// Fetch the lifecycle state of a target.
    async fn state(&self, target: &DeploymentTarget) -> Result<TargetState>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_stable_states() {
        assert!(TargetState::classify("CREATE_COMPLETE").is_deployed());
        assert!(TargetState::classify("UPDATE_COMPLETE").is_deployed());
        assert!(TargetState::classify("UPDATE_ROLLBACK_COMPLETE").is_deployed());
        assert!(TargetState::classify(" IMPORT_COMPLETE\n").is_deployed());
    }

    #[test]
    fn test_classify_unusable_states() {
        assert_eq!(TargetState::classify("DELETE_COMPLETE"), TargetState::Deleted);
        assert_eq!(TargetState::classify(""), TargetState::Missing);
        assert_eq!(TargetState::classify("None"), TargetState::Missing);
        assert_eq!(
            TargetState::classify("ROLLBACK_COMPLETE"),
            TargetState::Failed("ROLLBACK_COMPLETE".to_string())
        );
        assert_eq!(
            TargetState::classify("UPDATE_IN_PROGRESS"),
            TargetState::InProgress("UPDATE_IN_PROGRESS".to_string())
        );
        assert_eq!(
            TargetState::classify("CREATE_FAILED"),
            TargetState::Failed("CREATE_FAILED".to_string())
        );
    }

    #[test]
    fn test_query_display() {
        let query = OutputQuery::new("vide-oh-dev", "ServiceEndpoint");
        assert_eq!(query.to_string(), "vide-oh-dev/ServiceEndpoint");
        assert_eq!(query.target.name(), "vide-oh-dev");
    }
}
