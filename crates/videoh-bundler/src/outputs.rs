//! Output resolution against deployed stacks.

use std::sync::Arc;
use tracing::{debug, info, warn};
use videoh_core::target::{OutputQuery, OutputSource};
use videoh_core::{Error, Result};

/// Resolves published outputs of deployment targets.
///
/// Every call queries the control plane again; nothing is cached.
pub struct OutputResolver {
    source: Arc<dyn OutputSource>,
    /// Raise `OutputNotFound` instead of returning an empty value.
    strict: bool,
    /// Check the target's lifecycle state before reading the output.
    require_deployed: bool,
}

impl OutputResolver {
    pub fn new(source: Arc<dyn OutputSource>) -> Self {
        Self {
            source,
            strict: true,
            require_deployed: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn require_deployed(mut self, require: bool) -> Self {
        self.require_deployed = require;
        self
    }

    /// Resolve one output to its trimmed value.
    pub async fn resolve(&self, query: &OutputQuery) -> Result<String> {
        if self.require_deployed {
            let state = self.source.state(&query.target).await?;
            if !state.is_deployed() {
                return Err(Error::TargetNotDeployed {
                    target: query.target.to_string(),
                    status: state.to_string(),
                });
            }
            debug!(target = %query.target, state = %state, "Target is deployed");
        }

        let value = self.source.output(query).await?.trim().to_string();

        if value.is_empty() {
            if self.strict {
                return Err(Error::OutputNotFound {
                    target: query.target.to_string(),
                    key: query.key.clone(),
                });
            }
            warn!(
                target = %query.target,
                key = %query.key,
                "Output is empty; writing an empty value"
            );
        }

        info!(
            source = self.source.name(),
            target = %query.target,
            key = %query.key,
            value = %value,
            "Resolved output"
        );
        Ok(value)
    }
}
