//! Credential resolution.

use std::sync::Arc;
use tracing::{info, warn};
use videoh_core::Result;
use videoh_core::credential::{self, Credential, CredentialStore};

/// Resolves a credential's current value by exact name.
pub struct CredentialResolver {
    store: Arc<dyn CredentialStore>,
}

impl CredentialResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Fails with `CredentialNotFound` when no issued credential has this
    /// name. With several matches the first listed one is used.
    pub async fn resolve(&self, name: &str) -> Result<Credential> {
        let issued = self.store.list(name).await?;
        let matches = issued.iter().filter(|c| c.name == name).count();
        if matches > 1 {
            warn!(name = %name, matches, "Several credentials match; using the first");
        }

        let found = credential::select(name, issued)?;
        info!(store = self.store.name(), name = %name, value = %found.masked(), "Resolved credential");
        Ok(found)
    }
}
