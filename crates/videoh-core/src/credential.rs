//! Credential records and the credential store abstraction.

use async_trait::async_trait;
use serde::Deserialize;

use crate::{Error, Result};

/// A named secret issued by an external access-control service.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credential {
    pub name: String,
    pub value: String,
}

impl Credential {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The value with all but a short prefix hidden, for logs.
    pub fn masked(&self) -> String {
        mask(&self.value)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("value", &self.masked())
            .finish()
    }
}

/// Hide a secret value, keeping at most three leading characters.
pub fn mask(value: &str) -> String {
    let visible: String = value.chars().take(3).collect();
    if value.chars().count() <= 6 {
        "***".to_string()
    } else {
        format!("{}***", visible)
    }
}

/// Pick the credential whose name matches exactly.
///
/// Zero matches is `CredentialNotFound`; with several matches the first one
/// in listing order wins.
pub fn select(name: &str, issued: Vec<Credential>) -> Result<Credential> {
    issued
        .into_iter()
        .find(|c| c.name == name)
        .ok_or_else(|| Error::CredentialNotFound(name.to_string()))
}

/// Trait for services that issue credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Name of this store.
    fn name(&self) -> &'static str;

    /// List currently active credentials, narrowed by a name filter.
    ///
    /// An empty list is a valid response.
    async fn list(&self, name_filter: &str) -> Result<Vec<Credential>>;
}
