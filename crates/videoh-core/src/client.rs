//! Explicit configuration for the front-end API client.
//!
//! The client is constructed from this object at startup instead of reading
//! process-wide environment variables.

use serde::{Deserialize, Serialize};

use crate::generated::GeneratedConfig;
use crate::{Error, Result};

pub const REST_API_BASE_URL: &str = "REST_API_BASE_URL";
pub const API_KEY: &str = "API_KEY";
pub const WEBSOCKET_API_BASE_URL: &str = "WEBSOCKET_API_BASE_URL";

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub websocket_url: Option<String>,
}

impl ApiClientConfig {
    /// Read the client settings out of a generated configuration whose keys
    /// carry `prefix` (empty when unprefixed).
    pub fn from_generated(config: &GeneratedConfig, prefix: &str) -> Result<Self> {
        let lookup = |name: &str| config.get(&format!("{}{}", prefix, name));
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| Error::InvalidInput(format!("missing {}{}", prefix, name)))
        };

        Ok(Self {
            base_url: required(REST_API_BASE_URL)?,
            api_key: required(API_KEY)?,
            websocket_url: lookup(WEBSOCKET_API_BASE_URL)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        })
    }

    /// Headers attached to every request.
    pub fn default_headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", "application/json".to_string()),
            (API_KEY_HEADER, self.api_key.clone()),
        ]
    }
}
