//! The generated `KEY=VALUE` configuration consumed by the front-end build.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Ordered key-value pairs rendered one per line.
///
/// Values are written verbatim: no quoting, no escaping of `=` or newlines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedConfig {
    pairs: Vec<(String, String)>,
}

impl GeneratedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair, keeping insertion order.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.pairs.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Render as newline-terminated `KEY=VALUE` lines.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.pairs {
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    /// Parse `KEY=VALUE` text. Blank lines and `#` comments are skipped and
    /// the value is everything after the first `=`.
    pub fn parse(text: &str) -> Result<Self> {
        let mut config = Self::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                Error::InvalidInput(format!("line {}: expected KEY=VALUE", idx + 1))
            })?;
            config.push(key.trim(), value);
        }
        Ok(config)
    }
}

impl FromIterator<(String, String)> for GeneratedConfig {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}
