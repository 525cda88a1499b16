//! Configuration objects for the retrieval and export collaborators
//!
//! Configuration is constructed once at startup (from a JSON file or an
//! in-memory string) and passed by reference into the collaborators that
//! need it. Nothing here re-reads files on use.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Per-outlet settings for the accounting-system export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutletConfig {
    /// Customer display name used on generated invoices
    pub customer_name: String,
    /// Prefix prepended to every exported product name
    pub product_name_prefix: String,
    /// Tax label; an empty string means no tax name column is emitted
    #[serde(default)]
    pub tax_name: String,
    /// Mapping from POS payment method to external account code
    pub payment_method_accounts: HashMap<String, String>,
    /// Tag string attached to every exported row
    #[serde(default)]
    pub tag: String,
}

/// Export configuration covering all known outlets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    pub outlets: HashMap<String, OutletConfig>,
}

impl ExportConfig {
    /// Load the export configuration from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse the export configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Known outlet keys, sorted for stable error messages
    pub fn outlet_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.outlets.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Login credentials and outlet id for one outlet on the POS export service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutletCredentials {
    pub email: String,
    pub password: String,
    pub outlet_id: u64,
}

/// Credentials configuration for the POS export service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Base URL of the export service API
    pub base_url: String,
    pub outlets: HashMap<String, OutletCredentials>,
}

impl CredentialsConfig {
    /// Load the credentials configuration from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Parse the credentials configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Known outlet keys, sorted for stable error messages
    pub fn outlet_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.outlets.keys().cloned().collect();
        keys.sort();
        keys
    }
}

/// Errors that can occur while loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
