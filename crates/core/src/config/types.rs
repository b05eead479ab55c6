use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::acquirer::AcquirerConfig;
use crate::composer::LabelSettings;
use crate::orchestrator::OrchestratorConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub shop: ShopConfig,
    pub hotfolder: HotfolderConfig,
    pub label: LabelSettings,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub staging: StagingConfig,
    #[serde(default)]
    pub cuts: CutsConfig,
    #[serde(default)]
    pub acquirer: AcquirerConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Upstream shop API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShopConfig {
    /// Base URL of the storefront REST API (e.g. "https://shop.example.com/wp-json/wc/v3")
    pub base_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// Hotfolder configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HotfolderConfig {
    /// Directory watched by the production equipment
    pub path: PathBuf,
}

/// Ledger configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("skinpress.db")
}

/// Staging area for fetched assets and intermediate documents
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StagingConfig {
    #[serde(default = "default_staging_path")]
    pub path: PathBuf,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            path: default_staging_path(),
        }
    }
}

fn default_staging_path() -> PathBuf {
    PathBuf::from("staging")
}

/// Cut template directory; templates are stored as `<print_id>.svg`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CutsConfig {
    #[serde(default = "default_cuts_path")]
    pub path: PathBuf,
}

impl Default for CutsConfig {
    fn default() -> Self {
        Self {
            path: default_cuts_path(),
        }
    }
}

fn default_cuts_path() -> PathBuf {
    PathBuf::from("cuts")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[shop]
base_url = "https://shop.example.com/wp-json/wc/v3"
consumer_key = "ck_test"
consumer_secret = "cs_test"

[hotfolder]
path = "/print/hotfolder"

[label]
sender_name = "Acme Prints"
sender_street = "Main Street 1"
sender_postalcode = "12345"
sender_city = "Springfield"
sender_country = "Germany"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.shop.consumer_key, "ck_test");
        assert_eq!(config.shop.timeout_secs, 30);
        assert_eq!(config.hotfolder.path.to_str().unwrap(), "/print/hotfolder");
        assert_eq!(config.ledger.path.to_str().unwrap(), "skinpress.db");
        assert_eq!(config.staging.path.to_str().unwrap(), "staging");
        assert_eq!(config.cuts.path.to_str().unwrap(), "cuts");
    }

    #[test]
    fn test_deserialize_missing_shop_fails() {
        let toml = r#"
[hotfolder]
path = "/print/hotfolder"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_custom_paths() {
        let toml = r#"
[shop]
base_url = "https://shop.example.com/wp-json/wc/v3"
consumer_key = "ck"
consumer_secret = "cs"
timeout_secs = 10

[hotfolder]
path = "/hot"

[ledger]
path = "/data/orders.db"

[staging]
path = "/tmp/skinpress"

[cuts]
path = "/print/cuts"

[label]
sender_name = "Acme Prints"
sender_street = "Main Street 1"
sender_postalcode = "12345"
sender_city = "Springfield"
sender_country = "Germany"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.shop.timeout_secs, 10);
        assert_eq!(config.ledger.path.to_str().unwrap(), "/data/orders.db");
        assert_eq!(config.staging.path.to_str().unwrap(), "/tmp/skinpress");
        assert_eq!(config.cuts.path.to_str().unwrap(), "/print/cuts");
    }
}
