//! Configuration for the election node

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Node ID, used in logs
    pub node_id: String,

    /// Ledger configuration
    pub ledger: vote_ledger::Config,

    /// Engine behaviour
    pub engine: EngineSettings,

    /// Known callers
    pub identity: IdentityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_id: "node-1".to_string(),
            ledger: vote_ledger::Config::default(),
            engine: EngineSettings::default(),
            identity: IdentityConfig::default(),
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Attribute that marks a caller as election admin
    pub admin_attribute: String,

    /// Value the admin attribute must carry
    pub admin_value: String,

    /// Answer of `initStatusQuery` when the ledger read fails
    pub init_status_on_read_error: InitStatusFallback,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            admin_attribute: "admin".to_string(),
            admin_value: "true".to_string(),
            init_status_on_read_error: InitStatusFallback::default(),
        }
    }
}

/// Behaviour of `initStatusQuery` on a failed ledger read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStatusFallback {
    /// Answer `true`
    #[default]
    ReportInitialized,
    /// Fail the query
    Propagate,
}

/// Identity registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Accept signed invocations from keys not listed in `members`
    pub allow_unregistered: bool,

    /// Registered members
    pub members: Vec<MemberConfig>,
}

/// A registered caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberConfig {
    /// Ed25519 public key (hex)
    pub public_key: String,

    /// Verified attributes, e.g. `admin = "true"`
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(node_id) = std::env::var("ELECTION_NODE_ID") {
            config.node_id = node_id;
        }

        if let Ok(data_dir) = std::env::var("ELECTION_DATA_DIR") {
            config.ledger.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(allow) = std::env::var("ELECTION_ALLOW_UNREGISTERED") {
            config.identity.allow_unregistered = allow.parse().map_err(|_| {
                crate::Error::Config(format!(
                    "ELECTION_ALLOW_UNREGISTERED must be true or false, got {:?}",
                    allow
                ))
            })?;
        }

        Ok(config)
    }
}
