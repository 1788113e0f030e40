//! Identity port
//!
//! The engine never authenticates anyone itself. Each invocation is handed an
//! [`Identity`] that the surrounding platform has already verified; the engine
//! only asks for the caller's stable id and for attribute assertions such as
//! `admin=true`.

use crate::config::IdentityConfig;
use crate::{Error, Result};
use std::collections::{BTreeMap, HashMap};

/// Verified caller of the current invocation
pub trait Identity {
    /// Stable identifier of the caller
    fn caller_id(&self) -> Result<String>;

    /// Whether the caller carries the verified attribute `name` with value `expected`
    fn has_attribute(&self, name: &str, expected: &str) -> Result<bool>;
}

/// Identity with a fixed id and attribute set
///
/// Used when the transport has already resolved the caller, and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    id: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl StaticIdentity {
    /// Caller with the given id and no attributes
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            attributes: BTreeMap::new(),
        }
    }

    /// Caller whose id cannot be resolved
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// Add a verified attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl Identity for StaticIdentity {
    fn caller_id(&self) -> Result<String> {
        self.id
            .clone()
            .ok_or_else(|| Error::Identity("Failed to get creator".to_string()))
    }

    fn has_attribute(&self, name: &str, expected: &str) -> Result<bool> {
        Ok(self.attributes.get(name).map(String::as_str) == Some(expected))
    }
}

/// Public keys known to the node, with the attributes vouched for each
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    members: HashMap<[u8; 32], BTreeMap<String, String>>,
    allow_unregistered: bool,
}

impl IdentityRegistry {
    /// Empty registry
    pub fn new(allow_unregistered: bool) -> Self {
        Self {
            members: HashMap::new(),
            allow_unregistered,
        }
    }

    /// Build from node configuration
    pub fn from_config(config: &IdentityConfig) -> Result<Self> {
        let mut registry = Self::new(config.allow_unregistered);

        for member in &config.members {
            let public_key = decode_public_key(&member.public_key)
                .map_err(|e| Error::Config(format!("identity member: {}", e)))?;
            registry.register(public_key, member.attributes.clone());
        }

        tracing::info!(
            members = registry.members.len(),
            allow_unregistered = registry.allow_unregistered,
            "Identity registry loaded"
        );

        Ok(registry)
    }

    /// Register a key with its attributes, replacing any previous entry
    pub fn register(&mut self, public_key: [u8; 32], attributes: BTreeMap<String, String>) {
        self.members.insert(public_key, attributes);
    }

    /// Identity of a caller whose signature over `public_key` has been verified
    pub fn resolve(&self, public_key: [u8; 32]) -> VerifiedIdentity {
        let attributes = self.members.get(&public_key).cloned();
        let registered = attributes.is_some();

        VerifiedIdentity {
            public_key,
            attributes: attributes.unwrap_or_default(),
            resolvable: registered || self.allow_unregistered,
        }
    }
}

/// Caller identified by a verified Ed25519 public key
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    public_key: [u8; 32],
    attributes: BTreeMap<String, String>,
    resolvable: bool,
}

impl VerifiedIdentity {
    /// Verified public key
    pub fn public_key(&self) -> [u8; 32] {
        self.public_key
    }
}

impl Identity for VerifiedIdentity {
    fn caller_id(&self) -> Result<String> {
        if !self.resolvable {
            return Err(Error::Identity(format!(
                "public key {} is not registered",
                hex::encode(self.public_key)
            )));
        }
        Ok(format!("ed25519::{}", hex::encode(self.public_key)))
    }

    fn has_attribute(&self, name: &str, expected: &str) -> Result<bool> {
        Ok(self.attributes.get(name).map(String::as_str) == Some(expected))
    }
}

/// Decode a hex-encoded 32-byte public key
pub fn decode_public_key(encoded: &str) -> std::result::Result<[u8; 32], String> {
    let bytes = hex::decode(encoded).map_err(|e| format!("invalid hex public key: {}", e))?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| format!("public key must be 32 bytes, got {}", bytes.len()))
}
