//! Signed invocation envelopes
//!
//! A client signs the bincode encoding of `(tx_id, operation, args, public_key)`
//! with its Ed25519 key. The node verifies the signature before the public key
//! is handed to the identity registry, so the engine only ever sees callers
//! that proved possession of their key.

use crate::crypto::{hash_bytes, verify_signature, KeyPair};
use crate::identity::decode_public_key;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Invocation signed by its caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedInvocation {
    /// Transaction ID
    pub tx_id: Uuid,

    /// Operation name
    pub operation: String,

    /// Operation arguments
    pub args: Vec<String>,

    /// Caller's Ed25519 public key (hex)
    pub public_key: String,

    /// Signature over the signing body (hex)
    pub signature: String,
}

#[derive(Serialize)]
struct SigningBody<'a> {
    tx_id: &'a Uuid,
    operation: &'a str,
    args: &'a [String],
    public_key: &'a str,
}

impl SignedInvocation {
    /// Build and sign a new invocation
    pub fn sign(
        keypair: &KeyPair,
        operation: impl Into<String>,
        args: Vec<String>,
    ) -> Result<Self> {
        let mut invocation = Self {
            tx_id: Uuid::new_v4(),
            operation: operation.into(),
            args,
            public_key: keypair.public_key_hex(),
            signature: String::new(),
        };

        let signature = keypair.sign(&invocation.signing_bytes()?);
        invocation.signature = hex::encode(signature);
        Ok(invocation)
    }

    /// Canonical bytes covered by the signature
    pub fn signing_bytes(&self) -> Result<Vec<u8>> {
        let body = SigningBody {
            tx_id: &self.tx_id,
            operation: &self.operation,
            args: &self.args,
            public_key: &self.public_key,
        };
        bincode::serialize(&body)
            .map_err(|e| Error::Serialization(format!("Failed to encode signing body: {}", e)))
    }

    /// Check the signature and return the verified public key
    pub fn verify(&self) -> Result<[u8; 32]> {
        let public_key = decode_public_key(&self.public_key).map_err(Error::Envelope)?;

        let signature = hex::decode(&self.signature)
            .map_err(|e| Error::Envelope(format!("invalid hex signature: {}", e)))?;
        let signature = <[u8; 64]>::try_from(signature.as_slice()).map_err(|_| {
            Error::Envelope(format!("signature must be 64 bytes, got {}", signature.len()))
        })?;

        verify_signature(&self.signing_bytes()?, &signature, &public_key)?;
        Ok(public_key)
    }

    /// Transaction hash (SHA-256 of the encoded envelope)
    pub fn hash(&self) -> Result<[u8; 32]> {
        Ok(hash_bytes(&self.to_bytes()?))
    }

    /// Serialize envelope
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize tx: {}", e)))
    }

    /// Deserialize envelope
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes)
            .map_err(|e| Error::Envelope(format!("Failed to decode tx: {}", e)))
    }

    /// JSON form used on the node's line protocol
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Parse the JSON form
    pub fn from_json(line: &str) -> Result<Self> {
        serde_json::from_str(line)
            .map_err(|e| Error::Envelope(format!("Failed to parse tx: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keypair() -> KeyPair {
        KeyPair::from_seed(&[5u8; 32])
    }

    fn vote(keypair: &KeyPair) -> SignedInvocation {
        SignedInvocation::sign(keypair, "voteInvokation", vec!["A".to_string()]).unwrap()
    }

    #[test]
    fn test_signed_invocation_verifies() {
        let keypair = keypair();
        let tx = vote(&keypair);

        assert_eq!(tx.verify().unwrap(), keypair.public_key());
    }

    #[test]
    fn test_tampered_fields_rejected() {
        let tx = vote(&keypair());

        let mut args = tx.clone();
        args.args = vec!["B".to_string()];
        assert!(matches!(args.verify(), Err(Error::Envelope(_))));

        let mut operation = tx.clone();
        operation.operation = "initializationInvokation".to_string();
        assert!(operation.verify().is_err());

        let mut tx_id = tx.clone();
        tx_id.tx_id = Uuid::new_v4();
        assert!(tx_id.verify().is_err());
    }

    #[test]
    fn test_swapped_public_key_rejected() {
        let tx = vote(&keypair());

        let mut forged = tx;
        forged.public_key = KeyPair::from_seed(&[6u8; 32]).public_key_hex();
        assert!(forged.verify().is_err());
    }

    #[test]
    fn test_malformed_signature() {
        let mut tx = SignedInvocation::sign(&keypair(), "destructionInvokation", vec![]).unwrap();

        tx.signature = "zz".to_string();
        assert!(matches!(tx.verify(), Err(Error::Envelope(_))));

        tx.signature = hex::encode([0u8; 10]);
        assert!(matches!(tx.verify(), Err(Error::Envelope(_))));
    }

    #[test]
    fn test_encodings_preserve_envelope() {
        let tx = SignedInvocation::sign(
            &keypair(),
            "initializationInvokation",
            vec!["{}".to_string()],
        )
        .unwrap();

        let from_bytes = SignedInvocation::from_bytes(&tx.to_bytes().unwrap()).unwrap();
        assert_eq!(from_bytes, tx);

        let from_json = SignedInvocation::from_json(&tx.to_json().unwrap()).unwrap();
        assert_eq!(from_json, tx);
        assert!(from_json.verify().is_ok());
    }

    #[test]
    fn test_hash_tracks_content() {
        let tx = vote(&keypair());
        let mut other = tx.clone();
        other.args.push("B".to_string());

        assert_eq!(tx.hash().unwrap(), tx.clone().hash().unwrap());
        assert_ne!(tx.hash().unwrap(), other.hash().unwrap());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            SignedInvocation::from_json("{\"operation\":"),
            Err(Error::Envelope(_))
        ));
        assert!(SignedInvocation::from_bytes(&[0xff; 3]).is_err());
    }
}
