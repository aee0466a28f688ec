/**
 * Commitment Record
 * Persisted shape of an enrollment: hash, helper data and the parameters
 * the helper data was produced under
 */

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize, Serializer};

use crate::commitment::{CommitmentHash, CommitmentResult};
use crate::config::CommitmentConfig;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitmentRecord {
    /// Hex-encoded SHA-256 of the key
    pub hash: String,
    /// Base64-encoded helper data
    pub delta: String,
    pub key_length: usize,
    pub feature_dim: usize,
    pub code_redundancy: usize,
}

impl CommitmentRecord {
    pub fn new(config: &CommitmentConfig, commitment: &CommitmentResult) -> Self {
        Self {
            hash: hex::encode(commitment.hash),
            delta: STANDARD.encode(&commitment.delta),
            key_length: config.key_length,
            feature_dim: config.feature_dim,
            code_redundancy: config.code_redundancy,
        }
    }

    /// Any parameter change invalidates the stored helper data.
    pub fn ensure_compatible(&self, config: &CommitmentConfig) -> Result<()> {
        let checks = [
            ("key_length", config.key_length, self.key_length),
            ("feature_dim", config.feature_dim, self.feature_dim),
            ("code_redundancy", config.code_redundancy, self.code_redundancy),
        ];
        for (field, expected, got) in checks {
            if expected != got {
                return Err(Error::ConfigMismatch { field, expected, got });
            }
        }
        Ok(())
    }

    pub fn hash_bytes(&self) -> Result<CommitmentHash> {
        let bytes = hex::decode(&self.hash)
            .map_err(|e| Error::Encoding(format!("commitment hash: {}", e)))?;
        bytes
            .try_into()
            .map_err(|bytes: Vec<u8>| Error::Encoding(format!("commitment hash is {} bytes, expected 32", bytes.len())))
    }

    pub fn delta_bytes(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(&self.delta)
            .map_err(|e| Error::Encoding(format!("helper data: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Encoding(format!("Failed to serialize record: {}", e)))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Encoding(format!("Failed to parse record: {}", e)))
    }
}

pub(crate) fn serialize_hex<S: Serializer>(bytes: &CommitmentHash, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}
