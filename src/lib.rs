//! # Fuzzy Commitment
//!
//! Binds a random secret key to a noisy biometric feature vector so that the
//! key can be recovered from any later sample close enough to the enrolled
//! one, without storing the template itself.
//!
//! ```text
//! ENROLL:  T = quantize(features)      C = repeat(K, R)
//!          delta = T ⊕ C               hash = SHA256(K)
//!
//! VERIFY:  C' = quantize(features') ⊕ delta
//!          K' = majority(C', R)        SHA256(K') == hash ?
//! ```
//!
//! Only `hash` and `delta` are persisted. The key exists for the duration of a
//! single `commit`/`verify` call.

pub mod bits;
pub mod commitment;
pub mod config;
pub mod entropy;
pub mod quantizer;
pub mod record;
pub mod repetition;
pub mod sealing;
pub mod similarity;
pub mod store;
pub mod vault;

pub use commitment::{CommitmentHash, CommitmentResult, FuzzyCommitment, SecretKey, VerificationResult};
pub use config::CommitmentConfig;
pub use entropy::{EntropySource, OsEntropy, SeededEntropy};
pub use quantizer::{quantize, BitTemplate};
pub use record::CommitmentRecord;
pub use sealing::{AesGcmCipher, TemplateCipher};
pub use similarity::cosine_similarity;
pub use store::{BlobStore, MemoryBlobStore};
pub use vault::{BiometricVault, Enrollment, VaultDecision, VerificationMethod};

/// Result type for commitment operations
pub type Result<T> = std::result::Result<T, Error>;

/// Faults raised by the commitment core and its collaborators.
///
/// A rejected verification is not one of these; it is reported through
/// [`VerificationResult::authenticated`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration mismatch on {field}: expected {expected}, got {got}")]
    ConfigMismatch {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Secure random source unavailable")]
    EntropyUnavailable,

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Cipher operation failed: {0}")]
    Cipher(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Stored template not found: {0}")]
    TemplateNotFound(String),
}
