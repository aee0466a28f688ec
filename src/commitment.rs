/**
 * Commitment Engine
 * Binds a fresh secret key to a biometric template and recovers it later
 *
 * Enrollment persists only SHA-256(key) and the helper data
 * `template ⊕ encode(key)`. Verification XORs a fresh template against the
 * helper data, majority-decodes the key and checks its hash.
 */

use ring::constant_time::verify_slices_are_equal;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroize;

use crate::bits::{align_and_xor, from_bytes, hamming_distance, to_bytes, wipe};
use crate::config::CommitmentConfig;
use crate::entropy::{EntropySource, OsEntropy};
use crate::quantizer::{quantize, BitTemplate};
use crate::repetition;
use crate::{Error, Result};

/// SHA-256 digest of a commitment key
pub type CommitmentHash = [u8; 32];

/// Commitment key. Zeroized on drop and never printed.
pub struct SecretKey {
    inner: Vec<u8>,
}

impl Zeroize for SecretKey {
    fn zeroize(&mut self) {
        self.inner.zeroize();
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl SecretKey {
    fn from_vec(inner: Vec<u8>) -> Self {
        Self { inner }
    }

    /// Raw key bytes. Use immediately, don't store.
    pub fn as_bytes(&self) -> &[u8] {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn digest(&self) -> CommitmentHash {
        let mut hasher = Sha256::new();
        hasher.update(&self.inner);
        hasher.finalize().into()
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey([REDACTED])")
    }
}

/// Output of an enrollment.
///
/// `hash` and `delta` are meant to be persisted; `key` is handed back only so
/// the caller can use it for an auxiliary purpose before dropping it.
#[derive(Debug)]
pub struct CommitmentResult {
    pub hash: CommitmentHash,
    pub delta: Vec<u8>,
    pub key: SecretKey,
}

/// Outcome of a verification attempt.
///
/// A failed match is `authenticated == false`, not an error. Callers that
/// need the cryptographic guarantee alone should gate on `exact_match`.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    pub authenticated: bool,
    pub exact_match: bool,
    pub fuzzy_match: bool,
    pub hamming_distance: f64,
    /// 0..=100
    pub confidence: f64,
    #[serde(serialize_with = "crate::record::serialize_hex")]
    pub recovered_hash: CommitmentHash,
}

/// Fuzzy commitment engine.
///
/// Stateless apart from its configuration and entropy source, so a single
/// instance can be shared across threads.
pub struct FuzzyCommitment<E: EntropySource = OsEntropy> {
    config: CommitmentConfig,
    entropy: E,
}

impl FuzzyCommitment<OsEntropy> {
    /// Engine drawing keys from the operating system CSPRNG.
    pub fn new(config: CommitmentConfig) -> Result<Self> {
        Self::with_entropy(config, OsEntropy::new())
    }
}

impl<E: EntropySource> FuzzyCommitment<E> {
    pub fn with_entropy(config: CommitmentConfig, entropy: E) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, entropy })
    }

    pub fn config(&self) -> &CommitmentConfig {
        &self.config
    }

    /// Enroll a feature vector.
    pub fn commit(&self, features: &[f32]) -> Result<CommitmentResult> {
        let template = quantize(features, self.config.feature_dim);
        self.commit_template(&template)
    }

    /// Enroll an already quantized template.
    pub fn commit_template(&self, template: &BitTemplate) -> Result<CommitmentResult> {
        self.check_template(template)?;

        let mut key = vec![0u8; self.config.key_length];
        self.entropy.fill(&mut key)?;
        let key = SecretKey::from_vec(key);

        let codeword = repetition::encode(key.as_bytes(), self.config.code_redundancy);
        let delta = to_bytes(&align_and_xor(template.as_bitslice(), &codeword));
        let hash = key.digest();

        debug!(
            template_bits = template.bit_len(),
            codeword_bits = codeword.len(),
            delta_bytes = delta.len(),
            "FCS commit"
        );
        wipe(codeword);

        Ok(CommitmentResult { hash, delta, key })
    }

    /// Check a feature vector against a stored commitment.
    pub fn verify(
        &self,
        features: &[f32],
        stored_hash: &CommitmentHash,
        stored_delta: &[u8],
    ) -> Result<VerificationResult> {
        let template = quantize(features, self.config.feature_dim);
        self.verify_template(&template, stored_hash, stored_delta)
    }

    /// Check an already quantized template against a stored commitment.
    ///
    /// Two tiers decide acceptance: the decoded key hashes to `stored_hash`
    /// (exact), or the observed template lies within `error_tolerance` of the
    /// template implied by the decoded key (fuzzy).
    pub fn verify_template(
        &self,
        template: &BitTemplate,
        stored_hash: &CommitmentHash,
        stored_delta: &[u8],
    ) -> Result<VerificationResult> {
        self.check_template(template)?;
        if stored_delta.len() != self.config.delta_len() {
            return Err(Error::ConfigMismatch {
                field: "delta length",
                expected: self.config.delta_len(),
                got: stored_delta.len(),
            });
        }

        let mut delta = from_bytes(stored_delta);
        delta.truncate(self.config.delta_bits());

        let noisy_codeword = align_and_xor(template.as_bitslice(), &delta);
        let recovered = SecretKey::from_vec(repetition::decode(
            &noisy_codeword,
            self.config.key_length,
            self.config.code_redundancy,
        ));
        wipe(noisy_codeword);

        let recovered_hash = recovered.digest();
        let exact_match = verify_slices_are_equal(&recovered_hash, stored_hash).is_ok();

        // Template implied by the decoded key; the enrolled one is never stored.
        // Only its first feature_dim bits are compared, padding never counts.
        let reencoded = repetition::encode(recovered.as_bytes(), self.config.code_redundancy);
        let expected_template = align_and_xor(&delta, &reencoded);
        let distance = hamming_distance(template.as_bitslice(), &expected_template);
        wipe(reencoded);
        wipe(expected_template);

        let fuzzy_match = distance <= self.config.error_tolerance;
        let confidence = if exact_match {
            100.0
        } else {
            (1.0 - distance) * 100.0
        };

        debug!(
            exact_match,
            fuzzy_match,
            hamming_distance = distance,
            confidence,
            "FCS verify"
        );

        Ok(VerificationResult {
            authenticated: exact_match || fuzzy_match,
            exact_match,
            fuzzy_match,
            hamming_distance: distance,
            confidence,
            recovered_hash,
        })
    }

    fn check_template(&self, template: &BitTemplate) -> Result<()> {
        if template.bit_len() != self.config.feature_dim {
            return Err(Error::ConfigMismatch {
                field: "template bits",
                expected: self.config.feature_dim,
                got: template.bit_len(),
            });
        }
        Ok(())
    }
}
