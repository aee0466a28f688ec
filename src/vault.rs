/**
 * Biometric Vault
 * Enrollment and verification over a commitment engine, a sealed-template
 * store and a cipher
 *
 * Handles:
 * - Enrollment (commitment + sealed raw template)
 * - Verification (commitment tier, then direct comparison fallback)
 */

use serde::Serialize;
use tracing::{info, warn};

use crate::commitment::FuzzyCommitment;
use crate::entropy::{EntropySource, OsEntropy};
use crate::record::CommitmentRecord;
use crate::sealing::{features_from_bytes, features_to_bytes, TemplateCipher};
use crate::similarity::cosine_similarity;
use crate::store::BlobStore;
use crate::{Error, Result};

/// Minimum cosine similarity accepted by the direct comparison path.
pub const DEFAULT_DIRECT_THRESHOLD: f64 = 0.70;

#[derive(Debug, Clone, Serialize)]
pub struct Enrollment {
    pub record: CommitmentRecord,
    /// Blob id of the sealed raw template
    pub template_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    FuzzyCommitment,
    DirectComparison,
    Rejected,
}

#[derive(Debug, Clone, Serialize)]
pub struct VaultDecision {
    pub authenticated: bool,
    pub confidence: f64,
    pub method: VerificationMethod,
}

pub struct BiometricVault<S: BlobStore, C: TemplateCipher, E: EntropySource = OsEntropy> {
    engine: FuzzyCommitment<E>,
    store: S,
    cipher: C,
    direct_threshold: f64,
}

impl<S: BlobStore, C: TemplateCipher, E: EntropySource> BiometricVault<S, C, E> {
    pub fn new(engine: FuzzyCommitment<E>, store: S, cipher: C) -> Self {
        Self {
            engine,
            store,
            cipher,
            direct_threshold: DEFAULT_DIRECT_THRESHOLD,
        }
    }

    pub fn with_direct_threshold(mut self, threshold: f64) -> Self {
        self.direct_threshold = threshold;
        self
    }

    pub fn engine(&self) -> &FuzzyCommitment<E> {
        &self.engine
    }

    pub fn enroll(&self, features: &[f32]) -> Result<Enrollment> {
        let commitment = self.engine.commit(features)?;
        let record = CommitmentRecord::new(self.engine.config(), &commitment);

        let sealed = self.cipher.seal(&features_to_bytes(features))?;
        let template_id = self.store.put(&sealed)?;

        info!(template_id = %template_id, "Enrolled biometric commitment");

        // commitment.key is zeroized on drop here
        Ok(Enrollment { record, template_id })
    }

    /// Commitment tier first; the sealed template is only opened when it
    /// rejects.
    pub fn verify(&self, enrollment: &Enrollment, features: &[f32]) -> Result<VaultDecision> {
        let record = &enrollment.record;
        record.ensure_compatible(self.engine.config())?;
        let hash = record.hash_bytes()?;
        let delta = record.delta_bytes()?;

        let result = self.engine.verify(features, &hash, &delta)?;
        if result.authenticated {
            info!(
                exact_match = result.exact_match,
                confidence = result.confidence,
                "Verified via fuzzy commitment"
            );
            return Ok(VaultDecision {
                authenticated: true,
                confidence: result.confidence,
                method: VerificationMethod::FuzzyCommitment,
            });
        }

        let sealed = self
            .store
            .get(&enrollment.template_id)?
            .ok_or_else(|| Error::TemplateNotFound(enrollment.template_id.clone()))?;
        let stored_features = features_from_bytes(&self.cipher.open(&sealed)?)?;

        let similarity = cosine_similarity(features, &stored_features);
        if similarity >= self.direct_threshold {
            info!(similarity, "Verified via direct comparison");
            return Ok(VaultDecision {
                authenticated: true,
                confidence: similarity * 100.0,
                method: VerificationMethod::DirectComparison,
            });
        }

        warn!(
            commitment_confidence = result.confidence,
            similarity,
            "Biometric mismatch"
        );
        Ok(VaultDecision {
            authenticated: false,
            confidence: result.confidence,
            method: VerificationMethod::Rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommitmentConfig;
    use crate::entropy::SeededEntropy;
    use crate::sealing::AesGcmCipher;
    use crate::store::MemoryBlobStore;

    fn vault(config: CommitmentConfig) -> BiometricVault<MemoryBlobStore, AesGcmCipher, SeededEntropy> {
        let engine = FuzzyCommitment::with_entropy(config, SeededEntropy::from_seed(21)).unwrap();
        BiometricVault::new(engine, MemoryBlobStore::new(), AesGcmCipher::new(&[3u8; 32]).unwrap())
    }

    fn strict_config() -> CommitmentConfig {
        CommitmentConfig {
            key_length: 4,
            feature_dim: 64,
            error_tolerance: 0.0,
            code_redundancy: 3,
        }
    }

    fn features(seed: f32) -> Vec<f32> {
        (0..64).map(|i| ((i as f32) * seed).sin()).collect()
    }

    #[test]
    fn test_same_sample_verifies_through_commitment() {
        let vault = vault(strict_config());
        let sample = features(0.7);

        let enrollment = vault.enroll(&sample).unwrap();
        assert_eq!(vault.store.len().unwrap(), 1);

        let decision = vault.verify(&enrollment, &sample).unwrap();
        assert!(decision.authenticated);
        assert_eq!(decision.method, VerificationMethod::FuzzyCommitment);
        assert_eq!(decision.confidence, 100.0);
    }

    #[test]
    fn test_sealed_template_is_not_plaintext() {
        let vault = vault(strict_config());
        let sample = features(0.7);
        let enrollment = vault.enroll(&sample).unwrap();

        let stored = vault.store.get(&enrollment.template_id).unwrap().unwrap();
        assert_ne!(stored, features_to_bytes(&sample));
    }

    #[test]
    fn test_direct_comparison_rescues_inverted_fine_structure() {
        // Same coarse vector with its small variations mirrored: cosine stays
        // near 1 while every template bit flips
        let vault = vault(strict_config());
        let sample: Vec<f32> = features(0.7).iter().map(|x| 5.0 + 0.05 * x).collect();
        let presented: Vec<f32> = features(0.7).iter().map(|x| 5.0 - 0.05 * x).collect();
        let enrollment = vault.enroll(&sample).unwrap();

        let decision = vault.verify(&enrollment, &presented).unwrap();
        assert!(decision.authenticated);
        assert_eq!(decision.method, VerificationMethod::DirectComparison);
        assert!(decision.confidence > 99.0);
    }

    #[test]
    fn test_unrelated_sample_is_rejected() {
        let vault = vault(strict_config());
        let sample = features(0.7);
        let enrollment = vault.enroll(&sample).unwrap();

        let presented: Vec<f32> = sample.iter().map(|x| -x).collect();
        let decision = vault.verify(&enrollment, &presented).unwrap();
        assert!(!decision.authenticated);
        assert_eq!(decision.method, VerificationMethod::Rejected);
    }

    #[test]
    fn test_missing_template_is_an_error() {
        let vault = vault(strict_config());
        let sample = features(0.7);
        let mut enrollment = vault.enroll(&sample).unwrap();
        enrollment.template_id = "QmGone".into();

        let presented: Vec<f32> = sample.iter().map(|x| -x).collect();
        assert!(matches!(
            vault.verify(&enrollment, &presented),
            Err(Error::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_record_from_other_configuration_is_refused() {
        let enrollment = vault(strict_config()).enroll(&features(0.7)).unwrap();

        let other = vault(CommitmentConfig {
            code_redundancy: 5,
            ..strict_config()
        });
        assert!(matches!(
            other.verify(&enrollment, &features(0.7)),
            Err(Error::ConfigMismatch { .. })
        ));
    }
}
