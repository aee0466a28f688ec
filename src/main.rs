/**
 * FCS Probe
 * Offline enroll/verify run against the commitment core
 *
 * Handles:
 * - Configuration from FCS_* environment variables
 * - Enrollment of one feature vector (commitment + sealed template)
 * - Verification of a second vector against that enrollment
 */

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use fuzzy_commitment::{
    AesGcmCipher, BiometricVault, CommitmentConfig, Enrollment, FuzzyCommitment, MemoryBlobStore,
    VaultDecision,
};

#[derive(Deserialize)]
struct ProbeInput {
    enroll: Vec<f32>,
    probe: Vec<f32>,
}

#[derive(Serialize)]
struct ProbeReport {
    config: CommitmentConfig,
    enrollment: Enrollment,
    decision: VaultDecision,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => bail!("usage: fcs-probe <input.json>"),
    };

    let raw = std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?;
    let input: ProbeInput = serde_json::from_str(&raw).context("Failed to parse probe input")?;

    let config = CommitmentConfig::from_env()?;
    info!(
        key_length = config.key_length,
        feature_dim = config.feature_dim,
        error_tolerance = config.error_tolerance,
        code_redundancy = config.code_redundancy,
        "Starting FCS probe"
    );

    let vault = BiometricVault::new(
        FuzzyCommitment::new(config)?,
        MemoryBlobStore::new(),
        AesGcmCipher::generate()?,
    );

    let enrollment = vault.enroll(&input.enroll)?;
    let decision = vault.verify(&enrollment, &input.probe)?;

    info!(
        authenticated = decision.authenticated,
        confidence = decision.confidence,
        "Probe complete"
    );

    let report = ProbeReport {
        config,
        enrollment,
        decision,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
