/**
 * Commitment Configuration
 * Fixed at engine construction; every stored delta is tied to it
 */

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommitmentConfig {
    /// Secret key length in bytes
    pub key_length: usize,
    /// Template length in bits (one per feature dimension)
    pub feature_dim: usize,
    /// Largest normalized Hamming distance accepted by the fuzzy tier
    pub error_tolerance: f64,
    /// Repetition factor of the code; odd so a majority vote never ties
    pub code_redundancy: usize,
}

impl Default for CommitmentConfig {
    fn default() -> Self {
        Self {
            key_length: 16,
            feature_dim: 512,
            error_tolerance: 0.40,
            code_redundancy: 7,
        }
    }
}

impl CommitmentConfig {
    /// Read the configuration from `FCS_*` environment variables.
    ///
    /// Unset variables keep their default; a set but unparseable variable is
    /// an error rather than a silent default.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            key_length: env_or("FCS_KEY_LENGTH", defaults.key_length)?,
            feature_dim: env_or("FCS_FEATURE_DIM", defaults.feature_dim)?,
            error_tolerance: env_or("FCS_ERROR_TOLERANCE", defaults.error_tolerance)?,
            code_redundancy: env_or("FCS_CODE_REDUNDANCY", defaults.code_redundancy)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.key_length == 0 {
            return Err(Error::InvalidConfig("key_length must be at least 1 byte".into()));
        }
        if self.feature_dim == 0 {
            return Err(Error::InvalidConfig("feature_dim must be at least 1 bit".into()));
        }
        if self.code_redundancy % 2 == 0 {
            return Err(Error::InvalidConfig(format!(
                "code_redundancy must be odd, got {}",
                self.code_redundancy
            )));
        }
        if !self.error_tolerance.is_finite() || !(0.0..=1.0).contains(&self.error_tolerance) {
            return Err(Error::InvalidConfig(format!(
                "error_tolerance must lie in [0, 1], got {}",
                self.error_tolerance
            )));
        }
        Ok(())
    }

    /// Bits in the repetition-encoded key.
    pub fn codeword_bits(&self) -> usize {
        self.key_length * 8 * self.code_redundancy
    }

    /// Meaningful bits of the helper data.
    pub fn delta_bits(&self) -> usize {
        self.feature_dim.max(self.codeword_bits())
    }

    /// Byte length of the helper data produced under this configuration.
    pub fn delta_len(&self) -> usize {
        self.delta_bits().div_ceil(8)
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("{} has unparseable value {:?}", name, raw))),
        Err(_) => Ok(default),
    }
}
