/**
 * Entropy Sources
 * Secure OS-backed randomness for production, seeded randomness for tests
 */

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use ring::rand::{SecureRandom, SystemRandom};
use std::sync::Mutex;

use crate::{Error, Result};

/// Where commitment keys come from.
///
/// Implementations must fail rather than degrade to a weaker generator.
pub trait EntropySource: Send + Sync {
    fn fill(&self, dest: &mut [u8]) -> Result<()>;
}

/// Operating system CSPRNG via `ring`.
#[derive(Clone)]
pub struct OsEntropy {
    rng: SystemRandom,
}

impl OsEntropy {
    pub fn new() -> Self {
        Self {
            rng: SystemRandom::new(),
        }
    }
}

impl Default for OsEntropy {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for OsEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        self.rng.fill(dest).map_err(|_| Error::EntropyUnavailable)
    }
}

/// Deterministic source for reproducible runs. Not for production keys.
pub struct SeededEntropy {
    rng: Mutex<StdRng>,
}

impl SeededEntropy {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl EntropySource for SeededEntropy {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        let mut rng = self.rng.lock().map_err(|_| Error::EntropyUnavailable)?;
        rng.fill_bytes(dest);
        Ok(())
    }
}
