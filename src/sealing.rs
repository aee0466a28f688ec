/**
 * Template Sealing
 * Authenticated encryption of raw feature vectors for the direct
 * comparison path
 */

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroize;

use crate::{Error, Result};

/// Authenticated encryption black box for raw templates.
pub trait TemplateCipher: Send + Sync {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>>;
    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>>;
}

/// AES-256-GCM with a random nonce per message.
///
/// Sealed layout: `nonce (12) || ciphertext || tag (16)`.
pub struct AesGcmCipher {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl AesGcmCipher {
    pub const KEY_LEN: usize = 32;

    pub fn new(master_key: &[u8]) -> Result<Self> {
        if master_key.len() != Self::KEY_LEN {
            return Err(Error::Cipher(format!(
                "master key must be {} bytes, got {}",
                Self::KEY_LEN,
                master_key.len()
            )));
        }
        let unbound = UnboundKey::new(&AES_256_GCM, master_key)
            .map_err(|_| Error::Cipher("Failed to load master key".into()))?;

        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }

    /// Cipher under a freshly drawn master key.
    pub fn generate() -> Result<Self> {
        let mut master_key = [0u8; Self::KEY_LEN];
        SystemRandom::new()
            .fill(&mut master_key)
            .map_err(|_| Error::EntropyUnavailable)?;
        let cipher = Self::new(&master_key);
        master_key.zeroize();
        cipher
    }
}

impl TemplateCipher for AesGcmCipher {
    fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| Error::EntropyUnavailable)?;

        let mut in_out = plaintext.to_vec();
        self.key
            .seal_in_place_append_tag(Nonce::assume_unique_for_key(nonce_bytes), Aad::empty(), &mut in_out)
            .map_err(|_| Error::Cipher("Failed to seal template".into()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&in_out);
        Ok(sealed)
    }

    fn open(&self, sealed: &[u8]) -> Result<Vec<u8>> {
        if sealed.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(Error::Cipher("Sealed template too short".into()));
        }
        let (nonce_bytes, body) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| Error::Cipher("Malformed nonce".into()))?;

        let mut in_out = body.to_vec();
        let plaintext_len = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| Error::Cipher("Template authentication failed".into()))?
            .len();
        in_out.truncate(plaintext_len);
        Ok(in_out)
    }
}

/// Raw feature vector as little-endian `f32` bytes.
pub fn features_to_bytes(features: &[f32]) -> Vec<u8> {
    features.iter().flat_map(|x| x.to_le_bytes()).collect()
}

pub fn features_from_bytes(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(Error::Encoding(format!(
            "feature payload of {} bytes is not a whole number of f32 values",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
