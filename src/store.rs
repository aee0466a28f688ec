/**
 * Blob Store
 * Content-addressed storage for sealed templates
 */

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

use crate::{Error, Result};

/// Get/put by opaque identifier. Identifiers are derived from content.
pub trait BlobStore: Send + Sync {
    fn put(&self, data: &[u8]) -> Result<String>;
    fn get(&self, id: &str) -> Result<Option<Vec<u8>>>;
}

/// `"Qm"` followed by the first 44 hex characters of SHA-256(data).
pub fn content_id(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hex::encode(hasher.finalize());
    format!("Qm{}", &digest[..44])
}

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| Error::Storage("blob index poisoned".into()))?;
        Ok(blobs.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, data: &[u8]) -> Result<String> {
        let id = content_id(data);
        let mut blobs = self
            .blobs
            .write()
            .map_err(|_| Error::Storage("blob index poisoned".into()))?;
        blobs.insert(id.clone(), data.to_vec());

        debug!(id = %id, size = data.len(), "Stored blob");
        Ok(id)
    }

    fn get(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| Error::Storage("blob index poisoned".into()))?;
        Ok(blobs.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_content_id_shape() {
        let id = content_id(b"sealed");
        assert!(id.starts_with("Qm"));
        assert_eq!(id.len(), 46);
        assert_eq!(id, content_id(b"sealed"));
        assert_ne!(id, content_id(b"other"));
    }

    #[test]
    fn test_put_then_get() {
        let store = MemoryBlobStore::new();
        assert!(store.is_empty().unwrap());

        let id = store.put(b"blob").unwrap();
        assert_eq!(store.get(&id).unwrap(), Some(b"blob".to_vec()));
        assert_eq!(store.len().unwrap(), 1);

        // Identical content lands on the same id
        assert_eq!(store.put(b"blob").unwrap(), id);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_unknown_id_is_none() {
        let store = MemoryBlobStore::new();
        assert_eq!(store.get("QmMissing").unwrap(), None);
    }

    #[test]
    fn test_poisoned_index_is_a_storage_error() {
        let store = Arc::new(MemoryBlobStore::new());
        store.put(b"blob").unwrap();

        let holder = Arc::clone(&store);
        let outcome = thread::spawn(move || {
            let _guard = holder.blobs.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(outcome.is_err());

        assert!(matches!(store.len(), Err(Error::Storage(_))));
        assert!(store.is_empty().is_err());
        assert!(matches!(store.get("QmMissing"), Err(Error::Storage(_))));
    }
}
