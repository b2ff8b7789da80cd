//! Blob store implementations
//!
//! Locators are fresh UUIDv7 strings; they are never derived from content.

use crate::DocumentError;
use async_trait::async_trait;
use smarthire_domain::{BlobLocator, BlobStore};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// In-memory blob store for tests and dry runs
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True when nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    type Error = DocumentError;

    async fn put(&self, bytes: &[u8]) -> Result<BlobLocator, Self::Error> {
        let key = format!("mem-{}", uuid::Uuid::now_v7());
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), bytes.to_vec());
        Ok(BlobLocator::new(key))
    }

    async fn get(&self, locator: &BlobLocator) -> Result<Vec<u8>, Self::Error> {
        self.blobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(locator.as_str())
            .cloned()
            .ok_or_else(|| DocumentError::BlobNotFound(locator.to_string()))
    }
}

/// Blob store backed by a directory of files
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open (and create if missing) a blob directory
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, DocumentError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory holding the blobs
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, locator: &BlobLocator) -> Result<PathBuf, DocumentError> {
        let name = locator.as_str();
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
        if !valid || name.starts_with('.') {
            return Err(DocumentError::BlobNotFound(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    type Error = DocumentError;

    async fn put(&self, bytes: &[u8]) -> Result<BlobLocator, Self::Error> {
        let locator = BlobLocator::new(format!("{}.blob", uuid::Uuid::now_v7()));
        let path = self.path_for(&locator)?;
        let tmp = path.with_extension("partial");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(locator = %locator, size = bytes.len(), "Blob stored");
        Ok(locator)
    }

    async fn get(&self, locator: &BlobLocator) -> Result<Vec<u8>, Self::Error> {
        let path = self.path_for(locator)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DocumentError::BlobNotFound(locator.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
