//! Stored documents
//!
//! Bytes are owned by the external blob store; the core only keeps an opaque
//! locator plus the metadata needed for dedup and tie-breaking.

use crate::Fingerprint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference into the blob store
///
/// Never derived from content; only the blob store mints locators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobLocator(String);

impl BlobLocator {
    /// Wrap a locator produced by a blob store
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw locator
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A document ready to be registered with the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    /// Digest of the uploaded bytes
    pub fingerprint: Fingerprint,
    /// Name the uploader gave the file
    pub source_name: String,
    /// Where the bytes live
    pub storage_locator: BlobLocator,
    /// Size of the upload in bytes
    pub size_bytes: u64,
}

/// A registered document. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Digest of the uploaded bytes
    pub fingerprint: Fingerprint,
    /// Name the uploader gave the file on first registration
    pub source_name: String,
    /// Where the bytes live
    pub storage_locator: BlobLocator,
    /// Size of the upload in bytes
    pub size_bytes: u64,
    /// First registration time (milliseconds since epoch)
    pub registered_at: u64,
    /// Store-assigned insertion sequence; breaks ties between equal timestamps
    pub registration_seq: u64,
}
