//! SmartHire document handling
//!
//! Everything that touches raw upload bytes:
//!
//! - [`fingerprint`]: SHA-256 content addressing
//! - [`TextExtractor`]: PDF / DOCX / plain text to [`NormalizedText`](smarthire_domain::NormalizedText)
//! - [`InMemoryBlobStore`] and [`FsBlobStore`]: blob collaborators holding the bytes

pub mod blob;
pub mod docx;
pub mod error;
pub mod extractor;
pub mod format;
pub mod normalize;
pub mod pdf;

pub use blob::{FsBlobStore, InMemoryBlobStore};
pub use error::DocumentError;
pub use extractor::TextExtractor;
pub use format::{detect_format, DocumentFormat};
pub use normalize::normalize;

use sha2::{Digest, Sha256};
use smarthire_domain::Fingerprint;

/// Compute the content fingerprint of a document
///
/// Deterministic and side-effect free; identical bytes always produce the
/// same fingerprint.
///
/// # Examples
///
/// ```
/// use smarthire_document::fingerprint;
///
/// let a = fingerprint(b"resume");
/// assert_eq!(a, fingerprint(b"resume"));
/// assert_ne!(a, fingerprint(b"resume "));
/// ```
pub fn fingerprint(bytes: &[u8]) -> Fingerprint {
    let digest: [u8; 32] = Sha256::digest(bytes).into();
    Fingerprint::from_bytes(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_digest() {
        assert_eq!(
            fingerprint(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    proptest! {
        /// Property: fingerprinting is deterministic
        #[test]
        fn test_fingerprint_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            prop_assert_eq!(fingerprint(&bytes), fingerprint(&bytes.clone()));
        }

        /// Property: a one-byte change changes the fingerprint
        #[test]
        fn test_fingerprint_sensitive(bytes in proptest::collection::vec(any::<u8>(), 1..256), idx in any::<prop::sample::Index>()) {
            let mut changed = bytes.clone();
            let i = idx.index(changed.len());
            changed[i] = changed[i].wrapping_add(1);
            prop_assert_ne!(fingerprint(&bytes), fingerprint(&changed));
        }
    }
}
