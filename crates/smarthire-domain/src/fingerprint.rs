//! Content fingerprints
//!
//! A fingerprint is the 256-bit digest of a document's bytes. Hashing itself
//! lives in `smarthire-document`; this module only models the value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// 256-bit content digest used as the dedup and idempotency key
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Wrap a raw digest
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering (64 characters)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a 64-character hex string
    ///
    /// # Examples
    ///
    /// ```
    /// use smarthire_domain::Fingerprint;
    ///
    /// let fp = Fingerprint::from_bytes([7u8; 32]);
    /// assert_eq!(Fingerprint::from_hex(&fp.to_hex()).unwrap(), fp);
    /// assert!(Fingerprint::from_hex("abc").is_err());
    /// ```
    pub fn from_hex(s: &str) -> Result<Self, String> {
        let s = s.trim();
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| format!("Invalid fingerprint {:?}: {}", s, e))?;
        Ok(Self(bytes))
    }

    /// First 12 hex characters, for logs and tables
    pub fn short(&self) -> String {
        self.to_hex()[..12].to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short())
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fingerprint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Fingerprint::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
