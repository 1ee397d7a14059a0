//! Witness-stream fingerprints.
//!
//! A witness stream is fed record by record into a [`WitnessSink`] using a
//! fixed little-endian layout. The SHA-256 of those bytes is the stream's
//! fingerprint: two runs agree on the fingerprint exactly when they emitted
//! the same records in the same order.
//!
//! Record layouts live next to the record types (`avoidance`, `gate_cycle`);
//! this module only fixes the primitive encodings and the digest.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex-encoded SHA-256 of a canonical witness stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WitnessDigest(pub String);

impl WitnessDigest {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WitnessDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Destination for canonical record bytes.
pub trait WitnessSink {
    fn put(&mut self, bytes: &[u8]);

    fn put_u8(&mut self, value: u8) {
        self.put(&[value]);
    }

    fn put_u16(&mut self, value: u16) {
        self.put(&value.to_le_bytes());
    }

    fn put_u32(&mut self, value: u32) {
        self.put(&value.to_le_bytes());
    }

    fn put_u64(&mut self, value: u64) {
        self.put(&value.to_le_bytes());
    }
}

impl WitnessSink for Vec<u8> {
    fn put(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Incremental SHA-256 over a witness stream.
#[derive(Clone, Default)]
pub struct StreamHasher {
    hasher: Sha256,
    bytes: u64,
}

impl StreamHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes fed so far.
    pub fn len(&self) -> u64 {
        self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes == 0
    }

    pub fn finish(self) -> WitnessDigest {
        let hash = self.hasher.finalize();
        WitnessDigest(format!("{hash:x}"))
    }
}

impl WitnessSink for StreamHasher {
    fn put(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
        self.bytes += bytes.len() as u64;
    }
}

/// A value with a canonical byte encoding.
pub trait CanonicalEncode {
    fn encode(&self, sink: &mut dyn WitnessSink);
}

/// The canonical bytes of `value`.
pub fn canonical_bytes<T: CanonicalEncode + ?Sized>(value: &T) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::new();
    value.encode(&mut out);
    out
}

/// SHA-256 fingerprint of `value`'s canonical encoding.
pub fn fingerprint<T: CanonicalEncode + ?Sized>(value: &T) -> WitnessDigest {
    let mut hasher = StreamHasher::new();
    value.encode(&mut hasher);
    hasher.finish()
}
