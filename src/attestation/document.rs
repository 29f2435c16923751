//! Parsed attestation documents and platform measurements.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha384};

/// A platform measurement register value (PCR). Compared byte-for-byte;
/// the registry never interprets the contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measurement(Vec<u8>);

impl Measurement {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// SHA-384 digest of arbitrary input, the register width Nitro-style
    /// platforms extend PCRs with.
    pub fn digest(data: &[u8]) -> Self {
        Self(Sha384::digest(data).to_vec())
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(hex::decode(s)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

/// One `(index, value)` entry from a document's measurement list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcrEntry {
    pub index: u32,
    pub value: Measurement,
}

/// The parsed contents of an attestation document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationDocument {
    /// Measurement entries in document order. Order is significant; the
    /// verifier rejects a permuted list rather than re-sorting it.
    pub pcrs: Vec<PcrEntry>,
    /// Ephemeral public key the enclave committed to, when present.
    pub public_key: Option<Vec<u8>>,
}

impl AttestationDocument {
    pub fn new(pcrs: Vec<PcrEntry>, public_key: Option<Vec<u8>>) -> Self {
        Self { pcrs, public_key }
    }
}
