//! The enclave-resident ephemeral keypair.
//!
//! An enclave generates a fresh Ed25519 keypair at boot, commits the public
//! half into its attestation document, and signs intent envelopes with the
//! private half. The private key never leaves this struct; everything the
//! outside world sees is the public key and signatures.

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};

use crate::attestation::{AttestationDocument, Measurement, PcrEntry};
use crate::codec::{CanonicalEncode, IntentEnvelope, IntentScope};

/// Response wrapper pairing a signed envelope with its signature, the shape
/// relayed to verifying clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedEnvelope<T> {
    pub envelope: IntentEnvelope<T>,
    /// Hex-encoded 64-byte Ed25519 signature over the envelope's canonical
    /// bytes.
    pub signature: String,
}

impl<T> SignedEnvelope<T> {
    /// Raw signature bytes, if the hex transport form is well-formed.
    pub fn signature_bytes(&self) -> Result<Vec<u8>, hex::FromHexError> {
        hex::decode(&self.signature)
    }
}

/// Ephemeral Ed25519 signing key, generated once per enclave boot.
pub struct EphemeralKeypair {
    signing: SigningKey,
}

impl EphemeralKeypair {
    /// Generate a fresh keypair from the operating system RNG.
    pub fn generate() -> Self {
        Self {
            signing: SigningKey::generate(&mut OsRng),
        }
    }

    /// The public half, as embedded in attestation documents.
    pub fn public_key(&self) -> [u8; 32] {
        self.signing.verifying_key().to_bytes()
    }

    /// Sign the canonical bytes of an intent envelope.
    pub fn sign_envelope<T: CanonicalEncode>(
        &self,
        intent: IntentScope,
        timestamp_ms: u64,
        payload: &T,
    ) -> [u8; 64] {
        let message = IntentEnvelope::new(intent, timestamp_ms, payload).signing_bytes();
        self.signing.sign(&message).to_bytes()
    }

    /// Wrap a payload in an intent envelope, sign it, and return both in
    /// the response shape an enclave endpoint hands to clients.
    pub fn signed_response<T: CanonicalEncode>(
        &self,
        payload: T,
        timestamp_ms: u64,
        intent: IntentScope,
    ) -> SignedEnvelope<T> {
        let envelope = IntentEnvelope::new(intent, timestamp_ms, payload);
        let signature = hex::encode(self.signing.sign(&envelope.signing_bytes()).to_bytes());
        SignedEnvelope {
            envelope,
            signature,
        }
    }

    /// Build the document a platform would issue for this keypair: the given
    /// PCR values at indices 0..=2 with the public key embedded.
    pub fn attest(&self, pcrs: &[Measurement; 3]) -> AttestationDocument {
        let entries = pcrs
            .iter()
            .enumerate()
            .map(|(i, value)| PcrEntry {
                index: i as u32,
                value: value.clone(),
            })
            .collect();
        AttestationDocument::new(entries, Some(self.public_key().to_vec()))
    }
}
