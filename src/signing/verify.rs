//! Signature verification for intent envelopes.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::codec::{CanonicalEncode, IntentEnvelope, IntentScope};
use crate::registry::EnclaveIdentity;

/// Check `signature` over the canonical envelope bytes against the
/// identity's public key.
///
/// The outcome is a plain boolean, never an error: malformed key bytes,
/// wrong-length signatures and mismatched content all return `false`, so
/// callers branch on untrusted input instead of catching exceptions.
pub fn verify_envelope_signature<T: CanonicalEncode>(
    identity: &EnclaveIdentity,
    intent: IntentScope,
    timestamp_ms: u64,
    payload: &T,
    signature: &[u8],
) -> bool {
    let Ok(key_bytes) = <&[u8; 32]>::try_from(identity.public_key.as_slice()) else {
        return false;
    };
    let Ok(key) = VerifyingKey::from_bytes(key_bytes) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    let message = IntentEnvelope::new(intent, timestamp_ms, payload).signing_bytes();
    key.verify(&message, &signature).is_ok()
}
