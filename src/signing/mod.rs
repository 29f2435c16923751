//! Signing — Ed25519 over canonical intent envelopes
//!
//! Both halves of the signature protocol:
//! - **verify**: check a signature against a registered enclave identity
//! - **keypair**: the enclave-resident ephemeral key that produces
//!   attestations and signed responses

mod keypair;
mod verify;

pub use keypair::{EphemeralKeypair, SignedEnvelope};
pub use verify::verify_envelope_signature;
