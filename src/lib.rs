//! veritee — trust in remote, attested execution environments
//!
//! Registers an enclave's ephemeral public key only after its attestation
//! matches pre-declared measurements, then lets anyone verify the messages
//! it signs:
//! - **codec**: deterministic binary encoding used as the signing message
//! - **attestation**: measurement checks against a declared config
//! - **registry**: configs, capabilities and verified enclave identities
//! - **signing**: Ed25519 over domain-separated intent envelopes

pub mod attestation;
pub mod codec;
pub mod registry;
pub mod signing;

pub use attestation::{
    verify_attestation, AttestationDocument, AttestationError, Measurement, PcrEntry,
};
pub use codec::{CanonicalEncode, Encoder, IntentEnvelope, IntentScope};
pub use registry::{Capability, EnclaveIdentity, MeasurementConfig, RegistryError, TrustRegistry};
pub use signing::{verify_envelope_signature, EphemeralKeypair, SignedEnvelope};
