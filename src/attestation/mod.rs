//! Attestation — proving an enclave runs the expected software
//!
//! Documents arrive here already envelope-verified by a trusted upstream
//! parser (the platform's signature chain is not re-checked in this crate):
//! - **Document**: parsed measurement entries plus the embedded public key
//! - **Verifier**: strict, pure comparison against a measurement config

mod document;
mod verifier;

pub use document::{AttestationDocument, Measurement, PcrEntry};
pub use verifier::{verify_attestation, AttestationError};
