//! Attestation verification against a measurement config.

use thiserror::Error;

use super::AttestationDocument;
use crate::registry::MeasurementConfig;

/// Reasons an attestation document is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttestationError {
    /// Fewer than three measurement entries, or the first three do not carry
    /// indices 0, 1, 2 in that order.
    #[error("malformed attestation: {0}")]
    MalformedAttestation(&'static str),

    /// A measurement differs from the config's expectation; the enclave is
    /// not running the expected software.
    #[error("measurement for PCR{index} does not match the expected value")]
    MeasurementMismatch { index: u32 },

    /// The document does not embed an enclave public key.
    #[error("attestation does not embed an enclave public key")]
    MissingPublicKey,
}

/// Check a parsed attestation document against a config's expected
/// measurements and extract the embedded public key.
///
/// The first three entries must carry indices 0, 1, 2 in that exact order
/// (entries past the third are ignored; hardware documents carry
/// higher-indexed registers too), all three values must byte-equal the
/// config's, and the public key must be present. Pure: no state is touched
/// and no clock is read.
pub fn verify_attestation(
    config: &MeasurementConfig,
    document: &AttestationDocument,
) -> Result<Vec<u8>, AttestationError> {
    if document.pcrs.len() < 3 {
        return Err(AttestationError::MalformedAttestation(
            "fewer than three measurement entries",
        ));
    }
    for (i, entry) in document.pcrs.iter().take(3).enumerate() {
        if entry.index != i as u32 {
            return Err(AttestationError::MalformedAttestation(
                "measurement entries out of index order",
            ));
        }
    }
    for (i, entry) in document.pcrs.iter().take(3).enumerate() {
        if entry.value != *config.pcr(i) {
            return Err(AttestationError::MeasurementMismatch { index: i as u32 });
        }
    }
    match &document.public_key {
        Some(public_key) => Ok(public_key.clone()),
        None => Err(AttestationError::MissingPublicKey),
    }
}
