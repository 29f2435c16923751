//! Verified enclave identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MeasurementConfig;

/// An attestation-verified enclave identity: the ephemeral public key
/// extracted from a successful measurement check, bound to the config
/// version observed at that instant.
///
/// Immutable after creation except for deletion. Many identities may coexist
/// for one config: registration is deliberately not deduplicated, so every
/// attested instance of an application mints its own record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnclaveIdentity {
    pub id: String,
    /// Config this identity was verified against.
    pub config_id: String,
    pub application_tag: String,
    /// Raw Ed25519 public key bytes from the attestation document.
    pub public_key: Vec<u8>,
    /// Config version at verification time. The config's version only ever
    /// grows, so once this falls behind it stays behind.
    pub config_version: u64,
    pub created_at: DateTime<Utc>,
}

impl EnclaveIdentity {
    pub(crate) fn new(config: &MeasurementConfig, public_key: Vec<u8>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            config_id: config.id.clone(),
            application_tag: config.application_tag.clone(),
            public_key,
            config_version: config.version(),
            created_at: Utc::now(),
        }
    }

    /// Stale iff the bound version is strictly behind `current_version`.
    pub fn is_stale_at(&self, current_version: u64) -> bool {
        self.config_version < current_version
    }

    /// Hex form of the public key, for display and transport.
    pub fn public_key_hex(&self) -> String {
        hex::encode(&self.public_key)
    }
}
