//! The trust registry — a concurrent store of configs and identities.
//!
//! Models the shared-state substrate the protocol runs on: every operation
//! either fully applies or has no effect, conflicting writes are serialized
//! by the locks, and read access is unrestricted. Write access to a config
//! is gated solely on possession of its capability.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use super::{Capability, EnclaveIdentity, MeasurementConfig};
use crate::attestation::{verify_attestation, AttestationDocument, AttestationError, Measurement};
use crate::codec::{CanonicalEncode, IntentScope};
use crate::signing::verify_envelope_signature;

/// Failures of registry operations. All are fatal to the call and leave no
/// partial state behind; retries belong to the caller.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The presented capability was not minted for the addressed config.
    #[error("capability does not authorize changes to config {config_id}")]
    Authorization { config_id: String },

    #[error("config not found: {0}")]
    ConfigNotFound(String),

    #[error("identity not found: {0}")]
    IdentityNotFound(String),

    /// Retirement attempted on an identity still bound to the current config
    /// version. There is no forced-retirement path.
    #[error("identity {id} is not stale (bound to version {bound_version})")]
    NotStale { id: String, bound_version: u64 },

    #[error(transparent)]
    Attestation(#[from] AttestationError),
}

/// Registry of measurement configs and verified enclave identities.
///
/// `&self` everywhere: the registry is shared freely across threads and
/// callers, matching the permissionless-read model. Concurrent
/// [`register_enclave`](TrustRegistry::register_enclave) calls against one
/// config are independent and all succeed, each minting its own identity.
#[derive(Debug, Default)]
pub struct TrustRegistry {
    configs: RwLock<HashMap<String, MeasurementConfig>>,
    identities: RwLock<HashMap<String, EnclaveIdentity>>,
}

impl TrustRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a config at version 0 and mint its sole capability. The
    /// capability is never reissued; losing it means the config's
    /// measurements are frozen forever.
    pub fn create_config(
        &self,
        application_tag: impl Into<String>,
        name: impl Into<String>,
        m0: Measurement,
        m1: Measurement,
        m2: Measurement,
    ) -> (MeasurementConfig, Capability) {
        let config = MeasurementConfig::new(application_tag, name, m0, m1, m2);
        let capability = Capability::new(config.id.clone(), config.application_tag.clone());
        log::info!(
            "config created: id={} tag={} name={}",
            config.id,
            config.application_tag,
            config.name
        );
        self.configs
            .write()
            .expect("registry lock poisoned")
            .insert(config.id.clone(), config.clone());
        (config, capability)
    }

    /// Replace all three expected measurements and advance the version by
    /// exactly 1. Every identity bound to the prior version becomes stale
    /// the moment this returns. Returns the new version.
    pub fn update_measurements(
        &self,
        config_id: &str,
        capability: &Capability,
        m0: Measurement,
        m1: Measurement,
        m2: Measurement,
    ) -> Result<u64, RegistryError> {
        let mut configs = self.configs.write().expect("registry lock poisoned");
        let config = configs
            .get_mut(config_id)
            .ok_or_else(|| RegistryError::ConfigNotFound(config_id.to_string()))?;
        if !capability.authorizes(config) {
            log::warn!("measurement update refused for config {}", config.id);
            return Err(RegistryError::Authorization {
                config_id: config.id.clone(),
            });
        }
        config.set_pcrs([m0, m1, m2]);
        log::info!(
            "measurements rotated: config={} version={}",
            config.id,
            config.version()
        );
        Ok(config.version())
    }

    /// Rename a config. Same capability gate as a measurement update, but
    /// the version does not move.
    pub fn update_name(
        &self,
        config_id: &str,
        capability: &Capability,
        name: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let mut configs = self.configs.write().expect("registry lock poisoned");
        let config = configs
            .get_mut(config_id)
            .ok_or_else(|| RegistryError::ConfigNotFound(config_id.to_string()))?;
        if !capability.authorizes(config) {
            log::warn!("rename refused for config {}", config.id);
            return Err(RegistryError::Authorization {
                config_id: config.id.clone(),
            });
        }
        config.name = name.into();
        Ok(())
    }

    /// Snapshot of a config record.
    pub fn config(&self, config_id: &str) -> Option<MeasurementConfig> {
        self.configs
            .read()
            .expect("registry lock poisoned")
            .get(config_id)
            .cloned()
    }

    pub fn config_version(&self, config_id: &str) -> Option<u64> {
        self.configs
            .read()
            .expect("registry lock poisoned")
            .get(config_id)
            .map(MeasurementConfig::version)
    }

    /// Verify an attestation document against a config's current
    /// measurements and, on success, publish a new identity bound to the
    /// version read at this instant.
    ///
    /// Never deduplicated: repeated or concurrent registrations with the
    /// same document each mint an independent identity.
    pub fn register_enclave(
        &self,
        config_id: &str,
        document: &AttestationDocument,
    ) -> Result<EnclaveIdentity, RegistryError> {
        let identity = {
            let configs = self.configs.read().expect("registry lock poisoned");
            let config = configs
                .get(config_id)
                .ok_or_else(|| RegistryError::ConfigNotFound(config_id.to_string()))?;
            let public_key = verify_attestation(config, document)?;
            EnclaveIdentity::new(config, public_key)
        };
        self.identities
            .write()
            .expect("registry lock poisoned")
            .insert(identity.id.clone(), identity.clone());
        log::info!(
            "enclave registered: identity={} config={} version={} pk={}",
            identity.id,
            identity.config_id,
            identity.config_version,
            identity.public_key_hex()
        );
        Ok(identity)
    }

    /// Snapshot of an identity record.
    pub fn identity(&self, identity_id: &str) -> Option<EnclaveIdentity> {
        self.identities
            .read()
            .expect("registry lock poisoned")
            .get(identity_id)
            .cloned()
    }

    /// Snapshots of all identity records, in no particular order.
    pub fn identities(&self) -> Vec<EnclaveIdentity> {
        self.identities
            .read()
            .expect("registry lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    /// Whether an identity has fallen behind its config's current version.
    pub fn is_stale(&self, identity_id: &str) -> Result<bool, RegistryError> {
        let identity = self
            .identity(identity_id)
            .ok_or_else(|| RegistryError::IdentityNotFound(identity_id.to_string()))?;
        let current = self
            .config_version(&identity.config_id)
            .ok_or_else(|| RegistryError::ConfigNotFound(identity.config_id.clone()))?;
        Ok(identity.is_stale_at(current))
    }

    /// Delete a stale identity. Identities still bound to the current config
    /// version are always rejected.
    ///
    /// Staleness is permanent, so the check and the removal need not happen
    /// under one lock: an identity observed stale stays stale.
    pub fn retire(&self, identity_id: &str) -> Result<(), RegistryError> {
        let identity = self
            .identity(identity_id)
            .ok_or_else(|| RegistryError::IdentityNotFound(identity_id.to_string()))?;
        let current = self
            .config_version(&identity.config_id)
            .ok_or_else(|| RegistryError::ConfigNotFound(identity.config_id.clone()))?;
        if !identity.is_stale_at(current) {
            return Err(RegistryError::NotStale {
                id: identity.id,
                bound_version: identity.config_version,
            });
        }
        self.identities
            .write()
            .expect("registry lock poisoned")
            .remove(identity_id)
            .ok_or_else(|| RegistryError::IdentityNotFound(identity_id.to_string()))?;
        log::info!(
            "identity retired: id={} bound_version={} current_version={}",
            identity_id,
            identity.config_version,
            current
        );
        Ok(())
    }

    /// Check a signature attributed to a stored identity.
    ///
    /// An unknown identity id is a lookup error; a bad signature is a plain
    /// `false` so callers can apply their own policy to untrusted input.
    pub fn verify_signature<T: CanonicalEncode>(
        &self,
        identity_id: &str,
        intent: IntentScope,
        timestamp_ms: u64,
        payload: &T,
        signature: &[u8],
    ) -> Result<bool, RegistryError> {
        let identity = self
            .identity(identity_id)
            .ok_or_else(|| RegistryError::IdentityNotFound(identity_id.to_string()))?;
        Ok(verify_envelope_signature(
            &identity,
            intent,
            timestamp_ms,
            payload,
            signature,
        ))
    }

    pub fn summary(&self) -> String {
        let configs = self.configs.read().expect("registry lock poisoned").len();
        let identities = self.identities.read().expect("registry lock poisoned").len();
        format!(
            "TrustRegistry | {} configs | {} identities",
            configs, identities
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attestation::PcrEntry;
    use crate::signing::EphemeralKeypair;
    use std::sync::Arc;

    const TAG: &str = "0x1::weather::WEATHER";

    fn measurements(seed: &[u8]) -> [Measurement; 3] {
        [
            Measurement::digest(&[seed, b"-0".as_slice()].concat()),
            Measurement::digest(&[seed, b"-1".as_slice()].concat()),
            Measurement::digest(&[seed, b"-2".as_slice()].concat()),
        ]
    }

    fn setup() -> (TrustRegistry, MeasurementConfig, Capability) {
        let registry = TrustRegistry::new();
        let [m0, m1, m2] = measurements(b"v0");
        let (config, cap) = registry.create_config(TAG, "weather", m0, m1, m2);
        (registry, config, cap)
    }

    fn document_for(pcrs: &[Measurement; 3], public_key: Vec<u8>) -> AttestationDocument {
        let entries = pcrs
            .iter()
            .enumerate()
            .map(|(i, value)| PcrEntry {
                index: i as u32,
                value: value.clone(),
            })
            .collect();
        AttestationDocument::new(entries, Some(public_key))
    }

    #[test]
    fn test_version_counts_measurement_updates() {
        let (registry, config, cap) = setup();
        for k in 1..=5u64 {
            let version = registry
                .update_measurements(
                    &config.id,
                    &cap,
                    Measurement::digest(&k.to_le_bytes()),
                    Measurement::digest(b"m1"),
                    Measurement::digest(b"m2"),
                )
                .unwrap();
            assert_eq!(version, k);
        }
        assert_eq!(registry.config_version(&config.id), Some(5));
    }

    #[test]
    fn test_rename_does_not_touch_version() {
        let (registry, config, cap) = setup();
        registry.update_name(&config.id, &cap, "weather-v2").unwrap();
        let snapshot = registry.config(&config.id).unwrap();
        assert_eq!(snapshot.name, "weather-v2");
        assert_eq!(snapshot.version(), 0);
    }

    #[test]
    fn test_foreign_capability_is_rejected_without_side_effects() {
        let (registry, config, _cap) = setup();
        let [m0, m1, m2] = measurements(b"other");
        let (other, other_cap) = registry.create_config(TAG, "imposter", m0, m1, m2);

        let [m0, m1, m2] = measurements(b"new");
        let err = registry
            .update_measurements(&config.id, &other_cap, m0, m1, m2)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Authorization { .. }));
        assert_eq!(registry.config_version(&config.id), Some(0));
        assert_eq!(registry.config_version(&other.id), Some(0));
    }

    #[test]
    fn test_register_binds_current_version() {
        let (registry, config, cap) = setup();
        let keypair = EphemeralKeypair::generate();

        let identity = registry
            .register_enclave(&config.id, &keypair.attest(config.pcrs()))
            .unwrap();
        assert_eq!(identity.config_version, 0);
        assert_eq!(identity.public_key, keypair.public_key().to_vec());
        assert!(!registry.is_stale(&identity.id).unwrap());

        let [m0, m1, m2] = measurements(b"v1");
        registry
            .update_measurements(&config.id, &cap, m0, m1, m2)
            .unwrap();
        assert!(registry.is_stale(&identity.id).unwrap());
    }

    #[test]
    fn test_register_rejects_stale_measurements() {
        let (registry, config, cap) = setup();
        let keypair = EphemeralKeypair::generate();
        let old_document = keypair.attest(config.pcrs());

        let [m0, m1, m2] = measurements(b"v1");
        registry
            .update_measurements(&config.id, &cap, m0, m1, m2)
            .unwrap();

        let err = registry
            .register_enclave(&config.id, &old_document)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Attestation(AttestationError::MeasurementMismatch { index: 0 })
        ));
        assert!(registry.identities().is_empty());
    }

    #[test]
    fn test_duplicate_registrations_mint_distinct_identities() {
        let (registry, config, _cap) = setup();
        let keypair = EphemeralKeypair::generate();
        let document = keypair.attest(config.pcrs());

        let a = registry.register_enclave(&config.id, &document).unwrap();
        let b = registry.register_enclave(&config.id, &document).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.public_key, b.public_key);
        assert_eq!(a.config_version, b.config_version);
        assert_eq!(registry.identities().len(), 2);
    }

    #[test]
    fn test_concurrent_registrations_both_succeed() {
        let (registry, config, _cap) = setup();
        let registry = Arc::new(registry);
        let keypair = EphemeralKeypair::generate();
        let document = Arc::new(keypair.attest(config.pcrs()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let document = Arc::clone(&document);
                let config_id = config.id.clone();
                std::thread::spawn(move || {
                    registry.register_enclave(&config_id, &document).unwrap()
                })
            })
            .collect();

        let minted: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(registry.identities().len(), 4);
        for identity in &minted {
            assert_eq!(identity.public_key, keypair.public_key().to_vec());
            assert_eq!(identity.config_version, 0);
        }
    }

    #[test]
    fn test_retire_requires_strict_staleness() {
        let (registry, config, cap) = setup();
        let keypair = EphemeralKeypair::generate();
        let identity = registry
            .register_enclave(&config.id, &keypair.attest(config.pcrs()))
            .unwrap();

        let err = registry.retire(&identity.id).unwrap_err();
        assert!(matches!(err, RegistryError::NotStale { .. }));
        assert!(registry.identity(&identity.id).is_some());

        let [m0, m1, m2] = measurements(b"v1");
        registry
            .update_measurements(&config.id, &cap, m0, m1, m2)
            .unwrap();

        registry.retire(&identity.id).unwrap();
        assert!(registry.identity(&identity.id).is_none());
        assert!(matches!(
            registry.retire(&identity.id),
            Err(RegistryError::IdentityNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_ids_are_lookup_errors() {
        let (registry, _config, cap) = setup();
        let [m0, m1, m2] = measurements(b"x");
        assert!(matches!(
            registry.update_measurements("missing", &cap, m0, m1, m2),
            Err(RegistryError::ConfigNotFound(_))
        ));
        assert!(matches!(
            registry.is_stale("missing"),
            Err(RegistryError::IdentityNotFound(_))
        ));
        let document = document_for(&measurements(b"v0"), vec![0u8; 32]);
        assert!(matches!(
            registry.register_enclave("missing", &document),
            Err(RegistryError::ConfigNotFound(_))
        ));
    }

    #[test]
    fn test_verify_signature_through_registry() {
        let (registry, config, _cap) = setup();
        let keypair = EphemeralKeypair::generate();
        let identity = registry
            .register_enclave(&config.id, &keypair.attest(config.pcrs()))
            .unwrap();

        let payload = "ready".to_string();
        let signature = keypair.sign_envelope(IntentScope(0), 42, &payload);
        assert!(registry
            .verify_signature(&identity.id, IntentScope(0), 42, &payload, &signature)
            .unwrap());
        assert!(!registry
            .verify_signature(&identity.id, IntentScope(1), 42, &payload, &signature)
            .unwrap());
        assert!(matches!(
            registry.verify_signature("missing", IntentScope(0), 42, &payload, &signature),
            Err(RegistryError::IdentityNotFound(_))
        ));
    }
}
