//! Measurement configs and the capabilities that guard them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attestation::Measurement;

/// Expected measurements for one application, plus a version counter.
///
/// The version starts at 0, moves by exactly 1 on every measurement update,
/// never on a name change, and never backwards. Enclave identities bind to
/// the version they were verified against, so a bump instantly marks every
/// existing identity stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasurementConfig {
    pub id: String,
    /// Tag identifying the application this config belongs to.
    pub application_tag: String,
    pub name: String,
    pcrs: [Measurement; 3],
    version: u64,
    pub created_at: DateTime<Utc>,
}

impl MeasurementConfig {
    pub fn new(
        application_tag: impl Into<String>,
        name: impl Into<String>,
        m0: Measurement,
        m1: Measurement,
        m2: Measurement,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            application_tag: application_tag.into(),
            name: name.into(),
            pcrs: [m0, m1, m2],
            version: 0,
            created_at: Utc::now(),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Expected value for PCR `index` (0..=2).
    pub fn pcr(&self, index: usize) -> &Measurement {
        &self.pcrs[index]
    }

    pub fn pcrs(&self) -> &[Measurement; 3] {
        &self.pcrs
    }

    /// Replace all three measurements and advance the version by 1. Only the
    /// registry calls this, behind the capability check.
    pub(crate) fn set_pcrs(&mut self, pcrs: [Measurement; 3]) {
        self.pcrs = pcrs;
        self.version += 1;
    }
}

/// Bearer token authorizing mutation of exactly one config.
///
/// Minted once at config creation and never reissued. Possession is the
/// whole check; no caller identity is consulted. The type is deliberately
/// opaque: not cloneable and not serializable, so config creation stays the
/// only mint path.
#[derive(Debug)]
pub struct Capability {
    config_id: String,
    application_tag: String,
}

impl Capability {
    pub(crate) fn new(config_id: String, application_tag: String) -> Self {
        Self {
            config_id,
            application_tag,
        }
    }

    /// Id of the config this capability was minted with.
    pub fn config_id(&self) -> &str {
        &self.config_id
    }

    /// Tag of the application this capability belongs to.
    pub fn application_tag(&self) -> &str {
        &self.application_tag
    }

    /// Whether this capability authorizes changes to `config`.
    pub fn authorizes(&self, config: &MeasurementConfig) -> bool {
        self.config_id == config.id
    }
}
