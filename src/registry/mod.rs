//! Registry — shared, permissionless trust state
//!
//! A concurrent key-value store over two record kinds:
//! - **MeasurementConfig** (+ its **Capability**): expected measurements and
//!   a monotonic version counter, mutable only by the capability holder
//! - **EnclaveIdentity**: an attestation-verified public key bound to the
//!   config version it was checked against
//!
//! Reads are open to anyone; possession of the capability is the only write
//! authorization. There are no caller-identity ACLs.

mod config;
mod identity;
mod store;

pub use config::{Capability, MeasurementConfig};
pub use identity::EnclaveIdentity;
pub use store::{RegistryError, TrustRegistry};
