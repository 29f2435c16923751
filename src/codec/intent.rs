//! Intent envelope — the signing wrapper.
//!
//! Wraps an application payload with a one-byte intent tag and a millisecond
//! timestamp before canonical encoding. The tag separates signing domains so
//! a signature produced for one purpose can never be replayed for another;
//! the timestamp lets verifiers apply their own freshness policy (the core
//! assigns it no intrinsic expiry).

use serde::{Deserialize, Serialize};

use super::{CanonicalEncode, Encoder};

/// One-byte domain separator for signed messages. Each message purpose gets
/// its own scope value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentScope(pub u8);

/// Signing wrapper: intent tag, then timestamp, then payload, in that order.
///
/// Transient: built only to produce the byte string that is signed or
/// verified, never persisted. The serde derives exist for relaying a signed
/// envelope to clients as JSON; the signing bytes always come from
/// [`signing_bytes`](IntentEnvelope::signing_bytes), never from serde.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentEnvelope<T> {
    pub intent: IntentScope,
    pub timestamp_ms: u64,
    pub data: T,
}

impl<T> IntentEnvelope<T> {
    pub fn new(intent: IntentScope, timestamp_ms: u64, data: T) -> Self {
        Self {
            intent,
            timestamp_ms,
            data,
        }
    }
}

impl<T: CanonicalEncode> IntentEnvelope<T> {
    /// The exact bytes a signature over this envelope commits to.
    pub fn signing_bytes(&self) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.write_u8(self.intent.0);
        enc.write_u64(self.timestamp_ms);
        self.data.encode(&mut enc);
        enc.into_bytes()
    }
}
