//! Device lookup from trace metadata.
//!
//! A thin adapter over the key/value metadata recorded with a trace. It is
//! independent of the consolidation engine; callers use the name to pick a
//! power model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Metadata key holding the SoC model name.
pub const SOC_MODEL_KEY: &str = "android_soc_model";
/// Fallback key used by guest VMs.
pub const GUEST_SOC_MODEL_KEY: &str = "android_guest_soc_model";
/// Build fingerprint, `brand/product/device:release/id/incremental:type/tags`.
pub const BUILD_FINGERPRINT_KEY: &str = "android_build_fingerprint";

/// String key/value metadata attached to a trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceMetadata(BTreeMap<String, String>);

impl TraceMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Trimmed, non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TraceMetadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Device identifier for a trace.
///
/// Prefers the SoC model, then the guest SoC model, then the device field of
/// the build fingerprint.
pub fn device_name(metadata: &TraceMetadata) -> Option<String> {
    metadata
        .get(SOC_MODEL_KEY)
        .or_else(|| metadata.get(GUEST_SOC_MODEL_KEY))
        .or_else(|| metadata.get(BUILD_FINGERPRINT_KEY).and_then(fingerprint_device))
        .map(str::to_string)
}

/// Third `/`-separated field of a fingerprint, up to the first `:`.
fn fingerprint_device(fingerprint: &str) -> Option<&str> {
    let device = fingerprint.split('/').nth(2)?.split(':').next()?.trim();
    (!device.is_empty()).then_some(device)
}
