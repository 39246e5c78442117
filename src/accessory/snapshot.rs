//! Persisted form of a device record: identity, structure and last-known state.
//!
//! Handlers are never persisted. Restoring a snapshot re-attaches live
//! handlers built from each capability's kind.

use super::capability::{AttributeValue, CapabilityKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub id: Uuid,
    pub display_name: String,
    pub capabilities: Vec<CapabilitySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySnapshot {
    pub kind: CapabilityKind,
    pub name: String,
    /// Last-known values of read/write attributes, keyed by attribute name.
    #[serde(default)]
    pub values: BTreeMap<String, AttributeValue>,
}

impl CapabilitySnapshot {
    /// Last-known boolean value of `attribute`, `false` when unspecified.
    pub fn bool_value(&self, attribute: &str) -> bool {
        self.values
            .get(attribute)
            .and_then(AttributeValue::as_bool)
            .unwrap_or(false)
    }
}
