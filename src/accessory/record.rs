//! Device record: one externally addressable accessory.

use super::capability::{AttributeValue, Capability, CapabilityKind};
use super::snapshot::{CapabilitySnapshot, DeviceSnapshot};
use crate::error::{BridgeError, Result};
use crate::streaming::BoundStreamController;
use std::sync::Arc;
use uuid::Uuid;

/// A named, uniquely identified bundle of capabilities.
///
/// Always holds exactly one AccessoryInfo capability plus at least one
/// functional capability. Records are owned by the device registry; the
/// host only holds shared references for display.
#[derive(Debug)]
pub struct DeviceRecord {
    id: Uuid,
    display_name: String,
    capabilities: Vec<Capability>,
}

impl DeviceRecord {
    pub fn new(
        id: Uuid,
        display_name: impl Into<String>,
        capabilities: Vec<Capability>,
    ) -> Result<Self> {
        let info_count = capabilities
            .iter()
            .filter(|c| c.kind() == CapabilityKind::AccessoryInfo)
            .count();
        if info_count != 1 {
            return Err(BridgeError::InvalidDevice(format!(
                "expected exactly one AccessoryInfo capability, found {info_count}"
            )));
        }
        if !capabilities.iter().any(|c| c.kind().is_functional()) {
            return Err(BridgeError::InvalidDevice(
                "device has no functional capability".to_string(),
            ));
        }

        Ok(Self {
            id,
            display_name: display_name.into(),
            capabilities,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    /// First capability of the given kind.
    pub fn capability(&self, kind: CapabilityKind) -> Option<&Capability> {
        self.capabilities.iter().find(|c| c.kind() == kind)
    }

    /// Stream controller of the camera capability, if this is a camera.
    pub fn stream_controller(&self) -> Option<&Arc<BoundStreamController>> {
        self.capabilities
            .iter()
            .find_map(Capability::stream_controller)
    }

    /// Ask the accessory to identify itself.
    pub fn identify(&self) -> Result<()> {
        self.capability(CapabilityKind::AccessoryInfo)
            .ok_or_else(|| BridgeError::InvalidDevice("missing AccessoryInfo".to_string()))?
            .set("Identify", AttributeValue::Bool(true))
    }

    /// Capture identity, structure and last-known state.
    pub fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot {
            id: self.id,
            display_name: self.display_name.clone(),
            capabilities: self
                .capabilities
                .iter()
                .map(|c| CapabilitySnapshot {
                    kind: c.kind(),
                    name: c.name().to_string(),
                    values: c.state(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessory::{AccessoryInformation, Attribute, BinaryState};

    fn switch_capability() -> Capability {
        Capability::new(CapabilityKind::Switch, "Switch 1").with_attribute(Attribute::read_write(
            "On",
            Arc::new(BinaryState::new("Switch 1", true)),
        ))
    }

    #[test]
    fn test_requires_accessory_info() {
        let result = DeviceRecord::new(Uuid::nil(), "Switch 1", vec![switch_capability()]);
        assert!(matches!(result, Err(BridgeError::InvalidDevice(_))));
    }

    #[test]
    fn test_requires_functional_capability() {
        let info = AccessoryInformation::new("Switch 1").into_capability();
        let result = DeviceRecord::new(Uuid::nil(), "Switch 1", vec![info]);
        assert!(matches!(result, Err(BridgeError::InvalidDevice(_))));
    }

    #[test]
    fn test_rejects_second_accessory_info() {
        let result = DeviceRecord::new(
            Uuid::nil(),
            "Switch 1",
            vec![
                AccessoryInformation::new("a").into_capability(),
                AccessoryInformation::new("b").into_capability(),
                switch_capability(),
            ],
        );
        assert!(matches!(result, Err(BridgeError::InvalidDevice(_))));
    }

    #[test]
    fn test_snapshot_captures_structure_and_state() {
        let record = DeviceRecord::new(
            Uuid::nil(),
            "Switch 1",
            vec![
                AccessoryInformation::new("Switch 1").into_capability(),
                switch_capability(),
            ],
        )
        .unwrap();

        let snapshot = record.snapshot();
        assert_eq!(snapshot.display_name, "Switch 1");
        assert_eq!(snapshot.capabilities.len(), 2);
        assert_eq!(snapshot.capabilities[1].kind, CapabilityKind::Switch);
        assert!(snapshot.capabilities[1].bool_value("On"));
        assert!(record.identify().is_ok());
        assert!(record.stream_controller().is_none());
    }
}
