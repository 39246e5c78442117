//! Capability catalog: builds the capability set of each device kind.
//!
//! The catalog is handed to the device registry at construction time and
//! lives as long as the registry. It is used both for new devices and for
//! re-attaching live handlers to restored snapshots.

use crate::accessory::{
    AccessoryInformation, Attribute, BinaryState, Capability, CapabilityKind, CapabilitySnapshot,
    DeviceRecord, DeviceSnapshot,
};
use crate::config::AccessoryConfig;
use crate::error::{BridgeError, Result};
use crate::streaming::{StreamingDelegate, StreamingNegotiator, StreamingStatusAttribute};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{Display, EnumString};
use uuid::Uuid;

/// Kind of device the registry creates on `add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceKind {
    Switch,
    Lightbulb,
    Camera,
}

/// Produces the session delegate for a camera, given its display name.
pub type DelegateFactory = Arc<dyn Fn(&str) -> Arc<dyn StreamingDelegate> + Send + Sync>;

/// Name given to the light capability of new lightbulb devices.
const LIGHT_SERVICE_NAME: &str = "Test Light";

pub struct CapabilityCatalog {
    accessory: AccessoryConfig,
    negotiator: StreamingNegotiator,
    delegates: DelegateFactory,
}

impl CapabilityCatalog {
    pub fn new(
        accessory: AccessoryConfig,
        negotiator: StreamingNegotiator,
        delegates: DelegateFactory,
    ) -> Self {
        Self {
            accessory,
            negotiator,
            delegates,
        }
    }

    /// Build a fresh device of `kind`. Attributes start from their defaults.
    pub fn build(&self, kind: DeviceKind, id: Uuid, display_name: &str) -> Result<DeviceRecord> {
        let functional = match kind {
            DeviceKind::Switch => Self::switch(display_name, false),
            DeviceKind::Lightbulb => Self::lightbulb(LIGHT_SERVICE_NAME, false),
            DeviceKind::Camera => self.camera(id, display_name, false)?,
        };
        DeviceRecord::new(
            id,
            display_name,
            vec![self.information(id, display_name), functional],
        )
    }

    /// Rebuild a device from its snapshot, keeping its id and capability
    /// structure and restoring last-known attribute values.
    pub fn reattach(&self, snapshot: &DeviceSnapshot) -> Result<DeviceRecord> {
        let capabilities = snapshot
            .capabilities
            .iter()
            .map(|c| self.reattach_capability(snapshot, c))
            .collect::<Result<Vec<_>>>()?;

        DeviceRecord::new(snapshot.id, &snapshot.display_name, capabilities).map_err(|e| {
            BridgeError::MalformedSnapshot {
                id: snapshot.id,
                reason: e.to_string(),
            }
        })
    }

    fn reattach_capability(
        &self,
        device: &DeviceSnapshot,
        capability: &CapabilitySnapshot,
    ) -> Result<Capability> {
        let on = capability.bool_value("On");
        match capability.kind {
            CapabilityKind::AccessoryInfo => Ok(self.information(device.id, &device.display_name)),
            CapabilityKind::Switch => Ok(Self::switch(&capability.name, on)),
            CapabilityKind::Lightbulb => Ok(Self::lightbulb(&capability.name, on)),
            CapabilityKind::CameraStream => self.camera(
                device.id,
                &capability.name,
                capability.bool_value("Active"),
            ),
        }
    }

    fn information(&self, id: Uuid, display_name: &str) -> Capability {
        AccessoryInformation::new(display_name)
            .with_manufacturer(&self.accessory.manufacturer)
            .with_model(&self.accessory.model)
            .with_serial_number(id.simple().to_string().to_uppercase())
            .into_capability()
    }

    fn switch(name: &str, on: bool) -> Capability {
        Capability::new(CapabilityKind::Switch, name)
            .with_attribute(Attribute::read_write("On", Arc::new(BinaryState::new(name, on))))
    }

    fn lightbulb(name: &str, on: bool) -> Capability {
        Capability::new(CapabilityKind::Lightbulb, name)
            .with_attribute(Attribute::read_write("On", Arc::new(BinaryState::new(name, on))))
    }

    /// Negotiate the streaming capability once and bind it to a fresh delegate.
    fn camera(&self, id: Uuid, name: &str, active: bool) -> Result<Capability> {
        let descriptor = self.negotiator.build(id)?;
        let delegate = (self.delegates)(name);
        let controller = Arc::new(StreamingNegotiator::bind(descriptor, delegate));

        Ok(Capability::new(CapabilityKind::CameraStream, name)
            .with_attribute(Attribute::read_only(
                "StreamingStatus",
                Arc::new(StreamingStatusAttribute::new(controller.clone())),
            ))
            .with_attribute(Attribute::read_write(
                "Active",
                Arc::new(BinaryState::new(format!("{name} Camera"), active)),
            ))
            .with_stream_controller(controller))
    }
}
