//! Capability descriptors and their attribute contracts.
//!
//! A capability is one controllable aspect of an accessory (a switch, a light,
//! a camera feed). Each capability exposes named attributes, and every
//! attribute carries a read/write contract backed by an [`AttributeHandler`].

use crate::error::{BridgeError, Result};
use crate::streaming::BoundStreamController;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use strum::{Display, EnumString};

/// Capability type exposed to the host.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
pub enum CapabilityKind {
    /// Manufacturer, model, serial and identify support. Exactly one per device.
    AccessoryInfo,
    /// Binary on/off switch
    Switch,
    /// On/off light
    Lightbulb,
    /// Camera with a negotiated streaming capability
    CameraStream,
}

impl CapabilityKind {
    /// Whether this kind represents device functionality (anything but AccessoryInfo).
    pub fn is_functional(self) -> bool {
        !matches!(self, Self::AccessoryInfo)
    }
}

/// Access contract of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

impl Access {
    pub fn readable(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    pub fn writable(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

/// Typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Bool(bool),
    Enum(u8),
    Number(f64),
    Text(String),
}

impl AttributeValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<u8> {
        match self {
            Self::Enum(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

/// Request/response contract behind a single attribute.
///
/// Handlers are synchronous: nothing behind them performs I/O. A handler
/// always targets the same backing value for the lifetime of its device.
pub trait AttributeHandler: Send + Sync + 'static {
    /// Returns the current value.
    fn get(&self) -> AttributeValue;

    /// Applies a new value.
    fn set(&self, value: AttributeValue) -> Result<()>;
}

/// A named attribute with its access contract.
#[derive(Clone)]
pub struct Attribute {
    name: &'static str,
    access: Access,
    handler: Arc<dyn AttributeHandler>,
}

impl Attribute {
    pub fn read_only(name: &'static str, handler: Arc<dyn AttributeHandler>) -> Self {
        Self {
            name,
            access: Access::Read,
            handler,
        }
    }

    pub fn write_only(name: &'static str, handler: Arc<dyn AttributeHandler>) -> Self {
        Self {
            name,
            access: Access::Write,
            handler,
        }
    }

    pub fn read_write(name: &'static str, handler: Arc<dyn AttributeHandler>) -> Self {
        Self {
            name,
            access: Access::ReadWrite,
            handler,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn get(&self) -> Result<AttributeValue> {
        if !self.access.readable() {
            return Err(BridgeError::WriteOnlyAttribute(self.name.to_string()));
        }
        Ok(self.handler.get())
    }

    pub fn set(&self, value: AttributeValue) -> Result<()> {
        if !self.access.writable() {
            return Err(BridgeError::ReadOnlyAttribute(self.name.to_string()));
        }
        self.handler.set(value)
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("access", &self.access)
            .finish_non_exhaustive()
    }
}

/// One capability of a device: its kind, a display name and its attributes.
///
/// Camera capabilities additionally carry the bound stream controller that
/// was negotiated when the device was configured.
#[derive(Debug, Clone)]
pub struct Capability {
    kind: CapabilityKind,
    name: String,
    attributes: BTreeMap<&'static str, Attribute>,
    stream_controller: Option<Arc<BoundStreamController>>,
}

impl Capability {
    pub fn new(kind: CapabilityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            attributes: BTreeMap::new(),
            stream_controller: None,
        }
    }

    /// Add an attribute. Returns self for method chaining.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.insert(attribute.name, attribute);
        self
    }

    /// Attach the stream controller negotiated for this capability.
    pub fn with_stream_controller(mut self, controller: Arc<BoundStreamController>) -> Self {
        self.stream_controller = Some(controller);
        self
    }

    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    pub fn stream_controller(&self) -> Option<&Arc<BoundStreamController>> {
        self.stream_controller.as_ref()
    }

    /// Read an attribute by name.
    pub fn get(&self, attribute: &str) -> Result<AttributeValue> {
        self.attribute(attribute)
            .ok_or_else(|| BridgeError::UnknownAttribute(attribute.to_string()))?
            .get()
    }

    /// Write an attribute by name.
    pub fn set(&self, attribute: &str, value: AttributeValue) -> Result<()> {
        self.attribute(attribute)
            .ok_or_else(|| BridgeError::UnknownAttribute(attribute.to_string()))?
            .set(value)
    }

    /// Current values of all read/write attributes (the state worth persisting).
    pub fn state(&self) -> BTreeMap<String, AttributeValue> {
        self.attributes
            .values()
            .filter(|attr| attr.access == Access::ReadWrite)
            .map(|attr| (attr.name.to_string(), attr.handler.get()))
            .collect()
    }
}
