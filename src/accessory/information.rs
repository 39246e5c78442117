//! AccessoryInfo capability: manufacturer, model, serial number and identify.

use super::capability::{Attribute, AttributeHandler, AttributeValue, Capability, CapabilityKind};
use crate::error::{BridgeError, Result};
use std::sync::Arc;

/// Fixed, read-only attribute value.
struct StaticValue {
    name: &'static str,
    value: AttributeValue,
}

impl AttributeHandler for StaticValue {
    fn get(&self) -> AttributeValue {
        self.value.clone()
    }

    fn set(&self, _value: AttributeValue) -> Result<()> {
        Err(BridgeError::ReadOnlyAttribute(self.name.to_string()))
    }
}

/// Write-only identify trigger. Writing `true` logs the identify request.
struct Identify {
    display_name: String,
}

impl AttributeHandler for Identify {
    fn get(&self) -> AttributeValue {
        AttributeValue::Bool(false)
    }

    fn set(&self, value: AttributeValue) -> Result<()> {
        match value {
            AttributeValue::Bool(true) => {
                log::info!("[Accessory] {} identified!", self.display_name);
                Ok(())
            }
            AttributeValue::Bool(false) => Ok(()),
            _ => Err(BridgeError::AttributeTypeMismatch {
                attribute: "Identify".to_string(),
                expected: "boolean",
            }),
        }
    }
}

/// Metadata shown by the host for every accessory.
#[derive(Debug, Clone)]
pub struct AccessoryInformation {
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
}

impl AccessoryInformation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: "Custom Manufacturer".to_string(),
            model: "Custom Model".to_string(),
            serial_number: "Default-Serial".to_string(),
        }
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = serial_number.into();
        self
    }

    /// Build the AccessoryInfo capability descriptor.
    pub fn into_capability(self) -> Capability {
        let fixed = |name: &'static str, value: String| {
            Attribute::read_only(
                name,
                Arc::new(StaticValue {
                    name,
                    value: AttributeValue::Text(value),
                }),
            )
        };

        Capability::new(CapabilityKind::AccessoryInfo, self.name.clone())
            .with_attribute(fixed("Manufacturer", self.manufacturer))
            .with_attribute(fixed("Model", self.model))
            .with_attribute(fixed("SerialNumber", self.serial_number))
            .with_attribute(Attribute::write_only(
                "Identify",
                Arc::new(Identify {
                    display_name: self.name.clone(),
                }),
            ))
            .with_attribute(fixed("Name", self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_information_attributes() {
        let info = AccessoryInformation::new("External Switch")
            .with_model("External Switch")
            .into_capability();

        assert_eq!(info.kind(), CapabilityKind::AccessoryInfo);
        assert_eq!(
            info.get("Manufacturer").unwrap(),
            AttributeValue::Text("Custom Manufacturer".into())
        );
        assert_eq!(
            info.get("Model").unwrap(),
            AttributeValue::Text("External Switch".into())
        );
        assert!(info.set("Identify", AttributeValue::Bool(true)).is_ok());
        assert!(info.state().is_empty());
    }
}
