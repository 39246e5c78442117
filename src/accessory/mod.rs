//! Accessory model: capability descriptors, device records and their
//! persisted snapshots.

mod binary_state;
mod capability;
pub mod identity;
mod information;
mod record;
mod snapshot;

pub use binary_state::BinaryState;
pub use capability::{
    Access, Attribute, AttributeHandler, AttributeValue, Capability, CapabilityKind,
};
pub use information::AccessoryInformation;
pub use record::DeviceRecord;
pub use snapshot::{CapabilitySnapshot, DeviceSnapshot};
