//! Trigger listener: out-of-band add/remove commands for the registry.
//!
//! Commands are coarse and carry no payload beyond an optional device
//! name. Registry errors are logged here and never reach the caller.

mod server;

pub use server::{BoundTriggerListener, TriggerListener};

use crate::accessory::identity;
use crate::registry::DeviceRegistry;
use log::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerCommand {
    /// Add one device. Unnamed devices are named after the current time.
    Add { name: Option<String> },
    RemoveAll,
    /// Anything else the transport received. Acknowledged, never applied.
    Unrecognized { path: String },
}

/// Apply a command and return the resulting device count.
pub fn dispatch(registry: &DeviceRegistry, command: TriggerCommand) -> usize {
    match command {
        TriggerCommand::Add { name } => {
            let name = name.unwrap_or_else(identity::timestamp_name);
            match registry.add(&name) {
                Ok(_) => info!(
                    "[Trigger] Added device \"{}\" ({} devices)",
                    name,
                    registry.len()
                ),
                Err(e) => warn!("[Trigger] Could not add \"{}\": {}", name, e),
            }
        }
        TriggerCommand::RemoveAll => match registry.remove_all() {
            Ok(removed) => info!(
                "[Trigger] Removed {} devices ({} devices)",
                removed.len(),
                registry.len()
            ),
            Err(e) => warn!("[Trigger] Could not remove devices: {}", e),
        },
        TriggerCommand::Unrecognized { path } => info!(
            "[Trigger] Ignoring unrecognized command {} ({} devices)",
            path,
            registry.len()
        ),
    }
    registry.len()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::{CapabilityCatalog, DeviceKind};
    use crate::config::{AccessoryConfig, PlatformConfig};
    use crate::host::MemoryHost;
    use crate::registry::Exposure;
    use crate::streaming::{LoggingDelegate, StreamingDelegate, StreamingNegotiator};
    use std::sync::Arc;

    pub(crate) fn switch_registry(exposure: Exposure) -> (Arc<DeviceRegistry>, Arc<MemoryHost>) {
        let host = Arc::new(MemoryHost::new());
        let catalog = CapabilityCatalog::new(
            AccessoryConfig::default(),
            StreamingNegotiator::new(Default::default()),
            Arc::new(|name: &str| Arc::new(LoggingDelegate::new(name)) as Arc<dyn StreamingDelegate>),
        );
        let platform = PlatformConfig {
            exposure,
            device_kind: DeviceKind::Switch,
            ..Default::default()
        };
        let registry = Arc::new(DeviceRegistry::new(platform, catalog, host.clone()));
        (registry, host)
    }

    #[test]
    fn test_add_named_and_timestamped() {
        let (registry, host) = switch_registry(Exposure::DynamicSet);
        registry.restore(Vec::new()).unwrap();

        let add = |name: Option<&str>| {
            dispatch(
                &registry,
                TriggerCommand::Add {
                    name: name.map(str::to_string),
                },
            )
        };
        assert_eq!(add(Some("Porch")), 1);
        assert_eq!(add(None), 2);
        // Duplicate is swallowed
        assert_eq!(add(Some("Porch")), 2);
        assert_eq!(host.added_batches().len(), 2);
    }

    #[test]
    fn test_remove_all_and_unrecognized() {
        let (registry, host) = switch_registry(Exposure::DynamicSet);
        registry.restore(Vec::new()).unwrap();
        registry.add("A").unwrap();

        let path = "/bogus".to_string();
        assert_eq!(dispatch(&registry, TriggerCommand::Unrecognized { path }), 1);
        assert!(host.removed_batches().is_empty());

        assert_eq!(dispatch(&registry, TriggerCommand::RemoveAll), 0);
        assert_eq!(host.removed_batches().len(), 1);
    }

    #[test]
    fn test_errors_never_escape() {
        // Not restored yet: every command is acknowledged and nothing changes
        let (registry, host) = switch_registry(Exposure::DynamicSet);
        assert_eq!(dispatch(&registry, TriggerCommand::Add { name: None }), 0);
        assert_eq!(dispatch(&registry, TriggerCommand::RemoveAll), 0);
        assert!(host.added_batches().is_empty());
    }
}
