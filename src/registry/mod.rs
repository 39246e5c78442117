//! Device registry: the single source of truth for which accessories exist
//! in this runtime session.
//!
//! Every mutation runs inside one critical section, including the host
//! notification, so the host's externally visible set can never diverge
//! from `devices`.

mod exposure;

pub use exposure::Exposure;

use crate::accessory::{DeviceRecord, DeviceSnapshot, identity};
use crate::catalog::CapabilityCatalog;
use crate::config::PlatformConfig;
use crate::error::{BridgeError, Result};
use crate::host::AccessoryHost;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Default)]
struct RegistryState {
    restored: bool,
    devices: HashMap<Uuid, Arc<DeviceRecord>>,
}

pub struct DeviceRegistry {
    platform: PlatformConfig,
    catalog: CapabilityCatalog,
    host: Arc<dyn AccessoryHost>,
    state: Mutex<RegistryState>,
}

impl DeviceRegistry {
    pub fn new(
        platform: PlatformConfig,
        catalog: CapabilityCatalog,
        host: Arc<dyn AccessoryHost>,
    ) -> Self {
        Self {
            platform,
            catalog,
            host,
            state: Mutex::new(RegistryState::default()),
        }
    }

    pub fn exposure(&self) -> &Exposure {
        &self.platform.exposure
    }

    /// Id a device named `name` gets in this registry.
    pub fn derive_id(&self, name: &str) -> Uuid {
        match self.platform.exposure {
            Exposure::ExternallyPublished { .. } => identity::derive_id(
                &format!(
                    "{}:external-{}",
                    self.platform.namespace, self.platform.device_kind
                ),
                name,
            ),
            _ => identity::derive_id(&self.platform.namespace, name),
        }
    }

    /// Rebuild devices the host persisted in an earlier session.
    ///
    /// Malformed or duplicate snapshots are skipped. Returns the number of
    /// devices restored.
    pub fn restore(&self, persisted: Vec<DeviceSnapshot>) -> Result<usize> {
        let mut state = self.state.lock();
        if state.restored {
            return Err(BridgeError::AlreadyRestored);
        }

        for snapshot in persisted {
            if state.devices.contains_key(&snapshot.id) {
                warn!(
                    "[Registry] Skipping cached accessory {}: {}",
                    snapshot.display_name,
                    BridgeError::DuplicateIdentity(snapshot.id)
                );
                continue;
            }
            match self.catalog.reattach(&snapshot) {
                Ok(record) => {
                    info!(
                        "[Registry] Loading accessory from cache: {}",
                        record.display_name()
                    );
                    state.devices.insert(record.id(), Arc::new(record));
                }
                Err(e) => warn!(
                    "[Registry] Skipping cached accessory {}: {}",
                    snapshot.display_name, e
                ),
            }
        }

        state.restored = true;
        Ok(state.devices.len())
    }

    /// Create a device named `name` and expose it through the host.
    pub fn add(&self, name: &str) -> Result<Arc<DeviceRecord>> {
        self.ensure_mutable()?;
        let mut state = self.state.lock();
        if !state.restored {
            return Err(BridgeError::NotRestored);
        }

        let id = self.derive_id(name);
        if state.devices.contains_key(&id) {
            return Err(BridgeError::DuplicateIdentity(id));
        }

        let record = Arc::new(self.catalog.build(self.platform.device_kind, id, name)?);
        state.devices.insert(id, record.clone());
        self.host.notify_added(std::slice::from_ref(&record));
        info!("[Registry] Adding new accessory: {}", name);
        Ok(record)
    }

    /// Remove one device. Removing an unknown id is a no-op.
    pub fn remove(&self, id: Uuid) -> Result<()> {
        self.ensure_mutable()?;
        let mut state = self.state.lock();
        if !state.restored {
            return Err(BridgeError::NotRestored);
        }

        match state.devices.remove(&id) {
            Some(record) => {
                self.host.notify_removed(std::slice::from_ref(&record));
                info!("[Registry] Removed accessory: {}", record.display_name());
            }
            None => debug!("[Registry] {}, nothing to remove", BridgeError::UnknownDevice(id)),
        }
        Ok(())
    }

    /// Remove every device in a single host notification batch.
    ///
    /// Returns the records that were tracked before the call.
    pub fn remove_all(&self) -> Result<Vec<Arc<DeviceRecord>>> {
        self.ensure_mutable()?;
        let mut state = self.state.lock();
        if !state.restored {
            return Err(BridgeError::NotRestored);
        }

        let removed: Vec<_> = std::mem::take(&mut state.devices).into_values().collect();
        self.host.notify_removed(&removed);
        info!("[Registry] Removed {} accessories", removed.len());
        Ok(removed)
    }

    /// Expose the configured names of a static or externally published set.
    ///
    /// Devices already present (restored from the cache) are kept as they
    /// are. Dynamic sets publish nothing here.
    pub fn publish(&self) -> Result<Vec<Arc<DeviceRecord>>> {
        let names = match &self.platform.exposure {
            Exposure::StaticSet { names } | Exposure::ExternallyPublished { names } => names,
            Exposure::DynamicSet => return Ok(Vec::new()),
        };

        let mut state = self.state.lock();
        let mut published = Vec::new();
        for name in names {
            let id = self.derive_id(name);
            if state.devices.contains_key(&id) {
                debug!("[Registry] {} already present", name);
                continue;
            }
            let record = Arc::new(self.catalog.build(self.platform.device_kind, id, name)?);
            state.devices.insert(id, record.clone());
            published.push(record);
        }

        if published.is_empty() {
            return Ok(published);
        }
        match self.platform.exposure {
            Exposure::ExternallyPublished { .. } => self.host.publish_external(&published),
            _ => self.host.notify_added(&published),
        }
        info!(
            "[Registry] Published {} {} accessories",
            published.len(),
            self.platform.device_kind
        );
        Ok(published)
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<DeviceRecord>> {
        self.state.lock().devices.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().devices.is_empty()
    }

    pub fn is_restored(&self) -> bool {
        self.state.lock().restored
    }

    /// All tracked records, ordered by display name.
    pub fn records(&self) -> Vec<Arc<DeviceRecord>> {
        let mut records: Vec<_> = self.state.lock().devices.values().cloned().collect();
        records.sort_by(|a, b| a.display_name().cmp(b.display_name()));
        records
    }

    /// Snapshots of every record with their last-known values.
    pub fn snapshots(&self) -> Vec<DeviceSnapshot> {
        self.records().iter().map(|r| r.snapshot()).collect()
    }

    fn ensure_mutable(&self) -> Result<()> {
        if self.platform.exposure.is_mutable() {
            Ok(())
        } else {
            Err(BridgeError::ImmutableDeviceSet)
        }
    }
}
