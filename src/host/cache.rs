//! JSON file-backed device cache standing in for the host's own cache.
//!
//! Snapshots are written whenever accessories are added or removed and
//! synced with last-known values at shutdown. On the next start they are
//! handed to the registry's restore step.

use super::AccessoryHost;
use crate::accessory::{DeviceRecord, DeviceSnapshot};
use log::{error, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Cached accessories state
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CachedAccessories {
    pub accessories: Vec<DeviceSnapshot>,
}

/// On-disk shape, decoded entry by entry so one bad record does not
/// discard the rest.
#[derive(Deserialize)]
struct RawCache {
    #[serde(default)]
    accessories: Vec<serde_json::Value>,
}

impl CachedAccessories {
    /// Load from file
    pub fn load(path: &Path) -> Self {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("[Cache] No cached accessories found (first run)");
                return Self::default();
            }
            Err(e) => {
                error!("[Cache] Failed to read accessory cache: {}", e);
                return Self::default();
            }
        };

        let raw = match serde_json::from_slice::<RawCache>(&bytes) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("[Cache] Failed to parse accessory cache: {}", e);
                return Self::default();
            }
        };

        let mut accessories = Vec::with_capacity(raw.accessories.len());
        for entry in raw.accessories {
            match serde_json::from_value::<DeviceSnapshot>(entry) {
                Ok(snapshot) => accessories.push(snapshot),
                Err(e) => warn!("[Cache] Skipping malformed cached accessory: {}", e),
            }
        }

        info!(
            "[Cache] Loaded {} cached accessories from {:?}",
            accessories.len(),
            path
        );
        Self { accessories }
    }

    /// Save to file
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(self)?;
        fs::write(path, data)?;
        info!(
            "[Cache] Saved {} accessories to {:?}",
            self.accessories.len(),
            path
        );
        Ok(())
    }

    /// Add or replace an accessory
    pub fn upsert(&mut self, snapshot: DeviceSnapshot) {
        match self.accessories.iter_mut().find(|a| a.id == snapshot.id) {
            Some(existing) => *existing = snapshot,
            None => self.accessories.push(snapshot),
        }
    }

    /// Remove an accessory
    pub fn remove(&mut self, id: Uuid) {
        self.accessories.retain(|a| a.id != id);
    }
}

/// Cache wrapper with auto-save
pub struct DeviceCache {
    path: PathBuf,
    state: RwLock<CachedAccessories>,
}

impl DeviceCache {
    pub fn new(path: PathBuf) -> Self {
        let state = CachedAccessories::load(&path);
        Self {
            path,
            state: RwLock::new(state),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshots for the registry's restore step.
    pub fn snapshots(&self) -> Vec<DeviceSnapshot> {
        self.state.read().accessories.clone()
    }

    /// Replace cached entries with the live state of the given accessories.
    pub fn sync(&self, snapshots: Vec<DeviceSnapshot>) {
        let mut state = self.state.write();
        for snapshot in snapshots {
            state.upsert(snapshot);
        }
        if let Err(e) = state.save(&self.path) {
            error!("[Cache] Failed to save accessory cache: {}", e);
        }
    }
}

impl AccessoryHost for DeviceCache {
    fn notify_added(&self, records: &[Arc<DeviceRecord>]) {
        self.sync(records.iter().map(|r| r.snapshot()).collect());
    }

    fn notify_removed(&self, records: &[Arc<DeviceRecord>]) {
        let mut state = self.state.write();
        for record in records {
            state.remove(record.id());
        }
        if let Err(e) = state.save(&self.path) {
            error!("[Cache] Failed to save accessory cache: {}", e);
        }
    }

    fn publish_external(&self, records: &[Arc<DeviceRecord>]) {
        // Externally published accessories are paired on their own and never cached
        for record in records {
            info!(
                "[Cache] {} published as external accessory",
                record.display_name()
            );
        }
    }
}
