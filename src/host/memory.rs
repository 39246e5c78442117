//! In-process host that records every notification batch.

use super::AccessoryHost;
use crate::accessory::DeviceRecord;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Default)]
struct Batches {
    added: Vec<Vec<Uuid>>,
    removed: Vec<Vec<Uuid>>,
    published: Vec<Vec<Uuid>>,
    visible: BTreeSet<Uuid>,
}

/// Host that keeps the externally visible set in memory.
///
/// Useful for embedding the registry without a real bridge and for
/// asserting on notification batches.
#[derive(Default)]
pub struct MemoryHost {
    batches: Mutex<Batches>,
}

fn ids(records: &[Arc<DeviceRecord>]) -> Vec<Uuid> {
    records.iter().map(|r| r.id()).collect()
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn added_batches(&self) -> Vec<Vec<Uuid>> {
        self.batches.lock().added.clone()
    }

    pub fn removed_batches(&self) -> Vec<Vec<Uuid>> {
        self.batches.lock().removed.clone()
    }

    pub fn published_batches(&self) -> Vec<Vec<Uuid>> {
        self.batches.lock().published.clone()
    }

    /// Ids currently visible through this host.
    pub fn visible(&self) -> BTreeSet<Uuid> {
        self.batches.lock().visible.clone()
    }
}

impl AccessoryHost for MemoryHost {
    fn notify_added(&self, records: &[Arc<DeviceRecord>]) {
        let ids = ids(records);
        let mut batches = self.batches.lock();
        batches.visible.extend(ids.iter().copied());
        batches.added.push(ids);
    }

    fn notify_removed(&self, records: &[Arc<DeviceRecord>]) {
        let ids = ids(records);
        let mut batches = self.batches.lock();
        for id in &ids {
            batches.visible.remove(id);
        }
        batches.removed.push(ids);
    }

    fn publish_external(&self, records: &[Arc<DeviceRecord>]) {
        let ids = ids(records);
        let mut batches = self.batches.lock();
        batches.visible.extend(ids.iter().copied());
        batches.published.push(ids);
    }
}
