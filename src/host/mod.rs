//! Interface to the host bridge process.
//!
//! The host owns pairing, the characteristic wire protocol and its device
//! cache. The registry only tells it which accessories appeared or went
//! away, in batches, exactly once per mutation.

mod cache;
mod memory;

pub use cache::{CachedAccessories, DeviceCache};
pub use memory::MemoryHost;

use crate::accessory::DeviceRecord;
use std::sync::Arc;

pub trait AccessoryHost: Send + Sync {
    /// New accessories became externally visible.
    fn notify_added(&self, records: &[Arc<DeviceRecord>]);

    /// Accessories are no longer externally visible.
    fn notify_removed(&self, records: &[Arc<DeviceRecord>]);

    /// Accessories exposed on their own, paired separately from the bridge.
    fn publish_external(&self, records: &[Arc<DeviceRecord>]) {
        self.notify_added(records);
    }
}
