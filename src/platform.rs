//! Platform lifecycle: restore cached accessories, then expose the
//! configured set once the host has finished launching.

use crate::accessory::DeviceSnapshot;
use crate::catalog::{CapabilityCatalog, DelegateFactory};
use crate::config::{Config, ListenerConfig};
use crate::error::{BridgeError, Result};
use crate::host::AccessoryHost;
use crate::registry::{DeviceRegistry, Exposure};
use crate::streaming::StreamingNegotiator;
use crate::trigger::TriggerListener;
use log::info;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Platform {
    name: String,
    listener: ListenerConfig,
    registry: Arc<DeviceRegistry>,
}

impl Platform {
    pub fn new(config: &Config, host: Arc<dyn AccessoryHost>, delegates: DelegateFactory) -> Self {
        let catalog = CapabilityCatalog::new(
            config.accessory.clone(),
            StreamingNegotiator::new(config.streaming.clone()),
            delegates,
        );
        let registry = DeviceRegistry::new(config.platform.clone(), catalog, host);
        info!("[Platform] Finished initializing platform: {}", config.platform.name);

        Self {
            name: config.platform.name.clone(),
            listener: config.listener.clone(),
            registry: Arc::new(registry),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    /// Hand the accessories the host cached in an earlier session to the
    /// registry. Must happen before `did_finish_launching`.
    pub fn configure_cached(&self, snapshots: Vec<DeviceSnapshot>) -> Result<usize> {
        let restored = self.registry.restore(snapshots)?;
        info!("[Platform] Restored {} cached accessories", restored);
        Ok(restored)
    }

    /// Expose the configured accessories. Dynamic sets bind the trigger
    /// listener, then serve it in the background and return its task handle.
    ///
    /// A listener that cannot bind fails the launch.
    pub async fn did_finish_launching(
        &self,
        shutdown: CancellationToken,
    ) -> Result<Option<JoinHandle<Result<()>>>> {
        info!("[Platform] Executed didFinishLaunching callback");
        if !self.registry.is_restored() {
            return Err(BridgeError::NotRestored);
        }

        match self.registry.exposure() {
            Exposure::DynamicSet => {
                let listener =
                    TriggerListener::new(self.registry.clone(), self.listener.socket_addr())
                        .bind()
                        .await?;
                Ok(Some(listener.spawn(shutdown)))
            }
            Exposure::StaticSet { .. } | Exposure::ExternallyPublished { .. } => {
                self.registry.publish()?;
                Ok(None)
            }
        }
    }
}
