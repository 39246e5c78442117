//! Stream controller bound to a device's camera capability.
//!
//! Admits session requests from the host against the negotiated descriptor
//! and hands them to the session delegate. Tracks active sessions so no more
//! than `stream_count` run at once.

use super::delegate::{PrepareStreamRequest, SnapshotRequest, StartStreamRequest, StreamingDelegate};
use super::negotiator::StreamingCapabilityDescriptor;
use crate::accessory::{AttributeHandler, AttributeValue};
use crate::error::{BridgeError, Result};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use strum::FromRepr;
use uuid::Uuid;

/// Streaming status reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(u8)]
pub enum StreamingStatus {
    Available = 0x00,
    InUse = 0x01,
    Unavailable = 0x02,
}

pub struct BoundStreamController {
    descriptor: Arc<StreamingCapabilityDescriptor>,
    delegate: Arc<dyn StreamingDelegate>,
    sessions: Mutex<HashSet<Uuid>>,
}

impl BoundStreamController {
    pub(super) fn new(
        descriptor: StreamingCapabilityDescriptor,
        delegate: Arc<dyn StreamingDelegate>,
    ) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            delegate,
            sessions: Mutex::new(HashSet::new()),
        }
    }

    /// The descriptor handed to the media pipeline. Never renegotiated.
    pub fn descriptor(&self) -> &Arc<StreamingCapabilityDescriptor> {
        &self.descriptor
    }

    pub fn delegate(&self) -> &Arc<dyn StreamingDelegate> {
        &self.delegate
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn streaming_status(&self) -> StreamingStatus {
        if self.active_sessions() >= self.descriptor.stream_count() as usize {
            StreamingStatus::InUse
        } else {
            StreamingStatus::Available
        }
    }

    pub async fn snapshot(&self, request: SnapshotRequest) -> Result<Vec<u8>> {
        self.delegate.handle_snapshot_request(request).await
    }

    pub async fn prepare(&self, request: &PrepareStreamRequest) -> Result<()> {
        if !self.descriptor.supports_crypto_suite(request.crypto_suite) {
            return Err(BridgeError::UnsupportedStreamParameters(format!(
                "crypto suite {}",
                request.crypto_suite
            )));
        }
        self.delegate.prepare_stream(request).await
    }

    /// Reserve a stream slot and start the session in the delegate.
    pub async fn start(&self, request: &StartStreamRequest) -> Result<()> {
        self.descriptor.check(request)?;

        {
            let mut sessions = self.sessions.lock();
            if sessions.len() >= self.descriptor.stream_count() as usize {
                return Err(BridgeError::MaxStreamsReached);
            }
            if !sessions.insert(request.session_id) {
                return Err(BridgeError::UnsupportedStreamParameters(format!(
                    "session {} already started",
                    request.session_id
                )));
            }
        }

        if let Err(e) = self.delegate.start_stream(request).await {
            self.sessions.lock().remove(&request.session_id);
            return Err(e);
        }
        Ok(())
    }

    /// Release the session's slot and stop it in the delegate.
    pub async fn stop(&self, session_id: Uuid) -> Result<()> {
        if !self.sessions.lock().remove(&session_id) {
            return Err(BridgeError::SessionNotFound(session_id));
        }
        self.delegate.stop_stream(session_id).await
    }
}

impl fmt::Debug for BoundStreamController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundStreamController")
            .field("descriptor", &self.descriptor)
            .field("active_sessions", &self.active_sessions())
            .finish_non_exhaustive()
    }
}

/// Read-only `StreamingStatus` attribute of a camera capability.
pub struct StreamingStatusAttribute {
    controller: Arc<BoundStreamController>,
}

impl StreamingStatusAttribute {
    pub fn new(controller: Arc<BoundStreamController>) -> Self {
        Self { controller }
    }
}

impl AttributeHandler for StreamingStatusAttribute {
    fn get(&self) -> AttributeValue {
        AttributeValue::Enum(self.controller.streaming_status() as u8)
    }

    fn set(&self, _value: AttributeValue) -> Result<()> {
        Err(BridgeError::ReadOnlyAttribute("StreamingStatus".to_string()))
    }
}
