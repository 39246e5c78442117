//! Session delegate interface owned by the external media pipeline.
//!
//! The bridge never touches media. Session setup, RTP/SRTP handling and
//! codec invocation all happen behind a [`StreamingDelegate`].

use super::options::{Resolution, SrtpCryptoSuite, VideoProfile};
use crate::error::{BridgeError, Result};
use async_trait::async_trait;
use std::net::IpAddr;
use uuid::Uuid;

/// Still image request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub width: u16,
    pub height: u16,
}

/// Transport setup for a session, sent before the stream starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareStreamRequest {
    pub session_id: Uuid,
    pub target_address: IpAddr,
    pub video_port: u16,
    pub audio_port: u16,
    pub crypto_suite: SrtpCryptoSuite,
}

/// Parameters the controller selected for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartStreamRequest {
    pub session_id: Uuid,
    pub video: VideoProfile,
    pub resolution: Resolution,
    pub crypto_suite: SrtpCryptoSuite,
}

#[async_trait]
pub trait StreamingDelegate: Send + Sync {
    async fn handle_snapshot_request(&self, request: SnapshotRequest) -> Result<Vec<u8>>;

    async fn prepare_stream(&self, request: &PrepareStreamRequest) -> Result<()>;

    async fn start_stream(&self, request: &StartStreamRequest) -> Result<()>;

    async fn stop_stream(&self, session_id: Uuid) -> Result<()>;
}

/// Delegate that logs session requests without running a media pipeline.
pub struct LoggingDelegate {
    device_name: String,
}

impl LoggingDelegate {
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
        }
    }
}

#[async_trait]
impl StreamingDelegate for LoggingDelegate {
    async fn handle_snapshot_request(&self, request: SnapshotRequest) -> Result<Vec<u8>> {
        log::info!(
            "[Streaming] {} snapshot requested at {}x{}",
            self.device_name,
            request.width,
            request.height
        );
        Err(BridgeError::StreamingDelegate(
            "no media pipeline attached".to_string(),
        ))
    }

    async fn prepare_stream(&self, request: &PrepareStreamRequest) -> Result<()> {
        log::info!(
            "[Streaming] {} preparing session {} to {} (video:{}, audio:{}, {})",
            self.device_name,
            request.session_id,
            request.target_address,
            request.video_port,
            request.audio_port,
            request.crypto_suite
        );
        Ok(())
    }

    async fn start_stream(&self, request: &StartStreamRequest) -> Result<()> {
        log::info!(
            "[Streaming] {} starting session {} at {}x{}@{} ({} {})",
            self.device_name,
            request.session_id,
            request.resolution.width,
            request.resolution.height,
            request.resolution.fps,
            request.video.profile,
            request.video.level
        );
        Ok(())
    }

    async fn stop_stream(&self, session_id: Uuid) -> Result<()> {
        log::info!(
            "[Streaming] {} stopped session {}",
            self.device_name,
            session_id
        );
        Ok(())
    }
}
