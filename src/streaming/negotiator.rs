//! Builds and validates the streaming capability a camera advertises.
//!
//! The negotiator turns [`StreamingOptions`] into an immutable
//! [`StreamingCapabilityDescriptor`] once per device and binds it to the
//! session delegate of the media pipeline. It never opens sockets, spawns
//! processes or sees media frames.

use super::controller::BoundStreamController;
use super::delegate::{StartStreamRequest, StreamingDelegate};
use super::options::{
    AudioOptions, AudioSampleRate, Resolution, SrtpCryptoSuite, StreamingOptions, VideoProfile,
};
use crate::error::{BridgeError, Result};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Minimum concurrent streams the host protocol requires.
pub const MIN_STREAM_COUNT: u8 = 2;

/// Negotiated, read-only streaming configuration of one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamingCapabilityDescriptor {
    device_id: Uuid,
    video_profiles: Vec<VideoProfile>,
    resolutions: Vec<Resolution>,
    crypto_suites: Vec<SrtpCryptoSuite>,
    stream_count: u8,
    audio: AudioOptions,
}

impl StreamingCapabilityDescriptor {
    pub fn device_id(&self) -> Uuid {
        self.device_id
    }

    pub fn video_profiles(&self) -> &[VideoProfile] {
        &self.video_profiles
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    pub fn crypto_suites(&self) -> &[SrtpCryptoSuite] {
        &self.crypto_suites
    }

    pub fn stream_count(&self) -> u8 {
        self.stream_count
    }

    pub fn audio(&self) -> &AudioOptions {
        &self.audio
    }

    pub fn supports_crypto_suite(&self, suite: SrtpCryptoSuite) -> bool {
        self.crypto_suites.contains(&suite)
    }

    /// Check that a session request only uses advertised parameters.
    pub fn check(&self, request: &StartStreamRequest) -> Result<()> {
        if !self.video_profiles.contains(&request.video) {
            return Err(BridgeError::UnsupportedStreamParameters(format!(
                "H.264 {} level {}",
                request.video.profile, request.video.level
            )));
        }
        if !self.resolutions.contains(&request.resolution) {
            let r = request.resolution;
            return Err(BridgeError::UnsupportedStreamParameters(format!(
                "resolution {}x{}@{}",
                r.width, r.height, r.fps
            )));
        }
        if !self.supports_crypto_suite(request.crypto_suite) {
            return Err(BridgeError::UnsupportedStreamParameters(format!(
                "crypto suite {}",
                request.crypto_suite
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct StreamingNegotiator {
    options: StreamingOptions,
}

impl StreamingNegotiator {
    pub fn new(options: StreamingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &StreamingOptions {
        &self.options
    }

    /// Validate the configured options and build the descriptor for `device_id`.
    pub fn build(&self, device_id: Uuid) -> Result<StreamingCapabilityDescriptor> {
        validate(&self.options)?;

        let video = &self.options.video;
        let video_profiles = video
            .profiles
            .iter()
            .flat_map(|&profile| {
                video
                    .levels
                    .iter()
                    .map(move |&level| VideoProfile { profile, level })
            })
            .collect();

        let descriptor = StreamingCapabilityDescriptor {
            device_id,
            video_profiles,
            resolutions: video.resolutions.clone(),
            crypto_suites: self.options.crypto_suites.clone(),
            stream_count: self.options.stream_count,
            audio: self.options.audio.clone().unwrap_or_default(),
        };

        log::debug!(
            "[Streaming] Built descriptor for {}: {} profiles, {} resolutions, {} streams",
            device_id,
            descriptor.video_profiles.len(),
            descriptor.resolutions.len(),
            descriptor.stream_count
        );
        Ok(descriptor)
    }

    /// Hand the descriptor to the media pipeline's session delegate.
    pub fn bind(
        descriptor: StreamingCapabilityDescriptor,
        delegate: Arc<dyn StreamingDelegate>,
    ) -> BoundStreamController {
        BoundStreamController::new(descriptor, delegate)
    }
}

fn invalid(reason: impl Into<String>) -> BridgeError {
    BridgeError::InvalidStreamingConfiguration(reason.into())
}

fn validate(options: &StreamingOptions) -> Result<()> {
    if options.stream_count < MIN_STREAM_COUNT {
        return Err(invalid(format!(
            "stream count {} is below the minimum of {}",
            options.stream_count, MIN_STREAM_COUNT
        )));
    }
    if !options.crypto_suites.iter().any(|s| s.is_cipher()) {
        return Err(invalid("no real SRTP cipher suite configured"));
    }
    if options.video.profiles.is_empty() || options.video.levels.is_empty() {
        return Err(invalid("at least one H.264 profile and level required"));
    }
    if options.video.resolutions.is_empty() {
        return Err(invalid("no video resolutions configured"));
    }
    if let Some(r) = options
        .video
        .resolutions
        .iter()
        .find(|r| r.width == 0 || r.height == 0 || r.fps == 0)
    {
        return Err(invalid(format!(
            "resolution {}x{}@{} must be positive",
            r.width, r.height, r.fps
        )));
    }
    if let Some(audio) = &options.audio {
        if audio.codecs.is_empty() {
            return Err(invalid("audio options without codecs"));
        }
        for codec in &audio.codecs {
            if codec.channels == 0 {
                return Err(invalid(format!("{} with zero channels", codec.codec_type)));
            }
            let has = |rate: AudioSampleRate| codec.sample_rates.contains(&rate);
            if codec.codec_type.requires_wideband_rates()
                && !(has(AudioSampleRate::Khz16) && has(AudioSampleRate::Khz24))
            {
                return Err(invalid(format!(
                    "{} must offer 16 kHz and 24 kHz",
                    codec.codec_type
                )));
            }
        }
    }
    Ok(())
}
