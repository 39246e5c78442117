use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr};

/// H.264 profile advertised to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRepr, Display)]
#[repr(u8)]
pub enum H264Profile {
    Baseline = 0x00,
    Main = 0x01,
    High = 0x02,
}

/// H.264 level advertised to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRepr, Display)]
#[repr(u8)]
pub enum H264Level {
    #[strum(serialize = "3.1")]
    Level3_1 = 0x00,
    #[strum(serialize = "3.2")]
    Level3_2 = 0x01,
    #[strum(serialize = "4.0")]
    Level4_0 = 0x02,
}

/// SRTP crypto suite identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRepr, Display)]
#[repr(u8)]
pub enum SrtpCryptoSuite {
    #[strum(serialize = "AES_CM_128_HMAC_SHA1_80")]
    AesCm128HmacSha1_80 = 0x00,
    #[strum(serialize = "AES_CM_256_HMAC_SHA1_80")]
    AesCm256HmacSha1_80 = 0x01,
    /// Unencrypted. Only useful for inspecting traffic while testing.
    #[strum(serialize = "NONE")]
    None = 0x02,
}

impl SrtpCryptoSuite {
    /// Whether this suite actually encrypts.
    pub fn is_cipher(self) -> bool {
        !matches!(self, SrtpCryptoSuite::None)
    }
}

/// Audio codec type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum AudioCodecType {
    #[strum(serialize = "PCMU")]
    Pcmu,
    #[strum(serialize = "PCMA")]
    Pcma,
    #[strum(serialize = "AAC-eld")]
    AacEld,
    #[strum(serialize = "OPUS")]
    Opus,
    #[strum(serialize = "mSBC")]
    Msbc,
    #[strum(serialize = "AMR")]
    Amr,
    #[strum(serialize = "AMR-WB")]
    AmrWb,
}

impl AudioCodecType {
    /// Codecs that must offer both 16 kHz and 24 kHz.
    pub fn requires_wideband_rates(self) -> bool {
        matches!(self, Self::AacEld | Self::Opus)
    }
}

/// Audio sample rate in kHz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRepr)]
#[repr(u8)]
pub enum AudioSampleRate {
    Khz8 = 8,
    Khz16 = 16,
    Khz24 = 24,
}

/// Video resolution with framerate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u16,
    pub height: u16,
    pub fps: u8,
}

impl Resolution {
    pub const fn new(width: u16, height: u16, fps: u8) -> Self {
        Self { width, height, fps }
    }
}

/// A (profile, level) pair advertised for the video codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoProfile {
    pub profile: H264Profile,
    pub level: H264Level,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioCodec {
    pub codec_type: AudioCodecType,
    pub channels: u8,
    pub sample_rates: Vec<AudioSampleRate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioOptions {
    pub comfort_noise: bool,
    pub codecs: Vec<AudioCodec>,
}

impl Default for AudioOptions {
    /// OPUS mono at 16 and 24 kHz, the codec the host assumes when a camera
    /// does not declare audio support.
    fn default() -> Self {
        Self {
            comfort_noise: false,
            codecs: vec![AudioCodec {
                codec_type: AudioCodecType::Opus,
                channels: 1,
                sample_rates: vec![AudioSampleRate::Khz16, AudioSampleRate::Khz24],
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoOptions {
    pub profiles: Vec<H264Profile>,
    pub levels: Vec<H264Level>,
    pub resolutions: Vec<Resolution>,
}

/// Streaming configuration a negotiator validates and turns into a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingOptions {
    pub stream_count: u8,
    pub crypto_suites: Vec<SrtpCryptoSuite>,
    pub video: VideoOptions,
    /// `None` advertises [`AudioOptions::default`].
    pub audio: Option<AudioOptions>,
}

impl Default for StreamingOptions {
    fn default() -> Self {
        Self {
            // Two concurrent streams is the minimum the host accepts
            stream_count: 2,
            crypto_suites: vec![SrtpCryptoSuite::None, SrtpCryptoSuite::AesCm128HmacSha1_80],
            video: VideoOptions {
                profiles: vec![H264Profile::Baseline, H264Profile::Main, H264Profile::High],
                levels: vec![H264Level::Level3_1, H264Level::Level3_2, H264Level::Level4_0],
                resolutions: vec![
                    Resolution::new(1920, 1080, 30),
                    Resolution::new(1280, 960, 30),
                    Resolution::new(1280, 720, 30),
                    Resolution::new(1024, 768, 30),
                    Resolution::new(640, 480, 30),
                    Resolution::new(640, 360, 30),
                    Resolution::new(480, 360, 30),
                    Resolution::new(480, 270, 30),
                    Resolution::new(320, 240, 30),
                    // Apple Watch
                    Resolution::new(320, 240, 15),
                    Resolution::new(320, 180, 30),
                ],
            },
            audio: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_identifiers() {
        assert_eq!(SrtpCryptoSuite::from_repr(2), Some(SrtpCryptoSuite::None));
        assert_eq!(H264Level::Level4_0.to_string(), "4.0");
        assert_eq!(
            SrtpCryptoSuite::AesCm128HmacSha1_80.to_string(),
            "AES_CM_128_HMAC_SHA1_80"
        );
        assert!(!SrtpCryptoSuite::None.is_cipher());
    }

    #[test]
    fn test_default_catalog() {
        let options = StreamingOptions::default();
        assert_eq!(options.stream_count, 2);
        assert_eq!(options.video.resolutions.len(), 11);
        assert!(options.crypto_suites.iter().any(|s| s.is_cipher()));
        assert!(options.audio.is_none());
    }
}
