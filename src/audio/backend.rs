use thiserror::Error;

use super::stream::AudioStream;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for microphone capture
#[derive(Debug, Clone)]
pub struct MicConfig {
    /// Target sample rate (backends may capture at the device rate)
    pub sample_rate: u32,
    /// Target channel count (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Buffer size in milliseconds (affects latency)
    pub buffer_duration_ms: u64,
    /// Preferred input device name (None = platform default)
    pub device: Option<String>,
}

impl Default for MicConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // 16kHz, what the transcription service expects
            channels: 1,        // Mono
            buffer_duration_ms: 100,
            device: None,
        }
    }
}

/// Why a microphone could not be acquired
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// The platform has no usable audio input capability
    #[error("audio capture is not supported on this system")]
    NotSupported,
    /// The user or the OS refused access to the input device
    #[error("microphone access was denied")]
    PermissionDenied,
    /// The driver accepted the request but failed while setting up the stream
    #[error("audio backend failure: {0}")]
    Backend(String),
}

/// Microphone acquisition backend
///
/// Implementations:
/// - Device: cpal input device (the production path)
/// - Tone: synthetic sine source (demos, waveform tests)
/// - Mock: scriptable outcomes and release counters (tests)
#[async_trait::async_trait]
pub trait MicBackend: Send + Sync {
    /// Request exclusive access to an input device
    ///
    /// On success the returned stream is live: at least one track is
    /// producing frames. Both failure modes must surface to the caller,
    /// never be swallowed.
    async fn acquire(&mut self) -> Result<AudioStream, CaptureError>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Microphone backend factory
pub struct MicFactory;

impl MicFactory {
    /// Create the capture backend for a source
    pub fn create(source: MicSource, config: MicConfig) -> Box<dyn MicBackend> {
        match source {
            MicSource::Device => Box::new(super::device::DeviceMic::new(config)),
            MicSource::Tone { frequency_hz } => {
                Box::new(super::mock::ToneMic::new(config, frequency_hz))
            }
        }
    }
}

/// Microphone source type
#[derive(Debug, Clone)]
pub enum MicSource {
    /// Hardware input device (all platforms)
    Device,
    /// Synthetic sine source (no hardware required)
    Tone { frequency_hz: f32 },
}
