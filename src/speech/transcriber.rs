// Finalizing transcription collaborators.
//
// After a recording stops, the session hands the recorded clip to a
// transcriber and appends the returned text to the transcript. The mock
// variant simulates the platform's transcription service; the HTTP variant
// talks to the real one.

use anyhow::{Context, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::audio::AudioClip;

/// Result of a finalization pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    /// Transcribed text
    pub text: String,
    /// Confidence score (0.0 to 1.0), if the service reports one
    pub confidence: Option<f32>,
}

/// Finalizing transcription service
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe a recorded answer
    async fn transcribe(&self, clip: &AudioClip) -> Result<Transcription>;

    /// Service name for logging
    fn name(&self) -> &str;
}

/// Simulated transcription service
///
/// Returns canned text after a short delay, standing in for the real
/// service during local development and tests.
pub struct MockTranscriber {
    text: String,
    delay: Duration,
}

impl MockTranscriber {
    pub fn new(text: impl Into<String>, delay: Duration) -> Self {
        Self {
            text: text.into(),
            delay,
        }
    }
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self::new(
            "Transcription (mock): answer received",
            Duration::from_millis(300),
        )
    }
}

#[async_trait::async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(&self, clip: &AudioClip) -> Result<Transcription> {
        info!(
            "Mock transcription of {:.1}s clip",
            clip.duration_seconds()
        );
        tokio::time::sleep(self.delay).await;

        Ok(Transcription {
            text: self.text.clone(),
            confidence: None,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[derive(Debug, Serialize)]
struct TranscribeRequest {
    /// Base64-encoded WAV file
    audio: String,
    language: String,
    sample_rate: u32,
    channels: u16,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    text: String,
    confidence: Option<f32>,
}

/// Remote transcription service client
pub struct HttpTranscriber {
    client: reqwest::Client,
    endpoint: String,
    language: String,
}

impl HttpTranscriber {
    pub fn new(endpoint: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            language: language.into(),
        }
    }
}

#[async_trait::async_trait]
impl Transcriber for HttpTranscriber {
    async fn transcribe(&self, clip: &AudioClip) -> Result<Transcription> {
        let wav = clip.to_wav_bytes()?;

        let request = TranscribeRequest {
            audio: base64::engine::general_purpose::STANDARD.encode(&wav),
            language: self.language.clone(),
            sample_rate: clip.sample_rate,
            channels: clip.channels,
        };

        info!(
            "Sending {:.1}s clip to transcription service at {}",
            clip.duration_seconds(),
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .context("Failed to reach transcription service")?
            .error_for_status()
            .context("Transcription service rejected the request")?;

        let body: TranscribeResponse = response
            .json()
            .await
            .context("Failed to parse transcription response")?;

        Ok(Transcription {
            text: body.text,
            confidence: body.confidence,
        })
    }

    fn name(&self) -> &str {
        "http"
    }
}
