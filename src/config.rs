use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub interview: InterviewConfig,
    pub speech: SpeechConfig,
    pub transcriber: TranscriberConfig,
    pub waveform: WaveformSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "hireview".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8090,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Capture source: "device" (hardware input) or "tone" (synthetic)
    pub source: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub buffer_duration_ms: u64,
    /// Preferred input device name (None = platform default)
    pub device: Option<String>,
    /// Directory for archived answer WAVs (None = no archive)
    pub recordings_path: Option<PathBuf>,
    /// Frequency of the synthetic source, when source = "tone"
    pub tone_frequency_hz: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            source: "device".to_string(),
            sample_rate: 16000,
            channels: 1,
            buffer_duration_ms: 100,
            device: None,
            recordings_path: None,
            tone_frequency_hz: 440.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InterviewConfig {
    /// Default prompt deck for new sessions
    pub questions: Vec<String>,
    /// Bound on the finalization wait before giving up and going idle
    pub finalize_timeout_secs: u64,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            questions: vec![
                "Tell us briefly about yourself.".to_string(),
                "Describe the hardest technical challenge you have solved.".to_string(),
                "How do you handle negative feedback?".to_string(),
                "What are your goals for the coming year?".to_string(),
            ],
            finalize_timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Streaming engine: "none" (audio-only mode) or "scripted" (demo)
    pub engine: String,
    /// Snapshot script for the scripted engine
    pub script: Vec<String>,
    pub snapshot_interval_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            engine: "none".to_string(),
            script: Vec::new(),
            snapshot_interval_ms: 400,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriberConfig {
    /// Finalization service: "mock" or "http"
    pub mode: String,
    /// Endpoint of the real transcription service, when mode = "http"
    pub endpoint: String,
    pub language: String,
    /// Canned text returned by the mock service
    pub mock_text: String,
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            mode: "mock".to_string(),
            endpoint: "http://localhost:9000/transcribe".to_string(),
            language: "en-US".to_string(),
            mock_text: "Transcription (mock): answer received".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WaveformSettings {
    pub enabled: bool,
    pub columns: usize,
    pub window_ms: u64,
    pub fps: u32,
}

impl Default for WaveformSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            columns: 96,
            window_ms: 2000,
            fps: 30,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_usable() {
        let config = Config::default();
        assert_eq!(config.service.http.port, 8090);
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.interview.questions.len(), 4);
        assert_eq!(config.transcriber.mode, "mock");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load("config/does-not-exist").expect("defaults");
        assert_eq!(config.service.name, "hireview");
    }
}
