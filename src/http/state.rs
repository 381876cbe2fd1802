use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::audio::{MicConfig, MicFactory, MicSource};
use crate::config::Config;
use crate::session::{InterviewOptions, InterviewSession, SessionError};
use crate::speech::{
    HttpTranscriber, MockTranscriber, NullRecognizer, Recognizer, ScriptedRecognizer, Transcriber,
};
use crate::waveform::WaveformConfig;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Active interview sessions (interview_id → session)
    pub sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<InterviewSession>>>>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Assemble a session from the configured capture/recognition/
    /// transcription stack
    pub fn build_session(
        &self,
        id: Uuid,
        questions: Option<Vec<String>>,
    ) -> Result<InterviewSession, SessionError> {
        let config = &self.config;

        let mic_config = MicConfig {
            sample_rate: config.audio.sample_rate,
            channels: config.audio.channels,
            buffer_duration_ms: config.audio.buffer_duration_ms,
            device: config.audio.device.clone(),
        };
        let source = match config.audio.source.as_str() {
            "tone" => MicSource::Tone {
                frequency_hz: config.audio.tone_frequency_hz,
            },
            _ => MicSource::Device,
        };
        let mic = MicFactory::create(source, mic_config);

        let recognizer: Box<dyn Recognizer> = match config.speech.engine.as_str() {
            "scripted" if !config.speech.script.is_empty() => Box::new(ScriptedRecognizer::new(
                config.speech.script.clone(),
                Duration::from_millis(config.speech.snapshot_interval_ms),
            )),
            _ => Box::new(NullRecognizer),
        };

        let transcriber: Arc<dyn Transcriber> = match config.transcriber.mode.as_str() {
            "http" => Arc::new(HttpTranscriber::new(
                config.transcriber.endpoint.clone(),
                config.transcriber.language.clone(),
            )),
            _ => Arc::new(MockTranscriber::new(
                config.transcriber.mock_text.clone(),
                Duration::from_millis(300),
            )),
        };

        let options = InterviewOptions {
            finalize_timeout: Duration::from_secs(config.interview.finalize_timeout_secs),
            recordings_path: config.audio.recordings_path.clone(),
            waveform: config.waveform.enabled.then(|| WaveformConfig {
                columns: config.waveform.columns,
                window_ms: config.waveform.window_ms,
                fps: config.waveform.fps,
            }),
        };

        let questions = questions.unwrap_or_else(|| config.interview.questions.clone());

        InterviewSession::new(id.to_string(), questions, options, mic, recognizer, transcriber)
    }
}
