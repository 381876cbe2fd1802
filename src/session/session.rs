use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::questions::{Advance, QuestionDeck};
use super::transcript::TranscriptBuffer;
use crate::audio::{AudioClip, AudioFrame, AudioStream, CaptureError, MicBackend};
use crate::speech::{RecognitionHandle, Recognizer, Transcriber};
use crate::waveform::{Waveform, WaveformConfig};

/// Where the session is in its recording cycle; exactly one value at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Preparing,
    Recording,
    Processing,
    Error,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("cannot {action} while the session is {status:?}")]
    InvalidTransition {
        action: &'static str,
        status: SessionStatus,
    },

    #[error("an interview needs at least one question")]
    EmptyDeck,
}

/// Per-session tunables
#[derive(Debug, Clone)]
pub struct InterviewOptions {
    /// Bound on the finalization wait before giving up and going idle
    pub finalize_timeout: Duration,
    /// Directory for archived answer WAVs (None = no archive)
    pub recordings_path: Option<PathBuf>,
    /// Waveform settings (None = no visualizer)
    pub waveform: Option<WaveformConfig>,
}

impl Default for InterviewOptions {
    fn default() -> Self {
        Self {
            finalize_timeout: Duration::from_secs(15),
            recordings_path: None,
            waveform: Some(WaveformConfig::default()),
        }
    }
}

/// Serializable view of the session for the UI
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: String,
    pub status: SessionStatus,
    pub question_index: usize,
    pub question_count: usize,
    pub question: String,
    pub transcript: String,
    pub started_at: DateTime<Utc>,
    pub last_error: Option<String>,
}

/// One live interview: a question deck, a transcript, and the recording
/// resources the session owns while capturing
///
/// The session is the sole owner of the audio stream and the recognition
/// handle. Whichever of {manual stop, close, drop} happens first runs the
/// release sequence; later attempts are no-ops.
pub struct InterviewSession {
    id: String,
    options: InterviewOptions,
    status: SessionStatus,
    deck: QuestionDeck,
    transcript: Arc<Mutex<TranscriptBuffer>>,
    last_error: Option<String>,
    started_at: DateTime<Utc>,

    mic: Box<dyn MicBackend>,
    recognizer: Box<dyn Recognizer>,
    transcriber: Arc<dyn Transcriber>,

    // Held only while status is Recording
    stream: Option<AudioStream>,
    recognition: Option<RecognitionHandle>,
    collector: Option<JoinHandle<Vec<i16>>>,
    waveform: Option<Waveform>,
}

impl InterviewSession {
    pub fn new(
        id: impl Into<String>,
        questions: Vec<String>,
        options: InterviewOptions,
        mic: Box<dyn MicBackend>,
        recognizer: Box<dyn Recognizer>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Result<Self, SessionError> {
        let deck = QuestionDeck::new(questions).ok_or(SessionError::EmptyDeck)?;
        let id = id.into();

        info!(
            "Interview session {} created ({} questions, mic={}, recognizer={}, transcriber={})",
            id,
            deck.len(),
            mic.name(),
            recognizer.name(),
            transcriber.name()
        );

        Ok(Self {
            id,
            options,
            status: SessionStatus::Idle,
            deck,
            transcript: Arc::new(Mutex::new(TranscriptBuffer::new())),
            last_error: None,
            started_at: Utc::now(),
            mic,
            recognizer,
            transcriber,
            stream: None,
            recognition: None,
            collector: None,
            waveform: None,
        })
    }

    /// Acquire the microphone and begin capturing
    ///
    /// Valid from `idle` and from `error` (user retry). On acquisition
    /// failure the session transitions to `error` holding no resources.
    pub async fn start_recording(&mut self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Idle | SessionStatus::Error => {}
            status => {
                return Err(SessionError::InvalidTransition {
                    action: "start recording",
                    status,
                })
            }
        }

        self.status = SessionStatus::Preparing;
        self.last_error = None;
        info!(
            "Preparing to record answer to question {}/{}",
            self.deck.index() + 1,
            self.deck.len()
        );

        let stream = match self.mic.acquire().await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("Microphone acquisition failed: {}", e);
                self.status = SessionStatus::Error;
                self.last_error = Some(e.to_string());
                return Err(e.into());
            }
        };

        let transcript = Arc::clone(&self.transcript);
        let recognition = self.recognizer.start(
            stream.subscribe(),
            Box::new(move |text| {
                let mut buffer = transcript.lock().expect("transcript lock poisoned");
                buffer.set(text);
            }),
        );
        if !recognition.supported() {
            debug!("Recognition unsupported; transcript stays manually editable");
        }

        self.collector = Some(spawn_collector(stream.subscribe()));
        self.waveform = self
            .options
            .waveform
            .clone()
            .map(|config| Waveform::attach(&stream, config));
        self.stream = Some(stream);
        self.recognition = Some(recognition);
        self.status = SessionStatus::Recording;

        info!("Recording started");
        Ok(())
    }

    /// Stop capturing and run the finalization pass
    ///
    /// The recognition handle, the waveform and the stream tracks are all
    /// released before the first await: while the transcriber runs, nothing
    /// mutates the transcript concurrently.
    pub async fn stop_recording(&mut self) -> Result<(), SessionError> {
        if self.status != SessionStatus::Recording {
            return Err(SessionError::InvalidTransition {
                action: "stop recording",
                status: self.status,
            });
        }

        self.status = SessionStatus::Processing;

        let (sample_rate, channels) = self
            .stream
            .as_ref()
            .map(|s| (s.sample_rate(), s.channels()))
            .unwrap_or((16000, 1));
        self.release_capture();

        let samples = match self.collector.take() {
            Some(task) => task.await.unwrap_or_else(|e| {
                warn!("Sample collector failed: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        let clip = AudioClip::new(samples, sample_rate, channels);
        info!("Recording stopped ({:.1}s captured)", clip.duration_seconds());

        self.archive_answer(&clip);

        match tokio::time::timeout(
            self.options.finalize_timeout,
            self.transcriber.transcribe(&clip),
        )
        .await
        {
            Ok(Ok(result)) => {
                self.transcript
                    .lock()
                    .expect("transcript lock poisoned")
                    .append_final(&result.text);
            }
            Ok(Err(e)) => {
                warn!("Transcription failed: {:#}", e);
                self.last_error = Some(format!("transcription failed: {:#}", e));
            }
            Err(_) => {
                warn!(
                    "Transcription timed out after {:?}",
                    self.options.finalize_timeout
                );
                self.last_error = Some("transcription timed out".to_string());
            }
        }

        self.status = SessionStatus::Idle;
        Ok(())
    }

    /// Advance to the next question, clearing the transcript in the same
    /// logical step
    ///
    /// Rejected while recording or processing; the UI must stop first.
    pub fn next_question(&mut self) -> Result<Advance, SessionError> {
        match self.status {
            SessionStatus::Recording | SessionStatus::Processing | SessionStatus::Preparing => {
                return Err(SessionError::InvalidTransition {
                    action: "advance the question",
                    status: self.status,
                })
            }
            SessionStatus::Idle | SessionStatus::Error => {}
        }

        let advance = self.deck.advance();
        self.transcript
            .lock()
            .expect("transcript lock poisoned")
            .clear();
        self.status = SessionStatus::Idle;
        self.last_error = None;

        match advance {
            Advance::Advanced(index) => {
                info!("Advanced to question {}/{}", index + 1, self.deck.len())
            }
            Advance::Complete => info!("Interview complete, staying on the last question"),
        }

        Ok(advance)
    }

    /// Manual transcript edit; same replacement entry point the recognition
    /// callback uses
    pub fn set_transcript(&self, text: impl Into<String>) {
        self.transcript
            .lock()
            .expect("transcript lock poisoned")
            .set(text.into());
    }

    pub fn transcript(&self) -> String {
        self.transcript
            .lock()
            .expect("transcript lock poisoned")
            .text()
            .to_string()
    }

    /// Tear the session down; same release sequence as an explicit stop,
    /// minus finalization. Safe to call more than once.
    pub fn close(&mut self) {
        if self.stream.is_some() {
            info!("Closing interview session {} mid-recording", self.id);
        }
        self.release_capture();
        self.collector.take();
        if matches!(
            self.status,
            SessionStatus::Recording | SessionStatus::Processing | SessionStatus::Preparing
        ) {
            self.status = SessionStatus::Idle;
        }
    }

    fn release_capture(&mut self) {
        if let Some(mut recognition) = self.recognition.take() {
            recognition.stop();
        }
        if let Some(mut waveform) = self.waveform.take() {
            waveform.stop();
        }
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
            // Dropping the stream closes the frame channel; the collector
            // drains and returns its samples
        }
    }

    fn archive_answer(&self, clip: &AudioClip) {
        let Some(dir) = &self.options.recordings_path else {
            return;
        };
        if clip.is_empty() {
            return;
        }

        let path = dir.join(format!("{}-q{:02}.wav", self.id, self.deck.index()));
        if let Err(e) = clip.write_wav(&path) {
            warn!("Failed to archive answer audio: {:#}", e);
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            status: self.status,
            question_index: self.deck.index(),
            question_count: self.deck.len(),
            question: self.deck.current().to_string(),
            transcript: self.transcript(),
            started_at: self.started_at,
            last_error: self.last_error.clone(),
        }
    }

    /// Current amplitude trace; empty while not recording
    pub fn waveform_trace(&self) -> Vec<f32> {
        self.waveform
            .as_ref()
            .map(|w| w.trace())
            .unwrap_or_default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn question_index(&self) -> usize {
        self.deck.index()
    }

    pub fn holds_stream(&self) -> bool {
        self.stream.is_some()
    }

    pub fn holds_recognition(&self) -> bool {
        self.recognition.is_some()
    }
}

impl Drop for InterviewSession {
    fn drop(&mut self) {
        self.release_capture();
    }
}

/// Accumulate every captured sample until the stream closes
fn spawn_collector(mut frames: broadcast::Receiver<AudioFrame>) -> JoinHandle<Vec<i16>> {
    tokio::spawn(async move {
        let mut samples = Vec::new();
        loop {
            match frames.recv().await {
                Ok(frame) => samples.extend_from_slice(&frame.samples),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Sample collector lagged, dropped {} frames", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        samples
    })
}
