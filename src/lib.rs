pub mod audio;
pub mod config;
pub mod http;
pub mod session;
pub mod speech;
pub mod waveform;

pub use audio::{
    AudioClip, AudioFrame, AudioStream, CaptureError, DeviceMic, MicBackend, MicConfig,
    MicFactory, MicSource, MockMic, ToneMic, TrackHandle,
};
pub use config::Config;
pub use http::{create_router, AppState};
pub use session::{
    Advance, InterviewOptions, InterviewSession, QuestionDeck, SessionError, SessionSnapshot,
    SessionStatus, TranscriptBuffer,
};
pub use speech::{
    HttpTranscriber, MockTranscriber, NullRecognizer, RecognitionHandle, Recognizer,
    ScriptedRecognizer, TextSink, Transcriber, Transcription,
};
pub use waveform::{render_trace, Waveform, WaveformConfig};
