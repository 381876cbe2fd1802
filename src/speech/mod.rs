pub mod recognizer;
pub mod scripted;
pub mod transcriber;

pub use recognizer::{NullRecognizer, RecognitionHandle, Recognizer, TextSink};
pub use scripted::ScriptedRecognizer;
pub use transcriber::{HttpTranscriber, MockTranscriber, Transcriber, Transcription};
