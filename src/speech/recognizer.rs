// Streaming speech recognition contract.
//
// A recognizer consumes live audio frames and delivers text snapshots to a
// single consumer. Every delivery carries the full text of the in-progress
// utterance segment; the consumer replaces its live view, it never appends.

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::audio::AudioFrame;

/// Callback receiving live text snapshots
pub type TextSink = Box<dyn Fn(String) + Send + Sync>;

/// Handle over a started recognition run
///
/// `stop()` is idempotent and safe to call after the audio stream itself has
/// been torn down. A handle with `supported() == false` wraps no engine at
/// all; stopping it is a no-op.
pub struct RecognitionHandle {
    supported: bool,
    stop_tx: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

impl RecognitionHandle {
    /// Handle for a running engine task
    pub fn started(stop_tx: watch::Sender<bool>, task: JoinHandle<()>) -> Self {
        Self {
            supported: true,
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }

    /// No-op handle for platforms without a recognition capability
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            stop_tx: None,
            task: None,
        }
    }

    pub fn supported(&self) -> bool {
        self.supported
    }

    /// Terminate capture; no observable effect beyond the first call
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            debug!("Stopping recognition");
            let _ = stop_tx.send(true);
        }
        // Detach rather than await: the task winds down on its own once it
        // sees the signal or the closed frame channel
        self.task.take();
    }

    pub fn is_stopped(&self) -> bool {
        !self.supported || self.stop_tx.is_none()
    }
}

impl Drop for RecognitionHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Streaming recognition engine
pub trait Recognizer: Send + Sync {
    /// Begin continuous recognition over the given frame subscription,
    /// delivering interim-inclusive snapshots through `on_text`
    fn start(&self, frames: broadcast::Receiver<AudioFrame>, on_text: TextSink)
        -> RecognitionHandle;

    /// Engine name for logging
    fn name(&self) -> &str;
}

/// The capability-absent engine: recording continues audio-only and the
/// transcript stays manually editable
pub struct NullRecognizer;

impl Recognizer for NullRecognizer {
    fn start(
        &self,
        _frames: broadcast::Receiver<AudioFrame>,
        _on_text: TextSink,
    ) -> RecognitionHandle {
        debug!("Speech recognition not available, continuing audio-only");
        RecognitionHandle::unsupported()
    }

    fn name(&self) -> &str {
        "null"
    }
}
