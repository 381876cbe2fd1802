use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tracing::debug;

use super::recognizer::{RecognitionHandle, Recognizer, TextSink};
use crate::audio::AudioFrame;

/// Recognizer that replays a fixed sequence of text snapshots
///
/// Each snapshot is the full text of the utterance so far, exactly like a
/// real interim-inclusive engine: later snapshots grow, and the consumer
/// replaces its live view on every delivery. Used by demos and tests.
pub struct ScriptedRecognizer {
    snapshots: Vec<String>,
    interval: Duration,
}

impl ScriptedRecognizer {
    pub fn new(snapshots: Vec<String>, interval: Duration) -> Self {
        Self {
            snapshots,
            interval,
        }
    }

    /// Build cumulative word-by-word snapshots from a finished sentence
    pub fn progressive(sentence: &str, interval: Duration) -> Self {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        let snapshots = (1..=words.len())
            .map(|n| words[..n].join(" "))
            .collect();
        Self::new(snapshots, interval)
    }
}

impl Recognizer for ScriptedRecognizer {
    fn start(
        &self,
        _frames: broadcast::Receiver<AudioFrame>,
        on_text: TextSink,
    ) -> RecognitionHandle {
        let snapshots = self.snapshots.clone();
        let interval = self.interval;
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            for snapshot in snapshots {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => {
                        debug!("Scripted recognition stopped mid-script");
                        return;
                    }
                    _ = tokio::time::sleep(interval) => {
                        on_text(snapshot);
                    }
                }
            }

            // Script exhausted; stay alive until stopped like a real engine
            let _ = stop_rx.changed().await;
        });

        RecognitionHandle::started(stop_tx, task)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
