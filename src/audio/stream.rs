// Live capture stream handle shared between the session and its observers.
//
// The session owns the AudioStream exclusively; the recognizer, the sample
// collector and the waveform only hold broadcast subscriptions. Stopping the
// tracks is idempotent, and dropping the stream runs the same release path so
// teardown can never leak a capture thread.

use tokio::sync::broadcast;
use tracing::debug;

use super::backend::AudioFrame;

/// Broadcast capacity for in-flight frames; slow readers lag and skip
const FRAME_CHANNEL_CAPACITY: usize = 64;

/// One producing track of a live stream
///
/// Wraps the one-shot stop action handed over by the backend (signal a
/// capture thread, cancel a generator task). `stop()` consumes it, so a
/// second call has no observable effect.
pub struct TrackHandle {
    label: String,
    stop: Option<Box<dyn FnOnce() + Send>>,
}

impl TrackHandle {
    pub fn new(label: impl Into<String>, stop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            label: label.into(),
            stop: Some(Box::new(stop)),
        }
    }

    /// Stop the producing side; no-op after the first call
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            debug!("Stopping audio track: {}", self.label);
            stop();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_none()
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Drop for TrackHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A live audio capture stream
///
/// Frames flow from the backend's producer into a broadcast channel; any
/// number of observers can `subscribe()`. Once every track is stopped and
/// the stream itself is dropped, subscribers see the channel close and can
/// wind down on their own.
pub struct AudioStream {
    sample_rate: u32,
    channels: u16,
    frames: broadcast::Sender<AudioFrame>,
    tracks: Vec<TrackHandle>,
}

impl AudioStream {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        let (frames, _) = broadcast::channel(FRAME_CHANNEL_CAPACITY);
        Self::from_sender(sample_rate, channels, frames)
    }

    /// Build a stream around a sender the backend already handed to its
    /// producer (used when the real capture format is only known after the
    /// device has been opened)
    pub(crate) fn from_sender(
        sample_rate: u32,
        channels: u16,
        frames: broadcast::Sender<AudioFrame>,
    ) -> Self {
        Self {
            sample_rate,
            channels,
            frames,
            tracks: Vec::new(),
        }
    }

    /// Producer-side handle for the backend that feeds this stream
    pub fn sink(&self) -> broadcast::Sender<AudioFrame> {
        self.frames.clone()
    }

    /// Register a producing track
    pub fn add_track(&mut self, track: TrackHandle) {
        self.tracks.push(track);
    }

    /// Subscribe to live frames (read-only observer)
    pub fn subscribe(&self) -> broadcast::Receiver<AudioFrame> {
        self.frames.subscribe()
    }

    /// Stop every track; safe to call repeatedly
    pub fn stop_tracks(&mut self) {
        for track in &mut self.tracks {
            track.stop();
        }
    }

    /// True while at least one track has not been stopped
    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(|t| !t.is_stopped())
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl Drop for AudioStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_track_stop_is_idempotent() {
        let stops = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&stops);
        let mut track = TrackHandle::new("test", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        track.stop();
        track.stop();
        track.stop();

        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(track.is_stopped());
    }

    #[test]
    fn test_stream_drop_stops_tracks() {
        let stops = Arc::new(AtomicUsize::new(0));

        {
            let mut stream = AudioStream::new(16000, 1);
            let counter = Arc::clone(&stops);
            stream.add_track(TrackHandle::new("test", move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
            assert!(stream.is_live());
        }

        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_tracks_then_drop_releases_once() {
        let stops = Arc::new(AtomicUsize::new(0));

        let mut stream = AudioStream::new(16000, 1);
        let counter = Arc::clone(&stops);
        stream.add_track(TrackHandle::new("test", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        stream.stop_tracks();
        assert!(!stream.is_live());
        drop(stream);

        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_subscribers_receive_frames() {
        let stream = AudioStream::new(16000, 1);
        let mut rx = stream.subscribe();

        let sink = stream.sink();
        sink.send(AudioFrame {
            samples: vec![1, 2, 3],
            sample_rate: 16000,
            channels: 1,
            timestamp_ms: 0,
        })
        .expect("subscriber is live");

        let frame = rx.recv().await.expect("frame delivered");
        assert_eq!(frame.samples, vec![1, 2, 3]);
    }
}
