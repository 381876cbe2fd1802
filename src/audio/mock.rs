// Non-hardware microphone backends.
//
// ToneMic feeds demos and waveform tests on machines without an input
// device. MockMic scripts acquisition outcomes and counts track releases so
// tests can assert the acquire/release balance the session must uphold.

use std::f32::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::backend::{AudioFrame, CaptureError, MicBackend, MicConfig};
use super::stream::{AudioStream, TrackHandle};

/// Synthetic sine source
///
/// Produces frames on a tokio interval at the configured buffer cadence
/// until its track is stopped.
pub struct ToneMic {
    config: MicConfig,
    frequency_hz: f32,
}

impl ToneMic {
    pub fn new(config: MicConfig, frequency_hz: f32) -> Self {
        Self {
            config,
            frequency_hz,
        }
    }
}

#[async_trait::async_trait]
impl MicBackend for ToneMic {
    async fn acquire(&mut self) -> Result<AudioStream, CaptureError> {
        let sample_rate = self.config.sample_rate;
        let channels = self.config.channels;
        let buffer_ms = self.config.buffer_duration_ms.max(10);
        let frequency = self.frequency_hz;

        let mut stream = AudioStream::new(sample_rate, channels);
        let sink = stream.sink();
        let (stop_tx, mut stop_rx) = watch::channel(false);

        tokio::spawn(async move {
            let samples_per_tick = (sample_rate as u64 * buffer_ms / 1000) as usize;
            let step = 2.0 * PI * frequency / sample_rate as f32;
            let mut phase: f32 = 0.0;
            let started = Instant::now();

            let mut ticker = tokio::time::interval(Duration::from_millis(buffer_ms));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {
                        let mut samples = Vec::with_capacity(samples_per_tick * channels as usize);
                        for _ in 0..samples_per_tick {
                            let value = (phase.sin() * 0.4 * i16::MAX as f32) as i16;
                            phase += step;
                            if phase > 2.0 * PI {
                                phase -= 2.0 * PI;
                            }
                            for _ in 0..channels {
                                samples.push(value);
                            }
                        }

                        let _ = sink.send(AudioFrame {
                            samples,
                            sample_rate,
                            channels,
                            timestamp_ms: started.elapsed().as_millis() as u64,
                        });
                    }
                }
            }

            debug!("Tone generator stopped");
        });

        stream.add_track(TrackHandle::new("tone", move || {
            let _ = stop_tx.send(true);
        }));

        Ok(stream)
    }

    fn name(&self) -> &str {
        "tone"
    }
}

/// Scriptable acquisition collaborator for tests
///
/// Clones share the same outcome switch and counters, so a test can keep a
/// probe handle while the session owns the boxed backend.
#[derive(Clone)]
pub struct MockMic {
    sample_rate: u32,
    channels: u16,
    fail_with: Arc<Mutex<Option<CaptureError>>>,
    acquisitions: Arc<AtomicUsize>,
    track_stops: Arc<AtomicUsize>,
}

impl MockMic {
    /// A mock that always grants the microphone
    pub fn healthy() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            fail_with: Arc::new(Mutex::new(None)),
            acquisitions: Arc::new(AtomicUsize::new(0)),
            track_stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A mock that refuses every acquisition with the given error
    pub fn failing(error: CaptureError) -> Self {
        let mic = Self::healthy();
        mic.set_outcome(Some(error));
        mic
    }

    /// Change the scripted outcome; `None` means acquisitions succeed
    pub fn set_outcome(&self, outcome: Option<CaptureError>) {
        *self.fail_with.lock().expect("mock outcome lock") = outcome;
    }

    /// How many streams this mock has handed out
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// How many of those streams had their track stopped
    pub fn track_stops(&self) -> usize {
        self.track_stops.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MicBackend for MockMic {
    async fn acquire(&mut self) -> Result<AudioStream, CaptureError> {
        if let Some(error) = self.fail_with.lock().expect("mock outcome lock").clone() {
            return Err(error);
        }

        self.acquisitions.fetch_add(1, Ordering::SeqCst);

        let mut stream = AudioStream::new(self.sample_rate, self.channels);
        let stops = Arc::clone(&self.track_stops);
        stream.add_track(TrackHandle::new("mock", move || {
            stops.fetch_add(1, Ordering::SeqCst);
        }));

        Ok(stream)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
