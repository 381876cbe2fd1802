// Amplitude-trace rendering over a live audio stream.
//
// The waveform is a pure observer: it subscribes to the stream's frames and
// keeps a sliding window of recent samples, re-rendered into a fixed-width
// normalized trace on a cooperative interval tick. It never stops tracks;
// the session owns the stream and tears the waveform down as part of its
// release sequence. The render task also exits on its own once the frame
// channel closes, so a swapped or dropped stream cannot leak a render loop.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::audio::{AudioFrame, AudioStream};

/// Configuration for the amplitude trace
#[derive(Debug, Clone)]
pub struct WaveformConfig {
    /// Number of columns in the rendered trace
    pub columns: usize,
    /// How much recent audio the trace covers, in milliseconds
    pub window_ms: u64,
    /// Redraw cadence in frames per second
    pub fps: u32,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            columns: 96,
            window_ms: 2000,
            fps: 30,
        }
    }
}

/// Live amplitude trace bound to one audio stream
pub struct Waveform {
    trace_rx: watch::Receiver<Vec<f32>>,
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl Waveform {
    /// Subscribe to the stream and start the render task
    pub fn attach(stream: &AudioStream, config: WaveformConfig) -> Self {
        let frames = stream.subscribe();
        let window_samples = (stream.sample_rate() as u64
            * stream.channels() as u64
            * config.window_ms
            / 1000)
            .max(1) as usize;

        let (trace_tx, trace_rx) = watch::channel(vec![0.0; config.columns]);
        let (stop_tx, stop_rx) = watch::channel(false);

        let task = tokio::spawn(render_loop(
            frames,
            trace_tx,
            stop_rx,
            config,
            window_samples,
        ));

        Self {
            trace_rx,
            stop_tx,
            task: Some(task),
        }
    }

    /// Latest rendered trace, one normalized peak per column
    pub fn trace(&self) -> Vec<f32> {
        self.trace_rx.borrow().clone()
    }

    /// Stop the render task; safe to call repeatedly
    pub fn stop(&mut self) {
        let _ = self.stop_tx.send(true);
        self.task.take();
    }

    /// True once the render task has exited (stream closed or stopped)
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map(|t| t.is_finished()).unwrap_or(true)
    }
}

impl Drop for Waveform {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn render_loop(
    mut frames: broadcast::Receiver<AudioFrame>,
    trace_tx: watch::Sender<Vec<f32>>,
    mut stop_rx: watch::Receiver<bool>,
    config: WaveformConfig,
    window_samples: usize,
) {
    let mut window: VecDeque<i16> = VecDeque::with_capacity(window_samples);
    let mut ticker = tokio::time::interval(Duration::from_millis(
        (1000 / u64::from(config.fps.max(1))).max(1),
    ));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = stop_rx.changed() => break,
            result = frames.recv() => match result {
                Ok(frame) => {
                    window.extend(frame.samples.iter().copied());
                    while window.len() > window_samples {
                        window.pop_front();
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!("Waveform lagged, skipped {} frames", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = ticker.tick() => {
                window.make_contiguous();
                let trace = render_trace(window.as_slices().0, config.columns);
                let _ = trace_tx.send(trace);
            }
        }
    }

    debug!("Waveform render loop stopped");
}

/// Reduce a sample window to one normalized peak per column
pub fn render_trace(samples: &[i16], columns: usize) -> Vec<f32> {
    if columns == 0 {
        return Vec::new();
    }
    if samples.is_empty() {
        return vec![0.0; columns];
    }

    let bucket = (samples.len() + columns - 1) / columns;
    (0..columns)
        .map(|col| {
            let start = col * bucket;
            if start >= samples.len() {
                return 0.0;
            }
            let end = (start + bucket).min(samples.len());
            let peak = samples[start..end]
                .iter()
                .map(|s| (*s as i32).unsigned_abs())
                .max()
                .unwrap_or(0);
            peak as f32 / i16::MAX as f32
        })
        .collect()
}
