// Hardware microphone capture via cpal.
//
// The cpal stream is not Send, so the whole device lifecycle lives on a
// dedicated thread: open, play, park until the track's stop signal, drop.
// Acquisition suspends the caller until the thread reports either a live
// stream or a typed failure.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;
use std::time::Instant;
use tokio::sync::{broadcast, oneshot};
use tracing::{error, info};

use super::backend::{AudioFrame, CaptureError, MicBackend, MicConfig};
use super::stream::{AudioStream, TrackHandle};

/// Broadcast capacity mirrors the stream-side constant; the capture thread
/// only needs enough slack for observers that briefly fall behind
const DEVICE_CHANNEL_CAPACITY: usize = 64;

/// cpal input device backend
pub struct DeviceMic {
    config: MicConfig,
}

impl DeviceMic {
    pub fn new(config: MicConfig) -> Self {
        Self { config }
    }

    /// Names of the input devices cpal can see on this host
    pub fn list_input_devices() -> Result<Vec<String>, CaptureError> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| CaptureError::Backend(e.to_string()))?;
        Ok(devices.filter_map(|d| d.name().ok()).collect())
    }
}

#[async_trait::async_trait]
impl MicBackend for DeviceMic {
    async fn acquire(&mut self) -> Result<AudioStream, CaptureError> {
        let (frames, _) = broadcast::channel(DEVICE_CHANNEL_CAPACITY);
        let sink = frames.clone();

        let (ready_tx, ready_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = std::sync::mpsc::channel::<()>();
        let device_name = self.config.device.clone();

        std::thread::Builder::new()
            .name("hireview-mic".into())
            .spawn(move || capture_thread(device_name, sink, ready_tx, stop_rx))
            .map_err(|e| CaptureError::Backend(e.to_string()))?;

        // Suspends until the device is open and playing (or refused). On
        // macOS this is also where the OS permission prompt resolves.
        let (label, sample_rate, channels) = match ready_rx.await {
            Ok(Ok(info)) => info,
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(CaptureError::Backend(
                    "capture thread exited before startup".to_string(),
                ))
            }
        };

        info!(
            "Microphone acquired: {} ({} Hz, {} channels)",
            label, sample_rate, channels
        );

        let mut stream = AudioStream::from_sender(sample_rate, channels, frames);
        stream.add_track(TrackHandle::new(format!("cpal:{}", label), move || {
            let _ = stop_tx.send(());
        }));

        Ok(stream)
    }

    fn name(&self) -> &str {
        "device"
    }
}

/// Owns the cpal stream for its entire lifetime
fn capture_thread(
    device_name: Option<String>,
    frames: broadcast::Sender<AudioFrame>,
    ready_tx: oneshot::Sender<Result<(String, u32, u16), CaptureError>>,
    stop_rx: std::sync::mpsc::Receiver<()>,
) {
    let setup = move || -> Result<(cpal::Stream, String, u32, u16), CaptureError> {
        let host = cpal::default_host();

        let device = match &device_name {
            Some(name) => host
                .input_devices()
                .map_err(|e| CaptureError::Backend(e.to_string()))?
                .find(|d| d.name().map(|n| n == *name).unwrap_or(false))
                .ok_or_else(|| {
                    CaptureError::Backend(format!("input device '{}' not found", name))
                })?,
            None => host
                .default_input_device()
                .ok_or(CaptureError::NotSupported)?,
        };

        let label = device.name().unwrap_or_else(|_| "unknown".to_string());

        let supported = device.default_input_config().map_err(|e| match e {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => CaptureError::PermissionDenied,
            cpal::DefaultStreamConfigError::StreamTypeNotSupported => CaptureError::NotSupported,
            other => CaptureError::Backend(other.to_string()),
        })?;

        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.config();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels;
        let started = Instant::now();

        let stream = match sample_format {
            SampleFormat::I16 => build_stream::<i16>(&device, &config, frames, started),
            SampleFormat::U16 => build_stream::<u16>(&device, &config, frames, started),
            SampleFormat::F32 => build_stream::<f32>(&device, &config, frames, started),
            other => {
                return Err(CaptureError::Backend(format!(
                    "unsupported sample format: {:?}",
                    other
                )))
            }
        }
        .map_err(|e| match e {
            cpal::BuildStreamError::DeviceNotAvailable => CaptureError::PermissionDenied,
            other => CaptureError::Backend(other.to_string()),
        })?;

        stream.play().map_err(|e| match e {
            cpal::PlayStreamError::DeviceNotAvailable => CaptureError::PermissionDenied,
            other => CaptureError::Backend(other.to_string()),
        })?;

        Ok((stream, label, sample_rate, channels))
    };

    match setup() {
        Ok((stream, label, sample_rate, channels)) => {
            if ready_tx.send(Ok((label, sample_rate, channels))).is_err() {
                // Caller went away during acquisition; drop the stream now
                return;
            }
            // Park until the track is stopped; the stream drops on the way out
            let _keep_alive = stream;
            let _ = stop_rx.recv();
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
        }
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    frames: broadcast::Sender<AudioFrame>,
    started: Instant,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: cpal::SizedSample + Send + 'static,
    i16: cpal::FromSample<T>,
{
    let sample_rate = config.sample_rate.0;
    let channels = config.channels;

    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let samples: Vec<i16> = data
                .iter()
                .map(|&sample| cpal::Sample::to_sample(sample))
                .collect();

            // A send error just means no observer is attached right now
            let _ = frames.send(AudioFrame {
                samples,
                sample_rate,
                channels,
                timestamp_ms: started.elapsed().as_millis() as u64,
            });
        },
        move |err| {
            error!("Audio input stream error: {}", err);
        },
        None,
    )
}
