use anyhow::{Context, Result};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tracing::info;

/// PCM audio recorded for a single interview answer
///
/// Collected from the live stream while recording, then handed to the
/// transcriber and optionally archived as a WAV file.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioClip {
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    fn wav_spec(&self) -> hound::WavSpec {
        hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    /// Encode the clip as an in-memory WAV file (transcriber payloads)
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, self.wav_spec())
                .context("Failed to create in-memory WAV writer")?;
            for &sample in &self.samples {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV buffer")?;
            }
            writer.finalize().context("Failed to finalize WAV buffer")?;
        }
        Ok(cursor.into_inner())
    }

    /// Archive the clip as a WAV file on disk
    pub fn write_wav(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create recordings directory")?;
        }

        let mut writer = hound::WavWriter::create(path, self.wav_spec())
            .with_context(|| format!("Failed to create WAV file: {:?}", path))?;
        for &sample in &self.samples {
            writer
                .write_sample(sample)
                .context("Failed to write sample to WAV")?;
        }
        writer.finalize().context("Failed to finalize WAV file")?;

        info!(
            "Archived answer audio: {} ({:.1}s, {} Hz)",
            path.display(),
            self.duration_seconds(),
            self.sample_rate
        );

        Ok(())
    }

    /// Read a clip back from a WAV file
    pub fn open_wav(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = hound::WavReader::open(path)
            .with_context(|| format!("Failed to open WAV file: {:?}", path))?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_mono() {
        let clip = AudioClip::new(vec![0i16; 16000], 16000, 1);
        assert!((clip.duration_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_duration_stereo() {
        let clip = AudioClip::new(vec![0i16; 32000], 16000, 2);
        assert!((clip.duration_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_wav_bytes_have_riff_header() {
        let clip = AudioClip::new(vec![100, -100, 200, -200], 16000, 1);
        let bytes = clip.to_wav_bytes().unwrap();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
    }
}
