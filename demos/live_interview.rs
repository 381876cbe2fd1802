// Record a real answer from the default microphone: 10 seconds of capture
// with a live waveform, then the mock finalization pass.
//
// There is no in-process streaming recognizer here, so the live transcript
// stays empty until finalization — exactly the audio-only degradation the
// session supports when recognition is unavailable.

use anyhow::Result;
use hireview::{
    InterviewOptions, InterviewSession, MicConfig, MicFactory, MicSource, MockTranscriber,
    NullRecognizer,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

const BARS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

fn sparkline(trace: &[f32]) -> String {
    trace
        .iter()
        .map(|v| {
            let idx = (v.clamp(0.0, 1.0) * (BARS.len() - 1) as f32).round() as usize;
            BARS[idx]
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("🎙️  Live interview demo — speak into your microphone!");

    let options = InterviewOptions {
        recordings_path: Some("recordings".into()),
        ..InterviewOptions::default()
    };

    let mut session = InterviewSession::new(
        format!("live-{}", chrono::Utc::now().timestamp()),
        vec!["Tell us briefly about yourself.".to_string()],
        options,
        MicFactory::create(MicSource::Device, MicConfig::default()),
        Box::new(NullRecognizer),
        Arc::new(MockTranscriber::default()),
    )?;

    // Acquisition can fail with a denied or missing microphone; the session
    // lands in its error state and could be retried
    if let Err(e) = session.start_recording().await {
        warn!("❌ Could not start recording: {}", e);
        warn!("   Session status: {:?}", session.status());
        return Ok(());
    }

    info!("🔴 Recording for 10 seconds...");
    for _ in 0..20 {
        sleep(Duration::from_millis(500)).await;
        info!("🌊 {}", sparkline(&session.waveform_trace()));
    }

    session.stop_recording().await?;
    info!("⏹️  Recording stopped and archived under recordings/");
    info!("📄 Transcript:\n{}", session.transcript());

    session.close();
    info!("🏁 Demo complete");

    Ok(())
}
