// End-to-end interview cycle without hardware: a synthetic tone source,
// a scripted recognition engine and the mock transcription service.

use anyhow::Result;
use hireview::{
    InterviewOptions, InterviewSession, MicConfig, MicFactory, MicSource, MockTranscriber,
    ScriptedRecognizer,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

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

    info!("🎙️  Scripted interview demo (no hardware needed)");

    // 1. Assemble the session from synthetic collaborators
    let mic = MicFactory::create(
        MicSource::Tone {
            frequency_hz: 220.0,
        },
        MicConfig::default(),
    );
    let recognizer = Box::new(ScriptedRecognizer::progressive(
        "I enjoy building reliable systems and learning from code review",
        Duration::from_millis(250),
    ));
    let transcriber = Arc::new(MockTranscriber::default());

    let mut session = InterviewSession::new(
        "demo",
        vec![
            "Tell us briefly about yourself.".to_string(),
            "What are your goals for the coming year?".to_string(),
        ],
        InterviewOptions::default(),
        mic,
        recognizer,
        transcriber,
    )?;

    // 2. Record an answer to the first question
    let snapshot = session.snapshot();
    info!(
        "❓ Question {}/{}: {}",
        snapshot.question_index + 1,
        snapshot.question_count,
        snapshot.question
    );

    session.start_recording().await?;
    info!("🔴 Recording ({:?})", session.status());

    for _ in 0..8 {
        sleep(Duration::from_millis(400)).await;
        info!("🌊 {}", sparkline(&session.waveform_trace()));
        info!("📝 live: {}", session.transcript());
    }

    // 3. Stop and finalize
    session.stop_recording().await?;
    info!("⏹️  Stopped ({:?})", session.status());
    info!("📄 Transcript:\n{}", session.transcript());

    // 4. Next question clears the transcript
    let advance = session.next_question()?;
    info!(
        "➡️  Advance: {:?}, transcript is now {:?}",
        advance,
        session.transcript()
    );

    // 5. A short second take, then tear down
    session.start_recording().await?;
    sleep(Duration::from_millis(600)).await;
    session.stop_recording().await?;
    info!("📄 Second answer:\n{}", session.transcript());

    session.close();
    info!("🏁 Demo complete");

    Ok(())
}
