// Integration tests for the interview session state machine: resource
// acquire/release balance, status transitions, transcript semantics and
// question sequencing.

use anyhow::Result;
use hireview::{
    Advance, AppState, AudioClip, CaptureError, Config, InterviewOptions, InterviewSession,
    MicConfig, MicFactory, MicSource, MockMic, MockTranscriber, NullRecognizer,
    ScriptedRecognizer, SessionError, SessionStatus, Transcriber, Transcription,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use uuid::Uuid;

fn questions(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("Question {}", i + 1)).collect()
}

fn quick_options() -> InterviewOptions {
    InterviewOptions {
        finalize_timeout: Duration::from_secs(5),
        recordings_path: None,
        waveform: None,
    }
}

fn mock_session(mic: &MockMic) -> InterviewSession {
    InterviewSession::new(
        "test",
        questions(4),
        quick_options(),
        Box::new(mic.clone()),
        Box::new(NullRecognizer),
        Arc::new(MockTranscriber::new("mock result", Duration::from_millis(5))),
    )
    .expect("session builds")
}

struct FailingTranscriber;

#[async_trait::async_trait]
impl Transcriber for FailingTranscriber {
    async fn transcribe(&self, _clip: &AudioClip) -> Result<Transcription> {
        anyhow::bail!("service unavailable")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

#[tokio::test]
async fn test_every_acquired_stream_is_released() {
    let mic = MockMic::healthy();
    let mut session = mock_session(&mic);

    for _ in 0..3 {
        session.start_recording().await.expect("start");
        session.stop_recording().await.expect("stop");
    }

    assert_eq!(mic.acquisitions(), 3);
    assert_eq!(
        mic.track_stops(),
        3,
        "every acquisition needs a matching release"
    );
    assert_eq!(session.status(), SessionStatus::Idle);
    assert!(!session.holds_stream());
}

#[tokio::test]
async fn test_recording_holds_exactly_one_stream_and_handle() {
    let mic = MockMic::healthy();
    let mut session = mock_session(&mic);

    assert!(!session.holds_stream());
    assert!(!session.holds_recognition());

    session.start_recording().await.expect("start");
    assert_eq!(session.status(), SessionStatus::Recording);
    assert!(session.holds_stream());
    assert!(session.holds_recognition());

    session.stop_recording().await.expect("stop");
    assert_eq!(session.status(), SessionStatus::Idle);
    assert!(!session.holds_stream());
    assert!(!session.holds_recognition());
}

#[tokio::test]
async fn test_permission_denied_transitions_to_error_without_stream() {
    let mic = MockMic::failing(CaptureError::PermissionDenied);
    let mut session = mock_session(&mic);

    let err = session.start_recording().await.expect_err("must fail");
    assert!(matches!(
        err,
        SessionError::Capture(CaptureError::PermissionDenied)
    ));
    assert_eq!(session.status(), SessionStatus::Error);
    assert!(!session.holds_stream(), "no stream may be held after a denial");
    assert_eq!(mic.acquisitions(), 0);
    assert_eq!(mic.track_stops(), 0);
    assert!(session.snapshot().last_error.is_some());
}

#[tokio::test]
async fn test_not_supported_transitions_to_error_without_stream() {
    let mic = MockMic::failing(CaptureError::NotSupported);
    let mut session = mock_session(&mic);

    let err = session.start_recording().await.expect_err("must fail");
    assert!(matches!(
        err,
        SessionError::Capture(CaptureError::NotSupported)
    ));
    assert_eq!(session.status(), SessionStatus::Error);
    assert!(!session.holds_stream());
}

#[tokio::test]
async fn test_retry_after_error_reenters_preparing_and_succeeds() {
    let mic = MockMic::failing(CaptureError::PermissionDenied);
    let mut session = mock_session(&mic);

    session.start_recording().await.expect_err("first attempt fails");
    assert_eq!(session.status(), SessionStatus::Error);

    mic.set_outcome(None);
    session.start_recording().await.expect("retry succeeds");
    assert_eq!(session.status(), SessionStatus::Recording);
    assert!(session.snapshot().last_error.is_none());

    session.stop_recording().await.expect("stop");
}

#[tokio::test]
async fn test_stop_appends_final_transcription() {
    let mic = MockMic::healthy();
    let mut session = mock_session(&mic);

    session.start_recording().await.expect("start");
    session.set_transcript("partial");
    session.stop_recording().await.expect("stop");

    assert_eq!(session.transcript(), "partial\nmock result");
}

#[tokio::test]
async fn test_live_snapshots_replace_not_append() {
    let mic = MockMic::healthy();
    let mut session = InterviewSession::new(
        "test",
        questions(2),
        quick_options(),
        Box::new(mic.clone()),
        Box::new(ScriptedRecognizer::new(
            vec!["hello".to_string(), "hello world".to_string()],
            Duration::from_millis(20),
        )),
        Arc::new(MockTranscriber::new("done", Duration::from_millis(5))),
    )
    .expect("session builds");

    session.start_recording().await.expect("start");
    sleep(Duration::from_millis(200)).await;

    assert_eq!(
        session.transcript(),
        "hello world",
        "each snapshot replaces the live view"
    );

    session.stop_recording().await.expect("stop");
}

#[tokio::test]
async fn test_next_question_clears_transcript() {
    let mic = MockMic::healthy();
    let mut session = mock_session(&mic);

    session.set_transcript("anything at all");
    let advance = session.next_question().expect("advance");

    assert_eq!(advance, Advance::Advanced(1));
    assert_eq!(session.transcript(), "");
    assert_eq!(session.status(), SessionStatus::Idle);
}

#[tokio::test]
async fn test_next_question_rejected_while_recording() {
    let mic = MockMic::healthy();
    let mut session = mock_session(&mic);

    session.start_recording().await.expect("start");

    let err = session.next_question().expect_err("must be rejected");
    assert!(matches!(err, SessionError::InvalidTransition { .. }));
    assert_eq!(session.status(), SessionStatus::Recording);
    assert_eq!(session.question_index(), 0);

    session.stop_recording().await.expect("stop");
}

#[tokio::test]
async fn test_question_index_clamps_at_last() {
    let mic = MockMic::healthy();
    let mut session = mock_session(&mic);

    assert_eq!(session.next_question().expect("1"), Advance::Advanced(1));
    assert_eq!(session.next_question().expect("2"), Advance::Advanced(2));
    assert_eq!(session.next_question().expect("3"), Advance::Advanced(3));
    assert_eq!(session.question_index(), 3);

    assert_eq!(session.next_question().expect("4"), Advance::Complete);
    assert_eq!(session.question_index(), 3, "index must not wrap");
}

#[tokio::test]
async fn test_double_stop_is_rejected_but_harmless() {
    let mic = MockMic::healthy();
    let mut session = mock_session(&mic);

    session.start_recording().await.expect("start");
    session.stop_recording().await.expect("first stop");

    let err = session.stop_recording().await.expect_err("second stop");
    assert!(matches!(err, SessionError::InvalidTransition { .. }));
    assert_eq!(mic.track_stops(), 1, "release must not run twice");
}

#[tokio::test]
async fn test_close_releases_exactly_once() {
    let mic = MockMic::healthy();
    let mut session = mock_session(&mic);

    session.start_recording().await.expect("start");
    session.close();

    assert!(!session.holds_stream());
    assert_eq!(session.status(), SessionStatus::Idle);
    assert_eq!(mic.track_stops(), 1);

    session.close();
    assert_eq!(mic.track_stops(), 1, "second close is a no-op");
}

#[tokio::test]
async fn test_drop_runs_the_release_sequence() {
    let mic = MockMic::healthy();
    let mut session = mock_session(&mic);

    session.start_recording().await.expect("start");
    drop(session);

    assert_eq!(mic.acquisitions(), 1);
    assert_eq!(mic.track_stops(), 1, "drop must release the stream");
}

#[tokio::test]
async fn test_transcription_timeout_returns_to_idle() {
    let mic = MockMic::healthy();
    let mut session = InterviewSession::new(
        "test",
        questions(2),
        InterviewOptions {
            finalize_timeout: Duration::from_millis(50),
            recordings_path: None,
            waveform: None,
        },
        Box::new(mic.clone()),
        Box::new(NullRecognizer),
        Arc::new(MockTranscriber::new("too late", Duration::from_secs(60))),
    )
    .expect("session builds");

    session.start_recording().await.expect("start");
    session.set_transcript("partial");
    session.stop_recording().await.expect("stop");

    assert_eq!(session.status(), SessionStatus::Idle, "never stuck in processing");
    assert_eq!(session.transcript(), "partial", "nothing appended on timeout");
    let snapshot = session.snapshot();
    assert!(snapshot.last_error.expect("reported").contains("timed out"));
}

#[tokio::test]
async fn test_transcription_failure_reports_and_goes_idle() {
    let mic = MockMic::healthy();
    let mut session = InterviewSession::new(
        "test",
        questions(2),
        quick_options(),
        Box::new(mic.clone()),
        Box::new(NullRecognizer),
        Arc::new(FailingTranscriber),
    )
    .expect("session builds");

    session.start_recording().await.expect("start");
    session.stop_recording().await.expect("stop");

    assert_eq!(session.status(), SessionStatus::Idle);
    let snapshot = session.snapshot();
    assert!(snapshot
        .last_error
        .expect("reported")
        .contains("transcription failed"));
}

#[tokio::test]
async fn test_empty_deck_is_rejected() {
    let mic = MockMic::healthy();
    let result = InterviewSession::new(
        "test",
        Vec::new(),
        quick_options(),
        Box::new(mic),
        Box::new(NullRecognizer),
        Arc::new(MockTranscriber::default()),
    );

    assert!(matches!(result, Err(SessionError::EmptyDeck)));
}

#[tokio::test]
async fn test_answers_are_archived_as_wav() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = InterviewSession::new(
        "archive-test",
        questions(1),
        InterviewOptions {
            finalize_timeout: Duration::from_secs(5),
            recordings_path: Some(dir.path().to_path_buf()),
            waveform: None,
        },
        MicFactory::create(
            MicSource::Tone {
                frequency_hz: 440.0,
            },
            MicConfig {
                buffer_duration_ms: 20,
                ..MicConfig::default()
            },
        ),
        Box::new(NullRecognizer),
        Arc::new(MockTranscriber::new("archived", Duration::from_millis(5))),
    )
    .expect("session builds");

    session.start_recording().await.expect("start");
    sleep(Duration::from_millis(300)).await;
    session.stop_recording().await.expect("stop");

    let path = dir.path().join("archive-test-q00.wav");
    assert!(path.exists(), "answer WAV must be archived");

    let clip = AudioClip::open_wav(&path).expect("readable WAV");
    assert!(!clip.is_empty());
    assert_eq!(clip.sample_rate, 16000);
}

#[tokio::test]
async fn test_app_state_builds_sessions_from_config() {
    let mut config = Config::default();
    config.audio.source = "tone".to_string();
    config.waveform.enabled = false;

    let state = AppState::new(config);
    let mut session = state
        .build_session(Uuid::new_v4(), None)
        .expect("session from config");

    session.start_recording().await.expect("start");
    assert_eq!(session.status(), SessionStatus::Recording);
    session.stop_recording().await.expect("stop");
    assert_eq!(session.status(), SessionStatus::Idle);
}
