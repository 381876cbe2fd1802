pub mod questions;
pub mod session;
pub mod transcript;

pub use questions::{Advance, QuestionDeck};
pub use session::{
    InterviewOptions, InterviewSession, SessionError, SessionSnapshot, SessionStatus,
};
pub use transcript::TranscriptBuffer;
