pub mod quiz_engine;
pub mod session_key;

pub use quiz_engine::{AnswerOutcome, Presentation, QuizEngine, Step};
pub use session_key::SessionKey;
