pub mod line_classifier;
pub mod question_bank;
pub mod result_log;
pub mod segmenter;
pub mod validator;

pub use line_classifier::{classify, clean_option, LineKind};
pub use question_bank::{build_bank, QuestionBankCache};
pub use result_log::{JsonlResultLog, MemoryResultLog, ResultLog};
pub use segmenter::{analyze, segment, segment_with_report, AnswerKeyPolicy, FirstOptionIsCorrect, Segmenter, SegmentOutcome};
pub use validator::validate;
