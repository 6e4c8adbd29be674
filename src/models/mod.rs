pub mod grade;
pub mod loaders;
pub mod question;
pub mod result;
pub mod session;
pub mod subject;

pub use grade::Grade;
pub use loaders::load_subject_catalog;
pub use question::{Question, RawQuestion};
pub use result::{QuizReport, QuizResult, UserStats};
pub use session::{AnswerRecord, SampleSize, Session};
pub use subject::{Subject, SubjectCatalog};
