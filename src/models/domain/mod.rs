pub mod question;
pub mod question_set;

pub use question::{Answer, Difficulty, Question, QuestionKind};
pub use question_set::{
    CountMode, GenerationSettings, QuestionSet, TitleDescription, Visibility,
};
