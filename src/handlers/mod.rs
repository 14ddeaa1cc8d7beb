pub mod ai_handler;

pub use ai_handler::{
    extract_questions, generate_questions, generate_questions_from_file,
    generate_title_description, get_draft, health_check, multi_agent_quiz, reset_draft,
};
