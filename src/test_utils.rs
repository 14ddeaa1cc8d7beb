use crate::models::domain::{Answer, Question, QuestionKind, QuestionSet};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// A multiple-choice question with four options, "4" correct.
    pub fn arithmetic_question() -> Question {
        let mut question = Question::new("2+2=?", QuestionKind::MultipleChoice);
        question.answers = ["3", "4", "5", "6"]
            .iter()
            .enumerate()
            .map(|(i, text)| Answer {
                id: format!("a-{}", i),
                text: text.to_string(),
                is_correct: *text == "4",
                order_index: i as i16,
                explanation: None,
            })
            .collect();
        question
    }

    pub fn question_with_id(id: &str) -> Question {
        Question {
            id: id.to_string(),
            ..Question::new(format!("Question {}", id), QuestionKind::MultipleChoice)
        }
    }

    pub fn question_set(question_count: usize) -> QuestionSet {
        let mut set = QuestionSet::new("Test quiz", "A quiz for tests");
        set.questions = (0..question_count)
            .map(|i| question_with_id(&format!("q-{}", i)))
            .collect();
        for (i, question) in set.questions.iter_mut().enumerate() {
            question.order_index = i as i16;
        }
        set
    }

    /// Gateway output for a single-question generate call.
    pub fn single_question_json() -> String {
        serde_json::json!({
            "questions": [{
                "text": "2+2=?",
                "type": "MULTIPLE_CHOICE",
                "answers": [
                    {"text": "3"},
                    {"text": "4", "isCorrect": true},
                    {"text": "5"},
                    {"text": "6"}
                ]
            }]
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_arithmetic_question_has_one_correct_answer() {
        let question = arithmetic_question();
        assert_eq!(question.answers.len(), 4);
        assert_eq!(question.correct_answer_count(), 1);
    }

    #[test]
    fn test_question_set_orders_are_contiguous() {
        let set = question_set(3);
        let orders: Vec<i16> = set.questions.iter().map(|q| q.order_index).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }
}
