use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::trivia::Question;

/// Public projection of a question.
///
/// Mirrors the Open Trivia DB field names, with an added instance id and the
/// pre-shuffled `options` list clients can render directly.
#[derive(Debug, Serialize, ToSchema)]
pub struct QuestionDto {
    /// Identifier of this question instance; echoed back on submission.
    pub id: Uuid,
    /// Category label.
    pub category: String,
    /// Question type (`multiple`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Difficulty label.
    pub difficulty: String,
    /// Question text.
    pub question: String,
    /// The correct answer text.
    pub correct_answer: String,
    /// Incorrect answers in upstream order.
    pub incorrect_answers: Vec<String>,
    /// All answers in a fixed randomized order.
    pub options: Vec<String>,
}

impl From<Question> for QuestionDto {
    fn from(question: Question) -> Self {
        Self {
            id: question.id,
            category: question.category,
            kind: question.kind,
            difficulty: question.difficulty,
            question: question.text,
            correct_answer: question.correct_answer,
            incorrect_answers: question.incorrect_answers,
            options: question.options,
        }
    }
}

impl From<&Question> for QuestionDto {
    fn from(question: &Question) -> Self {
        question.clone().into()
    }
}
