//! Question sourcing: the external trivia API client, the shared question
//! model, and the pre-fetch cache.

pub mod cache;
pub mod opentdb;

use futures::future::BoxFuture;
use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Optional difficulty/category filters applied to a question fetch.
///
/// An absent or `"any"` value means the dimension is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionFilters {
    /// Requested difficulty (`easy`, `medium`, `hard`).
    pub difficulty: Option<String>,
    /// Requested Open Trivia DB category id.
    pub category: Option<String>,
}

impl QuestionFilters {
    /// Build filters from raw client input, treating `"any"`, `""`, and
    /// whitespace-only values as unconstrained.
    pub fn new(difficulty: Option<String>, category: Option<String>) -> Self {
        Self {
            difficulty: normalize(difficulty),
            category: normalize(category),
        }
    }

    /// True when neither dimension is constrained.
    pub fn is_any(&self) -> bool {
        self.difficulty.is_none() && self.category.is_none()
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("any"))
}

/// One trivia question as served to rooms and to the standalone endpoint.
///
/// The id is random per fetch, not derived from content, so the asked-question
/// history kept by a room cannot guarantee de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    /// Identifier of this question instance.
    pub id: Uuid,
    /// Category label as reported by the upstream API.
    pub category: String,
    /// Question type reported by the upstream API (always `multiple` here).
    pub kind: String,
    /// Difficulty label (`easy`, `medium`, `hard`).
    pub difficulty: String,
    /// Question text, HTML entities already decoded.
    pub text: String,
    /// The correct answer, compared literally against submissions.
    pub correct_answer: String,
    /// Incorrect answers in the order the upstream API returned them.
    pub incorrect_answers: Vec<String>,
    /// All answers in a randomized presentation order, fixed at fetch time so
    /// repeated polls see a stable layout.
    pub options: Vec<String>,
}

impl Question {
    /// Assemble a question, allocating a fresh instance id and shuffling the
    /// answer options once.
    pub fn new(
        category: String,
        kind: String,
        difficulty: String,
        text: String,
        correct_answer: String,
        incorrect_answers: Vec<String>,
    ) -> Self {
        let mut options = Vec::with_capacity(incorrect_answers.len() + 1);
        options.push(correct_answer.clone());
        options.extend(incorrect_answers.iter().cloned());
        options.shuffle(&mut rand::rng());

        Self {
            id: Uuid::new_v4(),
            category,
            kind,
            difficulty,
            text,
            correct_answer,
            incorrect_answers,
            options,
        }
    }

    /// Position of the correct answer within the shuffled options.
    pub fn correct_index(&self) -> Option<usize> {
        self.options
            .iter()
            .position(|option| *option == self.correct_answer)
    }
}

/// Failures reported by a question source. No retries happen at this layer;
/// callers decide whether to fall back or end the affected game.
#[derive(Debug, Error)]
pub enum TriviaError {
    /// The request to the trivia API timed out.
    #[error("request to trivia API timed out")]
    Timeout,
    /// The trivia API answered with a non-success status.
    #[error("trivia API returned status {status}")]
    UpstreamStatus {
        /// HTTP status returned by the API.
        status: reqwest::StatusCode,
    },
    /// The request failed before a response was received.
    #[error("trivia API request failed: {source}")]
    Request {
        /// Underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The response body could not be decoded.
    #[error("trivia API returned a malformed body: {source}")]
    Malformed {
        /// Underlying decode error.
        #[source]
        source: reqwest::Error,
    },
    /// The API reported success but matched zero questions.
    #[error("no questions matched the requested filters")]
    NoResults,
}

/// Abstraction over the external trivia question provider, so services and
/// tests can swap in alternative sources.
pub trait QuestionSource: Send + Sync {
    /// Fetch exactly one question matching the filters.
    fn fetch_one(
        &self,
        filters: &QuestionFilters,
    ) -> BoxFuture<'static, Result<Question, TriviaError>>;

    /// Fetch up to `amount` questions matching the filters.
    fn fetch_batch(
        &self,
        filters: &QuestionFilters,
        amount: usize,
    ) -> BoxFuture<'static, Result<Vec<Question>, TriviaError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_normalize_any_and_blank_values() {
        let filters = QuestionFilters::new(Some("Any".into()), Some("  ".into()));
        assert!(filters.is_any());

        let filters = QuestionFilters::new(Some("hard".into()), None);
        assert_eq!(filters.difficulty.as_deref(), Some("hard"));
        assert!(filters.category.is_none());
        assert!(!filters.is_any());
    }

    #[test]
    fn options_contain_every_answer_and_locate_the_correct_one() {
        let question = Question::new(
            "Science".into(),
            "multiple".into(),
            "easy".into(),
            "What is H2O?".into(),
            "Water".into(),
            vec!["Helium".into(), "Gold".into(), "Salt".into()],
        );

        assert_eq!(question.options.len(), 4);
        for answer in ["Water", "Helium", "Gold", "Salt"] {
            assert!(question.options.iter().any(|option| option == answer));
        }
        let index = question.correct_index().unwrap();
        assert_eq!(question.options[index], "Water");
    }

    #[test]
    fn fresh_ids_differ_between_instances() {
        let make = || {
            Question::new(
                "History".into(),
                "multiple".into(),
                "medium".into(),
                "Same text".into(),
                "Yes".into(),
                vec!["No".into()],
            )
        };
        assert_ne!(make().id, make().id);
    }
}
