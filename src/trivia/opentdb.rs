//! Open Trivia DB client implementing [`QuestionSource`].

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;

use super::{Question, QuestionFilters, QuestionSource, TriviaError};

/// HTTP client for the Open Trivia DB API.
///
/// Carries a fixed request timeout; callers never wait longer than that for a
/// fetch to resolve one way or the other.
#[derive(Clone)]
pub struct OpenTdbClient {
    client: Client,
    base_url: Arc<str>,
}

/// Wire format of the Open Trivia DB response envelope.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<ApiQuestion>,
}

/// Wire format of a single question entry.
#[derive(Debug, Deserialize)]
struct ApiQuestion {
    category: String,
    #[serde(rename = "type")]
    kind: String,
    difficulty: String,
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

impl ApiQuestion {
    fn into_question(self) -> Question {
        Question::new(
            decode_html(&self.category),
            self.kind,
            self.difficulty,
            decode_html(&self.question),
            decode_html(&self.correct_answer),
            self.incorrect_answers
                .iter()
                .map(|answer| decode_html(answer))
                .collect(),
        )
    }
}

impl OpenTdbClient {
    /// Build a client against `base_url` with the given request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TriviaError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| TriviaError::Request { source })?;

        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    async fn fetch(
        client: Client,
        base_url: Arc<str>,
        filters: QuestionFilters,
        amount: usize,
    ) -> Result<Vec<Question>, TriviaError> {
        let mut query: Vec<(&str, String)> = vec![
            ("amount", amount.to_string()),
            ("type", "multiple".to_string()),
        ];
        if let Some(difficulty) = &filters.difficulty {
            query.push(("difficulty", difficulty.clone()));
        }
        if let Some(category) = &filters.category {
            query.push(("category", category.clone()));
        }

        let response = client
            .get(base_url.as_ref())
            .query(&query)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TriviaError::UpstreamStatus { status });
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|source| TriviaError::Malformed { source })?;

        // response_code 0 is the API's success marker; anything else means no
        // usable questions for the requested filters.
        if body.response_code != 0 || body.results.is_empty() {
            return Err(TriviaError::NoResults);
        }

        Ok(body
            .results
            .into_iter()
            .map(ApiQuestion::into_question)
            .collect())
    }
}

impl QuestionSource for OpenTdbClient {
    fn fetch_one(
        &self,
        filters: &QuestionFilters,
    ) -> BoxFuture<'static, Result<Question, TriviaError>> {
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let filters = filters.clone();

        Box::pin(async move {
            let mut questions = Self::fetch(client, base_url, filters, 1).await?;
            questions.pop().ok_or(TriviaError::NoResults)
        })
    }

    fn fetch_batch(
        &self,
        filters: &QuestionFilters,
        amount: usize,
    ) -> BoxFuture<'static, Result<Vec<Question>, TriviaError>> {
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let filters = filters.clone();

        Box::pin(async move { Self::fetch(client, base_url, filters, amount).await })
    }
}

fn classify_transport_error(err: reqwest::Error) -> TriviaError {
    if err.is_timeout() {
        TriviaError::Timeout
    } else {
        TriviaError::Request { source: err }
    }
}

/// Decode the HTML entities the Open Trivia DB embeds in its text fields.
fn decode_html(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
}
