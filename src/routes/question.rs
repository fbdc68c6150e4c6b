use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    dto::question::QuestionDto,
    error::AppError,
    services::question_service,
    state::SharedState,
    trivia::QuestionFilters,
};

/// Routes serving room-independent questions.
pub fn router() -> Router<SharedState> {
    Router::new().route("/question", get(get_question))
}

/// Query parameters accepted by the question endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct QuestionQuery {
    /// Optional difficulty filter (`easy`, `medium`, `hard`, or `any`).
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Optional Open Trivia DB category id, or `any`.
    #[serde(default)]
    pub category: Option<String>,
}

/// Fetch a single question, independent of any room.
#[utoipa::path(
    get,
    path = "/question",
    tag = "question",
    params(
        ("difficulty" = Option<String>, Query, description = "Difficulty filter or `any`"),
        ("category" = Option<String>, Query, description = "Category id or `any`")
    ),
    responses(
        (status = 200, description = "A trivia question", body = QuestionDto),
        (status = 404, description = "No questions matched the filters"),
        (status = 502, description = "Trivia API failed"),
        (status = 504, description = "Trivia API timed out")
    )
)]
pub async fn get_question(
    State(state): State<SharedState>,
    Query(query): Query<QuestionQuery>,
) -> Result<Json<QuestionDto>, AppError> {
    let filters = QuestionFilters::new(query.difficulty, query.category);
    let question = question_service::fetch_question(&state, filters).await?;
    Ok(Json(question.into()))
}
