use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::room::{
        CreateRoomRequest, CreateRoomResponse, JoinRoomRequest, JoinRoomResponse,
        LeaveRoomRequest, RoomStateQuery, RoomStateResponse, StartGameRequest,
        StartGameResponse, SubmitAnswerRequest, SubmitAnswerResponse,
    },
    error::AppError,
    services::room_service,
    state::SharedState,
};

/// Routes handling room lifecycle and gameplay operations.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/create_room", post(create_room))
        .route("/join_room", post(join_room))
        .route("/room_state/{room_id}", get(room_state))
        .route("/start_game", post(start_game))
        .route("/submit_answer", post(submit_answer))
        .route("/leave_room", post(leave_room))
}

/// Create a new room with the caller as host.
#[utoipa::path(
    post,
    path = "/create_room",
    tag = "room",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = CreateRoomResponse),
        (status = 400, description = "Missing or invalid player name")
    )
)]
pub async fn create_room(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<CreateRoomRequest>>,
) -> Result<(StatusCode, Json<CreateRoomResponse>), AppError> {
    let response = room_service::create_room(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Join an existing room by code.
#[utoipa::path(
    post,
    path = "/join_room",
    tag = "room",
    request_body = JoinRoomRequest,
    responses(
        (status = 200, description = "Joined the room", body = JoinRoomResponse),
        (status = 404, description = "Room not found")
    )
)]
pub async fn join_room(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<JoinRoomRequest>>,
) -> Result<Json<JoinRoomResponse>, AppError> {
    let response = room_service::join_room(&state, payload).await?;
    Ok(Json(response))
}

/// Poll the full state of a room.
#[utoipa::path(
    get,
    path = "/room_state/{room_id}",
    tag = "room",
    params(
        ("room_id" = String, Path, description = "Room code"),
        ("player_id" = Option<Uuid>, Query, description = "Polling player to verify membership for")
    ),
    responses(
        (status = 200, description = "Current room snapshot", body = RoomStateResponse),
        (status = 404, description = "Room or player not found")
    )
)]
pub async fn room_state(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Query(query): Query<RoomStateQuery>,
) -> Result<Json<RoomStateResponse>, AppError> {
    let response = room_service::room_state(&state, &room_id, query.player_id).await?;
    Ok(Json(response))
}

/// Start a round and fetch its first question.
#[utoipa::path(
    post,
    path = "/start_game",
    tag = "room",
    request_body = StartGameRequest,
    responses(
        (status = 200, description = "Game started", body = StartGameResponse),
        (status = 400, description = "Game already started"),
        (status = 404, description = "Room not found"),
        (status = 502, description = "Trivia API failed; the game was ended"),
        (status = 504, description = "Trivia API timed out; the game was ended")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<StartGameRequest>>,
) -> Result<Json<StartGameResponse>, AppError> {
    let response = room_service::start_game(&state, payload).await?;
    Ok(Json(response))
}

/// Submit a player's answer to the current question.
#[utoipa::path(
    post,
    path = "/submit_answer",
    tag = "room",
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer recorded", body = SubmitAnswerResponse),
        (status = 400, description = "Game not started, already answered, or stale question"),
        (status = 404, description = "Room or player not found"),
        (status = 502, description = "Next-question fetch failed; the game was ended"),
        (status = 504, description = "Next-question fetch timed out; the game was ended")
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SubmitAnswerRequest>>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let response = room_service::submit_answer(&state, payload).await?;
    Ok(Json(response))
}

/// Leave a room. A no-op when the player is already gone.
#[utoipa::path(
    post,
    path = "/leave_room",
    tag = "room",
    request_body = LeaveRoomRequest,
    responses(
        (status = 200, description = "Player removed (or was not present)"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn leave_room(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<LeaveRoomRequest>>,
) -> Result<StatusCode, AppError> {
    room_service::leave_room(&state, payload).await?;
    Ok(StatusCode::OK)
}
