//! Room orchestration: translates requests into game state machine calls
//! while keeping external fetches outside the store lock.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::room::{
        CreateRoomRequest, CreateRoomResponse, JoinRoomRequest, JoinRoomResponse,
        LeaveRoomRequest, RoomStateResponse, StartGameRequest, StartGameResponse,
        SubmitAnswerRequest, SubmitAnswerResponse,
    },
    error::ServiceError,
    state::SharedState,
    trivia::QuestionFilters,
};

/// Create a room with the caller as host.
pub async fn create_room(
    state: &SharedState,
    request: CreateRoomRequest,
) -> Result<CreateRoomResponse, ServiceError> {
    let host_name = clean_name(&request.player_name)?;
    let filters = QuestionFilters::new(request.difficulty, request.category);

    let (room_id, player_id) = state
        .create_room(&host_name, filters, request.num_questions)
        .await?;

    info!(room_id = %room_id, host = %host_name, "room created");

    let players = {
        let rooms = state.rooms().lock().await;
        let game = rooms
            .get(&room_id)
            .ok_or_else(|| ServiceError::Internal("room vanished after creation".into()))?;
        game.players_snapshot()
    };

    Ok(CreateRoomResponse {
        room_id,
        player_id,
        players: players.into_iter().map(Into::into).collect(),
    })
}

/// Join an existing room. Allowed at any time, including mid-round.
pub async fn join_room(
    state: &SharedState,
    request: JoinRoomRequest,
) -> Result<JoinRoomResponse, ServiceError> {
    let player_name = clean_name(&request.player_name)?;
    // Room codes are typed by hand; accept them case-insensitively.
    let room_id = request.room_id.trim().to_uppercase();

    let mut rooms = state.rooms().lock().await;
    let game = rooms
        .get_mut(&room_id)
        .ok_or_else(|| room_not_found(&room_id))?;

    let player_id = game.add_player(&player_name);
    debug!(room_id = %room_id, player = %player_name, "player joined");

    Ok(JoinRoomResponse {
        room_id,
        player_id,
        players: game
            .players_snapshot()
            .into_iter()
            .map(Into::into)
            .collect(),
        game_started: game.started(),
        current_question_index: game.current_question_index(),
        total_questions: game.num_questions(),
        player_scores: game.scores(),
        player_answered: game.answered_map(),
    })
}

/// Snapshot a room for a polling client.
///
/// Polling counts as activity and extends the room's life; an observed room
/// is never evicted out from under its players.
pub async fn room_state(
    state: &SharedState,
    room_id: &str,
    player_id: Option<Uuid>,
) -> Result<RoomStateResponse, ServiceError> {
    let mut rooms = state.rooms().lock().await;
    let game = rooms
        .get_mut(room_id)
        .ok_or_else(|| room_not_found(room_id))?;

    game.touch();

    if let Some(player_id) = player_id {
        if !game.has_player(player_id) {
            return Err(player_not_found(player_id));
        }
    }

    Ok((&*game).into())
}

/// Start a round and deliver its first question.
///
/// The state transition is applied under the lock, then the lock is released
/// for the upstream fetch, then the room is re-validated before the question
/// is installed. An upstream failure ends the game.
pub async fn start_game(
    state: &SharedState,
    request: StartGameRequest,
) -> Result<StartGameResponse, ServiceError> {
    let filters = {
        let mut rooms = state.rooms().lock().await;
        let game = rooms
            .get_mut(&request.room_id)
            .ok_or_else(|| room_not_found(&request.room_id))?;
        game.start()
            .map_err(|err| ServiceError::Conflict(err.to_string()))?;
        game.filters().clone()
    };

    let fetched = state.source().fetch_one(&filters).await;

    let mut rooms = state.rooms().lock().await;
    let game = rooms
        .get_mut(&request.room_id)
        .ok_or_else(|| room_not_found(&request.room_id))?;

    let question = match fetched {
        Ok(question) => question,
        Err(err) => {
            warn!(room_id = %request.room_id, error = %err, "ending game: first question fetch failed");
            game.end_game();
            return Err(err.into());
        }
    };

    // The room may have ended or been recycled while the fetch was in
    // flight; never apply a stale question to it.
    if !game.in_progress() {
        return Err(ServiceError::Conflict(
            "game is no longer in progress".into(),
        ));
    }

    game.set_question(question.clone());
    info!(room_id = %request.room_id, "game started");

    Ok(StartGameResponse {
        question: question.into(),
        total_questions: game.num_questions(),
        player_scores: game.scores(),
    })
}

/// Record a player's answer, advancing to the next question (or ending the
/// game) once every player has answered the current one.
pub async fn submit_answer(
    state: &SharedState,
    request: SubmitAnswerRequest,
) -> Result<SubmitAnswerResponse, ServiceError> {
    // Phase 1: apply the submission and decide whether to advance, all under
    // the lock and without any external call.
    let filters = {
        let mut rooms = state.rooms().lock().await;
        let game = rooms
            .get_mut(&request.room_id)
            .ok_or_else(|| room_not_found(&request.room_id))?;

        if !game.started() {
            return Err(ServiceError::Conflict("game has not started".into()));
        }
        if !game.has_player(request.player_id) {
            return Err(player_not_found(request.player_id));
        }

        let accepted =
            game.submit_answer(request.player_id, request.question_id, &request.answer);
        if !accepted {
            return Err(ServiceError::Conflict(
                "submission rejected: already answered or stale question".into(),
            ));
        }

        if !game.all_answered() {
            return Ok(SubmitAnswerResponse {
                accepted: true,
                game_ended: false,
            });
        }

        if game.finished() {
            game.end_game();
            info!(room_id = %request.room_id, "game ended");
            return Ok(SubmitAnswerResponse {
                accepted: true,
                game_ended: true,
            });
        }

        game.filters().clone()
    };

    // Phase 2: every player answered and rounds remain, so fetch the next
    // question outside the lock.
    let fetched = state.source().fetch_one(&filters).await;

    let mut rooms = state.rooms().lock().await;
    let Some(game) = rooms.get_mut(&request.room_id) else {
        // The room was evicted mid-fetch. The submission itself was already
        // accepted, so report that rather than failing the client.
        warn!(room_id = %request.room_id, "room vanished while fetching next question");
        return Ok(SubmitAnswerResponse {
            accepted: true,
            game_ended: true,
        });
    };

    match fetched {
        Ok(question) => {
            // Only install the question if the round we fetched for is still
            // the current one and the game is still running.
            if game.in_progress() && game.current_question_id() == Some(request.question_id) {
                game.set_question(question);
            } else {
                debug!(room_id = %request.room_id, "discarding fetched question for stale round");
            }
            Ok(SubmitAnswerResponse {
                accepted: true,
                game_ended: game.ended(),
            })
        }
        Err(err) => {
            warn!(room_id = %request.room_id, error = %err, "ending game: next question fetch failed");
            game.end_game();
            Err(err.into())
        }
    }
}

/// Remove a player from a room. Idempotent for unknown players.
pub async fn leave_room(
    state: &SharedState,
    request: LeaveRoomRequest,
) -> Result<(), ServiceError> {
    let mut rooms = state.rooms().lock().await;
    let game = rooms
        .get_mut(&request.room_id)
        .ok_or_else(|| room_not_found(&request.room_id))?;

    if game.remove_player(request.player_id) {
        debug!(room_id = %request.room_id, player_id = %request.player_id, "player left");
    }

    Ok(())
}

fn clean_name(raw: &str) -> Result<String, ServiceError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ServiceError::InvalidInput("player name is required".into()));
    }
    Ok(name.to_string())
}

fn room_not_found(room_id: &str) -> ServiceError {
    ServiceError::NotFound(format!("room `{room_id}` not found"))
}

fn player_not_found(player_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("player `{player_id}` not found in room"))
}
