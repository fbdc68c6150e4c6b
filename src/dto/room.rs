use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_system_time, question::QuestionDto},
    state::game::{Game, PlayerSnapshot},
};

fn default_num_questions() -> u32 {
    10
}

/// Payload used to create a new room, with the caller joining as host.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateRoomRequest {
    /// Display name of the host.
    #[validate(length(min = 1, message = "player name is required"))]
    pub player_name: String,
    /// Optional difficulty filter (`easy`, `medium`, `hard`, or `any`).
    #[serde(default)]
    pub difficulty: Option<String>,
    /// Optional Open Trivia DB category id, or `any`.
    #[serde(default)]
    pub category: Option<String>,
    /// Number of questions in a round.
    #[serde(default = "default_num_questions")]
    #[validate(range(min = 1, max = 50, message = "num_questions must be between 1 and 50"))]
    pub num_questions: u32,
}

/// Payload used to join an existing room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinRoomRequest {
    /// Room code to join.
    #[validate(length(min = 1, message = "room id is required"))]
    pub room_id: String,
    /// Display name of the joining player.
    #[validate(length(min = 1, message = "player name is required"))]
    pub player_name: String,
}

/// Payload used to start a round in a room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartGameRequest {
    /// Room code of the game to start.
    #[validate(length(min = 1, message = "room id is required"))]
    pub room_id: String,
}

/// Payload carrying a player's answer to the current question.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitAnswerRequest {
    /// Room code.
    #[validate(length(min = 1, message = "room id is required"))]
    pub room_id: String,
    /// Id of the submitting player.
    pub player_id: Uuid,
    /// Id of the question instance being answered.
    pub question_id: Uuid,
    /// The chosen answer text.
    #[validate(length(min = 1, message = "answer is required"))]
    pub answer: String,
}

/// Payload used to leave a room.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LeaveRoomRequest {
    /// Room code.
    #[validate(length(min = 1, message = "room id is required"))]
    pub room_id: String,
    /// Id of the leaving player.
    pub player_id: Uuid,
}

/// Query parameters accepted by the room-state poll.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RoomStateQuery {
    /// When given, the poll verifies this player is still in the room.
    #[serde(default)]
    pub player_id: Option<Uuid>,
}

/// One player as exposed to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerSummary {
    /// Opaque player identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Current score.
    pub score: u32,
    /// Whether the player answered the current question.
    pub answered: bool,
    /// Whether this player created the room.
    pub is_host: bool,
}

impl From<PlayerSnapshot> for PlayerSummary {
    fn from(snapshot: PlayerSnapshot) -> Self {
        Self {
            id: snapshot.id,
            name: snapshot.name,
            score: snapshot.score,
            answered: snapshot.answered,
            is_host: snapshot.is_host,
        }
    }
}

/// Response returned once a room has been created.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateRoomResponse {
    /// Generated room code.
    pub room_id: String,
    /// Id assigned to the host.
    pub player_id: Uuid,
    /// Players currently in the room (just the host).
    pub players: Vec<PlayerSummary>,
}

/// Response returned when a player joins a room.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinRoomResponse {
    /// Room code.
    pub room_id: String,
    /// Id assigned to the joining player.
    pub player_id: Uuid,
    /// Players currently in the room, in join order.
    pub players: Vec<PlayerSummary>,
    /// Whether a round is running.
    pub game_started: bool,
    /// Questions set so far this round.
    pub current_question_index: u32,
    /// Configured round length.
    pub total_questions: u32,
    /// Scores keyed by player name.
    pub player_scores: BTreeMap<String, u32>,
    /// Answered flags keyed by player name.
    pub player_answered: BTreeMap<String, bool>,
}

/// Full snapshot of a room, served to polling clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomStateResponse {
    /// Room code.
    pub room_id: String,
    /// RFC3339 creation timestamp.
    pub created_at: String,
    /// Players currently in the room, in join order.
    pub players: Vec<PlayerSummary>,
    /// Whether a round is running.
    pub game_started: bool,
    /// Whether the game reached its terminal state.
    pub game_ended: bool,
    /// The question currently being played, if any.
    pub current_question: Option<QuestionDto>,
    /// Questions set so far this round.
    pub current_question_index: u32,
    /// Configured round length.
    pub total_questions: u32,
    /// Scores keyed by player name.
    pub player_scores: BTreeMap<String, u32>,
    /// Answered flags keyed by player name.
    pub player_answered: BTreeMap<String, bool>,
}

impl From<&Game> for RoomStateResponse {
    fn from(game: &Game) -> Self {
        Self {
            room_id: game.room_id().to_string(),
            created_at: format_system_time(game.created_at()),
            players: game
                .players_snapshot()
                .into_iter()
                .map(Into::into)
                .collect(),
            game_started: game.started(),
            game_ended: game.ended(),
            current_question: game.current_question().map(Into::into),
            current_question_index: game.current_question_index(),
            total_questions: game.num_questions(),
            player_scores: game.scores(),
            player_answered: game.answered_map(),
        }
    }
}

/// Response returned when a round starts.
#[derive(Debug, Serialize, ToSchema)]
pub struct StartGameResponse {
    /// The first question of the round.
    pub question: QuestionDto,
    /// Configured round length.
    pub total_questions: u32,
    /// Scores keyed by player name (all zero at this point).
    pub player_scores: BTreeMap<String, u32>,
}

/// Response returned for an answer submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitAnswerResponse {
    /// Whether the submission was accepted.
    pub accepted: bool,
    /// Whether this submission completed the final round.
    pub game_ended: bool,
}
