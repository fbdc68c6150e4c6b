//! Per-room game aggregate and its state machine.

use std::{
    collections::BTreeMap,
    time::{Instant, SystemTime},
};

use indexmap::IndexMap;
use thiserror::Error;
use uuid::Uuid;

use crate::trivia::{Question, QuestionFilters};

/// One participant in a room.
#[derive(Debug, Clone)]
pub struct Player {
    /// Display name chosen at join time (not required to be unique).
    pub name: String,
    /// Current score for this round.
    pub score: u32,
    /// Whether the player has answered the current question.
    pub answered: bool,
}

/// Read-only projection of a player used by DTO layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSnapshot {
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

/// Error returned when a game operation is not valid in the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// `start` was called on a game that is already running.
    #[error("game already started")]
    AlreadyStarted,
}

/// Mutable state aggregate for one room's play session.
///
/// All fields are private: a `Game` is only ever mutated through these methods
/// while the owning store's lock is held, so the player list, current question,
/// and scores are always read together consistently.
#[derive(Debug)]
pub struct Game {
    room_id: String,
    host_id: Uuid,
    players: IndexMap<Uuid, Player>,
    current_question: Option<Question>,
    current_question_index: u32,
    num_questions: u32,
    started: bool,
    ended: bool,
    filters: QuestionFilters,
    asked_question_ids: Vec<Uuid>,
    created_at: SystemTime,
    last_activity: Instant,
}

impl Game {
    /// Create a game for a fresh room with the host already joined.
    /// Returns the game together with the host's player id.
    pub fn new(
        room_id: String,
        host_name: &str,
        filters: QuestionFilters,
        num_questions: u32,
    ) -> (Self, Uuid) {
        let host_id = Uuid::new_v4();
        let mut players = IndexMap::new();
        players.insert(
            host_id,
            Player {
                name: host_name.to_string(),
                score: 0,
                answered: false,
            },
        );

        let game = Self {
            room_id,
            host_id,
            players,
            current_question: None,
            current_question_index: 0,
            num_questions,
            started: false,
            ended: false,
            filters,
            asked_question_ids: Vec::new(),
            created_at: SystemTime::now(),
            last_activity: Instant::now(),
        };

        (game, host_id)
    }

    /// Room code this game is addressed by.
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Player id of the room creator.
    pub fn host_id(&self) -> Uuid {
        self.host_id
    }

    /// Difficulty/category filters configured at creation.
    pub fn filters(&self) -> &QuestionFilters {
        &self.filters
    }

    /// Wall-clock creation time, for display in snapshots.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Whether a round has been started.
    pub fn started(&self) -> bool {
        self.started
    }

    /// Whether the game reached its terminal state.
    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Started and not yet ended.
    pub fn in_progress(&self) -> bool {
        self.started && !self.ended
    }

    /// The question currently being played, if any.
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    /// Instance id of the current question, if any.
    pub fn current_question_id(&self) -> Option<Uuid> {
        self.current_question.as_ref().map(|q| q.id)
    }

    /// Number of questions set so far this round.
    pub fn current_question_index(&self) -> u32 {
        self.current_question_index
    }

    /// Fixed number of questions for a full round.
    pub fn num_questions(&self) -> u32 {
        self.num_questions
    }

    /// Instant of the last player-facing mutation or poll.
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Record player-facing activity. Polling a room keeps it alive.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Whether the given player id belongs to this room.
    pub fn has_player(&self, player_id: Uuid) -> bool {
        self.players.contains_key(&player_id)
    }

    /// Add a player and return their fresh opaque id.
    ///
    /// Joining is allowed at any time, including mid-round; a late joiner
    /// starts unanswered and simply participates from the current question.
    pub fn add_player(&mut self, name: &str) -> Uuid {
        let player_id = Uuid::new_v4();
        self.players.insert(
            player_id,
            Player {
                name: name.to_string(),
                score: 0,
                answered: false,
            },
        );
        self.touch();
        player_id
    }

    /// Remove a player if present. A no-op, not an error, when absent.
    pub fn remove_player(&mut self, player_id: Uuid) -> bool {
        let removed = self.players.shift_remove(&player_id).is_some();
        if removed {
            self.touch();
        }
        removed
    }

    /// Begin a round: reset every score, clear answered flags, and rewind the
    /// question counter. The first question arrives via [`Game::set_question`]
    /// once the caller has fetched it.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::AlreadyStarted);
        }

        for player in self.players.values_mut() {
            player.score = 0;
            player.answered = false;
        }
        self.started = true;
        self.ended = false;
        self.current_question_index = 0;
        self.current_question = None;
        self.touch();

        Ok(())
    }

    /// Install the next question: record its id in the asked history, advance
    /// the question counter, and clear every player's answered flag.
    pub fn set_question(&mut self, question: Question) {
        self.asked_question_ids.push(question.id);
        self.current_question = Some(question);
        self.current_question_index += 1;
        for player in self.players.values_mut() {
            player.answered = false;
        }
        self.touch();
    }

    /// Record a player's answer for the current question.
    ///
    /// Rejected (returning `false`, with no state change) when the player is
    /// unknown, has already answered, no question is current, or the supplied
    /// question id does not match the current question — the latter guards
    /// against stale submissions from slow polling clients. An accepted
    /// answer marks the player answered and scores a point on an exact match
    /// with the correct answer.
    pub fn submit_answer(&mut self, player_id: Uuid, question_id: Uuid, answer: &str) -> bool {
        let Some(question) = self.current_question.as_ref() else {
            return false;
        };
        if question.id != question_id {
            return false;
        }
        let correct = question.correct_answer == answer;

        let Some(player) = self.players.get_mut(&player_id) else {
            return false;
        };
        if player.answered {
            return false;
        }

        player.answered = true;
        if correct {
            player.score += 1;
        }
        self.touch();
        true
    }

    /// True iff at least one player is present and every player has answered.
    /// An empty room never counts as complete.
    pub fn all_answered(&self) -> bool {
        !self.players.is_empty() && self.players.values().all(|player| player.answered)
    }

    /// Whether the configured question count has been exhausted.
    pub fn finished(&self) -> bool {
        self.current_question_index >= self.num_questions
    }

    /// Transition to the terminal state and drop the current question.
    pub fn end_game(&mut self) {
        self.ended = true;
        self.started = false;
        self.current_question = None;
        self.touch();
    }

    /// Scores keyed by player name.
    pub fn scores(&self) -> BTreeMap<String, u32> {
        self.players
            .values()
            .map(|player| (player.name.clone(), player.score))
            .collect()
    }

    /// Answered flags keyed by player name.
    pub fn answered_map(&self) -> BTreeMap<String, bool> {
        self.players
            .values()
            .map(|player| (player.name.clone(), player.answered))
            .collect()
    }

    /// Players in join order.
    pub fn players_snapshot(&self) -> Vec<PlayerSnapshot> {
        self.players
            .iter()
            .map(|(id, player)| PlayerSnapshot {
                id: *id,
                name: player.name.clone(),
                score: player.score,
                answered: player.answered,
                is_host: *id == self.host_id,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question(correct: &str) -> Question {
        Question::new(
            "General Knowledge".into(),
            "multiple".into(),
            "easy".into(),
            "Pick the right one".into(),
            correct.into(),
            vec!["wrong a".into(), "wrong b".into(), "wrong c".into()],
        )
    }

    fn lobby() -> (Game, Uuid) {
        Game::new(
            "ABC123".into(),
            "Alice",
            QuestionFilters::default(),
            2,
        )
    }

    #[test]
    fn host_joins_on_creation() {
        let (game, host_id) = lobby();
        assert!(game.has_player(host_id));
        let players = game.players_snapshot();
        assert_eq!(players.len(), 1);
        assert!(players[0].is_host);
        assert_eq!(players[0].name, "Alice");
        assert!(!game.started());
        assert!(!game.ended());
    }

    #[test]
    fn player_count_tracks_adds_and_removes() {
        let (mut game, host_id) = lobby();
        let bob = game.add_player("Bob");
        let carol = game.add_player("Carol");
        assert_eq!(game.players_snapshot().len(), 3);

        assert!(game.remove_player(bob));
        // Removing again is a no-op, not an error.
        assert!(!game.remove_player(bob));
        assert_eq!(game.players_snapshot().len(), 2);

        assert!(game.has_player(host_id));
        assert!(game.has_player(carol));
    }

    #[test]
    fn all_answered_is_false_for_empty_room() {
        let (mut game, host_id) = lobby();
        game.remove_player(host_id);
        assert!(!game.all_answered());
    }

    #[test]
    fn start_resets_scores_and_rejects_second_start() {
        let (mut game, host_id) = lobby();
        let bob = game.add_player("Bob");

        game.start().unwrap();
        game.set_question(sample_question("right"));
        let qid = game.current_question_id().unwrap();
        assert!(game.submit_answer(host_id, qid, "right"));
        assert!(game.submit_answer(bob, qid, "right"));
        assert_eq!(game.scores()["Alice"], 1);

        assert_eq!(game.start(), Err(GameError::AlreadyStarted));

        game.end_game();
        game.start().unwrap();
        assert_eq!(game.scores()["Alice"], 0);
        assert_eq!(game.scores()["Bob"], 0);
        assert!(game.current_question().is_none());
        assert_eq!(game.current_question_index(), 0);
    }

    #[test]
    fn second_submission_for_same_question_is_rejected() {
        let (mut game, host_id) = lobby();
        game.start().unwrap();
        game.set_question(sample_question("right"));
        let qid = game.current_question_id().unwrap();

        assert!(game.submit_answer(host_id, qid, "right"));
        assert!(!game.submit_answer(host_id, qid, "right"));
        assert_eq!(game.scores()["Alice"], 1);
    }

    #[test]
    fn stale_question_id_is_rejected() {
        let (mut game, host_id) = lobby();
        game.start().unwrap();
        game.set_question(sample_question("right"));
        let stale = game.current_question_id().unwrap();
        game.set_question(sample_question("right"));

        assert!(!game.submit_answer(host_id, stale, "right"));
        assert_eq!(game.scores()["Alice"], 0);
    }

    #[test]
    fn unknown_player_and_missing_question_are_rejected() {
        let (mut game, host_id) = lobby();
        assert!(!game.submit_answer(host_id, Uuid::new_v4(), "right"));

        game.start().unwrap();
        game.set_question(sample_question("right"));
        let qid = game.current_question_id().unwrap();
        assert!(!game.submit_answer(Uuid::new_v4(), qid, "right"));
    }

    #[test]
    fn wrong_answer_marks_answered_without_scoring() {
        let (mut game, host_id) = lobby();
        game.start().unwrap();
        game.set_question(sample_question("right"));
        let qid = game.current_question_id().unwrap();

        assert!(game.submit_answer(host_id, qid, "wrong a"));
        assert_eq!(game.scores()["Alice"], 0);
        assert!(game.all_answered());
    }

    #[test]
    fn set_question_clears_answered_flags_and_grows_history() {
        let (mut game, host_id) = lobby();
        let bob = game.add_player("Bob");
        game.start().unwrap();
        game.set_question(sample_question("right"));
        let qid = game.current_question_id().unwrap();

        game.submit_answer(host_id, qid, "right");
        game.submit_answer(bob, qid, "wrong a");
        assert!(game.all_answered());

        game.set_question(sample_question("right"));
        assert!(!game.all_answered());
        assert!(!game.answered_map()["Alice"]);
        assert_eq!(game.current_question_index(), 2);
        assert_eq!(game.asked_question_ids.len(), 2);
    }

    #[test]
    fn two_round_game_reaches_ended_with_final_scores() {
        let (mut game, alice) = lobby();
        let bob = game.add_player("Bob");

        game.start().unwrap();
        game.set_question(sample_question("right"));
        assert_eq!(game.current_question_index(), 1);
        let q1 = game.current_question_id().unwrap();
        assert!(game.submit_answer(alice, q1, "right"));
        assert!(game.submit_answer(bob, q1, "right"));
        assert!(game.all_answered());
        assert!(!game.finished());

        game.set_question(sample_question("right"));
        assert_eq!(game.current_question_index(), 2);
        let q2 = game.current_question_id().unwrap();
        assert!(game.submit_answer(alice, q2, "right"));
        assert!(game.submit_answer(bob, q2, "right"));
        assert!(game.all_answered());
        assert!(game.finished());

        game.end_game();
        assert!(game.ended());
        assert!(!game.started());
        assert!(game.current_question().is_none());
        assert_eq!(game.scores()["Alice"], 2);
        assert_eq!(game.scores()["Bob"], 2);
    }

    #[test]
    fn late_joiner_participates_from_current_round() {
        let (mut game, alice) = lobby();
        game.start().unwrap();
        game.set_question(sample_question("right"));
        let qid = game.current_question_id().unwrap();
        game.submit_answer(alice, qid, "right");
        assert!(game.all_answered());

        let dave = game.add_player("Dave");
        assert!(!game.all_answered());
        assert!(game.submit_answer(dave, qid, "right"));
        assert!(game.all_answered());
    }

    #[test]
    fn activity_is_monotonic_across_mutations() {
        let (mut game, _) = lobby();
        let before = game.last_activity();
        game.add_player("Bob");
        let after = game.last_activity();
        assert!(after >= before);
        game.touch();
        assert!(game.last_activity() >= after);
    }
}
