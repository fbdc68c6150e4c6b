//! Shared application state: the lock-guarded room store and question cache.

pub mod game;

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use rand::Rng;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::ServiceError,
    state::game::Game,
    trivia::{QuestionFilters, QuestionSource, cache::QuestionCache},
};

/// Cheaply clonable handle to the application state.
pub type SharedState = Arc<AppState>;

/// Length of generated room codes.
const ROOM_CODE_LENGTH: usize = 6;
/// Alphabet used for room codes.
const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Bound on collision-avoidance attempts; exhaustion is practically
/// impossible with 36^6 codes but must not loop forever.
const MAX_CODE_ATTEMPTS: usize = 1000;

/// Central application state shared by handlers and background tasks.
///
/// Every room lives in one map behind a single mutex: all operations on all
/// rooms serialize against each other, which bounds throughput but guarantees
/// a game's composite state is never read or written torn. External fetches
/// must never happen while this lock is held.
pub struct AppState {
    rooms: Mutex<HashMap<String, Game>>,
    cache: Mutex<QuestionCache>,
    source: Arc<dyn QuestionSource>,
    config: AppConfig,
}

impl AppState {
    /// Construct the state wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig, source: Arc<dyn QuestionSource>) -> SharedState {
        let cache = QuestionCache::new(config.cache_low_water, config.cache_cooldown);
        Arc::new(Self {
            rooms: Mutex::new(HashMap::new()),
            cache: Mutex::new(cache),
            source,
            config,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle to the question source.
    pub fn source(&self) -> Arc<dyn QuestionSource> {
        self.source.clone()
    }

    /// The room store lock. Game fields are only reachable through [`Game`]
    /// methods, so every mutation goes through this mutex.
    pub fn rooms(&self) -> &Mutex<HashMap<String, Game>> {
        &self.rooms
    }

    /// The question cache lock.
    pub fn cache(&self) -> &Mutex<QuestionCache> {
        &self.cache
    }

    /// Create a room with a fresh collision-checked code, the host joined,
    /// and the given round configuration. Returns the room code and host id.
    pub async fn create_room(
        &self,
        host_name: &str,
        filters: QuestionFilters,
        num_questions: u32,
    ) -> Result<(String, Uuid), ServiceError> {
        let mut rooms = self.rooms.lock().await;

        let mut rng = rand::rng();
        let code = (0..MAX_CODE_ATTEMPTS)
            .map(|_| generate_room_code(&mut rng))
            .find(|candidate| !rooms.contains_key(candidate))
            .ok_or_else(|| ServiceError::Internal("room code space exhausted".into()))?;

        let (game, host_id) = Game::new(code.clone(), host_name, filters, num_questions);
        rooms.insert(code.clone(), game);

        Ok((code, host_id))
    }

    /// Drop a room unconditionally.
    pub async fn delete_room(&self, room_id: &str) -> bool {
        self.rooms.lock().await.remove(room_id).is_some()
    }

    /// Evict every room whose last activity is older than `ttl`, returning
    /// the evicted codes. Runs under the store lock and therefore coexists
    /// safely with concurrent room operations.
    pub async fn evict_inactive(&self, ttl: Duration) -> Vec<String> {
        let now = Instant::now();
        let mut rooms = self.rooms.lock().await;

        let expired: Vec<String> = rooms
            .iter()
            .filter(|(_, game)| now.duration_since(game.last_activity()) > ttl)
            .map(|(code, _)| code.clone())
            .collect();

        for code in &expired {
            rooms.remove(code);
        }

        expired
    }
}

fn generate_room_code<R: Rng>(rng: &mut R) -> String {
    (0..ROOM_CODE_LENGTH)
        .map(|_| ROOM_CODE_ALPHABET[rng.random_range(0..ROOM_CODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::future::BoxFuture;

    use super::*;
    use crate::trivia::{Question, TriviaError};

    /// Source that always fails; store tests never reach the network.
    struct UnreachableSource;

    impl QuestionSource for UnreachableSource {
        fn fetch_one(
            &self,
            _filters: &QuestionFilters,
        ) -> BoxFuture<'static, Result<Question, TriviaError>> {
            Box::pin(async { Err(TriviaError::NoResults) })
        }

        fn fetch_batch(
            &self,
            _filters: &QuestionFilters,
            _amount: usize,
        ) -> BoxFuture<'static, Result<Vec<Question>, TriviaError>> {
            Box::pin(async { Err(TriviaError::NoResults) })
        }
    }

    fn test_state() -> SharedState {
        AppState::new(AppConfig::default(), Arc::new(UnreachableSource))
    }

    #[test]
    fn room_codes_use_the_expected_alphabet() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let code = generate_room_code(&mut rng);
            assert_eq!(code.len(), ROOM_CODE_LENGTH);
            assert!(
                code.bytes()
                    .all(|byte| ROOM_CODE_ALPHABET.contains(&byte))
            );
        }
    }

    #[tokio::test]
    async fn created_rooms_are_retrievable_and_deletable() {
        let state = test_state();
        let (code, host_id) = state
            .create_room("Alice", QuestionFilters::default(), 10)
            .await
            .unwrap();

        {
            let rooms = state.rooms().lock().await;
            let game = rooms.get(&code).unwrap();
            assert_eq!(game.room_id(), code);
            assert!(game.has_player(host_id));
        }

        assert!(state.delete_room(&code).await);
        assert!(!state.delete_room(&code).await);
    }

    #[tokio::test]
    async fn eviction_removes_only_stale_rooms() {
        let state = test_state();
        let (stale, _) = state
            .create_room("Alice", QuestionFilters::default(), 10)
            .await
            .unwrap();
        let (fresh, _) = state
            .create_room("Bob", QuestionFilters::default(), 10)
            .await
            .unwrap();

        // A zero TTL expires everything that is not touched right now.
        tokio::time::sleep(Duration::from_millis(10)).await;
        {
            let mut rooms = state.rooms().lock().await;
            rooms.get_mut(&fresh).unwrap().touch();
        }

        let evicted = state.evict_inactive(Duration::from_millis(5)).await;
        assert_eq!(evicted, vec![stale.clone()]);

        let rooms = state.rooms().lock().await;
        assert!(!rooms.contains_key(&stale));
        assert!(rooms.contains_key(&fresh));
    }
}
