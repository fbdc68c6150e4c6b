//! Application-level configuration resolved from environment variables.

use std::{env, time::Duration};

use tracing::info;

/// Default Open Trivia DB endpoint used when no override is configured.
const DEFAULT_TRIVIA_API_URL: &str = "https://opentdb.com/api.php";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// TCP port the HTTP server binds to.
    pub port: u16,
    /// Base URL of the external trivia question API.
    pub trivia_api_url: String,
    /// Hard timeout applied to every outbound question fetch.
    pub fetch_timeout: Duration,
    /// Inactivity threshold after which a room is evicted.
    pub room_ttl: Duration,
    /// Period of the background room cleanup sweep.
    pub cleanup_interval: Duration,
    /// Number of questions fetched per background cache refill.
    pub cache_batch_size: usize,
    /// Cache length below which a refill is triggered.
    pub cache_low_water: usize,
    /// Minimum interval between consecutive cache refills.
    pub cache_cooldown: Duration,
}

impl AppConfig {
    /// Resolve the configuration from the environment, falling back to
    /// built-in defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let config = Self {
            port: env_parse("PORT")
                .or_else(|| env_parse("SERVER_PORT"))
                .unwrap_or(8080),
            trivia_api_url: env::var("TRIVIA_API_URL")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TRIVIA_API_URL.into()),
            fetch_timeout: duration_from_env("TRIVIA_FETCH_TIMEOUT_SECS", 10),
            room_ttl: duration_from_env("ROOM_TTL_SECS", 3600),
            cleanup_interval: duration_from_env("CLEANUP_INTERVAL_SECS", 1800),
            cache_batch_size: env_parse("QUESTION_CACHE_BATCH").unwrap_or(10),
            cache_low_water: env_parse("QUESTION_CACHE_LOW_WATER").unwrap_or(5),
            cache_cooldown: duration_from_env("QUESTION_CACHE_COOLDOWN_SECS", 30),
        };

        info!(
            port = config.port,
            trivia_api_url = %config.trivia_api_url,
            room_ttl_secs = config.room_ttl.as_secs(),
            cleanup_interval_secs = config.cleanup_interval.as_secs(),
            "resolved configuration"
        );

        config
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            trivia_api_url: DEFAULT_TRIVIA_API_URL.into(),
            fetch_timeout: Duration::from_secs(10),
            room_ttl: Duration::from_secs(3600),
            cleanup_interval: Duration::from_secs(1800),
            cache_batch_size: 10,
            cache_low_water: 5,
            cache_cooldown: Duration::from_secs(30),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.parse().ok())
}

fn duration_from_env(key: &str, default_secs: u64) -> Duration {
    Duration::from_secs(env_parse(key).unwrap_or(default_secs))
}
