//! Standalone question serving backed by the pre-fetch cache.

use std::time::Instant;

use tracing::{debug, warn};

use crate::{
    error::ServiceError,
    state::SharedState,
    trivia::{Question, QuestionFilters},
};

/// Serve one question for the room-independent `/question` endpoint.
///
/// Unfiltered requests are answered from the cache when possible; a refill is
/// kicked off in the background whenever the cache runs low. Consumers never
/// wait for a refill: a miss (or any filtered request) falls back to a direct
/// single fetch.
pub async fn fetch_question(
    state: &SharedState,
    filters: QuestionFilters,
) -> Result<Question, ServiceError> {
    if filters.is_any() {
        let cached = {
            let mut cache = state.cache().lock().await;
            let question = cache.pop();
            if cache.begin_refill(Instant::now()) {
                spawn_refill(state.clone());
            }
            question
        };

        if let Some(question) = cached {
            debug!(question_id = %question.id, "serving question from cache");
            return Ok(question);
        }
    }

    Ok(state.source().fetch_one(&filters).await?)
}

/// Fetch a batch in the background and append it to the cache.
fn spawn_refill(state: SharedState) {
    tokio::spawn(async move {
        let batch_size = state.config().cache_batch_size;
        let batch = state
            .source()
            .fetch_batch(&QuestionFilters::default(), batch_size)
            .await;

        let mut cache = state.cache().lock().await;
        match batch {
            Ok(questions) => {
                let added = questions.len();
                cache.finish_refill(questions, Instant::now());
                debug!(added, total = cache.len(), "question cache refilled");
            }
            Err(err) => {
                cache.abort_refill(Instant::now());
                warn!(error = %err, "question cache refill failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc, Mutex,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        config::AppConfig,
        state::AppState,
        trivia::{QuestionSource, TriviaError},
    };

    /// Source that counts calls and serves numbered questions.
    #[derive(Default)]
    struct CountingSource {
        singles: AtomicUsize,
        batches: AtomicUsize,
    }

    fn numbered_question(text: String) -> Question {
        Question::new(
            "General Knowledge".into(),
            "multiple".into(),
            "easy".into(),
            text,
            "right".into(),
            vec!["wrong".into()],
        )
    }

    impl QuestionSource for Arc<CountingSource> {
        fn fetch_one(
            &self,
            _filters: &QuestionFilters,
        ) -> BoxFuture<'static, Result<Question, TriviaError>> {
            let n = self.singles.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Ok(numbered_question(format!("single {n}"))) })
        }

        fn fetch_batch(
            &self,
            _filters: &QuestionFilters,
            amount: usize,
        ) -> BoxFuture<'static, Result<Vec<Question>, TriviaError>> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                Ok((0..amount)
                    .map(|n| numbered_question(format!("batch {n}")))
                    .collect())
            })
        }
    }

    /// Source whose every call fails.
    struct FailingSource;

    impl QuestionSource for FailingSource {
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

    #[tokio::test]
    async fn empty_cache_falls_back_to_direct_fetch_and_triggers_refill() {
        let source = Arc::new(CountingSource::default());
        let state = AppState::new(AppConfig::default(), Arc::new(source.clone()));

        let question = fetch_question(&state, QuestionFilters::default())
            .await
            .unwrap();
        assert_eq!(question.text, "single 0");
        assert_eq!(source.singles.load(Ordering::SeqCst), 1);

        // Let the background refill land, then the cache serves the next hit.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(source.batches.load(Ordering::SeqCst), 1);
        assert_eq!(state.cache().lock().await.len(), 10);

        let question = fetch_question(&state, QuestionFilters::default())
            .await
            .unwrap();
        assert_eq!(question.text, "batch 0");
        assert_eq!(source.singles.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn filtered_requests_bypass_the_cache() {
        let source = Arc::new(CountingSource::default());
        let state = AppState::new(AppConfig::default(), Arc::new(source.clone()));

        let filters = QuestionFilters::new(Some("hard".into()), None);
        fetch_question(&state, filters).await.unwrap();

        assert_eq!(source.singles.load(Ordering::SeqCst), 1);
        assert_eq!(source.batches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn upstream_failure_surfaces_as_not_found_for_no_results() {
        let state = AppState::new(AppConfig::default(), Arc::new(FailingSource));
        let err = fetch_question(&state, QuestionFilters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn refill_failure_releases_the_slot_for_later() {
        let state = AppState::new(
            AppConfig {
                cache_cooldown: Duration::from_millis(0),
                ..AppConfig::default()
            },
            Arc::new(FailingSource),
        );

        // First miss claims the refill slot; the refill fails in the
        // background and must release it so a later attempt can claim again.
        let _ = fetch_question(&state, QuestionFilters::default()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        let mut cache = state.cache().lock().await;
        assert!(cache.begin_refill(Instant::now()));
    }
}
