//! FIFO buffer of pre-fetched questions with cooldown-throttled refills.

use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use super::Question;

/// Bounded FIFO of pre-fetched questions.
///
/// The cache never blocks a consumer: popping an empty cache simply returns
/// `None` and the caller falls back to a direct fetch. Refills are claimed via
/// [`QuestionCache::begin_refill`] so only one background fetch is in flight
/// at a time, and a cooldown keeps failed or rapid refills from hammering the
/// upstream API.
#[derive(Debug)]
pub struct QuestionCache {
    queue: VecDeque<Question>,
    low_water: usize,
    cooldown: Duration,
    last_refill: Option<Instant>,
    refill_in_flight: bool,
}

impl QuestionCache {
    /// Create an empty cache with the given refill threshold and cooldown.
    pub fn new(low_water: usize, cooldown: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            low_water,
            cooldown,
            last_refill: None,
            refill_in_flight: false,
        }
    }

    /// Take the oldest cached question, if any.
    pub fn pop(&mut self) -> Option<Question> {
        self.queue.pop_front()
    }

    /// Number of questions currently buffered.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when no questions are buffered.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Claim the refill slot if the cache is below its low-water mark, no
    /// refill is in flight, and the cooldown has elapsed. Returns whether the
    /// caller should start a background fetch.
    pub fn begin_refill(&mut self, now: Instant) -> bool {
        if self.refill_in_flight || self.queue.len() >= self.low_water {
            return false;
        }
        if let Some(last) = self.last_refill {
            if now.duration_since(last) < self.cooldown {
                return false;
            }
        }

        self.refill_in_flight = true;
        true
    }

    /// Append a fetched batch and release the refill slot.
    pub fn finish_refill(&mut self, batch: Vec<Question>, now: Instant) {
        self.queue.extend(batch);
        self.last_refill = Some(now);
        self.refill_in_flight = false;
    }

    /// Release the refill slot after a failed fetch.
    ///
    /// The cooldown still starts so a flapping upstream is not retried on
    /// every consumer hit.
    pub fn abort_refill(&mut self, now: Instant) {
        self.last_refill = Some(now);
        self.refill_in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question(text: &str) -> Question {
        Question::new(
            "General Knowledge".into(),
            "multiple".into(),
            "easy".into(),
            text.into(),
            "right".into(),
            vec!["wrong".into()],
        )
    }

    #[test]
    fn pops_in_fifo_order_and_empties_to_none() {
        let mut cache = QuestionCache::new(5, Duration::from_secs(30));
        let now = Instant::now();
        assert!(cache.begin_refill(now));
        cache.finish_refill(vec![sample_question("first"), sample_question("second")], now);

        assert_eq!(cache.pop().unwrap().text, "first");
        assert_eq!(cache.pop().unwrap().text, "second");
        assert!(cache.pop().is_none());
    }

    #[test]
    fn refill_not_claimed_while_one_is_in_flight() {
        let mut cache = QuestionCache::new(5, Duration::from_secs(30));
        let now = Instant::now();
        assert!(cache.begin_refill(now));
        assert!(!cache.begin_refill(now));

        cache.finish_refill(Vec::new(), now);
        // Still below low water, but the cooldown now applies.
        assert!(!cache.begin_refill(now));
        assert!(cache.begin_refill(now + Duration::from_secs(31)));
    }

    #[test]
    fn refill_not_claimed_above_low_water() {
        let mut cache = QuestionCache::new(2, Duration::from_secs(0));
        let now = Instant::now();
        assert!(cache.begin_refill(now));
        cache.finish_refill(vec![sample_question("a"), sample_question("b")], now);

        assert!(!cache.begin_refill(now + Duration::from_secs(1)));
        cache.pop();
        assert!(cache.begin_refill(now + Duration::from_secs(1)));
    }

    #[test]
    fn aborted_refill_respects_cooldown() {
        let mut cache = QuestionCache::new(5, Duration::from_secs(30));
        let now = Instant::now();
        assert!(cache.begin_refill(now));
        cache.abort_refill(now);

        assert!(!cache.begin_refill(now + Duration::from_secs(1)));
        assert!(cache.begin_refill(now + Duration::from_secs(31)));
    }
}
