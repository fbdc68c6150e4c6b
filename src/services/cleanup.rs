//! Periodic eviction of inactive rooms.

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::state::SharedState;

/// Run the cleanup sweep forever.
///
/// Fires once at startup and then every configured interval, deleting every
/// room whose last activity is older than the room TTL. Each sweep takes the
/// store lock, so it serializes cleanly with in-flight room operations.
pub async fn run(state: SharedState) {
    let mut ticker = interval(state.config().cleanup_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let evicted = state.evict_inactive(state.config().room_ttl).await;
        if evicted.is_empty() {
            debug!("cleanup sweep found no inactive rooms");
        } else {
            for room_id in &evicted {
                info!(room_id = %room_id, "evicted inactive room");
            }
        }
    }
}
