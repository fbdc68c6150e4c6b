//! HTTP route trees.

use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod health;
pub mod question;
pub mod room;

/// Compose all route trees and wire in the shared state.
pub fn router(state: SharedState) -> Router<()> {
    health::router()
        .merge(room::router())
        .merge(question::router())
        .merge(docs::router())
        .with_state(state)
}
