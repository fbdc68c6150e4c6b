//! Service layer sitting between the HTTP routes and the shared state.

pub mod cleanup;
pub mod documentation;
pub mod question_service;
pub mod room_service;
