//! Library crate for trivia-rooms-back, exposing modules for the binary and integration tests.

pub mod config;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod trivia;
