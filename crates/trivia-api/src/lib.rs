//! Trivia quiz HTTP API.
//!
//! Exposes the quiz session over JSON endpoints. The binary in `main.rs`
//! wires the PostgreSQL store and the Open Trivia Database client into
//! [`state::AppState`]; tests wire in-memory doubles instead.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
