//! Trivia quiz bounded context.
//!
//! Responsible for players, games and questions as stored records, the
//! lockstep question/answer state machine of a quiz session, and rotation
//! of questions nobody in the session has seen yet.

pub mod application;
pub mod domain;
