//! Domain model: records, answer slots and the session state machine.

pub mod answer;
pub mod commands;
pub mod game;
mod persistence;
pub mod question;
pub mod question_code;
pub mod session;
pub mod user;
