//! Trivia Core — shared domain abstractions.
//!
//! This crate defines the identifiers, collaborator traits and small
//! validated containers that the quiz context and its adapters depend on.
//! It contains no infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod id;
pub mod provider;
pub mod repository;
pub mod rng;
pub mod unique_ids;
pub mod write_once;
