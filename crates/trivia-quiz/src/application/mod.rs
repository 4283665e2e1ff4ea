//! Application services orchestrating the session against its collaborators.

pub mod command_handlers;
pub mod query_handlers;
pub mod question_source;
