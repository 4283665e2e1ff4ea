//! Commands accepted by the quiz context.

use trivia_core::command::Command;
use uuid::Uuid;

/// Seat a player, creating their record on first sight.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player's name.
    pub name: String,
}

impl Command for RegisterUser {
    fn command_type(&self) -> &'static str {
        "quiz.register_user"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn subject(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// Free a player's seat.
#[derive(Debug, Clone)]
pub struct RemoveUser {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player's name.
    pub name: String,
}

impl Command for RemoveUser {
    fn command_type(&self) -> &'static str {
        "quiz.remove_user"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn subject(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// Resume the seated players' unfinished game, or start a new one.
#[derive(Debug, Clone)]
pub struct StartGame {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for StartGame {
    fn command_type(&self) -> &'static str {
        "quiz.start_game"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Answer the open question.
#[derive(Debug, Clone)]
pub struct SubmitAnswer {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The answering player.
    pub user_name: String,
    /// Choice letter, `A` to `D`.
    pub choice: String,
}

impl Command for SubmitAnswer {
    fn command_type(&self) -> &'static str {
        "quiz.submit_answer"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn subject(&self) -> Option<&str> {
        Some(&self.user_name)
    }
}

/// End the running game, naming the unique top scorer as winner.
#[derive(Debug, Clone)]
pub struct FinishGame {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
}

impl Command for FinishGame {
    fn command_type(&self) -> &'static str {
        "quiz.finish_game"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
