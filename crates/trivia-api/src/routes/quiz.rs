//! Routes for the quiz room.

use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use trivia_core::error::ValidationError;
use trivia_core::id::RecordId;
use trivia_quiz::application::command_handlers;
use trivia_quiz::application::query_handlers::{self, GameView, SessionView};
use trivia_quiz::domain::commands;
use trivia_quiz::domain::question_code::QuestionCode;
use trivia_quiz::domain::session::{AnswerOutcome, Registration};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /users.
#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    /// The player's name.
    pub name: String,
}

/// Response body for POST /users.
#[derive(Debug, Serialize)]
pub struct RegisterUserResponse {
    /// The player's stored identity.
    pub user_id: RecordId,
    /// How the player was seated.
    pub registration: Registration,
}

/// Response body for DELETE /users/{name}.
#[derive(Debug, Serialize)]
pub struct RemoveUserResponse {
    /// Whether the player had a seat.
    pub removed: bool,
}

/// Response body for POST /start-game.
#[derive(Debug, Serialize)]
pub struct StartGameResponse {
    /// The running game.
    pub game_id: RecordId,
    /// Whether an unfinished game of the same players was picked up.
    pub resumed: bool,
    /// The first question put up.
    pub question_code: QuestionCode,
}

/// Request body for POST /answers.
#[derive(Debug, Deserialize)]
pub struct SubmitAnswerRequest {
    /// Who is answering.
    pub user_name: String,
    /// Answer letter, `A` to `D`.
    pub choice: String,
}

/// Response body for POST /answers.
#[derive(Debug, Serialize)]
pub struct SubmitAnswerResponse {
    /// Whether the answer was recorded.
    pub accepted: bool,
    /// Whether it completed the question.
    pub resolved: bool,
    /// Detailed outcome.
    pub outcome: AnswerOutcome,
}

/// Response body for POST /finish-game.
#[derive(Debug, Serialize)]
pub struct FinishGameResponse {
    /// The finished game.
    pub game_id: RecordId,
    /// The unique top scorer, if any.
    pub winner_id: Option<RecordId>,
    /// The winner's name.
    pub winner_name: Option<String>,
    /// Final scores in participant order.
    pub score_vector: Vec<u32>,
}

/// POST /users
#[instrument(skip(state, request), fields(name = %request.name))]
async fn register_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterUserRequest>,
) -> Result<Json<RegisterUserResponse>, ApiError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingField("name").into());
    }
    let command = commands::RegisterUser {
        correlation_id: Uuid::new_v4(),
        name: name.to_owned(),
    };

    info!(correlation_id = %command.correlation_id, "handling register_user command");

    let mut session = state.session.lock().await;
    let result =
        command_handlers::handle_register_user(&command, &mut session, &*state.repository).await?;

    Ok(Json(RegisterUserResponse {
        user_id: result.user_id,
        registration: result.registration,
    }))
}

/// DELETE /users/{name}
#[instrument(skip(state))]
async fn remove_user(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Json<RemoveUserResponse> {
    let command = commands::RemoveUser {
        correlation_id: Uuid::new_v4(),
        name,
    };

    info!(correlation_id = %command.correlation_id, "handling remove_user command");

    let mut session = state.session.lock().await;
    let removed = command_handlers::handle_remove_user(&command, &mut session);

    Json(RemoveUserResponse { removed })
}

/// POST /start-game
#[instrument(skip(state))]
async fn start_game(State(state): State<AppState>) -> Result<Json<StartGameResponse>, ApiError> {
    let command = commands::StartGame {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling start_game command");

    let mut session = state.session.lock().await;
    let result =
        command_handlers::handle_start_game(&command, &mut session, state.quiz_context()).await?;

    Ok(Json(StartGameResponse {
        game_id: result.game_id,
        resumed: result.resumed,
        question_code: result.question_code,
    }))
}

/// POST /answers
#[instrument(skip(state, request), fields(user_name = %request.user_name))]
async fn submit_answer(
    State(state): State<AppState>,
    Json(request): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, ApiError> {
    let command = commands::SubmitAnswer {
        correlation_id: Uuid::new_v4(),
        user_name: request.user_name,
        choice: request.choice,
    };

    info!(correlation_id = %command.correlation_id, "handling submit_answer command");

    let mut session = state.session.lock().await;
    let outcome =
        command_handlers::handle_submit_answer(&command, &mut session, state.quiz_context())
            .await?;

    Ok(Json(SubmitAnswerResponse {
        accepted: outcome.accepted(),
        resolved: outcome == AnswerOutcome::Resolved,
        outcome,
    }))
}

/// POST /finish-game
#[instrument(skip(state))]
async fn finish_game(State(state): State<AppState>) -> Result<Json<FinishGameResponse>, ApiError> {
    let command = commands::FinishGame {
        correlation_id: Uuid::new_v4(),
    };

    info!(correlation_id = %command.correlation_id, "handling finish_game command");

    let mut session = state.session.lock().await;
    let result =
        command_handlers::handle_finish_game(&command, &mut session, state.quiz_context()).await?;
    let (winner_id, winner_name) = result.winner.unzip();

    Ok(Json(FinishGameResponse {
        game_id: result.game_id,
        winner_id,
        winner_name,
        score_vector: result.score_vector,
    }))
}

/// GET /state
async fn session_state(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.session.lock().await;
    Json(query_handlers::get_session_view(&session))
}

/// GET /games/{id}
#[instrument(skip(state))]
async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<GameView>, ApiError> {
    let view = query_handlers::get_game_by_id(RecordId::from(game_id), &*state.repository).await?;
    Ok(Json(view))
}

/// Returns the router for the quiz room.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(register_user))
        .route("/users/{name}", delete(remove_user))
        .route("/start-game", post(start_game))
        .route("/answers", post(submit_answer))
        .route("/finish-game", post(finish_game))
        .route("/state", get(session_state))
        .route("/games/{id}", get(get_game))
}
