//! Integration tests for the quiz room endpoints.

mod common;

use axum::Router;
use axum::http::StatusCode;
use serde_json::json;
use trivia_test_support::{SequenceRng, sample_question};

const BASE: &str = "/api/v1/quiz";

/// Shuffle script that puts the correct answer in slot B.
fn correct_in_b() -> SequenceRng {
    SequenceRng::new(vec![1, 1, 0])
}

fn two_question_app() -> Router {
    common::build_test_app_with(
        vec![sample_question("Q1"), sample_question("Q2")],
        correct_in_b(),
    )
}

async fn seat(app: &Router, name: &str) -> serde_json::Value {
    let (status, json) =
        common::post_json(app.clone(), &format!("{BASE}/users"), &json!({ "name": name })).await;
    assert_eq!(status, StatusCode::OK);
    json
}

async fn answer(app: &Router, name: &str, choice: &str) -> serde_json::Value {
    let (status, json) = common::post_json(
        app.clone(),
        &format!("{BASE}/answers"),
        &json!({ "user_name": name, "choice": choice }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    json
}

#[tokio::test]
async fn test_full_game_scores_and_names_winner() {
    // Arrange
    let app = two_question_app();
    let ann = seat(&app, "Ann").await;
    seat(&app, "Bob").await;

    // Act: start
    let (status, started) = common::post_empty(app.clone(), &format!("{BASE}/start-game")).await;

    // Assert: the first question is up with its answer in slot B
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["resumed"], false);
    let (_, view) = common::get_json(app.clone(), &format!("{BASE}/state")).await;
    assert_eq!(view["phase"], "question_pending");
    assert_eq!(view["game_id"], started["game_id"]);
    assert_eq!(view["current_question"]["text"], "Q1");
    assert_eq!(view["current_question"]["answers"][1]["letter"], "B");
    assert_eq!(view["current_question"]["answers"][1]["text"], "right");

    // Act: both answer
    let first = answer(&app, "Ann", "B").await;
    let second = answer(&app, "Bob", "A").await;

    // Assert: the second answer resolves the question
    assert_eq!(first["outcome"], "recorded");
    assert_eq!(first["resolved"], false);
    assert_eq!(second["outcome"], "resolved");
    assert_eq!(second["resolved"], true);

    let (_, view) = common::get_json(app.clone(), &format!("{BASE}/state")).await;
    assert_eq!(view["current_question"]["text"], "Q2");
    assert_eq!(view["scores"], json!([
        { "name": "Ann", "score": 1 },
        { "name": "Bob", "score": 0 },
    ]));
    assert_eq!(view["known_question_codes"], json!([started["question_code"]]));
    assert_eq!(view["answer_order"], json!([]));

    // Act: finish
    let (status, finished) = common::post_empty(app.clone(), &format!("{BASE}/finish-game")).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finished["game_id"], started["game_id"]);
    assert_eq!(finished["winner_id"], ann["user_id"]);
    assert_eq!(finished["winner_name"], "Ann");
    assert_eq!(finished["score_vector"], json!([1, 0]));

    let game_uri = format!("{BASE}/games/{}", started["game_id"].as_str().unwrap());
    let (status, game) = common::get_json(app.clone(), &game_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(game["finished"], true);
    assert_eq!(game["winner"], ann["user_id"]);
    assert_eq!(game["question_codes"], json!([started["question_code"]]));
    assert_eq!(game["score_vector"], json!([1, 0]));
    assert!(game["started_at"].is_string());

    let (_, view) = common::get_json(app, &format!("{BASE}/state")).await;
    assert_eq!(view["phase"], "no_game");
    assert!(view["game_id"].is_null());
}

#[tokio::test]
async fn test_tied_game_has_no_winner() {
    // Arrange
    let app = two_question_app();
    seat(&app, "Ann").await;
    seat(&app, "Bob").await;
    common::post_empty(app.clone(), &format!("{BASE}/start-game")).await;
    answer(&app, "Ann", "B").await;
    answer(&app, "Bob", "B").await;

    // Act
    let (status, finished) = common::post_empty(app, &format!("{BASE}/finish-game")).await;

    // Assert
    assert_eq!(status, StatusCode::OK);
    assert!(finished["winner_id"].is_null());
    assert!(finished["winner_name"].is_null());
    assert_eq!(finished["score_vector"], json!([1, 1]));
}

#[tokio::test]
async fn test_newcomer_cannot_join_running_game() {
    // Arrange
    let app = two_question_app();
    seat(&app, "Ann").await;
    common::post_empty(app.clone(), &format!("{BASE}/start-game")).await;

    // Act
    let (status, json) =
        common::post_json(app.clone(), &format!("{BASE}/users"), &json!({ "name": "Cid" })).await;

    // Assert
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    let reconnect = seat(&app, "Ann").await;
    assert_eq!(reconnect["registration"], "reconnected");
}

#[tokio::test]
async fn test_answers_are_rejected_without_a_game() {
    let app = two_question_app();
    seat(&app, "Ann").await;

    let json = answer(&app, "Ann", "A").await;

    assert_eq!(json["accepted"], false);
    assert_eq!(json["outcome"], "no_active_game");
}

#[tokio::test]
async fn test_unknown_user_answer_is_rejected() {
    // Arrange
    let app = two_question_app();
    seat(&app, "Ann").await;
    common::post_empty(app.clone(), &format!("{BASE}/start-game")).await;

    // Act
    let json = answer(&app, "Zed", "A").await;

    // Assert
    assert_eq!(json["outcome"], "unknown_user");
    let (_, view) = common::get_json(app, &format!("{BASE}/state")).await;
    assert_eq!(view["pending_answers"], json!([{ "name": "Ann", "choice": null }]));
}

#[tokio::test]
async fn test_removed_user_no_longer_blocks_resolution() {
    // Arrange
    let app = two_question_app();
    seat(&app, "Ann").await;
    seat(&app, "Bob").await;
    common::post_empty(app.clone(), &format!("{BASE}/start-game")).await;
    answer(&app, "Ann", "B").await;

    // Act
    let (_, removed) = common::delete_json(app.clone(), &format!("{BASE}/users/Bob")).await;
    let (_, before) = common::get_json(app.clone(), &format!("{BASE}/state")).await;
    let json = answer(&app, "Ann", "B").await;

    // Assert
    assert_eq!(removed["removed"], true);
    assert_eq!(before["current_question"]["text"], "Q1");
    assert_eq!(json["outcome"], "resolved");
}
