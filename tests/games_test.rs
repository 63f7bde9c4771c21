//! HTTP tests for the game aggregate routes.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{OWNER, STRANGER};

#[tokio::test]
async fn create_game_makes_caller_the_owner() {
    let app = common::build_test_app().await;

    let (status, json) = common::post(
        &app,
        "/v1/games",
        Some(OWNER),
        json!({ "name": "Quest", "email": "quest@example.com" }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["name"], "Quest");
    assert_eq!(json["owners"], json!([OWNER]));
    assert_eq!(json["badges"], json!([]));
    assert_eq!(json["settings"]["levels"]["start"], 1);
    assert!(json["createdAt"].is_string());
}

#[tokio::test]
async fn create_game_requires_identity_and_valid_body() {
    let app = common::build_test_app().await;

    let (status, _) = common::post(&app, "/v1/games", None, json!({ "name": "Quest" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, json) =
        common::post(&app, "/v1/games", Some(OWNER), json!({ "name": " " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("must not be blank"));

    let (status, _) = common::post(
        &app,
        "/v1/games",
        Some(OWNER),
        json!({ "name": "Quest", "email": "nope" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let app = common::build_test_app().await;
    common::create_game(&app, json!({ "name": "One", "email": "q@example.com" })).await;

    let (status, json) = common::post(
        &app,
        "/v1/games",
        Some(OWNER),
        json!({ "name": "Two", "email": "q@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(json["message"].as_str().unwrap().contains("q@example.com"));
}

#[tokio::test]
async fn lookups_by_id_email_and_owner() {
    let app = common::build_test_app().await;
    let id = common::create_game(&app, json!({ "name": "Quest", "email": "q@example.com" })).await;

    let (status, json) = common::get(&app, &format!("/v1/games/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id.as_str());

    let (status, json) = common::get(&app, "/v1/games/email/q@example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], id.as_str());

    let (status, json) = common::get(&app, &format!("/v1/owners/{OWNER}/games")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    let (status, json) = common::get(&app, &format!("/v1/owners/{STRANGER}/games")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!([]));
}

#[tokio::test]
async fn absent_or_malformed_ids() {
    let app = common::build_test_app().await;

    let (status, _) = common::get(&app, "/v1/games/0b7e1c1e-3f44-4f0e-9a53-0d8d9c1f0e11").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::get(&app, "/v1/games/email/nobody@example.com").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = common::get(&app, "/v1/games/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("game_id"));

    let (status, json) = common::get(&app, "/v1/owners/%20/games").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn malformed_bodies_and_queries_answer_json_errors() {
    let app = common::build_test_app().await;

    let (status, json) = common::post(
        &app,
        "/v1/games",
        Some(OWNER),
        json!({ "name": "Quest", "colour": "red" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("colour"));

    let (status, json) = common::get(&app, "/v1/games?page=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn query_filters_by_name_and_paginates() {
    let app = common::build_test_app().await;
    for name in ["Quest", "Other", "Quest", "Else", "Quest"] {
        common::create_game(&app, json!({ "name": name })).await;
    }

    let (status, json) = common::get(&app, "/v1/games?name=Quest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalResults"], 3);
    assert_eq!(json["results"].as_array().unwrap().len(), 3);
    assert_eq!(json["page"], 1);
    assert_eq!(json["limit"], 10);
    assert_eq!(json["totalPages"], 1);

    let (_, json) = common::get(&app, "/v1/games?limit=2&page=3&sortBy=name:asc").await;
    assert_eq!(json["totalResults"], 5);
    assert_eq!(json["totalPages"], 3);
    assert_eq!(json["results"].as_array().unwrap().len(), 1);
    assert_eq!(json["results"][0]["name"], "Quest");

    let (_, json) = common::get(&app, "/v1/games?role=admin").await;
    assert_eq!(json["totalResults"], 0);
}

#[tokio::test]
async fn owner_updates_and_deletes() {
    let app = common::build_test_app().await;
    let id = common::create_game(&app, json!({ "name": "Quest", "desc": "old" })).await;
    let uri = format!("/v1/games/{id}");

    let (status, json) = common::patch(
        &app,
        &uri,
        Some(OWNER),
        json!({ "name": "Quest II", "desc": null }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Quest II");
    assert_eq!(json["desc"], json!(null));

    let (status, _) = common::patch(&app, &uri, Some(OWNER), json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = common::delete(&app, &uri, Some(OWNER)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = common::get(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_owner_cannot_modify() {
    let app = common::build_test_app().await;
    let id = common::create_game(&app, json!({ "name": "Quest" })).await;
    let uri = format!("/v1/games/{id}");

    let (status, _) = common::patch(&app, &uri, Some(STRANGER), json!({ "name": "Mine" })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = common::delete(&app, &uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, json) = common::get(&app, &uri).await;
    assert_eq!(json["name"], "Quest");
}

#[tokio::test]
async fn degraded_mode_answers_503() {
    let app = common::build_degraded_app();

    let (status, json) = common::get(&app, "/healthcheck").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "degraded");

    let (status, _) = common::get(&app, "/v1/games").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn healthcheck_and_openapi_document() {
    let app = common::build_test_app().await;

    let (status, json) = common::get(&app, "/healthcheck").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");

    let (status, json) = common::get(&app, "/api-doc/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/v1/games"].is_object());
}
