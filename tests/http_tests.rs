//! HTTP round trips against a server bound to a real socket.

mod common;

use common::spawn_test_server;
use twist::TWIST_STATUS_HEADER;

fn status_header(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(TWIST_STATUS_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = spawn_test_server().await;
    let response = reqwest::get(format!("{}/health", server.url())).await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(status_header(&response), "healthy");

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["embedder_mode"], "stub");
    assert_eq!(body["index_size"], 16);
}

#[tokio::test]
async fn test_game_round() {
    let server = spawn_test_server().await;
    let client = reqwest::Client::new();

    let story: serde_json::Value = client
        .post(format!("{}/generate-story", server.url()))
        .json(&serde_json::json!({"genre": "sci-fi"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let setup = story["story_setup"].as_str().unwrap().to_string();
    let hidden = story["hidden_twist"].as_str().unwrap().to_string();

    let predicted = client
        .post(format!("{}/predict-twist", server.url()))
        .json(&serde_json::json!({"story_setup": setup, "genre": "sci-fi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(status_header(&predicted), "fresh");
    let predicted: serde_json::Value = predicted.json().await.unwrap();
    let guess = predicted["predictions"][0].as_str().unwrap().to_string();
    assert_eq!(predicted["requested"], 3);

    let scored: serde_json::Value = client
        .post(format!("{}/semantic-score", server.url()))
        .json(&serde_json::json!({"guess": guess, "actual_twist": hidden}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let score = scored["score"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&score));
    assert_eq!(scored["similarity_breakdown"]["semantic_overlap"], scored["score"]);
}

#[tokio::test]
async fn test_stream_over_socket() {
    let server = spawn_test_server().await;
    let body = reqwest::get(format!(
        "{}/stream/predict-twist?setup=A%20family%20moves%20into%20a%20haunted%20house&genre=horror",
        server.url()
    ))
    .await
    .unwrap()
    .text()
    .await
    .unwrap();

    let initializing = body.find("event: initializing").unwrap();
    let complete = body.find("event: complete").unwrap();
    assert!(initializing < complete);
    assert!(body.contains("twist_0004"));
}

#[tokio::test]
async fn test_error_carries_status_header() {
    let server = spawn_test_server().await;
    let response = reqwest::Client::new()
        .post(format!("{}/semantic-score", server.url()))
        .json(&serde_json::json!({"guess": "", "actual_twist": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(status_header(&response), "invalid_input");

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["code"], 400);
}
