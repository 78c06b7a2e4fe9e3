mod support;

use std::time::Duration;

use application::DeletePolicy;
use reqwest::StatusCode;
use serde_json::{json, Value};

use support::{spawn_server, spawn_server_with};

fn texts(messages: &[Value]) -> Vec<&str> {
    messages
        .iter()
        .filter_map(|m| m["text"].as_str())
        .collect()
}

#[tokio::test]
async fn health_check() {
    let server = spawn_server().await;
    let response = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .expect("health");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn join_post_and_private_visibility() {
    let server = spawn_server().await;

    assert_eq!(server.join("alice").await.status(), StatusCode::CREATED);

    let participants: Vec<Value> = server
        .client
        .get(server.url("/participants"))
        .send()
        .await
        .expect("participants")
        .json()
        .await
        .expect("participants json");
    assert_eq!(participants.len(), 1);
    assert_eq!(participants[0]["name"], "alice");
    assert!(participants[0]["lastStatus"].is_i64());

    let hi = server
        .post_message("alice", json!({ "to": "Todos", "text": "hi", "type": "message" }))
        .await;
    assert_eq!(hi.status(), StatusCode::CREATED);

    let bob_view = server.messages(Some("bob"), "").await;
    assert!(texts(&bob_view).contains(&"hi"));

    let secret = server
        .post_message(
            "alice",
            json!({ "to": "bob", "text": "secret", "type": "private_message" }),
        )
        .await;
    assert_eq!(secret.status(), StatusCode::CREATED);

    let carol_view = server.messages(Some("carol"), "").await;
    assert!(!texts(&carol_view).contains(&"secret"));

    let bob_view = server.messages(Some("bob"), "").await;
    assert!(texts(&bob_view).contains(&"secret"));

    let alice_view = server.messages(Some("alice"), "").await;
    assert_eq!(texts(&alice_view), vec!["entra na sala...", "hi", "secret"]);
    assert_eq!(alice_view[0]["type"], "status");
    assert_eq!(alice_view[0]["time"], "10:00:00");
}

#[tokio::test]
async fn duplicate_join_conflicts_and_blank_name_is_rejected() {
    let server = spawn_server().await;

    assert_eq!(server.join("maria").await.status(), StatusCode::CREATED);
    assert_eq!(server.join("maria").await.status(), StatusCode::CONFLICT);
    assert_eq!(server.join("").await.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(server.join("   ").await.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(server.join(" maria").await.status(), StatusCode::CREATED);

    let missing = server
        .client
        .post(server.url("/participants"))
        .json(&json!({}))
        .send()
        .await
        .expect("join without name");
    assert_eq!(missing.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn join_without_usable_body_returns_json_error() {
    let server = spawn_server().await;

    let no_body = server
        .client
        .post(server.url("/participants"))
        .send()
        .await
        .expect("join without body");
    let null_name = server
        .client
        .post(server.url("/participants"))
        .json(&json!({ "name": null }))
        .send()
        .await
        .expect("join with null name");
    let broken_json = server
        .client
        .post(server.url("/participants"))
        .header("Content-Type", "application/json")
        .body("{")
        .send()
        .await
        .expect("join with broken json");

    for response in [no_body, null_name, broken_json] {
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json().await.expect("error body is json");
        assert_eq!(body["code"], "INVALID_INPUT");
        assert!(body["message"].is_string());
    }

    let no_message_body = server
        .client
        .post(server.url("/messages"))
        .header("User", "alice")
        .send()
        .await
        .expect("post without body");
    assert_eq!(no_message_body.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn posting_requires_an_active_sender_and_valid_type() {
    let server = spawn_server().await;
    server.join("alice").await;

    let unknown = server
        .post_message("ghost", json!({ "to": "Todos", "text": "boo", "type": "message" }))
        .await;
    assert_eq!(unknown.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let bad_type = server
        .post_message("alice", json!({ "to": "Todos", "text": "hey", "type": "status" }))
        .await;
    assert_eq!(bad_type.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let empty_text = server
        .post_message("alice", json!({ "to": "Todos", "text": "", "type": "message" }))
        .await;
    assert_eq!(empty_text.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn limit_returns_the_tail_in_order() {
    let server = spawn_server().await;
    server.join("alice").await;
    for text in ["one", "two", "three"] {
        server
            .post_message("alice", json!({ "to": "Todos", "text": text, "type": "message" }))
            .await;
    }

    let tail = server.messages(Some("alice"), "?limit=2").await;
    assert_eq!(texts(&tail), vec!["two", "three"]);

    let all = server.messages(Some("alice"), "?limit=abc").await;
    assert_eq!(all.len(), 4);

    let zero = server.messages(Some("alice"), "?limit=0").await;
    assert_eq!(zero.len(), 4);
}

#[tokio::test]
async fn heartbeat_of_unknown_participant_is_not_found() {
    let server = spawn_server().await;
    server.join("alice").await;

    let ok = server
        .client
        .post(server.url("/status"))
        .header("User", "alice")
        .send()
        .await
        .expect("status");
    assert_eq!(ok.status(), StatusCode::OK);

    let missing = server
        .client
        .post(server.url("/status"))
        .header("User", "nobody")
        .send()
        .await
        .expect("status");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sweep_evicts_silent_participants_and_keeps_active_ones() {
    let server = spawn_server().await;
    server.join("dan").await;
    server.join("eva").await;

    server.clock.advance(Duration::from_secs(12));
    let heartbeat = server
        .client
        .post(server.url("/status"))
        .header("User", "eva")
        .send()
        .await
        .expect("status");
    assert_eq!(heartbeat.status(), StatusCode::OK);

    server.clock.advance(Duration::from_secs(4));
    let report = server.services.sweeper().sweep_once().await.expect("sweep");
    assert_eq!(report.evicted, 1);

    let participants: Vec<Value> = server
        .client
        .get(server.url("/participants"))
        .send()
        .await
        .expect("participants")
        .json()
        .await
        .expect("participants json");
    let names: Vec<&str> = participants
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names, vec!["eva"]);

    let messages = server.messages(None, "").await;
    let leave = messages.last().expect("leave message");
    assert_eq!(leave["from"], "dan");
    assert_eq!(leave["to"], "Todos");
    assert_eq!(leave["type"], "status");
    assert_eq!(leave["text"], "sai da sala...");
}

#[tokio::test]
async fn only_the_sender_can_edit() {
    let server = spawn_server().await;
    server.join("alice").await;
    server.join("bob").await;
    server
        .post_message("alice", json!({ "to": "Todos", "text": "draft", "type": "message" }))
        .await;

    let messages = server.messages(Some("alice"), "").await;
    let id = messages
        .iter()
        .find(|m| m["text"] == "draft")
        .and_then(|m| m["id"].as_str())
        .expect("draft id")
        .to_owned();

    let forbidden = server
        .client
        .put(server.url(&format!("/messages/{id}")))
        .header("User", "bob")
        .json(&json!({ "to": "Todos", "text": "hijack", "type": "message" }))
        .send()
        .await
        .expect("edit as bob");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let edited = server
        .client
        .put(server.url(&format!("/messages/{id}")))
        .header("User", "alice")
        .json(&json!({ "to": "Todos", "text": "final", "type": "message" }))
        .send()
        .await
        .expect("edit as alice");
    assert_eq!(edited.status(), StatusCode::OK);
    let body: Value = edited.json().await.expect("edited json");
    assert_eq!(body["text"], "final");
    assert_eq!(body["id"], id.as_str());

    let bad_id = server
        .client
        .put(server.url("/messages/not-a-uuid"))
        .header("User", "alice")
        .json(&json!({ "to": "Todos", "text": "x", "type": "message" }))
        .send()
        .await
        .expect("edit bad id");
    assert_eq!(bad_id.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn delete_policy_controls_ownership() {
    let open = spawn_server().await;
    open.join("alice").await;
    open.post_message("alice", json!({ "to": "Todos", "text": "bye", "type": "message" }))
        .await;
    let id = open.messages(Some("alice"), "?limit=1").await[0]["id"]
        .as_str()
        .expect("id")
        .to_owned();

    let deleted = open
        .client
        .delete(open.url(&format!("/messages/{id}")))
        .header("User", "someone-else")
        .send()
        .await
        .expect("delete");
    assert_eq!(deleted.status(), StatusCode::OK);
    assert!(!texts(&open.messages(Some("alice"), "").await).contains(&"bye"));

    let strict = spawn_server_with(DeletePolicy::OwnerOnly).await;
    strict.join("alice").await;
    strict
        .post_message("alice", json!({ "to": "Todos", "text": "keep", "type": "message" }))
        .await;
    let id = strict.messages(Some("alice"), "?limit=1").await[0]["id"]
        .as_str()
        .expect("id")
        .to_owned();

    let forbidden = strict
        .client
        .delete(strict.url(&format!("/messages/{id}")))
        .header("User", "someone-else")
        .send()
        .await
        .expect("delete");
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let malformed = strict
        .client
        .delete(strict.url("/messages/123"))
        .send()
        .await
        .expect("delete malformed");
    assert_eq!(malformed.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
