//! Integration tests using mock HTTP server
//!
//! Drives the tap end to end: CLI flags → login → REST requests → Singer
//! messages.

use clap::Parser;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::Write;
use tap_contentquo::cli::{Cli, Runner};
use tap_contentquo::singer::SharedBuffer;
use tap_contentquo::Error;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn json_file(value: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{value}").unwrap();
    file
}

fn config_file(server: &MockServer) -> NamedTempFile {
    json_file(&json!({
        "api_url": server.uri(),
        "key": "test-key",
        "secret": "test-secret",
        "requests_per_second": 0,
        "max_retries": 1
    }))
}

fn catalog_file(selected: &[&str]) -> NamedTempFile {
    let streams: Vec<Value> = selected
        .iter()
        .map(|name| {
            json!({
                "tap_stream_id": name,
                "stream": name,
                "metadata": [{"breadcrumb": [], "metadata": {"selected": true}}]
            })
        })
        .collect();
    json_file(&json!({ "streams": streams }))
}

async fn run(args: &[&str]) -> Result<Vec<Value>, Error> {
    let cli = Cli::try_parse_from(std::iter::once("tap-contentquo").chain(args.iter().copied()))
        .unwrap();
    let buffer = SharedBuffer::new();
    Runner::new(cli).run_with(buffer.clone()).await?;
    Ok(buffer.messages().unwrap())
}

fn records<'a>(messages: &'a [Value], stream: &str) -> Vec<&'a Value> {
    messages
        .iter()
        .filter(|m| m["type"] == "RECORD" && m["stream"] == stream)
        .map(|m| &m["record"])
        .collect()
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/authenticate"))
        .and(body_json(json!({"key": "test-key", "secret": "test-secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": token})))
        .mount(server)
        .await;
}

async fn mount_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .and(header("X-Auth-Token", "tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_contentquo(server: &MockServer) {
    mount_login(server, "tok").await;

    mount_get(
        server,
        "/evaluations",
        json!({"evaluations": [
            {
                "eid": "e1",
                "name": "Spring launch",
                "qualityResult": {
                    "analytical": {"gradeIndex": 1, "gradeName": "Pass", "score": 98.5},
                    "auto": {"characTer": "0.12", "tausEditDensity": "3.4"},
                    "holistic": "good"
                },
                "scope": {"fileCount": 2, "volume": 1200}
            },
            {"eid": "e2", "name": "Archived"}
        ]}),
    )
    .await;

    mount_get(
        server,
        "/evaluations/e1",
        json!({
            "id": "d1",
            "name": "Spring launch",
            "assignees": [{"fullname": "Ada", "userId": 7, "assignments": [{"role": "reviewer"}]}]
        }),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/evaluations/e2"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .mount(server)
        .await;

    mount_get(
        server,
        "/evaluations/e1/issues",
        json!({"issues": [{"id": "i1", "severity": "minor"}, {"id": "i2", "severity": "major"}]}),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/evaluations/e2/issues"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;

    mount_get(server, "/evaluations/e1/metadata", json!({"projectID": 3})).await;
    mount_get(server, "/evaluations/e2/metadata", json!({"projectID": 4})).await;
    mount_get(server, "/evaluations/e1/metrics", json!({"editCount": 10})).await;
    mount_get(server, "/evaluations/e2/metrics", json!({"editCount": 0})).await;

    mount_get(server, "/users", json!({"users": [{"userId": 7, "fullname": "Ada"}]})).await;
    mount_get(
        server,
        "/users/7",
        json!({"userId": 7, "fullname": "Ada", "email": "ada@example.com"}),
    )
    .await;
}

// ============================================================================
// Full Sync
// ============================================================================

#[tokio::test]
async fn test_full_sync_all_streams() {
    let server = MockServer::start().await;
    mount_contentquo(&server).await;
    let config = config_file(&server);

    let messages = run(&["--config", config.path().to_str().unwrap()])
        .await
        .unwrap();

    assert_eq!(records(&messages, "evaluations").len(), 2);
    assert_eq!(records(&messages, "evaluation_details").len(), 1);
    assert_eq!(records(&messages, "evaluation_issues").len(), 2);
    assert_eq!(records(&messages, "evaluation_metadata").len(), 2);
    assert_eq!(records(&messages, "evaluation_metrics").len(), 2);
    assert_eq!(records(&messages, "users").len(), 1);
    assert_eq!(records(&messages, "user_details").len(), 1);

    let details = records(&messages, "evaluation_details")[0];
    assert_eq!(details["eid"], "e1");
    assert_eq!(details["assignees"][0]["assignments"][0]["role"], "reviewer");

    let issues = records(&messages, "evaluation_issues");
    assert!(issues.iter().all(|r| r["eid"] == "e1"));

    let evaluation = records(&messages, "evaluations")[0];
    assert_eq!(
        evaluation["qualityResult"]["auto"]["tausEditDensity"],
        "3.4"
    );
}

#[tokio::test]
async fn test_schema_precedes_records() {
    let server = MockServer::start().await;
    mount_contentquo(&server).await;
    let config = config_file(&server);

    let messages = run(&["--config", config.path().to_str().unwrap()])
        .await
        .unwrap();

    let mut seen_schema = std::collections::HashSet::new();
    for message in &messages {
        let stream = message["stream"].as_str().unwrap_or_default().to_string();
        match message["type"].as_str().unwrap() {
            "SCHEMA" => assert!(seen_schema.insert(stream), "duplicate SCHEMA"),
            "RECORD" => assert!(seen_schema.contains(&stream), "RECORD before SCHEMA"),
            "STATE" => {}
            other => panic!("unexpected message type {other}"),
        }
    }
    assert_eq!(messages.last().unwrap()["type"], "STATE");
}

#[tokio::test]
async fn test_final_state_has_partitions() {
    let server = MockServer::start().await;
    mount_contentquo(&server).await;
    let config = config_file(&server);
    let catalog = catalog_file(&["evaluations", "evaluation_metrics"]);

    let messages = run(&[
        "--config",
        config.path().to_str().unwrap(),
        "--catalog",
        catalog.path().to_str().unwrap(),
    ])
    .await
    .unwrap();

    let state = &messages.last().unwrap()["value"];
    assert_eq!(
        state,
        &json!({"bookmarks": {
            "evaluations": {},
            "evaluation_metrics": {"partitions": [
                {"context": {"eid": "e1"}},
                {"context": {"eid": "e2"}}
            ]}
        }})
    );
}

#[tokio::test]
async fn test_incoming_state_is_carried_forward() {
    let server = MockServer::start().await;
    mount_contentquo(&server).await;
    let config = config_file(&server);
    let catalog = catalog_file(&["users"]);
    let state = json_file(&json!({
        "bookmarks": {"retired_stream": {"replication_key_value": "2023-01-01"}}
    }));

    let messages = run(&[
        "--config",
        config.path().to_str().unwrap(),
        "--catalog",
        catalog.path().to_str().unwrap(),
        "--state",
        state.path().to_str().unwrap(),
    ])
    .await
    .unwrap();

    let value = &messages.last().unwrap()["value"];
    assert_eq!(
        value["bookmarks"]["retired_stream"],
        json!({"replication_key_value": "2023-01-01"})
    );
    assert_eq!(value["bookmarks"]["users"], json!({}));
}

// ============================================================================
// Selection
// ============================================================================

#[tokio::test]
async fn test_deselected_parent_feeds_selected_child() {
    let server = MockServer::start().await;
    mount_contentquo(&server).await;
    let config = config_file(&server);
    let catalog = catalog_file(&["evaluation_details"]);

    let messages = run(&[
        "--config",
        config.path().to_str().unwrap(),
        "--catalog",
        catalog.path().to_str().unwrap(),
    ])
    .await
    .unwrap();

    assert!(records(&messages, "evaluations").is_empty());
    assert_eq!(records(&messages, "evaluation_details").len(), 1);
    assert!(messages
        .iter()
        .all(|m| m["stream"] != "users" && m["stream"] != "evaluations"));
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_failed_login_surfaces_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/authenticate"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = config_file(&server);
    let err = run(&["--config", config.path().to_str().unwrap()])
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to authenticate. Status code: 401");
}

#[tokio::test]
async fn test_expired_token_relogins_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/authenticate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "old"})))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_login(&server, "tok").await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(header("X-Auth-Token", "old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    mount_get(&server, "/users", json!({"users": [{"userId": 1}]})).await;

    let config = config_file(&server);
    let catalog = catalog_file(&["users"]);
    let messages = run(&[
        "--config",
        config.path().to_str().unwrap(),
        "--catalog",
        catalog.path().to_str().unwrap(),
    ])
    .await
    .unwrap();

    assert_eq!(records(&messages, "users"), vec![&json!({"userId": 1})]);
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_paginated_users() {
    let server = MockServer::start().await;
    mount_login(&server, "tok").await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("page", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": [{"userId": 2}]})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Next-Page", "abc")
                .set_body_json(json!({"users": [{"userId": 1}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = config_file(&server);
    let catalog = catalog_file(&["users"]);
    let messages = run(&[
        "--config",
        config.path().to_str().unwrap(),
        "--catalog",
        catalog.path().to_str().unwrap(),
    ])
    .await
    .unwrap();

    let ids: Vec<&Value> = records(&messages, "users")
        .into_iter()
        .map(|r| &r["userId"])
        .collect();
    assert_eq!(ids, vec![&json!(1), &json!(2)]);
}

// ============================================================================
// Connection Test
// ============================================================================

#[tokio::test]
async fn test_connection_test_writes_nothing() {
    let server = MockServer::start().await;
    mount_contentquo(&server).await;
    let config = config_file(&server);

    let messages = run(&["--config", config.path().to_str().unwrap(), "--test"])
        .await
        .unwrap();
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_connection_test_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/authenticate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = config_file(&server);
    let err = run(&["--config", config.path().to_str().unwrap(), "--test"])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ConnectionTest { .. }));
}
