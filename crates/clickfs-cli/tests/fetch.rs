//! Query subcommands against an in-process API server.

use axum::extract::{Path, RawQuery};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use clickfs_cli::cli::fetch;
use clickfs_cli::{render, Cli, ObjectKind, OutputFormat};
use clickfs_client::{ApiClient, ClientConfig};
use serde_json::{json, Value};

async fn spawn_api() -> String {
    let app = Router::new()
        .route(
            "/api/v1/user",
            get(|| async { Json(json!({"user": {"id": 7, "username": "sam"}})) }),
        )
        .route(
            "/api/v1/team",
            get(|| async {
                Json(json!({"teams": [{"id": "42", "name": "Core", "members": [{}, {}]}]}))
            }),
        )
        .route(
            "/api/v1/team/:id/space",
            get(|Path(id): Path<String>| async move {
                Json(json!({"spaces": [{"id": format!("{}1", id), "name": "Eng"}]}))
            }),
        )
        .route(
            "/api/v1/team/:id/task",
            get(|RawQuery(query): RawQuery| async move {
                let name = query.unwrap_or_default();
                Json(json!({"tasks": [{"id": "t1", "name": name}]}))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn run_query(url: &str, args: &[&str]) -> (ObjectKind, Value) {
    let mut cli = Cli::parse_from(args);
    cli.url = None;
    let config = cli.client_config(&ClientConfig {
        api_url: url.to_string(),
        api_key: Some("pk_test".to_string()),
        timeout_secs: 5,
    });
    let client = ApiClient::new(&config).unwrap();
    fetch(&client, &cli.command).await.unwrap()
}

#[tokio::test]
async fn test_user_human_output() {
    let url = spawn_api().await;
    let (kind, value) = run_query(&url, &["clickup", "user"]).await;
    assert_eq!(render(kind, &value, OutputFormat::Human).unwrap(), "7 sam");
}

#[tokio::test]
async fn test_teams_human_output() {
    let url = spawn_api().await;
    let (kind, value) = run_query(&url, &["clickup", "teams"]).await;
    assert_eq!(
        render(kind, &value, OutputFormat::Human).unwrap(),
        "42 Core 2 users"
    );
}

#[tokio::test]
async fn test_spaces_json_output() {
    let url = spawn_api().await;
    let (kind, value) = run_query(&url, &["clickup", "spaces", "42"]).await;
    let out = render(kind, &value, OutputFormat::Json).unwrap();
    let parsed: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["spaces"][0]["id"], "421");
}

#[tokio::test]
async fn test_tasks_forward_filters() {
    let url = spawn_api().await;
    let (kind, value) = run_query(
        &url,
        &["clickup", "tasks", "42", "--page", "1", "--reverse"],
    )
    .await;
    assert_eq!(kind, ObjectKind::Tasks);
    let query = value["tasks"][0]["name"].as_str().unwrap();
    assert!(query.contains("page=1"));
    assert!(query.contains("reverse=true"));
}

#[tokio::test]
async fn test_missing_api_key_fails_before_request() {
    let result = ApiClient::new(&ClientConfig {
        api_key: None,
        ..ClientConfig::default()
    });
    assert!(result.is_err());
}
