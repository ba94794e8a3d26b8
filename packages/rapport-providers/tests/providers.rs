use std::future::IntoFuture;

use axum::{Json, Router, http::HeaderMap, http::StatusCode, response::IntoResponse, routing};
use reqwest::header::AUTHORIZATION;
use serde_json::{Map, Value};
use tokio::{
	net::TcpListener,
	sync::{oneshot, oneshot::Sender},
};

use rapport_config::LlmProviderConfig;
use rapport_providers::{Error, generation};

async fn start_completion_server() -> (String, Sender<()>) {
	let app = Router::new().route("/v1/chat/completions", routing::post(completion_handler));
	let listener =
		TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind completion server.");
	let addr = listener.local_addr().expect("Failed to read completion server address.");
	let (tx, rx) = oneshot::channel();
	let server = axum::serve(listener, app).with_graceful_shutdown(async move {
		let _ = rx.await;
	});

	tokio::spawn(async move {
		let _ = server.into_future().await;
	});

	(format!("http://{addr}"), tx)
}

async fn completion_handler(headers: HeaderMap, Json(payload): Json<Value>) -> impl IntoResponse {
	if headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) != Some("Bearer secret") {
		return StatusCode::UNAUTHORIZED.into_response();
	}

	let echoed = serde_json::json!({
		"model": payload.get("model"),
		"max_tokens": payload.get("max_tokens"),
		"messages": payload.get("messages").and_then(|v| v.as_array()).map(Vec::len),
		"tenant": headers.get("x-tenant").and_then(|v| v.to_str().ok()),
	});

	Json(serde_json::json!({
		"choices": [{ "message": { "role": "assistant", "content": echoed.to_string() } }]
	}))
	.into_response()
}

fn provider(api_base: String, api_key: Option<&str>) -> LlmProviderConfig {
	let mut default_headers = Map::new();

	default_headers.insert("x-tenant".to_string(), Value::String("rapport".to_string()));

	LlmProviderConfig {
		provider_id: "stub".to_string(),
		api_base,
		api_key: api_key.map(str::to_string),
		path: "/v1/chat/completions".to_string(),
		model: "stub-model".to_string(),
		temperature: 0.2,
		max_tokens: 321,
		timeout_ms: 5_000,
		default_headers,
	}
}

#[test]
fn builds_bearer_auth_header() {
	let headers =
		rapport_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");

	assert_eq!(value, "Bearer secret");
}

#[test]
fn rejects_non_string_default_header() {
	let mut default_headers = Map::new();

	default_headers.insert("x-retries".to_string(), Value::from(3));

	let err = rapport_providers::auth_headers("secret", &default_headers)
		.expect_err("Expected a non-string header to fail.");

	assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[tokio::test]
async fn completes_against_chat_endpoint() {
	let (api_base, shutdown) = start_completion_server().await;
	let cfg = provider(api_base, Some("secret"));
	let messages = vec![
		serde_json::json!({ "role": "system", "content": "Reply with JSON." }),
		serde_json::json!({ "role": "user", "content": "{}" }),
	];
	let content = generation::complete(&cfg, &messages).await.expect("Completion failed.");
	let echoed: Value = serde_json::from_str(&content).expect("Echo is not JSON.");

	assert_eq!(echoed["model"], "stub-model");
	assert_eq!(echoed["max_tokens"], 321);
	assert_eq!(echoed["messages"], 2);
	assert_eq!(echoed["tenant"], "rapport");

	let _ = shutdown.send(());
}

#[tokio::test]
async fn surfaces_http_errors() {
	let (api_base, shutdown) = start_completion_server().await;
	let cfg = provider(api_base, Some("wrong"));
	let err = generation::complete(&cfg, &[]).await.expect_err("Expected unauthorized.");

	assert!(matches!(err, Error::Reqwest(_)));

	let _ = shutdown.send(());
}

#[tokio::test]
async fn missing_api_key_is_a_config_error() {
	let cfg = provider("http://127.0.0.1:9".to_string(), None);
	let err = generation::complete(&cfg, &[]).await.expect_err("Expected missing key.");

	assert!(matches!(err, Error::InvalidConfig { .. }));
}
