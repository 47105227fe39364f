//! WireMock-based realtime database mocking infrastructure
//!
//! Provides a mock HTTP server that serves both the OAuth2 token endpoint
//! and the database REST API, so the client can be exercised end to end
//! without a cloud project.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use wiremock::{
    matchers::{header, method, path, path_regex},
    Mock, MockServer, Request, Respond, ResponseTemplate,
};

/// Access token issued by the mock token endpoint
pub const TEST_ACCESS_TOKEN: &str = "test-access-token";

/// Mock token endpoint plus database
pub struct MockRealtimeDatabase {
    pub server: MockServer,
    pub base_url: String,
}

impl MockRealtimeDatabase {
    /// Start a server with nothing mounted
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// URL the service-account key should point its `token_uri` at
    pub fn token_uri(&self) -> String {
        format!("{}/token", self.base_url)
    }

    /// Mount a token endpoint that must be hit exactly `times` times
    pub async fn mock_token_endpoint(&self, times: u64) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": TEST_ACCESS_TOKEN,
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Mount a token endpoint that answers with an arbitrary `expires_in`
    pub async fn mock_token_expiring_in(&self, expires_in: i64) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": TEST_ACCESS_TOKEN,
                "expires_in": expires_in,
                "token_type": "Bearer"
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a token endpoint that rejects the assertion
    pub async fn mock_token_rejected(&self) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid JWT Signature."
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a stateful database behind the bearer token; returns its contents
    pub async fn mock_database(&self) -> DatabaseState {
        let state = DatabaseState::default();

        Mock::given(path_regex(r"\.json$"))
            .and(header("authorization", format!("Bearer {TEST_ACCESS_TOKEN}").as_str()))
            .respond_with(state.clone())
            .mount(&self.server)
            .await;

        state
    }

    /// Mount a database that answers every request with `status`
    pub async fn mock_database_error(&self, status: u16, message: &str) {
        Mock::given(path_regex(r"\.json$"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "error": message })))
            .mount(&self.server)
            .await;
    }

    /// Fail the test if any database request arrives
    pub async fn expect_no_database_calls(&self) {
        Mock::given(path_regex(r"\.json$"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }
}

/// Database contents keyed by exact node path (without the `.json` suffix)
#[derive(Clone, Default)]
pub struct DatabaseState {
    nodes: Arc<Mutex<HashMap<String, Value>>>,
    writes: Arc<Mutex<Vec<String>>>,
}

impl DatabaseState {
    pub fn node(&self, path: &str) -> Option<Value> {
        self.nodes.lock().unwrap().get(path).cloned()
    }

    /// Paths written, in order
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl Respond for DatabaseState {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let node = request.url.path().trim_end_matches(".json").to_string();

        match request.method.as_str() {
            "PUT" => {
                let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
                    return ResponseTemplate::new(400)
                        .set_body_json(json!({ "error": "Invalid data; couldn't parse JSON object" }));
                };
                self.nodes.lock().unwrap().insert(node.clone(), body);
                self.writes.lock().unwrap().push(node);

                let silent = request
                    .url
                    .query_pairs()
                    .any(|(k, v)| k == "print" && v == "silent");
                if silent {
                    ResponseTemplate::new(204)
                } else {
                    ResponseTemplate::new(200).set_body_bytes(request.body.clone())
                }
            }
            "GET" => {
                let value = self.node(&node).unwrap_or(Value::Null);
                ResponseTemplate::new(200).set_body_json(value)
            }
            _ => ResponseTemplate::new(405).set_body_json(json!({ "error": "Method not allowed" })),
        }
    }
}
