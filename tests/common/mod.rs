//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use desklink::config::Config;
use desklink::desk_client::DeskClient;
use desklink::session::{KeyValueStore, MemoryStorage, TOKEN_KEY};
use serde_json::Value;
use wiremock::{MockServer, Request};

/// A mock backend plus a client pointed at it.
pub struct Harness {
    pub server: MockServer,
    pub client: DeskClient,
    pub storage: MemoryStorage,
}

impl Harness {
    /// Starts a mock backend and a client with an empty session.
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let storage = MemoryStorage::new();
        let client = DeskClient::new(
            &Config::with_base_url(server.uri()),
            Arc::new(storage.clone()),
        )
        .unwrap();
        Self {
            server,
            client,
            storage,
        }
    }

    /// Starts a mock backend and a client that already holds `token`.
    pub async fn start_with_token(token: &str) -> Self {
        let server = MockServer::start().await;
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, token).unwrap();
        let client = DeskClient::new(
            &Config::with_base_url(server.uri()),
            Arc::new(storage.clone()),
        )
        .unwrap();
        Self {
            server,
            client,
            storage,
        }
    }

    /// All requests the backend received, in order.
    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// The single request the backend received.
    pub async fn only_request(&self) -> Request {
        let mut requests = self.requests().await;
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.remove(0)
    }
}

/// The `Authorization` header of a request, if any.
pub fn authorization(request: &Request) -> Option<String> {
    request
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// The raw query string of a request, if any.
pub fn query(request: &Request) -> Option<String> {
    request.url.query().map(str::to_string)
}

/// The request body parsed as JSON.
pub fn json_body(request: &Request) -> Value {
    serde_json::from_slice(&request.body).unwrap()
}
