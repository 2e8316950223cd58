//! Failure normalization: protocol errors, unparsable bodies, network loss.

mod common;

use std::sync::Arc;

use common::Harness;
use desklink::config::Config;
use desklink::desk_client::DeskClient;
use desklink::error::{DeskError, GENERIC_FAILURE};
use desklink::models::TicketFilters;
use desklink::session::MemoryStorage;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn not_found_uses_backend_detail() {
    let h = Harness::start_with_token("tok").await;

    Mock::given(method("GET"))
        .and(path("/tickets/999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Ticket not found"})))
        .mount(&h.server)
        .await;

    let err = h.client.get_ticket(999).await.unwrap_err();
    assert_eq!(err.to_string(), "Ticket not found");
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert!(matches!(err, DeskError::Api { .. }));
}

#[tokio::test]
async fn empty_error_body_is_a_parse_failure() {
    let h = Harness::start_with_token("tok").await;

    Mock::given(method("GET"))
        .and(path("/tickets"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&h.server)
        .await;

    let err = h.client.get_tickets(&TicketFilters::new()).await.unwrap_err();
    assert_eq!(err.message(), GENERIC_FAILURE);
    assert!(err.is_parse_failure());
    assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
}

#[tokio::test]
async fn error_body_without_detail_falls_back() {
    let h = Harness::start_with_token("tok").await;

    Mock::given(method("POST"))
        .and(path("/tickets/4/claim"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({})))
        .mount(&h.server)
        .await;

    let err = h.client.claim_ticket(4).await.unwrap_err();
    assert_eq!(err.message(), GENERIC_FAILURE);
    assert!(!err.is_parse_failure());
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
}

#[tokio::test]
async fn success_with_non_json_body_is_a_parse_failure() {
    let h = Harness::start_with_token("tok").await;

    Mock::given(method("GET"))
        .and(path("/departments"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy page</html>"))
        .mount(&h.server)
        .await;

    let err = h.client.get_departments().await.unwrap_err();
    assert!(err.is_parse_failure());
    assert_eq!(err.status(), Some(StatusCode::OK));
}

#[tokio::test]
async fn expired_token_is_reported_as_unauthorized() {
    let h = Harness::start_with_token("expired").await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Could not validate credentials"})),
        )
        .mount(&h.server)
        .await;

    let err = h.client.get_me().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Could not validate credentials");
    // The client does not log itself out; that is the caller's call.
    assert!(h.client.is_authenticated());
}

#[tokio::test]
async fn validation_errors_are_rendered() {
    let h = Harness::start_with_token("tok").await;

    Mock::given(method("PATCH"))
        .and(path("/tickets/2/status"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "status"], "msg": "value is not a valid enumeration member"}]
        })))
        .mount(&h.server)
        .await;

    let err = h.client.update_ticket_status(2, "DONE").await.unwrap_err();
    assert!(err.message().contains("not a valid enumeration member"));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_failure() {
    // Grab a free port, then close it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let client = DeskClient::new(&Config::with_base_url(uri), Arc::new(MemoryStorage::new())).unwrap();
    let err = client.get_training_status().await.unwrap_err();
    assert!(matches!(err, DeskError::Network(_)));
    assert_eq!(err.message(), GENERIC_FAILURE);
}
