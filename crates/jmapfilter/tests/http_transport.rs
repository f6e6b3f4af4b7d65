//! Tests for the `reqwest` transport against a local HTTP server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jmapfilter::{
    Config, Credentials, Error, ErrorKind, HttpTransport, JmapClient, MailboxRole, Transport,
};

/// `Basic` credentials for `me@example.com:secret`.
const AUTHORIZATION: &str = "Basic bWVAZXhhbXBsZS5jb206c2VjcmV0";

fn credentials() -> Credentials {
    Credentials::new("me@example.com", "secret")
}

fn transport() -> HttpTransport {
    HttpTransport::new(&Config::default()).unwrap()
}

#[tokio::test]
async fn test_get_sends_basic_auth() {
    let server = MockServer::start().await;
    let reply = json!({"apiUrl": "x"});
    Mock::given(method("GET"))
        .and(path("/.well-known/jmap"))
        .and(header("authorization", AUTHORIZATION))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/.well-known/jmap", server.uri());
    let value = transport().get(&url, &credentials()).await.unwrap();

    assert_eq!(value, json!({"apiUrl": "x"}));
}

#[tokio::test]
async fn test_post_sends_basic_auth_and_body() {
    let server = MockServer::start().await;
    let body = json!({"using": [], "methodCalls": []});
    let reply = json!({"methodResponses": []});
    Mock::given(method("POST"))
        .and(path("/jmap/api/"))
        .and(header("authorization", AUTHORIZATION))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/jmap/api/", server.uri());
    let value = transport().post(&url, &credentials(), &body).await.unwrap();

    assert_eq!(value, json!({"methodResponses": []}));
}

#[tokio::test]
async fn test_unauthorized_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let url = format!("{}/.well-known/jmap", server.uri());
    let err = transport().get(&url, &credentials()).await.unwrap_err();

    assert!(matches!(err, Error::Status { status: 401, .. }));
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_unavailable_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = format!("{}/jmap/api/", server.uri());
    let err = transport()
        .post(&url, &credentials(), &json!({}))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Status { status: 503, .. }));
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_non_json_body_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let url = format!("{}/.well-known/jmap", server.uri());
    let err = transport().get(&url, &credentials()).await.unwrap_err();

    assert!(matches!(err, Error::Json(_)));
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[tokio::test]
async fn test_client_bootstraps_over_http() {
    let server = MockServer::start().await;
    let document = json!({
        "apiUrl": format!("{}/jmap/api/", server.uri()),
        "accounts": {"A1": {"name": "me@example.com"}},
    });
    let mailboxes = json!({
        "methodResponses": [
            ["Mailbox/get", {"list": [{"id": "M1", "role": "trash"}]}, "c0"],
        ],
    });
    Mock::given(method("GET"))
        .and(path("/.well-known/jmap"))
        .and(header("authorization", AUTHORIZATION))
        .respond_with(ResponseTemplate::new(200).set_body_json(document))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/jmap/api/"))
        .and(header("authorization", AUTHORIZATION))
        .respond_with(ResponseTemplate::new(200).set_body_json(mailboxes))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config::new(format!("{}/.well-known/jmap", server.uri())).unwrap();
    let transport = HttpTransport::new(&config).unwrap();
    let mut client = JmapClient::new(config, credentials(), transport);

    client.discover().await.unwrap();
    client.bootstrap_mailboxes().await.unwrap();

    let catalog = client.catalog();
    assert_eq!(catalog.mailbox_by_role(&MailboxRole::Trash).unwrap(), "M1");
}
