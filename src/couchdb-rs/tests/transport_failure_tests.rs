//! Behaviour when no response is obtained at all.

use async_trait::async_trait;
use couchdb_rs::{
    ConnectionProperties, CouchDBClient, CouchError, QueryParameter, RawResponse,
    RequestDescriptor, Transport, TransportError, ViewResult, INTERNAL_ERROR,
};
use pretty_assertions::assert_eq;
use reqwest::{Method, StatusCode};
use std::sync::{Arc, Mutex};

/// Records every request and never answers.
#[derive(Default)]
struct UnreachableTransport {
    seen: Mutex<Vec<(Method, String)>>,
}

#[async_trait]
impl Transport for UnreachableTransport {
    async fn issue(
        &self,
        request: RequestDescriptor,
        _body: Option<Vec<u8>>,
    ) -> Result<RawResponse, TransportError> {
        self.seen
            .lock()
            .unwrap()
            .push((request.method.clone(), request.path.clone()));
        Err(TransportError::new("connection refused"))
    }
}

/// Answers every request with the same canned response.
struct CannedTransport {
    status: StatusCode,
    body: &'static str,
}

#[async_trait]
impl Transport for CannedTransport {
    async fn issue(
        &self,
        _request: RequestDescriptor,
        _body: Option<Vec<u8>>,
    ) -> Result<RawResponse, TransportError> {
        Ok(RawResponse::new(self.status, self.body))
    }
}

fn unreachable_client() -> (CouchDBClient, Arc<UnreachableTransport>) {
    let transport = Arc::new(UnreachableTransport::default());
    let client =
        CouchDBClient::with_transport(ConnectionProperties::default(), transport.clone());
    (client, transport)
}

fn assert_internal(err: &CouchError, id: Option<&str>, rev: Option<&str>) {
    assert!(err.is_internal(), "expected internal error, got {:?}", err);
    assert_eq!(err.status_code(), None);
    assert_eq!(err.reason(), INTERNAL_ERROR);
    assert_eq!(err.id(), id);
    assert_eq!(err.rev(), rev);
}

#[tokio::test]
async fn test_document_calls_report_internal_error() {
    let (client, transport) = unreachable_client();
    let db = client.database("inventory");

    let err = db.retrieve::<serde_json::Value>("w1").await.unwrap_err();
    assert_internal(&err, Some("w1"), None);

    let err = db
        .update("w1", "1-abc", &serde_json::json!({"count": 1}))
        .await
        .unwrap_err();
    assert_internal(&err, Some("w1"), Some("1-abc"));

    // Not-found tolerance never applies when there is no response.
    let err = db.delete("w1", "1-abc", false).await.unwrap_err();
    assert_internal(&err, Some("w1"), Some("1-abc"));

    let seen = transport.seen.lock().unwrap().clone();
    assert_eq!(
        seen,
        vec![
            (Method::GET, "/inventory/w1".to_string()),
            (Method::PUT, "/inventory/w1?rev=1-abc".to_string()),
            (Method::DELETE, "/inventory/w1?rev=1-abc".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_server_calls_report_internal_error() {
    let (client, _transport) = unreachable_client();

    assert_internal(&client.db_exists("inventory").await.unwrap_err(), None, None);
    assert_internal(&client.get_uuids(3).await.unwrap_err(), None, None);

    let err = client
        .get_session::<serde_json::Value>("AuthSession=x")
        .await
        .unwrap_err();
    assert_internal(&err, None, None);

    let err = client
        .create_session::<serde_json::Value>("jan", "apple")
        .await
        .unwrap_err();
    assert_internal(&err, Some("org.couchdb.user:jan"), None);
}

#[tokio::test]
async fn test_view_and_attachment_calls_report_internal_error() {
    let (client, _transport) = unreachable_client();
    let db = client.database("people");

    let err = db
        .query_by_view::<ViewResult>("byName", "app", &[QueryParameter::Limit(1)])
        .await
        .unwrap_err();
    assert_internal(&err, None, None);

    let err = db
        .create_attachment("p1", "2-b", "a.txt", b"hi".to_vec(), "text/plain")
        .await
        .unwrap_err();
    assert_internal(&err, Some("p1"), Some("2-b"));

    let err = db.delete_design("app", "1-d", false).await.unwrap_err();
    assert_internal(&err, Some("app"), Some("1-d"));
}

#[tokio::test]
async fn test_empty_success_body_is_decode_error() {
    let transport = Arc::new(CannedTransport {
        status: StatusCode::CREATED,
        body: "",
    });
    let client = CouchDBClient::with_transport(ConnectionProperties::default(), transport);

    let err = client
        .database("inventory")
        .create(&serde_json::json!({"a": 1}))
        .await
        .unwrap_err();

    assert!(matches!(err, CouchError::Decode { .. }));
    assert_eq!(err.status_code(), Some(201));
}

#[tokio::test]
async fn test_unexpected_success_code_is_status_error() {
    // 200 is not a write success; the server's own words are kept.
    let transport = Arc::new(CannedTransport {
        status: StatusCode::OK,
        body: r#"{"ok":true,"id":"w1","rev":"1-a"}"#,
    });
    let client = CouchDBClient::with_transport(ConnectionProperties::default(), transport);

    let err = client
        .database("inventory")
        .update("w1", "0-a", &serde_json::json!({}))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(200));
    assert_eq!(err.reason(), "200 OK");
}

#[tokio::test]
async fn test_refused_connection_over_http() {
    // Nothing listens on port 1.
    let props = ConnectionProperties::new("127.0.0.1", 1, false);
    let client = CouchDBClient::new(props).unwrap();

    let err = client.get_uuid().await.unwrap_err();
    assert_internal(&err, None, None);
}
