//! Shared helpers for the integration tests.

use couchdb_rs::{ConnectionProperties, CouchDBClient};
use wiremock::MockServer;

/// A client pointed at the mock server.
pub fn client_for(server: &MockServer) -> CouchDBClient {
    let addr = server.address();
    let props = ConnectionProperties::new(addr.ip().to_string(), addr.port(), false);
    CouchDBClient::new(props).unwrap()
}
