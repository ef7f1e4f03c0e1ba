//! Core CouchDB client implementation.

use crate::database::Database;
use crate::error::{Result, TransportError, INTERNAL_ERROR};
use crate::request::{escape, RequestDescriptor};
use crate::response::Classifier;
use crate::transport::{HttpTransport, RawResponse, Transport};
use crate::users::UsersDatabase;
use couchdb_core::{ConnectionProperties, UuidList};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

const NO_UUIDS: &str = "No UUIDs returned";

/// Configuration and transport shared by every handle created from one client.
#[derive(Clone)]
pub(crate) struct Connection {
    props: Arc<ConnectionProperties>,
    transport: Arc<dyn Transport>,
}

impl Connection {
    /// Build a bodyless request; header failures carry the classifier's id/rev.
    pub(crate) fn request(
        &self,
        classifier: &Classifier<'_>,
        method: Method,
        path: impl Into<String>,
    ) -> Result<RequestDescriptor> {
        RequestDescriptor::build(&self.props, method, path, false, None)
            .map_err(|err| classifier.header_error(err))
    }

    pub(crate) fn request_with_body(
        &self,
        classifier: &Classifier<'_>,
        method: Method,
        path: impl Into<String>,
        content_type: Option<&str>,
    ) -> Result<RequestDescriptor> {
        RequestDescriptor::build(&self.props, method, path, true, content_type)
            .map_err(|err| classifier.header_error(err))
    }

    /// Issue one request; the single suspension point of every operation.
    pub(crate) async fn issue(
        &self,
        request: RequestDescriptor,
        body: Option<Vec<u8>>,
    ) -> std::result::Result<RawResponse, TransportError> {
        let method = request.method.clone();
        let path = request.path.clone();
        tracing::debug!(%method, %path, "Issuing request");

        let outcome = self.transport.issue(request, body).await;
        if let Ok(response) = &outcome {
            tracing::debug!(%method, %path, status = response.status.as_u16(), "Response received");
        }
        outcome
    }
}

/// A client for a CouchDB server.
///
/// Cloning is cheap; clones share configuration and transport.
///
/// # Example
///
/// ```no_run
/// use couchdb_rs::{ConnectionProperties, CouchDBClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let props = ConnectionProperties::new("localhost", 5984, false)
///     .with_credentials("admin", "password");
/// let client = CouchDBClient::new(props)?;
///
/// let db = client.create_db("inventory").await?;
/// let uuid = client.get_uuid().await?;
/// println!("{} ready, next id {}", db.name(), uuid);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CouchDBClient {
    pub(crate) conn: Connection,
}

impl CouchDBClient {
    /// Create a client backed by reqwest.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(props: ConnectionProperties) -> std::result::Result<Self, TransportError> {
        let transport = HttpTransport::new(&props)?;
        Ok(Self::with_transport(props, Arc::new(transport)))
    }

    /// Create a client over any transport.
    pub fn with_transport(props: ConnectionProperties, transport: Arc<dyn Transport>) -> Self {
        Self {
            conn: Connection {
                props: Arc::new(props),
                transport,
            },
        }
    }

    pub fn connection_properties(&self) -> &ConnectionProperties {
        &self.conn.props
    }

    /// Handle to a database; performs no I/O.
    pub fn database(&self, name: impl Into<String>) -> Database {
        Database::new(self.conn.clone(), name.into())
    }

    /// Handle to the `_users` database.
    pub fn users_database(&self) -> UsersDatabase {
        UsersDatabase::new(self.database("_users"))
    }

    /// Create a database.
    pub async fn create_db(&self, name: &str) -> Result<Database> {
        let classifier = Classifier::write();
        let request = self
            .conn
            .request(&classifier, Method::PUT, format!("/{}", escape(name)))?;
        let outcome = self.conn.issue(request, None).await;
        classifier.accept(outcome)?;
        Ok(self.database(name))
    }

    /// Whether a database exists.
    ///
    /// Any status other than 200 means `false`; only a missing response is an error.
    pub async fn db_exists(&self, name: &str) -> Result<bool> {
        let classifier = Classifier::read();
        let request = self
            .conn
            .request(&classifier, Method::GET, format!("/{}", escape(name)))?;
        match self.conn.issue(request, None).await {
            Ok(response) => Ok(response.status == StatusCode::OK),
            Err(_) => Err(classifier.internal(INTERNAL_ERROR)),
        }
    }

    /// Delete a database.
    pub async fn delete_db(&self, name: &str) -> Result<()> {
        let classifier = Classifier::remove(true);
        let request = self
            .conn
            .request(&classifier, Method::DELETE, format!("/{}", escape(name)))?;
        let outcome = self.conn.issue(request, None).await;
        classifier.accept(outcome)?;
        Ok(())
    }

    /// Fetch `count` server-generated UUIDs.
    ///
    /// An empty list in answer to a non-zero `count` is an internal error.
    pub async fn get_uuids(&self, count: u32) -> Result<Vec<String>> {
        let classifier = Classifier::read();
        let request = self
            .conn
            .request(&classifier, Method::GET, format!("/_uuids?count={}", count))?;
        let outcome = self.conn.issue(request, None).await;
        let list: UuidList = classifier.decode(outcome)?;

        if count > 0 && list.uuids.is_empty() {
            return Err(classifier.internal(NO_UUIDS));
        }
        Ok(list.uuids)
    }

    /// Fetch a single server-generated UUID.
    pub async fn get_uuid(&self) -> Result<String> {
        self.get_uuids(1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Classifier::read().internal(NO_UUIDS))
    }

    /// Set a server configuration value, e.g. `couchdb/max_document_size`.
    pub async fn set_config<T: Serialize + ?Sized>(&self, key_path: &str, value: &T) -> Result<()> {
        let classifier = Classifier::read();
        let body = serde_json::to_vec(value).map_err(|err| classifier.encode_error(err))?;
        let request =
            self.conn
                .request_with_body(&classifier, Method::PUT, config_path(key_path), None)?;
        let outcome = self.conn.issue(request, Some(body)).await;
        classifier.accept(outcome)?;
        Ok(())
    }

    /// Read a server configuration value or section.
    pub async fn get_config<T: DeserializeOwned>(&self, key_path: &str) -> Result<T> {
        let classifier = Classifier::read();
        let request = self
            .conn
            .request(&classifier, Method::GET, config_path(key_path))?;
        let outcome = self.conn.issue(request, None).await;
        classifier.decode(outcome)
    }
}

impl std::fmt::Debug for CouchDBClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouchDBClient")
            .field("base_url", &self.conn.props.base_url())
            .finish()
    }
}

fn config_path(key_path: &str) -> String {
    let segments: Vec<String> = key_path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(escape)
        .collect();
    format!("/_config/{}", segments.join("/"))
}
