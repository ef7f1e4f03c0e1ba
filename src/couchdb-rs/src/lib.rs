//! Async Rust client for CouchDB.
//!
//! Every operation is a single HTTP round trip: the request is built from the
//! immutable [`ConnectionProperties`], issued through a [`Transport`], and the
//! response is classified into a typed result or a [`CouchError`]. Nothing is
//! retried, cached or logged as an error; failures go back to the caller.
//!
//! # Example
//!
//! ```no_run
//! use couchdb_rs::{ConnectionProperties, CouchDBClient, CouchError};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = CouchDBClient::new(ConnectionProperties::default())?;
//! let db = client.database("inventory");
//!
//! let created = db.create(&json!({"name": "widget", "count": 3})).await?;
//! match db.update(&created.id, "1-stale", &json!({"count": 4})).await {
//!     Err(err) if err.is_conflict() => println!("someone else won"),
//!     Err(CouchError::Internal { .. }) => println!("server unreachable"),
//!     other => println!("{:?}", other),
//! }
//! # Ok(())
//! # }
//! ```

mod attachments;
mod client;
mod database;
mod error;
mod request;
mod response;
mod session;
mod transport;
mod users;
mod view;

pub use attachments::Attachment;
pub use client::CouchDBClient;
pub use database::Database;
pub use error::{CouchError, InvalidHeader, Result, TransportError, INTERNAL_ERROR};
pub use request::{escape, RequestDescriptor};
pub use response::{Classifier, BULK, READ, REMOVE, WRITE};
pub use session::Session;
pub use transport::{HttpTransport, RawResponse, Transport};
pub use users::UsersDatabase;

pub use couchdb_core;
pub use couchdb_core::{
    AllDocs, BulkResult, ConnectionProperties, Credentials, DesignDocument, DocumentResponse,
    KeyValue, QueryParameter, SessionInfo, Stale, UserDocument, ViewDefinition, ViewResult,
    ViewRow,
};
