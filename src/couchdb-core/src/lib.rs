//! CouchDB Core Library
//!
//! I/O-free building blocks shared by the CouchDB client:
//! - Connection configuration
//! - Wire models for documents, bulk writes, views, sessions and users
//! - View query parameter encoding

pub mod config;
pub mod models;
pub mod query;

// Re-export commonly used types
pub use config::{url_host, ConnectionProperties, Credentials};
pub use models::*;
pub use query::{encode, EncodedQuery, KeyError, KeyValue, QueryParameter, Stale, ViewMethod};
