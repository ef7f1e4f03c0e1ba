//! Document operations on a single database.

use crate::client::Connection;
use crate::error::Result;
use crate::request::escape;
use crate::response::{Classifier, BULK};
use couchdb_core::{BulkRequest, BulkResult, DocumentResponse};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A handle to one CouchDB database.
///
/// Holds no state besides its name; every call is a single round trip.
#[derive(Clone)]
pub struct Database {
    pub(crate) conn: Connection,
    name: String,
    escaped_name: String,
}

impl Database {
    pub(crate) fn new(conn: Connection, name: String) -> Self {
        let escaped_name = escape(&name);
        Self {
            conn,
            name,
            escaped_name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `/{db}` followed by the given suffix
    pub(crate) fn path(&self, suffix: &str) -> String {
        format!("/{}{}", self.escaped_name, suffix)
    }

    pub(crate) fn doc_path(&self, id: &str) -> String {
        self.path(&format!("/{}", escape(id)))
    }

    /// Retrieve a document by id.
    pub async fn retrieve<T: DeserializeOwned>(&self, id: &str) -> Result<T> {
        let classifier = Classifier::read().with_id(id);
        let request = self.conn.request(&classifier, Method::GET, self.doc_path(id))?;
        let outcome = self.conn.issue(request, None).await;
        classifier.decode(outcome)
    }

    /// Retrieve every document id, optionally with the document bodies.
    ///
    /// Decode into [`AllDocs`](couchdb_core::AllDocs) for the standard shape.
    pub async fn retrieve_all<T: DeserializeOwned>(&self, include_docs: bool) -> Result<T> {
        let suffix = if include_docs {
            "/_all_docs?include_docs=true"
        } else {
            "/_all_docs"
        };
        let classifier = Classifier::read();
        let request = self.conn.request(&classifier, Method::GET, self.path(suffix))?;
        let outcome = self.conn.issue(request, None).await;
        classifier.decode(outcome)
    }

    /// Create a document; the server assigns an id unless the body has `_id`.
    pub async fn create<T: Serialize + ?Sized>(&self, document: &T) -> Result<DocumentResponse> {
        let classifier = Classifier::write();
        let body = serde_json::to_vec(document).map_err(|err| classifier.encode_error(err))?;
        let request =
            self.conn
                .request_with_body(&classifier, Method::POST, self.path(""), None)?;
        let outcome = self.conn.issue(request, Some(body)).await;
        classifier.decode(outcome)
    }

    /// Replace a document. `rev` must be the revision last observed; the server
    /// answers 409 otherwise.
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        id: &str,
        rev: &str,
        document: &T,
    ) -> Result<DocumentResponse> {
        let classifier = Classifier::write().with_id(id).with_rev(rev);
        let body = serde_json::to_vec(document).map_err(|err| classifier.encode_error(err))?;
        let path = format!("{}?rev={}", self.doc_path(id), escape(rev));
        let request = self
            .conn
            .request_with_body(&classifier, Method::PUT, path, None)?;
        let outcome = self.conn.issue(request, Some(body)).await;
        classifier.decode(outcome)
    }

    /// Delete a document.
    ///
    /// Returns `None` when the document was already gone and `fail_on_not_found`
    /// is false.
    pub async fn delete(
        &self,
        id: &str,
        rev: &str,
        fail_on_not_found: bool,
    ) -> Result<Option<DocumentResponse>> {
        let classifier = Classifier::remove(fail_on_not_found)
            .with_id(id)
            .with_rev(rev);
        let path = format!("{}?rev={}", self.doc_path(id), escape(rev));
        let request = self.conn.request(&classifier, Method::DELETE, path)?;
        let outcome = self.conn.issue(request, None).await;
        classifier.classify(outcome)
    }

    /// Insert, update or delete many documents in one request.
    ///
    /// The call succeeds as a whole even when individual entries fail; inspect
    /// each [`BulkResult`]. With `new_edits` false the server stores the given
    /// revisions verbatim instead of generating new ones.
    pub async fn bulk<T: Serialize>(
        &self,
        documents: &[T],
        new_edits: bool,
    ) -> Result<Vec<BulkResult>> {
        let classifier = Classifier::new(BULK, false);
        let body = BulkRequest {
            docs: documents,
            new_edits,
        };
        let body = serde_json::to_vec(&body).map_err(|err| classifier.encode_error(err))?;
        let request = self.conn.request_with_body(
            &classifier,
            Method::POST,
            self.path("/_bulk_docs"),
            None,
        )?;
        let outcome = self.conn.issue(request, Some(body)).await;
        classifier.decode(outcome)
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").field("name", &self.name).finish()
    }
}
