//! Attachment operations.

use crate::database::Database;
use crate::error::Result;
use crate::request::escape;
use crate::response::Classifier;
use couchdb_core::DocumentResponse;
use reqwest::Method;

/// Raw attachment bytes together with the type the server stored them under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

impl Database {
    fn attachment_path(&self, doc_id: &str, name: &str) -> String {
        self.path(&format!("/{}/{}", escape(doc_id), escape(name)))
    }

    /// Add or replace an attachment; yields the document's new revision.
    pub async fn create_attachment(
        &self,
        doc_id: &str,
        doc_rev: &str,
        name: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<DocumentResponse> {
        let classifier = Classifier::write().with_id(doc_id).with_rev(doc_rev);
        let path = format!("{}?rev={}", self.attachment_path(doc_id, name), escape(doc_rev));
        let request =
            self.conn
                .request_with_body(&classifier, Method::PUT, path, Some(content_type))?;
        let outcome = self.conn.issue(request, Some(data)).await;
        classifier.decode(outcome)
    }

    /// Fetch an attachment's bytes and content type.
    pub async fn retrieve_attachment(&self, doc_id: &str, name: &str) -> Result<Attachment> {
        let classifier = Classifier::read().with_id(doc_id);
        let request = self
            .conn
            .request(&classifier, Method::GET, self.attachment_path(doc_id, name))?;
        let outcome = self.conn.issue(request, None).await;

        match classifier.accept(outcome)? {
            Some(response) => {
                let content_type = response.header("content-type").map(str::to_string);
                Ok(Attachment {
                    data: response.body,
                    content_type,
                })
            }
            None => Err(classifier.internal("No attachment returned")),
        }
    }

    /// Remove an attachment; see [`Database::delete`] for not-found handling.
    pub async fn delete_attachment(
        &self,
        doc_id: &str,
        doc_rev: &str,
        name: &str,
        fail_on_not_found: bool,
    ) -> Result<Option<DocumentResponse>> {
        let classifier = Classifier::remove(fail_on_not_found)
            .with_id(doc_id)
            .with_rev(doc_rev);
        let path = format!("{}?rev={}", self.attachment_path(doc_id, name), escape(doc_rev));
        let request = self.conn.request(&classifier, Method::DELETE, path)?;
        let outcome = self.conn.issue(request, None).await;
        classifier.classify(outcome)
    }
}
