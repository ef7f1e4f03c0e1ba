//! Design documents and view queries.

use crate::database::Database;
use crate::error::Result;
use crate::request::escape;
use crate::response::Classifier;
use couchdb_core::{query, DocumentResponse, QueryParameter, ViewMethod};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

impl Database {
    /// Query `view` of design document `design`.
    ///
    /// A `Keys` parameter with several keys turns the request into a POST with
    /// the keys in the body; every other parameter goes to the query string in
    /// the order given. Decode into [`ViewResult`](couchdb_core::ViewResult) for
    /// the standard shape.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use couchdb_rs::{CouchDBClient, ConnectionProperties, QueryParameter, ViewResult};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = CouchDBClient::new(ConnectionProperties::default())?;
    /// let db = client.database("people");
    /// let result: ViewResult = db
    ///     .query_by_view(
    ///         "by_name",
    ///         "app",
    ///         &[QueryParameter::StartKey(vec!["a".into()]), QueryParameter::Limit(10)],
    ///     )
    ///     .await?;
    /// println!("{} rows", result.rows.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn query_by_view<T: DeserializeOwned>(
        &self,
        view: &str,
        design: &str,
        params: &[QueryParameter],
    ) -> Result<T> {
        let classifier = Classifier::read();
        let encoded = query::encode(params);
        let path = self.path(&format!(
            "/_design/{}/_view/{}{}",
            escape(design),
            escape(view),
            encoded.query
        ));

        let (request, body) = match (encoded.method, &encoded.body) {
            (ViewMethod::Post, Some(keys)) => {
                let body = serde_json::to_vec(keys).map_err(|err| classifier.encode_error(err))?;
                let request = self
                    .conn
                    .request_with_body(&classifier, Method::POST, path, None)?;
                (request, Some(body))
            }
            _ => (self.conn.request(&classifier, Method::GET, path)?, None),
        };

        let outcome = self.conn.issue(request, body).await;
        classifier.decode(outcome)
    }

    /// Create or replace a design document.
    pub async fn create_design<T: Serialize + ?Sized>(
        &self,
        design_name: &str,
        document: &T,
    ) -> Result<DocumentResponse> {
        let classifier = Classifier::write();
        let body = serde_json::to_vec(document).map_err(|err| classifier.encode_error(err))?;
        let path = self.path(&format!("/_design/{}", escape(design_name)));
        let request = self
            .conn
            .request_with_body(&classifier, Method::PUT, path, None)?;
        let outcome = self.conn.issue(request, Some(body)).await;
        classifier.decode(outcome)
    }

    /// Delete a design document; see [`Database::delete`] for not-found handling.
    pub async fn delete_design(
        &self,
        design_name: &str,
        rev: &str,
        fail_on_not_found: bool,
    ) -> Result<Option<DocumentResponse>> {
        let classifier = Classifier::remove(fail_on_not_found)
            .with_id(design_name)
            .with_rev(rev);
        let path = self.path(&format!(
            "/_design/{}?rev={}",
            escape(design_name),
            escape(rev)
        ));
        let request = self.conn.request(&classifier, Method::DELETE, path)?;
        let outcome = self.conn.issue(request, None).await;
        classifier.classify(outcome)
    }
}
