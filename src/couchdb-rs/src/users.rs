//! The `_users` database.

use crate::database::Database;
use crate::error::Result;
use crate::response::Classifier;
use couchdb_core::{user_id, DocumentResponse};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ops::Deref;

/// Handle to `_users`; every [`Database`] operation is available through `Deref`.
#[derive(Debug, Clone)]
pub struct UsersDatabase {
    db: Database,
}

impl UsersDatabase {
    pub(crate) fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a user; `document` is usually a [`UserDocument`](couchdb_core::UserDocument).
    pub async fn create_user<T: Serialize + ?Sized>(
        &self,
        name: &str,
        document: &T,
    ) -> Result<DocumentResponse> {
        let id = user_id(name);
        let classifier = Classifier::write().with_id(&id);
        let body = serde_json::to_vec(document).map_err(|err| classifier.encode_error(err))?;
        let request =
            self.db
                .conn
                .request_with_body(&classifier, Method::PUT, self.db.doc_path(&id), None)?;
        let outcome = self.db.conn.issue(request, Some(body)).await;
        classifier.decode(outcome)
    }

    /// Fetch a user document by name.
    pub async fn get_user<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        self.db.retrieve(&user_id(name)).await
    }
}

impl Deref for UsersDatabase {
    type Target = Database;

    fn deref(&self) -> &Database {
        &self.db
    }
}
