//! Cookie authentication against `/_session`.

use crate::client::CouchDBClient;
use crate::error::Result;
use crate::request::{RequestDescriptor, FORM};
use crate::response::Classifier;
use couchdb_core::user_id;
use reqwest::header::COOKIE;
use reqwest::Method;
use serde::de::DeserializeOwned;

/// A `_session` response body plus the cookie that came with it.
#[derive(Debug, Clone)]
pub struct Session<T> {
    /// First `Set-Cookie` value, passed back verbatim on later calls
    pub cookie: Option<String>,
    pub body: T,
}

impl CouchDBClient {
    /// Log in with a name and password.
    ///
    /// Decode into [`SessionInfo`](couchdb_core::SessionInfo) for the standard shape.
    pub async fn create_session<T: DeserializeOwned>(
        &self,
        name: &str,
        password: &str,
    ) -> Result<Session<T>> {
        let id = user_id(name);
        let classifier = Classifier::read().with_id(&id);
        let form = format!(
            "name={}&password={}",
            urlencoding::encode(name),
            urlencoding::encode(password)
        );
        let request = self
            .conn
            .request_with_body(&classifier, Method::POST, "/_session", Some(FORM))?;
        let outcome = self.conn.issue(request, Some(form.into_bytes())).await;
        self.session_from(classifier, outcome, None)
    }

    /// Check who a session cookie belongs to.
    ///
    /// A cookie that is not valid header text fails with an encode error
    /// before anything is sent.
    pub async fn get_session<T: DeserializeOwned>(&self, cookie: &str) -> Result<Session<T>> {
        let classifier = Classifier::read();
        let request = self.cookie_request(&classifier, Method::GET, cookie)?;
        let outcome = self.conn.issue(request, None).await;
        self.session_from(classifier, outcome, Some(cookie))
    }

    /// Log out; the returned cookie is whatever the server sets to expire it.
    pub async fn delete_session<T: DeserializeOwned>(&self, cookie: &str) -> Result<Session<T>> {
        let classifier = Classifier::read();
        let request = self.cookie_request(&classifier, Method::DELETE, cookie)?;
        let outcome = self.conn.issue(request, None).await;
        self.session_from(classifier, outcome, None)
    }

    fn cookie_request(
        &self,
        classifier: &Classifier<'_>,
        method: Method,
        cookie: &str,
    ) -> Result<RequestDescriptor> {
        self.conn
            .request(classifier, method, "/_session")?
            .with_header(COOKIE, cookie)
            .map_err(|err| classifier.header_error(err))
    }

    /// Decode a session body; the cookie comes from `Set-Cookie`, or `fallback`.
    fn session_from<T: DeserializeOwned>(
        &self,
        classifier: Classifier<'_>,
        outcome: std::result::Result<crate::RawResponse, crate::TransportError>,
        fallback: Option<&str>,
    ) -> Result<Session<T>> {
        let response = classifier
            .accept(outcome)?
            .ok_or_else(|| classifier.internal("No session returned"))?;
        let body = classifier.decode_body(&response)?;
        let cookie = response
            .header("set-cookie")
            .or(fallback)
            .map(str::to_string);

        Ok(Session { cookie, body })
    }
}
