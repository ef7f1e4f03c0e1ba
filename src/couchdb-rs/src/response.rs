//! Mapping of transport outcomes to typed results or classified errors.

use crate::error::{CouchError, InvalidHeader, TransportError, INTERNAL_ERROR};
use crate::transport::RawResponse;
use couchdb_core::ErrorBody;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

/// Plain reads.
pub const READ: &[StatusCode] = &[StatusCode::OK];
/// Creates and updates.
pub const WRITE: &[StatusCode] = &[StatusCode::CREATED, StatusCode::ACCEPTED];
/// Deletes.
pub const REMOVE: &[StatusCode] = &[StatusCode::OK, StatusCode::ACCEPTED];
/// `_bulk_docs`, which answers 201 but 200 on older servers.
pub const BULK: &[StatusCode] = &[StatusCode::CREATED, StatusCode::OK];

/// Success contract of one call, plus the document it concerned.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    success: &'static [StatusCode],
    tolerate_not_found: bool,
    id: Option<&'a str>,
    rev: Option<&'a str>,
}

impl<'a> Classifier<'a> {
    pub fn new(success: &'static [StatusCode], tolerate_not_found: bool) -> Self {
        Self {
            success,
            tolerate_not_found,
            id: None,
            rev: None,
        }
    }

    pub fn read() -> Self {
        Self::new(READ, false)
    }

    pub fn write() -> Self {
        Self::new(WRITE, false)
    }

    pub fn remove(fail_on_not_found: bool) -> Self {
        Self::new(REMOVE, !fail_on_not_found)
    }

    pub fn with_id(mut self, id: &'a str) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_rev(mut self, rev: &'a str) -> Self {
        self.rev = Some(rev);
        self
    }

    /// Check the status of an outcome.
    ///
    /// Returns the response on success, `None` for a tolerated 404, and the
    /// classified error otherwise.
    pub fn accept(
        &self,
        outcome: Result<RawResponse, TransportError>,
    ) -> Result<Option<RawResponse>, CouchError> {
        let response = outcome.map_err(|_| self.internal(INTERNAL_ERROR))?;

        if self.success.contains(&response.status) {
            return Ok(Some(response));
        }
        if self.tolerate_not_found && response.status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Err(self.status_error(&response))
    }

    /// Check the outcome and decode the success body.
    pub fn classify<T: DeserializeOwned>(
        &self,
        outcome: Result<RawResponse, TransportError>,
    ) -> Result<Option<T>, CouchError> {
        match self.accept(outcome)? {
            Some(response) => self.decode_body(&response).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`classify`](Self::classify) for calls that always carry a body.
    pub fn decode<T: DeserializeOwned>(
        &self,
        outcome: Result<RawResponse, TransportError>,
    ) -> Result<T, CouchError> {
        self.classify(outcome)?
            .ok_or_else(|| self.decode_error(Some(StatusCode::NOT_FOUND), "response has no body"))
    }

    pub fn decode_body<T: DeserializeOwned>(&self, response: &RawResponse) -> Result<T, CouchError> {
        serde_json::from_slice(&response.body)
            .map_err(|err| self.decode_error(Some(response.status), &err.to_string()))
    }

    /// Error for a non-success response: the server's JSON reason if it has one,
    /// otherwise a description built from the status code alone.
    pub fn status_error(&self, response: &RawResponse) -> CouchError {
        let (error, reason) = match serde_json::from_slice::<ErrorBody>(&response.body) {
            Ok(body) => {
                let reason = body.reason.unwrap_or_else(|| body.error.clone());
                (Some(body.error), reason)
            }
            Err(_) => (None, generic_reason(response.status)),
        };

        CouchError::Status {
            status: response.status.as_u16(),
            error,
            reason,
            id: self.id.map(str::to_string),
            rev: self.rev.map(str::to_string),
        }
    }

    /// The no-status sentinel, carrying this call's id/rev.
    pub fn internal(&self, reason: &str) -> CouchError {
        CouchError::Internal {
            reason: reason.to_string(),
            id: self.id.map(str::to_string),
            rev: self.rev.map(str::to_string),
        }
    }

    pub fn decode_error(&self, status: Option<StatusCode>, message: &str) -> CouchError {
        CouchError::Decode {
            status: status.map(|s| s.as_u16()),
            message: message.to_string(),
            id: self.id.map(str::to_string),
            rev: self.rev.map(str::to_string),
        }
    }

    /// A request that could not be built; reported before any I/O.
    pub fn header_error(&self, err: InvalidHeader) -> CouchError {
        CouchError::Encode {
            message: err.to_string(),
            id: self.id.map(str::to_string),
            rev: self.rev.map(str::to_string),
        }
    }

    pub fn encode_error(&self, err: serde_json::Error) -> CouchError {
        CouchError::Encode {
            message: err.to_string(),
            id: self.id.map(str::to_string),
            rev: self.rev.map(str::to_string),
        }
    }
}

fn generic_reason(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(text) => format!("{} {}", status.as_u16(), text),
        None => format!("HTTP status {}", status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use couchdb_core::DocumentResponse;

    fn ok_body() -> Vec<u8> {
        br#"{"ok":true,"id":"doc1","rev":"2-def"}"#.to_vec()
    }

    #[test]
    fn test_missing_response_is_internal_with_id_and_rev() {
        let err = Classifier::write()
            .with_id("doc1")
            .with_rev("1-abc")
            .decode::<DocumentResponse>(Err(TransportError::new("connection refused")))
            .unwrap_err();

        assert!(err.is_internal());
        assert_eq!(err.status_code(), None);
        assert_eq!(err.reason(), INTERNAL_ERROR);
        assert_eq!(err.id(), Some("doc1"));
        assert_eq!(err.rev(), Some("1-abc"));
    }

    #[test]
    fn test_success_code_decodes_body() {
        let doc: DocumentResponse = Classifier::write()
            .decode(Ok(RawResponse::new(StatusCode::ACCEPTED, ok_body())))
            .unwrap();
        assert_eq!(doc.id, "doc1");
        assert_eq!(doc.rev, "2-def");
    }

    #[test]
    fn test_read_rejects_created() {
        let err = Classifier::read()
            .decode::<DocumentResponse>(Ok(RawResponse::new(StatusCode::CREATED, ok_body())))
            .unwrap_err();
        assert_eq!(err.status_code(), Some(201));
    }

    #[test]
    fn test_malformed_success_body_is_decode_error_with_status() {
        let err = Classifier::read()
            .with_id("doc1")
            .decode::<DocumentResponse>(Ok(RawResponse::new(StatusCode::OK, "not json")))
            .unwrap_err();

        assert!(matches!(err, CouchError::Decode { .. }));
        assert_eq!(err.status_code(), Some(200));
        assert_eq!(err.id(), Some("doc1"));
    }

    #[test]
    fn test_structured_error_reason() {
        let body = r#"{"error":"conflict","reason":"Document update conflict."}"#;
        let err = Classifier::write()
            .with_id("doc1")
            .with_rev("1-abc")
            .decode::<DocumentResponse>(Ok(RawResponse::new(StatusCode::CONFLICT, body)))
            .unwrap_err();

        match err {
            CouchError::Status {
                status,
                error,
                reason,
                id,
                rev,
            } => {
                assert_eq!(status, 409);
                assert_eq!(error.as_deref(), Some("conflict"));
                assert_eq!(reason, "Document update conflict.");
                assert_eq!(id.as_deref(), Some("doc1"));
                assert_eq!(rev.as_deref(), Some("1-abc"));
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_json_error_body_falls_back_to_generic_reason() {
        let err = Classifier::read()
            .decode::<DocumentResponse>(Ok(RawResponse::new(
                StatusCode::BAD_GATEWAY,
                "<html>upstream down</html>",
            )))
            .unwrap_err();

        match err {
            CouchError::Status { status, error, reason, .. } => {
                assert_eq!(status, 502);
                assert!(error.is_none());
                assert_eq!(reason, "502 Bad Gateway");
            }
            other => panic!("Expected status error, got {:?}", other),
        }
    }

    #[test]
    fn test_remove_tolerates_not_found_unless_asked() {
        let not_found = || Ok(RawResponse::new(StatusCode::NOT_FOUND, r#"{"error":"not_found","reason":"missing"}"#));

        let tolerated = Classifier::remove(false).accept(not_found()).unwrap();
        assert!(tolerated.is_none());

        let err = Classifier::remove(true).accept(not_found()).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.reason(), "missing");
    }

    #[test]
    fn test_remove_accepts_ok_and_accepted() {
        for status in [StatusCode::OK, StatusCode::ACCEPTED] {
            let response = Classifier::remove(true)
                .classify::<DocumentResponse>(Ok(RawResponse::new(status, ok_body())))
                .unwrap();
            assert!(response.is_some());
        }
    }

    #[test]
    fn test_error_without_reason_uses_error_kind() {
        let err = Classifier::read()
            .accept(Ok(RawResponse::new(StatusCode::UNAUTHORIZED, r#"{"error":"unauthorized"}"#)))
            .unwrap_err();
        assert_eq!(err.reason(), "unauthorized");
    }
}
