//! Request descriptors handed to the transport.

use crate::error::InvalidHeader;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use couchdb_core::{url_host, ConnectionProperties};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;

pub const JSON: &str = "application/json";
pub const FORM: &str = "application/x-www-form-urlencoded";

/// A fully specified request, ready for a [`Transport`](crate::Transport).
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub scheme: &'static str,
    pub host: String,
    pub port: u16,
    pub method: Method,
    /// Path plus query string; untrusted segments must already be escaped
    pub path: String,
    pub headers: HeaderMap,
}

impl RequestDescriptor {
    /// Build a descriptor from connection properties.
    ///
    /// `Accept: application/json` is always set. `Content-Type` is set only when
    /// `has_body` is true, defaulting to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidHeader`] when the content type or credentials are not
    /// valid header text; no request exists in that case.
    pub fn build(
        props: &ConnectionProperties,
        method: Method,
        path: impl Into<String>,
        has_body: bool,
        content_type: Option<&str>,
    ) -> Result<Self, InvalidHeader> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));

        if has_body {
            let content_type = content_type.unwrap_or(JSON);
            headers.insert(CONTENT_TYPE, header_value(&CONTENT_TYPE, content_type)?);
        }

        if let Some(creds) = &props.credentials {
            let token = STANDARD.encode(format!("{}:{}", creds.username, creds.password));
            let value = header_value(&AUTHORIZATION, &format!("Basic {}", token))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(Self {
            scheme: props.scheme(),
            host: props.host.clone(),
            port: props.port,
            method,
            path: path.into(),
            headers,
        })
    }

    /// Add a header verbatim.
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Result<Self, InvalidHeader> {
        let value = header_value(&name, value)?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Absolute URL; IPv6 literals are bracketed.
    pub fn url(&self) -> String {
        format!(
            "{}://{}:{}{}",
            self.scheme,
            url_host(&self.host),
            self.port,
            self.path
        )
    }
}

fn header_value(name: &HeaderName, value: &str) -> Result<HeaderValue, InvalidHeader> {
    HeaderValue::from_str(value).map_err(|_| InvalidHeader::new(name.as_str()))
}

/// Percent-escape a single path segment.
pub fn escape(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::COOKIE;

    #[test]
    fn test_get_has_accept_but_no_content_type() {
        let props = ConnectionProperties::new("localhost", 5984, false);
        let request = RequestDescriptor::build(&props, Method::GET, "/db/doc", false, None).unwrap();

        assert_eq!(request.headers.get(ACCEPT).unwrap(), "application/json");
        assert!(request.headers.get(CONTENT_TYPE).is_none());
        assert!(request.headers.get(AUTHORIZATION).is_none());
        assert_eq!(request.url(), "http://localhost:5984/db/doc");
    }

    #[test]
    fn test_body_defaults_to_json_content_type() {
        let props = ConnectionProperties::default();
        let request = RequestDescriptor::build(&props, Method::PUT, "/db", true, None).unwrap();
        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), JSON);

        let request =
            RequestDescriptor::build(&props, Method::PUT, "/db/a/b.png", true, Some("image/png"))
                .unwrap();
        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), "image/png");
    }

    #[test]
    fn test_scheme_host_port_come_from_properties() {
        let props = ConnectionProperties::new("couch.example.com", 6984, true);
        let request = RequestDescriptor::build(&props, Method::DELETE, "/_session", false, None).unwrap();

        assert_eq!(request.scheme, "https");
        assert_eq!(request.host, "couch.example.com");
        assert_eq!(request.port, 6984);
        assert_eq!(request.url(), "https://couch.example.com:6984/_session");
    }

    #[test]
    fn test_credentials_add_basic_auth() {
        let props = ConnectionProperties::default().with_credentials("admin", "secret");
        let request = RequestDescriptor::build(&props, Method::GET, "/", false, None).unwrap();

        // base64("admin:secret")
        assert_eq!(
            request.headers.get(AUTHORIZATION).unwrap(),
            "Basic YWRtaW46c2VjcmV0"
        );
    }

    #[test]
    fn test_cookie_header_is_attached_verbatim() {
        let props = ConnectionProperties::default();
        let request = RequestDescriptor::build(&props, Method::GET, "/_session", false, None)
            .unwrap()
            .with_header(COOKIE, "AuthSession=abc123")
            .unwrap();
        assert_eq!(request.headers.get(COOKIE).unwrap(), "AuthSession=abc123");
    }

    #[test]
    fn test_invalid_header_values_are_rejected() {
        let props = ConnectionProperties::default();
        let err = RequestDescriptor::build(&props, Method::GET, "/_session", false, None)
            .unwrap()
            .with_header(COOKIE, "AuthSession=abc\ndef")
            .unwrap_err();
        assert_eq!(err.name(), "cookie");

        let err = RequestDescriptor::build(&props, Method::PUT, "/db/a/b", true, Some("image/\npng"))
            .unwrap_err();
        assert_eq!(err.name(), "content-type");
    }

    #[test]
    fn test_ipv6_host_is_bracketed() {
        let props = ConnectionProperties::new("::1", 5984, false);
        let request = RequestDescriptor::build(&props, Method::GET, "/db", false, None).unwrap();
        assert_eq!(request.url(), "http://[::1]:5984/db");
        assert!(reqwest::Url::parse(&request.url()).is_ok());

        let props = ConnectionProperties::new("[fe80::1]", 5984, false);
        let request = RequestDescriptor::build(&props, Method::GET, "/db", false, None).unwrap();
        assert_eq!(request.url(), "http://[fe80::1]:5984/db");
    }

    #[test]
    fn test_escape_segment() {
        assert_eq!(escape("my db/1"), "my%20db%2F1");
        assert_eq!(escape("_design"), "_design");
    }
}
