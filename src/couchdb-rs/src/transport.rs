//! The HTTP boundary.

use crate::error::TransportError;
use crate::request::RequestDescriptor;
use couchdb_core::ConnectionProperties;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

/// A response as seen by the classifier.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// First value of a header, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Issues a request and yields the response, or an error if none was obtained.
///
/// Implementations must not retry.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn issue(
        &self,
        request: RequestDescriptor,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(props: &ConnectionProperties) -> Result<Self, TransportError> {
        let client = if props.insecure_skip_verify {
            reqwest::Client::builder()
                .danger_accept_invalid_certs(true)
                .build()?
        } else {
            reqwest::Client::new()
        };

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn issue(
        &self,
        request: RequestDescriptor,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url())
            .headers(request.headers);

        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
