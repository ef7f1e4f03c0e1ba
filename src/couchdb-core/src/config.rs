use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Connection properties shared (read-only) by every operation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectionProperties {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub secured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Credentials>,
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

/// Username/password pair sent as HTTP Basic auth
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Host as it appears in a URL: IPv6 literals get brackets.
pub fn url_host(host: &str) -> Cow<'_, str> {
    if host.contains(':') && !host.starts_with('[') {
        Cow::Owned(format!("[{}]", host))
    } else {
        Cow::Borrowed(host)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5984
}

impl ConnectionProperties {
    pub fn new(host: impl Into<String>, port: u16, secured: bool) -> Self {
        Self {
            host: host.into(),
            port,
            secured,
            credentials: None,
            insecure_skip_verify: false,
        }
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ConnectionProperties = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn scheme(&self) -> &'static str {
        if self.secured {
            "https"
        } else {
            "http"
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme(), url_host(&self.host), self.port)
    }
}

impl Default for ConnectionProperties {
    fn default() -> Self {
        Self::new(default_host(), default_port(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: ConnectionProperties = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ConnectionProperties::default());
        assert_eq!(config.base_url(), "http://127.0.0.1:5984");
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_secured_uses_https() {
        let config: ConnectionProperties =
            serde_json::from_str(r#"{"host": "db.example.com", "port": 6984, "secured": true}"#)
                .unwrap();
        assert_eq!(config.scheme(), "https");
        assert_eq!(config.base_url(), "https://db.example.com:6984");
    }

    #[test]
    fn test_credentials_round_trip_through_json() {
        let config = ConnectionProperties::new("localhost", 5984, false)
            .with_credentials("admin", "secret");
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ConnectionProperties = serde_json::from_str(&json).unwrap();

        let creds = parsed.credentials.unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "secret");
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(ConnectionProperties::load("/nonexistent/couchdb.json").is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let props = ConnectionProperties::default().with_credentials("admin", "hunter2");
        let debug = format!("{:?}", props);
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_ipv6_base_url() {
        let props = ConnectionProperties::new("::1", 5984, false);
        assert_eq!(props.base_url(), "http://[::1]:5984");
    }
}
