//! View query parameters and their wire encoding
//!
//! Parameters are rendered into the query string in the order they are given.
//! The one exception is a multi-key lookup: `Keys` with more than one element is
//! moved into a `{"keys": [...]}` request body and the request becomes a POST.

use serde_json::Value;
use std::fmt;

/// A single element of a view key
///
/// Keys are restricted to scalars plus an empty-object marker, which CouchDB
/// collates after every other value and is commonly used as an upper bound
/// (`["a", {}]`). Nested arrays and populated objects are not supported.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyValue {
    String(String),
    Int(i64),
    /// Must be finite; `KeyValue::try_from(f64)` checks this
    Float(f64),
    Bool(bool),
    EmptyObject,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KeyError {
    #[error("unsupported key element: {0}")]
    Unsupported(String),
    #[error("key element is not a finite number: {0}")]
    NonFinite(f64),
}

impl KeyValue {
    /// Query-string form: strings are quoted and percent-escaped, the rest is literal
    pub fn to_query_literal(&self) -> String {
        match self {
            KeyValue::String(s) => format!("\"{}\"", urlencoding::encode(s)),
            other => other.to_string(),
        }
    }

    /// JSON form used in request bodies
    pub fn to_json(&self) -> Value {
        match self {
            KeyValue::String(s) => Value::String(s.clone()),
            KeyValue::Int(n) => Value::from(*n),
            KeyValue::Float(n) => Value::from(*n),
            KeyValue::Bool(b) => Value::Bool(*b),
            KeyValue::EmptyObject => Value::Object(serde_json::Map::new()),
        }
    }
}

/// Literal text of the element, without quoting or escaping
impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::String(s) => f.write_str(s),
            KeyValue::Int(n) => write!(f, "{}", n),
            KeyValue::Float(n) => write!(f, "{}", n),
            KeyValue::Bool(b) => write!(f, "{}", b),
            KeyValue::EmptyObject => f.write_str("{}"),
        }
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        KeyValue::String(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        KeyValue::String(value)
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        KeyValue::Int(value)
    }
}

impl From<i32> for KeyValue {
    fn from(value: i32) -> Self {
        KeyValue::Int(value.into())
    }
}

/// NaN and infinities have no JSON form and are rejected.
impl TryFrom<f64> for KeyValue {
    type Error = KeyError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() {
            Ok(KeyValue::Float(value))
        } else {
            Err(KeyError::NonFinite(value))
        }
    }
}

impl From<bool> for KeyValue {
    fn from(value: bool) -> Self {
        KeyValue::Bool(value)
    }
}

impl TryFrom<Value> for KeyValue {
    type Error = KeyError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(KeyValue::String(s)),
            Value::Bool(b) => Ok(KeyValue::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(KeyValue::Int(i)),
                None => n
                    .as_f64()
                    .map(KeyValue::Float)
                    .ok_or_else(|| KeyError::Unsupported(n.to_string())),
            },
            Value::Object(map) if map.is_empty() => Ok(KeyValue::EmptyObject),
            other => Err(KeyError::Unsupported(other.to_string())),
        }
    }
}

/// Stale view handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stale {
    /// Never refresh the index before answering
    Ok,
    /// Answer from the stale index, then refresh it
    UpdateAfter,
}

impl Stale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stale::Ok => "ok",
            Stale::UpdateAfter => "update_after",
        }
    }
}

/// Query parameters for view functions of design documents
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParameter {
    /// Include conflict information (only with `IncludeDocs(true)`)
    Conflicts(bool),
    Descending(bool),
    /// Stop returning rows when this key is reached
    EndKey(Vec<KeyValue>),
    EndKeyDocId(String),
    Group(bool),
    GroupLevel(u32),
    IncludeDocs(bool),
    Attachments(bool),
    AttachmentEncodingInfo(bool),
    InclusiveEnd(bool),
    Limit(u64),
    Reduce(bool),
    Skip(u64),
    Stale(Stale),
    /// Start returning rows at this key
    StartKey(Vec<KeyValue>),
    StartKeyDocId(String),
    UpdateSequence(bool),
    /// Only rows whose key matches one of these
    Keys(Vec<KeyValue>),
}

/// HTTP method a view query must be issued with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMethod {
    Get,
    Post,
}

/// Result of encoding a parameter list
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedQuery {
    /// Empty, or `?`-prefixed and `&`-joined
    pub query: String,
    pub method: ViewMethod,
    pub body: Option<Value>,
}

impl EncodedQuery {
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

/// Render a key list: one element renders on its own, several as an array literal
fn key_literal(values: &[KeyValue]) -> String {
    match values {
        [single] => single.to_query_literal(),
        many => array_literal(many),
    }
}

fn array_literal(values: &[KeyValue]) -> String {
    let elements: Vec<String> = values.iter().map(KeyValue::to_query_literal).collect();
    format!("[{}]", elements.join(","))
}

/// Encode view parameters into a query string, switching to POST for multi-key lookups
pub fn encode(params: &[QueryParameter]) -> EncodedQuery {
    let mut fragments: Vec<String> = Vec::with_capacity(params.len());
    let mut keys_body: Option<&[KeyValue]> = None;

    for param in params {
        match param {
            QueryParameter::Conflicts(v) => fragments.push(format!("conflicts={}", v)),
            QueryParameter::Descending(v) => fragments.push(format!("descending={}", v)),
            QueryParameter::EndKey(keys) => {
                fragments.push(format!("endkey={}", key_literal(keys)))
            }
            QueryParameter::EndKeyDocId(id) => {
                fragments.push(format!("endkey_docid={}", urlencoding::encode(id)))
            }
            QueryParameter::Group(v) => fragments.push(format!("group={}", v)),
            QueryParameter::GroupLevel(v) => fragments.push(format!("group_level={}", v)),
            QueryParameter::IncludeDocs(v) => fragments.push(format!("include_docs={}", v)),
            QueryParameter::Attachments(v) => fragments.push(format!("attachments={}", v)),
            QueryParameter::AttachmentEncodingInfo(v) => {
                fragments.push(format!("att_encoding_info={}", v))
            }
            QueryParameter::InclusiveEnd(v) => fragments.push(format!("inclusive_end={}", v)),
            QueryParameter::Limit(v) => fragments.push(format!("limit={}", v)),
            QueryParameter::Reduce(v) => fragments.push(format!("reduce={}", v)),
            QueryParameter::Skip(v) => fragments.push(format!("skip={}", v)),
            QueryParameter::Stale(v) => fragments.push(format!("stale={}", v.as_str())),
            QueryParameter::StartKey(keys) => {
                fragments.push(format!("startkey={}", key_literal(keys)))
            }
            QueryParameter::StartKeyDocId(id) => {
                fragments.push(format!("startkey_docid={}", urlencoding::encode(id)))
            }
            QueryParameter::UpdateSequence(v) => fragments.push(format!("update_seq={}", v)),
            QueryParameter::Keys(keys) => match keys.as_slice() {
                [] => {}
                [single] => fragments.push(format!("key={}", single.to_query_literal())),
                many => keys_body = Some(many),
            },
        }
    }

    let query = if fragments.is_empty() {
        String::new()
    } else {
        format!("?{}", fragments.join("&"))
    };

    match keys_body {
        Some(keys) => {
            let keys: Vec<Value> = keys.iter().map(KeyValue::to_json).collect();
            let mut body = serde_json::Map::new();
            body.insert("keys".to_string(), Value::Array(keys));
            EncodedQuery {
                query,
                method: ViewMethod::Post,
                body: Some(Value::Object(body)),
            }
        }
        None => EncodedQuery {
            query,
            method: ViewMethod::Get,
            body: None,
        },
    }
}
