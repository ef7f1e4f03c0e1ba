use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// DocumentResponse is what CouchDB returns for a document write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResponse {
    #[serde(default)]
    pub ok: bool,
    pub id: String,
    pub rev: String,
}

/// BulkResult is one entry of a `_bulk_docs` response, in submission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BulkResult {
    Failure {
        id: String,
        error: String,
        #[serde(default)]
        reason: String,
    },
    Success {
        id: String,
        rev: String,
    },
}

impl BulkResult {
    pub fn id(&self) -> &str {
        match self {
            BulkResult::Failure { id, .. } | BulkResult::Success { id, .. } => id,
        }
    }

    pub fn rev(&self) -> Option<&str> {
        match self {
            BulkResult::Success { rev, .. } => Some(rev),
            BulkResult::Failure { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BulkResult::Success { .. })
    }
}

/// BulkRequest is the body posted to `_bulk_docs`
#[derive(Debug, Serialize)]
pub struct BulkRequest<'a, T> {
    pub docs: &'a [T],
    pub new_edits: bool,
}

/// ErrorBody is the JSON reason CouchDB attaches to failed requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// UuidList is the `_uuids` response
#[derive(Debug, Clone, Deserialize)]
pub struct UuidList {
    pub uuids: Vec<String>,
}

/// ViewResult is the response of a view query
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de>, V: Deserialize<'de>, D: Deserialize<'de>"))]
pub struct ViewResult<K = serde_json::Value, V = serde_json::Value, D = serde_json::Value> {
    #[serde(default)]
    pub total_rows: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub rows: Vec<ViewRow<K, V, D>>,
    #[serde(default)]
    pub update_seq: Option<serde_json::Value>,
}

/// ViewRow is a single emitted row; `id` is absent for reduced rows
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "K: Deserialize<'de>, V: Deserialize<'de>, D: Deserialize<'de>"))]
pub struct ViewRow<K, V, D> {
    #[serde(default)]
    pub id: Option<String>,
    pub key: K,
    pub value: V,
    #[serde(default)]
    pub doc: Option<D>,
}

/// Value emitted for each row of `_all_docs`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RevisionValue {
    pub rev: String,
}

/// AllDocs is the `_all_docs` response
pub type AllDocs<D = serde_json::Value> = ViewResult<String, RevisionValue, D>;

/// DesignDocument holds the view definitions of a `_design/` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignDocument {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub views: BTreeMap<String, ViewDefinition>,
}

/// ViewDefinition is a map function and optional reduce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewDefinition {
    pub map: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduce: Option<String>,
}

fn default_language() -> String {
    "javascript".to_string()
}

impl Default for DesignDocument {
    fn default() -> Self {
        Self {
            id: None,
            rev: None,
            language: default_language(),
            views: BTreeMap::new(),
        }
    }
}

impl DesignDocument {
    pub fn with_view(mut self, name: impl Into<String>, map: impl Into<String>) -> Self {
        self.views.insert(
            name.into(),
            ViewDefinition {
                map: map.into(),
                reduce: None,
            },
        );
        self
    }

    pub fn with_reduced_view(
        mut self,
        name: impl Into<String>,
        map: impl Into<String>,
        reduce: impl Into<String>,
    ) -> Self {
        self.views.insert(
            name.into(),
            ViewDefinition {
                map: map.into(),
                reduce: Some(reduce.into()),
            },
        );
        self
    }
}

/// UserDocument is a `_users` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDocument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(rename = "type", default = "default_user_type")]
    pub user_type: String,
}

fn default_user_type() -> String {
    "user".to_string()
}

impl UserDocument {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: Some(password.into()),
            roles: Vec::new(),
            user_type: default_user_type(),
        }
    }
}

/// SessionInfo is the body of `_session` responses
#[derive(Debug, Clone, Deserialize)]
pub struct SessionInfo {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, rename = "userCtx")]
    pub user_ctx: Option<UserContext>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// UserContext identifies the authenticated user of a session
#[derive(Debug, Clone, Deserialize)]
pub struct UserContext {
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Id under which a user lives in `_users`
pub fn user_id(name: &str) -> String {
    format!("org.couchdb.user:{}", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bulk_results_preserve_order_and_kind() {
        let body = json!([
            {"id": "a", "rev": "2-x"},
            {"id": "b", "error": "conflict", "reason": "Document update conflict."}
        ]);
        let results: Vec<BulkResult> = serde_json::from_value(body).unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_success());
        assert_eq!(results[0].rev(), Some("2-x"));
        assert_eq!(results[1].id(), "b");
        assert_eq!(
            results[1],
            BulkResult::Failure {
                id: "b".to_string(),
                error: "conflict".to_string(),
                reason: "Document update conflict.".to_string(),
            }
        );
    }

    #[test]
    fn test_bulk_request_shape() {
        let docs = vec![json!({"_id": "a"})];
        let body = serde_json::to_value(BulkRequest {
            docs: &docs,
            new_edits: false,
        })
        .unwrap();
        assert_eq!(body, json!({"docs": [{"_id": "a"}], "new_edits": false}));
    }

    #[test]
    fn test_all_docs_with_and_without_docs() {
        let body = json!({
            "total_rows": 2,
            "offset": 0,
            "rows": [
                {"id": "a", "key": "a", "value": {"rev": "1-a"}, "doc": {"_id": "a", "n": 1}},
                {"id": "b", "key": "b", "value": {"rev": "1-b"}}
            ]
        });
        let all: AllDocs = serde_json::from_value(body).unwrap();

        assert_eq!(all.total_rows, Some(2));
        assert_eq!(all.rows[0].value.rev, "1-a");
        assert_eq!(all.rows[0].doc.as_ref().unwrap()["n"], 1);
        assert!(all.rows[1].doc.is_none());
    }

    #[test]
    fn test_reduced_view_rows_have_no_id() {
        let body = json!({"rows": [{"key": null, "value": 42}]});
        let result: ViewResult<serde_json::Value, u64> = serde_json::from_value(body).unwrap();

        assert!(result.total_rows.is_none());
        assert!(result.rows[0].id.is_none());
        assert_eq!(result.rows[0].value, 42);
    }

    #[test]
    fn test_design_document_serialization() {
        let design = DesignDocument::default()
            .with_view("by_name", "function(doc) { emit(doc.name, null); }")
            .with_reduced_view("count", "function(doc) { emit(null, 1); }", "_count");
        let value = serde_json::to_value(&design).unwrap();

        assert!(value.get("_id").is_none());
        assert_eq!(value["views"]["count"]["reduce"], "_count");
        assert!(value["views"]["by_name"].get("reduce").is_none());
    }

    #[test]
    fn test_user_document_defaults() {
        let user = UserDocument::new("jan", "apple");
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value, json!({"name": "jan", "password": "apple", "roles": [], "type": "user"}));
        assert_eq!(user_id("jan"), "org.couchdb.user:jan");
    }
}
