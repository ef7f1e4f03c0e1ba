//! Subcommand implementations. Each one performs a single client call and
//! yields the JSON to print.

use anyhow::{bail, Context, Result};
use couchdb_core::{AllDocs, KeyValue, QueryParameter, ViewResult};
use couchdb_rs::CouchDBClient;
use serde_json::{json, Value};

/// Options of the `view` subcommand, already parsed by clap.
#[derive(Debug, Default)]
pub struct ViewOptions {
    pub start_key: Option<String>,
    pub end_key: Option<String>,
    pub keys: Vec<String>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    pub descending: bool,
    pub include_docs: bool,
    pub reduce: Option<bool>,
    pub group: bool,
    pub group_level: Option<u32>,
}

pub async fn uuids(client: &CouchDBClient, count: u32) -> Result<Value> {
    let uuids = client.get_uuids(count).await?;
    Ok(json!(uuids))
}

pub async fn db_create(client: &CouchDBClient, name: &str) -> Result<Value> {
    let db = client.create_db(name).await?;
    tracing::info!(db = db.name(), "Database created");
    Ok(json!({"ok": true, "db": db.name()}))
}

pub async fn db_delete(client: &CouchDBClient, name: &str) -> Result<Value> {
    client.delete_db(name).await?;
    tracing::info!(db = name, "Database deleted");
    Ok(json!({"ok": true}))
}

pub async fn db_exists(client: &CouchDBClient, name: &str) -> Result<Value> {
    let exists = client.db_exists(name).await?;
    Ok(json!({"db": name, "exists": exists}))
}

pub async fn get(client: &CouchDBClient, db: &str, id: &str) -> Result<Value> {
    let doc: Value = client.database(db).retrieve(id).await?;
    Ok(doc)
}

pub async fn all_docs(client: &CouchDBClient, db: &str, include_docs: bool) -> Result<Value> {
    let all: AllDocs = client.database(db).retrieve_all(include_docs).await?;
    let rows: Vec<Value> = all
        .rows
        .into_iter()
        .map(|row| match row.doc {
            Some(doc) => json!({"id": row.key, "rev": row.value.rev, "doc": doc}),
            None => json!({"id": row.key, "rev": row.value.rev}),
        })
        .collect();
    Ok(json!({"total_rows": all.total_rows, "rows": rows}))
}

pub async fn create(client: &CouchDBClient, db: &str, document: &str) -> Result<Value> {
    let document: Value =
        serde_json::from_str(document).context("Document must be valid JSON")?;
    let created = client.database(db).create(&document).await?;
    Ok(serde_json::to_value(created)?)
}

pub async fn delete(
    client: &CouchDBClient,
    db: &str,
    id: &str,
    rev: &str,
    fail_on_not_found: bool,
) -> Result<Value> {
    match client.database(db).delete(id, rev, fail_on_not_found).await? {
        Some(deleted) => Ok(serde_json::to_value(deleted)?),
        None => {
            tracing::warn!(id, "Document was already gone");
            Ok(json!({"ok": true, "id": id, "missing": true}))
        }
    }
}

pub async fn view(
    client: &CouchDBClient,
    db: &str,
    design: &str,
    view: &str,
    options: ViewOptions,
) -> Result<Value> {
    let params = view_params(options)?;
    let result: ViewResult = client.database(db).query_by_view(view, design, &params).await?;

    let rows: Vec<Value> = result
        .rows
        .into_iter()
        .map(|row| {
            let mut out = json!({"key": row.key, "value": row.value});
            if let Some(id) = row.id {
                out["id"] = json!(id);
            }
            if let Some(doc) = row.doc {
                out["doc"] = doc;
            }
            out
        })
        .collect();

    Ok(json!({
        "total_rows": result.total_rows,
        "offset": result.offset,
        "rows": rows,
    }))
}

/// Turn CLI options into query parameters, in a fixed order.
fn view_params(options: ViewOptions) -> Result<Vec<QueryParameter>> {
    let mut params = Vec::new();

    if let Some(start) = options.start_key {
        params.push(QueryParameter::StartKey(parse_key(&start)?));
    }
    if let Some(end) = options.end_key {
        params.push(QueryParameter::EndKey(parse_key(&end)?));
    }
    if options.descending {
        params.push(QueryParameter::Descending(true));
    }
    if options.include_docs {
        params.push(QueryParameter::IncludeDocs(true));
    }
    if let Some(reduce) = options.reduce {
        params.push(QueryParameter::Reduce(reduce));
    }
    if options.group {
        params.push(QueryParameter::Group(true));
    }
    if let Some(level) = options.group_level {
        params.push(QueryParameter::GroupLevel(level));
    }
    if let Some(limit) = options.limit {
        params.push(QueryParameter::Limit(limit));
    }
    if let Some(skip) = options.skip {
        params.push(QueryParameter::Skip(skip));
    }
    if !options.keys.is_empty() {
        let keys = options
            .keys
            .iter()
            .map(|raw| parse_scalar(raw))
            .collect::<Result<Vec<_>>>()?;
        params.push(QueryParameter::Keys(keys));
    }

    Ok(params)
}

/// Parse a JSON key; an array is a compound key, anything else a single element.
fn parse_key(raw: &str) -> Result<Vec<KeyValue>> {
    let value = parse_json(raw)?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| KeyValue::try_from(item).map_err(anyhow::Error::from))
            .collect(),
        other => Ok(vec![KeyValue::try_from(other)?]),
    }
}

fn parse_scalar(raw: &str) -> Result<KeyValue> {
    let value = parse_json(raw)?;
    if value.is_array() {
        bail!("--key takes a single value, got {}", raw);
    }
    Ok(KeyValue::try_from(value)?)
}

/// JSON if it parses, otherwise the raw text as a string key.
fn parse_json(raw: &str) -> Result<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(_) if !raw.trim_start().starts_with(['[', '{', '"']) => {
            Ok(Value::String(raw.to_string()))
        }
        Err(err) => Err(err).with_context(|| format!("Invalid key: {}", raw)),
    }
}
