//! Basic Usage Example
//!
//! Creates a database, writes and updates a document, then queries a view.
//! Needs a CouchDB server on localhost:5984 with an admin/password account.
//!
//! Run with: cargo run --example basic_usage

use couchdb_rs::{
    ConnectionProperties, CouchDBClient, DesignDocument, QueryParameter, ViewResult,
};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("couchdb-rs Basic Usage Example\n");

    let props = ConnectionProperties::new("localhost", 5984, false)
        .with_credentials("admin", "password");
    let client = CouchDBClient::new(props)?;

    let db = if client.db_exists("example_people").await? {
        client.database("example_people")
    } else {
        client.create_db("example_people").await?
    };
    println!("✅ Database '{}' ready\n", db.name());

    // Create, then update with the revision we got back
    let created = db.create(&json!({"name": "alice", "city": "oslo"})).await?;
    println!("📝 Created {} at {}", created.id, created.rev);

    let updated = db
        .update(
            &created.id,
            &created.rev,
            &json!({"name": "alice", "city": "bergen"}),
        )
        .await?;
    println!("   Updated to {}\n", updated.rev);

    // Reusing the stale revision is a conflict
    match db.update(&created.id, &created.rev, &json!({"name": "eve"})).await {
        Err(err) if err.is_conflict() => println!("⚠️  Stale write rejected: {}\n", err),
        other => println!("   Unexpected: {:?}\n", other),
    }

    let design = DesignDocument::default()
        .with_view("byCity", "function(doc) { if (doc.city) emit(doc.city, doc.name); }");
    if let Err(err) = db.create_design("people", &design).await {
        println!("   Design document not written: {}", err);
    }

    let result: ViewResult<String, String> = db
        .query_by_view(
            "byCity",
            "people",
            &[
                QueryParameter::StartKey(vec!["b".into()]),
                QueryParameter::Limit(10),
            ],
        )
        .await?;

    println!("🔍 People by city:");
    for row in &result.rows {
        println!("   {} -> {}", row.key, row.value);
    }

    db.delete(&updated.id, &updated.rev, false).await?;
    println!("\n🗑️  Cleaned up {}", updated.id);

    Ok(())
}
