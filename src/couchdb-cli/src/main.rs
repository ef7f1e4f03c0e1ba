//! couchdb - command-line access to a CouchDB server.

mod commands;
mod telemetry;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::ViewOptions;
use couchdb_core::ConnectionProperties;
use couchdb_rs::CouchDBClient;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "couchdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Connection config file (JSON)
    #[arg(short, long, default_value = "couchdb.json")]
    config: String,

    /// Server host, overrides the config file
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Server port, overrides the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Use HTTPS
    #[arg(long)]
    secure: bool,

    /// Basic auth user name
    #[arg(short, long)]
    user: Option<String>,

    /// Basic auth password
    #[arg(long, requires = "user")]
    password: Option<String>,

    /// Also write JSON logs to this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch server-generated UUIDs
    Uuids {
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,
    },

    /// Database management
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Fetch a document
    Get { db: String, id: String },

    /// List every document id, optionally with bodies
    AllDocs {
        db: String,

        #[arg(long)]
        include_docs: bool,
    },

    /// Create a document from a JSON string
    Create { db: String, document: String },

    /// Delete a document revision
    Delete {
        db: String,
        id: String,
        rev: String,

        /// Treat an already-missing document as an error
        #[arg(long)]
        fail_on_not_found: bool,
    },

    /// Query a view
    View {
        db: String,
        design: String,
        view: String,

        /// Start key as JSON; an array is a compound key
        #[arg(long)]
        start_key: Option<String>,

        /// End key as JSON; an array is a compound key
        #[arg(long)]
        end_key: Option<String>,

        /// Exact key to match, repeatable
        #[arg(long = "key")]
        keys: Vec<String>,

        #[arg(long)]
        limit: Option<u64>,

        #[arg(long)]
        skip: Option<u64>,

        #[arg(long)]
        descending: bool,

        #[arg(long)]
        include_docs: bool,

        /// Run the reduce function (true/false)
        #[arg(long)]
        reduce: Option<bool>,

        #[arg(long)]
        group: bool,

        #[arg(long)]
        group_level: Option<u32>,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Create a database
    Create { name: String },
    /// Delete a database
    Delete { name: String },
    /// Check whether a database exists
    Exists { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = telemetry::init_telemetry(cli.log_dir.as_deref(), cli.verbose)?;

    let props = connection_properties(&cli);
    tracing::debug!(base_url = %props.base_url(), "Connecting");
    let client = CouchDBClient::new(props)?;

    let output = match cli.command {
        Commands::Uuids { count } => commands::uuids(&client, count).await?,
        Commands::Db { action } => match action {
            DbAction::Create { name } => commands::db_create(&client, &name).await?,
            DbAction::Delete { name } => commands::db_delete(&client, &name).await?,
            DbAction::Exists { name } => commands::db_exists(&client, &name).await?,
        },
        Commands::Get { db, id } => commands::get(&client, &db, &id).await?,
        Commands::AllDocs { db, include_docs } => {
            commands::all_docs(&client, &db, include_docs).await?
        }
        Commands::Create { db, document } => commands::create(&client, &db, &document).await?,
        Commands::Delete {
            db,
            id,
            rev,
            fail_on_not_found,
        } => commands::delete(&client, &db, &id, &rev, fail_on_not_found).await?,
        Commands::View {
            db,
            design,
            view,
            start_key,
            end_key,
            keys,
            limit,
            skip,
            descending,
            include_docs,
            reduce,
            group,
            group_level,
        } => {
            let options = ViewOptions {
                start_key,
                end_key,
                keys,
                limit,
                skip,
                descending,
                include_docs,
                reduce,
                group,
                group_level,
            };
            commands::view(&client, &db, &design, &view, options).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Config file first, then command-line overrides.
fn connection_properties(cli: &Cli) -> ConnectionProperties {
    let mut props = ConnectionProperties::load(&cli.config).unwrap_or_else(|err| {
        tracing::warn!("Failed to load {}, using defaults: {}", cli.config, err);
        ConnectionProperties::default()
    });

    if let Some(host) = &cli.host {
        props.host = host.clone();
    }
    if let Some(port) = cli.port {
        props.port = port;
    }
    if cli.secure {
        props.secured = true;
    }
    if let Some(user) = &cli.user {
        props = props.with_credentials(user.clone(), cli.password.clone().unwrap_or_default());
    }

    props
}
