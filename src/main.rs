use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vectordb_builder::core::config::Config;
use vectordb_builder::core::context::RequestContext;
use vectordb_builder::features::api_keys::{ApiKeyDialog, ApiKeyDialogState, ApiKeyGateway};
use vectordb_builder::features::databases::dtos::{
    ChunkSize, CreateDatabaseForm, DatabaseListEntry, EmbeddingModel,
};
use vectordb_builder::features::databases::models::Sector;
use vectordb_builder::features::databases::{
    filter_databases, use_databases, DatabaseGateway, SectorFilter, UseDatabasesOptions,
};
use vectordb_builder::features::documents::services::store_file;
use vectordb_builder::features::usage::{report_filename, UsageDashboard, UsageService};
use vectordb_builder::modules::gateway::GatewayClient;
use vectordb_builder::modules::platform::InMemoryPlatform;
use vectordb_builder::modules::storage::S3DocumentStorage;
use vectordb_builder::shared::format::format_bytes;
use vectordb_builder::shared::types::FileUpload;

/// Command-line front end for the vector database builder
#[derive(Parser, Debug)]
#[command(name = "vectordb-builder", version, about)]
struct Cli {
    /// User id to act as
    #[arg(long, global = true, env = "VDB_USER_ID")]
    user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List databases
    Databases {
        /// Keep polling and reprint on every change
        #[arg(long)]
        watch: bool,
        /// Case-insensitive match on name or description
        #[arg(long, default_value = "")]
        search: String,
        /// `all` or a sector name
        #[arg(long, default_value = "all")]
        sector: SectorFilter,
    },
    /// Create a database from local files
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "other")]
        sector: Sector,
        #[arg(long, default_value = "text-embedding-ada-002")]
        model: EmbeddingModel,
        #[arg(long, default_value_t = 512)]
        chunk_size: u32,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show the ingestion status of a database
    Status { database_id: String },
    /// Delete a database
    Delete { database_id: String },
    /// Show the API key of a database, generating one if needed
    ApiKey {
        database_id: String,
        #[arg(long)]
        regenerate: bool,
    },
    /// List all API keys of the user
    Keys,
    /// Usage summary per database
    Usage {
        /// Write the JSON report to this file ("-" picks a dated name)
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Upload a file to document storage
    UploadDocument { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;
    tracing::debug!("Configuration loaded successfully");

    let user_id = cli
        .user
        .or_else(|| config.app.default_user_id.clone())
        .context("No user id: pass --user or set VDB_USER_ID")?;
    let ctx = RequestContext::new(user_id)?;

    let client = Arc::new(GatewayClient::new(&config.gateway)?);
    tracing::debug!("Gateway client initialized for {}", client.base_url());
    let databases = Arc::new(DatabaseGateway::new(Arc::clone(&client)));

    match cli.command {
        Command::Databases {
            watch,
            search,
            sector,
        } => {
            if watch {
                watch_databases(databases, ctx, &config, &search, sector).await?;
            } else {
                let list = databases.list(&ctx).await?;
                print_databases(&list, &search, sector);
            }
        }
        Command::Create {
            name,
            description,
            sector,
            model,
            chunk_size,
            files,
        } => {
            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                uploads.push(FileUpload::from_path(path).await?);
            }
            let form = CreateDatabaseForm {
                name,
                description,
                sector,
                model,
                chunk_size: ChunkSize::try_from(chunk_size)?,
                files: uploads,
            };
            let response = databases.create(&ctx, &form).await?;
            println!(
                "Created database {} ({})",
                response.database_id,
                response.status.as_deref().unwrap_or("processing")
            );
        }
        Command::Status { database_id } => {
            println!("{}", databases.status(&database_id).await?);
        }
        Command::Delete { database_id } => {
            let response = databases.delete(&database_id).await?;
            println!("Deleted {}: {}", database_id, response.status);
        }
        Command::ApiKey {
            database_id,
            regenerate,
        } => {
            let gateway = Arc::new(ApiKeyGateway::new(Arc::clone(&client)));
            let mut dialog = ApiKeyDialog::new(gateway, ctx, database_id.clone(), database_id);
            let state = if regenerate {
                dialog.regenerate().await
            } else {
                dialog.open().await
            };
            match state {
                ApiKeyDialogState::Ready(key) => println!("{}", key),
                ApiKeyDialogState::Failed(message) => anyhow::bail!("{}", message),
                other => anyhow::bail!("Unexpected dialog state: {:?}", other),
            }
        }
        Command::Keys => {
            let gateway = ApiKeyGateway::new(Arc::clone(&client));
            for key in gateway.list_user(&ctx).await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    key.database_id, key.database_name, key.key, key.created_at
                );
            }
        }
        Command::Usage { export } => {
            // The summary comes from the gateway alone; no platform connection is needed
            let service = UsageService::new(Arc::clone(&client), Arc::new(InMemoryPlatform::new()));
            let usage = service.summary(&ctx).await?;
            let list = databases.list(&ctx).await?;
            let dashboard = UsageDashboard::new(&usage, &list);

            let stats = dashboard.stats();
            println!(
                "Databases: {}  Queries: {}  Recent: {}",
                stats.total_databases, stats.total_queries, stats.recent_queries
            );
            for row in dashboard.database_rows() {
                println!(
                    "{}\t{}\t{}",
                    row.name,
                    row.queries,
                    row.last_used.as_deref().unwrap_or("Never")
                );
            }
            for activity in dashboard.recent_activity() {
                println!(
                    "{}\tQuery to {}\t{}",
                    activity.timestamp, activity.database_name, activity.api_key_preview
                );
            }

            if let Some(path) = export {
                let now = Utc::now();
                let path = if path.as_os_str() == "-" {
                    PathBuf::from(report_filename(now))
                } else {
                    path
                };
                tokio::fs::write(&path, dashboard.export_report(now)?)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Report written to {}", path.display());
            }
        }
        Command::UploadDocument { file } => {
            let storage = S3DocumentStorage::new(config.storage.clone())?;
            let upload = FileUpload::from_path(&file).await?;
            let stored = store_file(&storage, &upload).await?;
            println!("Stored {} ({})", stored.key, format_bytes(stored.size as f64));
            println!("{}", stored.url);
        }
    }

    Ok(())
}

fn print_databases(list: &[DatabaseListEntry], search: &str, sector: SectorFilter) {
    for db in filter_databases(list, search, sector) {
        println!(
            "{}\t{}\t{}\t{}\t{}",
            db.id,
            db.name,
            db.sector.map_or("-", |s| s.display_name()),
            db.status.as_deref().unwrap_or("-"),
            format_bytes(db.database_size.unwrap_or_default()),
        );
    }
}

async fn watch_databases(
    gateway: Arc<DatabaseGateway>,
    ctx: RequestContext,
    config: &Config,
    search: &str,
    sector: SectorFilter,
) -> anyhow::Result<()> {
    let options = UseDatabasesOptions {
        paused: false,
        ..UseDatabasesOptions::from_config(&config.hooks)
    };
    let hook = use_databases(gateway, ctx, options);
    let mut rx = hook.subscribe();

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                if let Some(message) = state.error_message() {
                    tracing::warn!("Refresh failed: {}", message);
                }
                if let (Some(list), false) = (state.data.as_ref(), state.loading) {
                    println!("--- {} ---", Utc::now().format("%H:%M:%S"));
                    print_databases(list, search, sector);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    hook.unmount();
    Ok(())
}
