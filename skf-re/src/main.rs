//! skf-re - SketchFactor Reputation Engine service
//!
//! Owns the shared SQLite database and exposes the registry, report ledger,
//! vote tally, and query surface over HTTP.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use skf_re::AppState;

#[derive(Debug, Parser)]
#[command(name = "skf-re", about = "SketchFactor reputation engine")]
struct Args {
    /// Root folder holding the database (overrides env and config file)
    #[arg(long, env = "SKF_ROOT_FOLDER")]
    root_folder: Option<String>,

    /// Listen port (overrides the http_port setting)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Starting skf-re (Reputation Engine)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Resolve root folder and create it if missing
    let root_folder =
        skf_common::config::resolve_root_folder(args.root_folder.as_deref(), "SKF_ROOT_FOLDER")?;
    skf_common::config::ensure_root_folder(&root_folder)?;

    // Open or create the shared database
    let db_path = skf_common::config::database_path(&root_folder);
    info!("Database: {}", db_path.display());

    let db_pool = skf_common::db::init_database(&db_path).await?;
    info!("Database connection established");

    // Listen address comes from settings unless overridden on the CLI
    let host = skf_common::db::setting_string(&db_pool, "http_host", "127.0.0.1").await?;
    let port = match args.port {
        Some(port) => port,
        None => skf_common::db::setting_i64(&db_pool, "http_port", 5730).await? as u16,
    };

    let state = AppState::new(db_pool);
    let app = skf_re::build_router(state);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!("Listening on http://{}:{}", host, port);
    info!("Health check: http://{}:{}/health", host, port);

    axum::serve(listener, app).await?;

    Ok(())
}
