//! Plenum daemon — entry point for running a Plenum voting server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use plenum_server::{PlenumService, ServerConfig};
use plenum_store::RecordStore;
use plenum_store_lmdb::LmdbRecordStore;

#[derive(Parser)]
#[command(name = "plenum-daemon", about = "Plenum voting system server")]
struct Cli {
    /// Data directory for the record log.
    #[arg(long, env = "PLENUM_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Address the HTTP API binds to.
    #[arg(long, env = "PLENUM_LISTEN_ADDR")]
    listen: Option<String>,

    /// Master admin secret.
    #[arg(long, env = "PLENUM_MASTER_SECRET")]
    master_secret: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "PLENUM_LOG_LEVEL")]
    log_level: String,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    plenum_utils::init_tracing();

    let cli = Cli::parse();

    let file_config: Option<ServerConfig> = if let Some(ref config_path) = cli.config {
        match ServerConfig::from_toml_file(&config_path.display().to_string()) {
            Ok(cfg) => {
                tracing::info!("Loaded config from {}", config_path.display());
                Some(cfg)
            }
            Err(e) => {
                tracing::warn!("Failed to load config file: {e}, using CLI defaults");
                None
            }
        }
    } else {
        None
    };

    let mut config = file_config.unwrap_or_default();
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }
    if let Some(master_secret) = cli.master_secret {
        config.master_secret = master_secret;
    }
    config.log_level = cli.log_level;

    if config.master_secret == "change-me" {
        tracing::warn!("master secret is still the default; change it before the event");
    }

    std::fs::create_dir_all(&config.data_dir)?;
    let store = LmdbRecordStore::open(&config.data_dir, config.map_size_bytes())?;
    tracing::info!(
        "Record store open at {} (schema v{})",
        config.data_dir.display(),
        store.schema_version()?,
    );

    let store: Arc<dyn RecordStore> = Arc::new(store);
    let service = PlenumService::new(store, config.master_secret.clone())?;
    let refresh_task = service.spawn_refresh_task();

    tracing::info!("Starting Plenum server on {}", config.listen_addr);
    plenum_rpc::serve(&config.listen_addr, service).await?;

    refresh_task.abort();
    tracing::info!("Plenum daemon exited cleanly");
    Ok(())
}
