//! Survey server entry point.

use log::info;
use std::error::Error;
use survey_core::db::open_db;
use survey_core::{init_logging, init_stderr_logging};
use survey_server::{serve, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = ServerConfig::from_env()?;
    match config.log_dir.as_deref() {
        Some(log_dir) => init_logging(&config.log_level, log_dir)?,
        None => init_stderr_logging(&config.log_level)?,
    }
    info!(
        "event=server_init module=main status=ok version={}",
        survey_core::core_version()
    );

    let conn = open_db(&config.db_path)?;
    serve(&config, AppState::new(conn)).await
}
