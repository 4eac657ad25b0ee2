// src/main.rs
use std::sync::Arc;

use boxfit::api::{self, ApiState};
use boxfit::config::AppConfig;
use log::{info, warn};

#[tokio::main]
async fn main() {
    // .env is read first so RUST_LOG from it reaches the logger
    let dotenv_result = dotenvy::dotenv();

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(err) = dotenv_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();
    let store = app_config.store.load_store();
    let state = ApiState::new(app_config.solver.clone(), Arc::new(store));

    info!("boxfit service starting...");
    api::start_api_server(app_config.api.clone(), state).await;
}
