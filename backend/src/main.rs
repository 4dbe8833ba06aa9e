mod auth;
mod config;
mod error;
mod extract;
mod objects;
mod ocr;
mod render;
mod services;
mod state;
mod store;
#[cfg(test)]
mod testing;

use crate::config::Config;
use crate::objects::{LocalObjectStore, ObjectStore};
use crate::ocr::VisionClient;
use crate::render::HeadlessChromeRenderer;
use crate::state::AppState;
use crate::store::{DocumentStore, MemoryStore, SqliteStore};
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info, warn};
use std::io;
use std::sync::Arc;

fn open_store(config: &Config) -> io::Result<Arc<dyn DocumentStore>> {
    if config.uses_memory_store() {
        warn!("Using the in-memory document store; data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = SqliteStore::open(&config.database).map_err(io::Error::other)?;
    Ok(Arc::new(store))
}

fn build_state(config: Config) -> io::Result<AppState> {
    let store = open_store(&config)?;
    info!("Document store: {} ({})", store.backend_tag(), config.database);

    let objects: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(
        &config.object_root,
        &config.public_base_url,
    ));
    if config.vision_api_key.is_none() {
        warn!("IDCARD_VISION_API_KEY is not set; template extraction will fail");
    }
    let ocr = VisionClient::new(
        &config.vision_endpoint,
        config.vision_api_key.clone(),
        objects.clone(),
    )
    .map_err(io::Error::other)?;
    let ocr = Arc::new(ocr);
    let renderer = Arc::new(HeadlessChromeRenderer::new(&config.chrome_bin));

    Ok(AppState {
        config: Arc::new(config),
        store,
        objects,
        ocr,
        renderer,
    })
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;
    std::fs::create_dir_all(&config.object_root)?;

    let state = build_state(config)?;
    let config = state.config.clone();
    let bind_addr = config.bind_addr();
    info!("Server running at {}", config.public_base_url);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(services::configure(config.json_limit_bytes))
            .service(actix_files::Files::new(objects::FILES_ROUTE, &config.object_root))
    })
    .bind(bind_addr)?
    .run()
    .await
}
