mod config;
mod db;
mod error;
mod middleware;
mod models;
mod repository;
mod routes;
mod services;
mod state;
mod utils;

use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};

use crate::config::AppConfig;
use crate::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    utils::logging::initialize_logging();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    info!("Connecting to storage ({:?})...", config.storage);
    let state = match AppState::from_config(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };
    info!("Storage ready: {}", state.accounts.storage_backend());

    let bind_addr = state.config.bind_addr.clone();
    info!("Starting server on http://{}", bind_addr);

    let data = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(data.clone())
            .configure(routes::configure_routes)
    })
        .bind(bind_addr)?
        .run()
        .await
}
