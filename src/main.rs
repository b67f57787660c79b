mod config;
mod model;
mod web;

use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{error, info, warn};
use std::path::PathBuf;

use config::Config;
use model::{ChatRelay, GroqClient};
use web::routes;

// App state structure
pub struct AppState {
    relay: ChatRelay,
    index_path: PathBuf,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting chat relay");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let system_prompt = match config.load_system_prompt() {
        Ok(prompt) => prompt,
        Err(e) => {
            error!("Failed to load system prompt: {:#}", e);
            std::process::exit(1);
        }
    };
    info!("System prompt loaded ({} characters)", system_prompt.len());

    // A missing key only disables /chat; the page is still served
    let client = match config.api_key.clone() {
        Some(api_key) => match GroqClient::new(&config.api_url, api_key, config.upstream_timeout) {
            Ok(client) => Some(client),
            Err(e) => {
                error!("Failed to build upstream client: {:#}", e);
                std::process::exit(1);
            }
        },
        None => {
            warn!("GROQ_API_KEY is not set; /chat will return errors");
            None
        }
    };

    let app_state = Data::new(AppState {
        relay: ChatRelay::new(client, system_prompt),
        index_path: config.index_path.clone(),
    });
    let max_body_bytes = config.max_body_bytes;

    info!("Server running on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .app_data(actix_web::web::PayloadConfig::new(max_body_bytes))
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
