mod config;
mod error;
mod handlers;
mod models;
mod services;
mod utils;

use std::io;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::handlers::AppState;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = Config::from_env();
    init_tracing(config.as_ref().map(|c| c.is_development).unwrap_or(false));

    let config = config.map_err(|err| {
        error!(error = %err, "invalid configuration");
        io::Error::new(io::ErrorKind::InvalidInput, err)
    })?;

    let state = AppState::new(&config).map_err(|err| {
        error!(error = %err, "failed to build webhook client");
        io::Error::new(io::ErrorKind::Other, err)
    })?;
    let state = web::Data::new(state);

    std::fs::create_dir_all(&config.upload_dir)?;

    info!(
        addr = %config.app_url,
        webhook = %config.webhook_url,
        mode = ?config.webhook_delivery_mode,
        max_file_size = config.max_file_size,
        "server starting"
    );

    let cors_domains = config.cors_domains.clone();
    let is_development = config.is_development;

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&cors_domains, is_development))
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind(config.app_url.as_str())?
    .workers(config.workers)
    .run()
    .await
}

fn cors(domains: &[String], is_development: bool) -> Cors {
    if is_development {
        return Cors::permissive();
    }

    domains
        .iter()
        .fold(Cors::default(), |cors, domain| cors.allowed_origin(domain))
        .allowed_methods(vec!["GET", "POST"])
        .allow_any_header()
        .max_age(3600)
}

/// Human-readable output in development, JSON lines otherwise.
fn init_tracing(is_development: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,photo_relay=debug"));

    let registry = tracing_subscriber::registry().with(filter);
    if is_development {
        registry.with(fmt::layer().with_target(true)).init();
    } else {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .init();
    }
}
