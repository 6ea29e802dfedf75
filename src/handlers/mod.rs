pub mod upload;

use actix_web::{web, HttpResponse, Responder};

use crate::config::Config;
use crate::services::discord;
use crate::utils::multipart::UploadOptions;

/// Shared, read-only state handed to every request.
pub struct AppState {
    pub discord: discord::Client,
    pub uploads: UploadOptions,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(AppState {
            discord: discord::Client::new(config)?,
            uploads: UploadOptions {
                dir: config.upload_dir.clone(),
                max_file_size: config.max_file_size,
            },
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(health))
        .route("/api/send", web::post().to(upload::forward_upload));
}

async fn health() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("ok")
}
