// Route exports
pub mod donations;
pub mod pages;
pub mod settings;

use actix_web::{error, web, HttpRequest, HttpResponse};
use std::path::PathBuf;

use crate::models::StatusResponse;
use crate::services::DonationIntake;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub intake: DonationIntake,
    pub web_root: PathBuf,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(pages::configure).service(
        web::scope("/api")
            .configure(donations::configure)
            .configure(settings::configure),
    );
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let response = HttpResponse::BadRequest().json(StatusResponse::failed(format!("Invalid JSON: {}", err)));
    error::InternalError::from_response(err, response).into()
}

/// JSON extractor config used by the server and the HTTP tests
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(handle_json_payload_error)
}
