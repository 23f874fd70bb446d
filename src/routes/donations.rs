use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

use crate::models::{
    DonorRecord, HealthResponse, StatusResponse, SubmitDonationResponse, TestEmailRequest,
};
use crate::routes::AppState;
use crate::services::mailer::test_email;
use crate::services::MailError;

/// Configure donation and mail routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/submit-donation", web::post().to(submit_donation))
        .route("/download-csv", web::get().to(download_csv))
        .route("/test-email", web::post().to(send_test_email));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        email_mode: state.intake.mailer().mode().label().to_string(),
        bloomerang_enabled: state.intake.crm().is_enabled(),
        timestamp: chrono::Utc::now(),
    })
}

/// Submit donation endpoint
///
/// POST /api/submit-donation
///
/// Request body:
/// ```json
/// {
///   "firstName": "Jane",
///   "lastName": "Doe",
///   "email": "jane@example.com",
///   "phone": "(305) 555-1234",
///   "address": "1 Main St",
///   "donationType": "merchandise",
///   "merchandiseItems": ["Clothing"],
///   "donationDate": "2024-01-15",
///   "location": "Main Office"
/// }
/// ```
async fn submit_donation(
    state: web::Data<AppState>,
    req: web::Json<DonorRecord>,
) -> impl Responder {
    let donor = req.into_inner();

    if let Err(errors) = donor.validate() {
        tracing::info!("Validation failed for donation submission: {:?}", errors);
        return HttpResponse::BadRequest().json(StatusResponse::failed(errors.to_string()));
    }

    let submission_id = uuid::Uuid::new_v4().to_string();
    tracing::info!("Donation submission {} received", submission_id);

    let report = state.intake.submit(&donor).await;

    HttpResponse::Ok().json(SubmitDonationResponse {
        success: true,
        message: "Donation recorded successfully".to_string(),
        submission_id,
        record_saved: report.record_saved,
        email_sent: report.email_sent,
        bloomerang_synced: report.crm.synced,
        bloomerang_message: report.crm.message,
        constituent_id: report.crm.matched_id,
    })
}

/// Download the donor CSV as `donors.csv`
async fn download_csv(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let records = state.intake.records();
    if !records.exists() {
        return HttpResponse::NotFound().json(serde_json::json!({ "error": "No data available" }));
    }

    match NamedFile::open_async(records.path()).await {
        Ok(file) => file
            .set_content_disposition(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename("donors.csv".to_string())],
            })
            .into_response(&req),
        Err(e) => {
            tracing::error!("Failed to open {}: {}", records.path().display(), e);
            HttpResponse::InternalServerError().json(StatusResponse::failed(e.to_string()))
        }
    }
}

/// Send a test message through the configured transport
///
/// The recipient defaults to the configured sender address.
async fn send_test_email(
    state: web::Data<AppState>,
    req: web::Json<TestEmailRequest>,
) -> impl Responder {
    let mailer = state.intake.mailer();
    let recipient = req
        .into_inner()
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| mailer.sender().to_string());

    if recipient.is_empty() {
        return HttpResponse::BadRequest()
            .json(StatusResponse::failed("No recipient email address provided or configured"));
    }

    match mailer.send(test_email(recipient, mailer.mode())).await {
        Ok(()) => HttpResponse::Ok().json(StatusResponse::ok(format!(
            "Test email sent successfully via {}",
            mailer.mode().label()
        ))),
        Err(e @ MailError::Configuration(_)) => {
            HttpResponse::BadRequest().json(StatusResponse::failed(e.to_string()))
        }
        Err(e) => {
            tracing::error!("Test email failed: {}", e);
            HttpResponse::InternalServerError().json(StatusResponse::failed(e.to_string()))
        }
    }
}
