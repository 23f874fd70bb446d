use actix_web::{web, HttpResponse, Responder};

use crate::models::{
    CrmTestResponse, EmailTemplateRequest, EmailTemplateResponse, FormTitleRequest,
    FormTitleResponse, LocationRequest, LocationsResponse, StatusResponse,
};
use crate::routes::AppState;
use crate::services::SiteError;

/// Configure settings-page routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/email-template", web::get().to(get_email_template))
        .route("/email-template", web::post().to(update_email_template))
        .route("/email-template/reset", web::post().to(reset_email_template))
        .route("/locations", web::get().to(get_locations))
        .route("/locations", web::post().to(add_location))
        .route("/locations", web::delete().to(delete_location))
        .route("/form-title", web::get().to(get_form_title))
        .route("/form-title", web::post().to(update_form_title))
        .route("/bloomerang/test", web::post().to(test_bloomerang));
}

/// Map a store error to a response, using `failure` for storage errors
fn site_error(err: SiteError, failure: &str) -> HttpResponse {
    if err.is_not_found() {
        HttpResponse::NotFound().json(StatusResponse::failed(err.to_string()))
    } else if err.is_validation() {
        HttpResponse::BadRequest().json(StatusResponse::failed(err.to_string()))
    } else {
        tracing::error!("{}: {}", failure, err);
        HttpResponse::InternalServerError().json(StatusResponse::failed(failure))
    }
}

async fn get_email_template(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(EmailTemplateResponse {
        success: true,
        template: state.intake.site().email_template().await,
    })
}

async fn update_email_template(
    state: web::Data<AppState>,
    req: web::Json<EmailTemplateRequest>,
) -> impl Responder {
    match state.intake.site().set_email_template(&req.template).await {
        Ok(()) => HttpResponse::Ok().json(StatusResponse::ok("Template saved successfully")),
        Err(e) => site_error(e, "Failed to save template"),
    }
}

async fn reset_email_template(state: web::Data<AppState>) -> impl Responder {
    match state.intake.site().reset_email_template().await {
        Ok(template) => HttpResponse::Ok().json(EmailTemplateResponse {
            success: true,
            template,
        }),
        Err(e) => site_error(e, "Failed to reset template"),
    }
}

async fn get_locations(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(LocationsResponse {
        success: true,
        locations: state.intake.site().locations().await,
    })
}

async fn add_location(
    state: web::Data<AppState>,
    req: web::Json<LocationRequest>,
) -> impl Responder {
    match state.intake.site().add_location(&req.location).await {
        Ok(()) => {
            tracing::info!("Added donation location {:?}", req.location.trim());
            HttpResponse::Ok().json(StatusResponse::ok("Location added successfully"))
        }
        Err(e) => site_error(e, "Failed to save location"),
    }
}

async fn delete_location(
    state: web::Data<AppState>,
    req: web::Json<LocationRequest>,
) -> impl Responder {
    match state.intake.site().remove_location(&req.location).await {
        Ok(()) => {
            tracing::info!("Removed donation location {:?}", req.location.trim());
            HttpResponse::Ok().json(StatusResponse::ok("Location deleted successfully"))
        }
        Err(e) => site_error(e, "Failed to save locations"),
    }
}

async fn get_form_title(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(FormTitleResponse {
        success: true,
        title: state.intake.site().form_title().await,
    })
}

async fn update_form_title(
    state: web::Data<AppState>,
    req: web::Json<FormTitleRequest>,
) -> impl Responder {
    match state.intake.site().set_form_title(&req.title).await {
        Ok(()) => HttpResponse::Ok().json(StatusResponse::ok("Form title saved successfully")),
        Err(e) => site_error(e, "Failed to save form title"),
    }
}

/// Check Bloomerang connectivity with the configured key
async fn test_bloomerang(state: web::Data<AppState>) -> impl Responder {
    match state.intake.crm().test_connection().await {
        Ok(api_url) => HttpResponse::Ok().json(CrmTestResponse {
            success: true,
            message: "Successfully connected to Bloomerang CRM".to_string(),
            api_url: api_url.to_string(),
        }),
        Err(e) if e.is_configuration() => {
            HttpResponse::BadRequest().json(StatusResponse::failed(e.to_string()))
        }
        Err(e) => {
            tracing::warn!("Bloomerang connection test failed: {}", e);
            HttpResponse::InternalServerError().json(StatusResponse::failed(e.to_string()))
        }
    }
}
