use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use donor_intake::config::Settings;
use donor_intake::routes::{self, AppState};
use donor_intake::services::{
    build_mailer, CrmSync, DonationIntake, ReceiptRenderer, RecordStore, SiteStore,
};

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_directive()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::other(format!("{}: {}", context, err))
}

fn log_banner(settings: &Settings, mailer_sender: &str, crm: &CrmSync) {
    let mode = settings.email.email_mode();
    info!("Email mode: {}", mode.label());
    info!(
        "Sender: {}",
        if mailer_sender.is_empty() { "Not configured" } else { mailer_sender }
    );

    if crm.is_enabled() {
        info!("Bloomerang CRM: ENABLED ({})", crm.api_url());
        info!(
            "Bloomerang API key: {}",
            if crm.has_api_key() { "Configured" } else { "Not configured" }
        );
        if !settings.bloomerang.verify_ssl {
            warn!("Bloomerang SSL verification is DISABLED (for local testing only)");
        }
    } else {
        info!("Bloomerang CRM: DISABLED");
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let loaded = Settings::load();
    match &loaded {
        Ok(settings) => init_logging(settings),
        Err(_) => init_logging(&Settings::default()),
    }

    info!("Starting donor intake service...");

    let settings = loaded.map_err(|e| startup_error("Failed to load configuration", e))?;

    info!("Configuration loaded successfully");
    if settings.server.debug {
        warn!("Debug mode is enabled");
    }

    let data_dir = settings.storage.resolved_data_dir();
    let csv_path = if settings.storage.csv_file.is_absolute() {
        settings.storage.csv_file.clone()
    } else {
        data_dir.join(&settings.storage.csv_file)
    };

    let records = Arc::new(RecordStore::new(csv_path));
    records
        .init()
        .map_err(|e| startup_error("Failed to initialize donor file", e))?;

    info!("Donor records stored in {}", records.path().display());

    let mailer = build_mailer(&settings).map_err(|e| startup_error("Failed to build mailer", e))?;

    let crm = Arc::new(
        CrmSync::new(&settings.bloomerang, &settings.matching)
            .map_err(|e| startup_error("Failed to build Bloomerang client", e))?,
    );

    log_banner(&settings, mailer.sender(), &crm);

    let intake = DonationIntake::new(
        records,
        Arc::new(ReceiptRenderer::new(settings.organization.clone())),
        mailer,
        Arc::new(SiteStore::new(data_dir)),
        crm,
    );

    let app_state = AppState {
        intake,
        web_root: settings.storage.web_root.clone(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting HTTP server on {}:{}", host, port);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(routes::json_config())
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    });

    let server = match settings.server.workers {
        Some(workers) => server.workers(workers),
        None => server,
    };

    server.bind((host, port))?.run().await
}
