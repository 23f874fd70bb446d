use actix_files::NamedFile;
use actix_web::{web, HttpRequest, HttpResponse};
use std::path::{Component, Path, PathBuf};

use crate::routes::AppState;

/// Configure page and static asset routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/settings", web::get().to(settings_page))
        .route("/static/{filename:.*}", web::get().to(serve_static));
}

async fn index(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    serve_file(state.web_root.join("index.html"), &req).await
}

async fn settings_page(state: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    serve_file(state.web_root.join("settings.html"), &req).await
}

async fn serve_static(
    state: web::Data<AppState>,
    filename: web::Path<String>,
    req: HttpRequest,
) -> HttpResponse {
    match static_path(&state.web_root, &filename) {
        Some(path) => serve_file(path, &req).await,
        None => {
            tracing::warn!("Rejected static path {:?}", filename.as_str());
            HttpResponse::NotFound().finish()
        }
    }
}

/// Resolve `filename` under `{web_root}/static`, refusing anything but plain segments
pub fn static_path(web_root: &Path, filename: &str) -> Option<PathBuf> {
    let relative = Path::new(filename);
    if filename.is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(web_root.join("static").join(relative))
}

async fn serve_file(path: PathBuf, req: &HttpRequest) -> HttpResponse {
    match NamedFile::open_async(&path).await {
        Ok(file) => file.into_response(req),
        Err(e) => {
            tracing::debug!("Cannot serve {}: {}", path.display(), e);
            HttpResponse::NotFound().finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_path_stays_under_root() {
        let root = Path::new("web");
        assert_eq!(
            static_path(root, "img/logo.png"),
            Some(PathBuf::from("web/static/img/logo.png"))
        );
        assert_eq!(static_path(root, "../config/local.toml"), None);
        assert_eq!(static_path(root, "img/../../secret"), None);
        assert_eq!(static_path(root, "/etc/passwd"), None);
        assert_eq!(static_path(root, ""), None);
    }
}
