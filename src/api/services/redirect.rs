use actix_governor::Governor;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::{debug, trace};

use crate::api::middleware::RedirectRateLimit;
use crate::config::RedirectConfig;
use crate::services::LinkService;
use crate::utils::is_valid_short_code;

use super::helpers::{error_from_snaplink, error_response};

/// Status code used for every redirect response
#[derive(Clone, Copy, Debug)]
pub struct RedirectSettings {
    pub status: StatusCode,
}

impl RedirectSettings {
    pub fn from_config(config: &RedirectConfig) -> Self {
        Self {
            status: StatusCode::from_u16(config.status)
                .ok()
                .filter(StatusCode::is_redirection)
                .unwrap_or(StatusCode::TEMPORARY_REDIRECT),
        }
    }
}

impl Default for RedirectSettings {
    fn default() -> Self {
        Self {
            status: StatusCode::TEMPORARY_REDIRECT,
        }
    }
}

pub struct RedirectService;

impl RedirectService {
    pub async fn handle_redirect(
        path: web::Path<String>,
        service: web::Data<LinkService>,
        settings: Option<web::Data<RedirectSettings>>,
    ) -> impl Responder {
        let code = path.into_inner();

        if !is_valid_short_code(&code) {
            // 非法短码，直接 404（不查存储）
            trace!("Invalid short code rejected: {}", code);
            return Self::not_found_response(&code);
        }

        match service.resolve(&code).await {
            Ok(record) => {
                let status = settings
                    .map(|s| s.status)
                    .unwrap_or(StatusCode::TEMPORARY_REDIRECT);
                trace!(
                    "Redirecting '{}' -> '{}' ({})",
                    code, record.destination, status
                );
                HttpResponse::build(status)
                    .insert_header(("Location", record.destination))
                    .insert_header(("Cache-Control", "no-store"))
                    .finish()
            }
            Err(e) if e.is_not_found() => {
                debug!("Redirect link not found: {}", code);
                Self::not_found_response(&code)
            }
            Err(e) => error_from_snaplink(&e),
        }
    }

    fn not_found_response(code: &str) -> HttpResponse {
        error_response(
            StatusCode::NOT_FOUND,
            format!("Short link '{}' not found", code),
        )
    }
}

/// Catch-all `/{code}` routes; register after every other scope.
pub fn redirect_routes(rate_limit: Option<&RedirectRateLimit>) -> actix_web::Scope {
    let get = web::get().to(RedirectService::handle_redirect);
    let head = web::head().to(RedirectService::handle_redirect);

    // GET 与 HEAD 共用同一份配额
    let (get, head) = match rate_limit {
        Some(config) => (
            get.wrap(Governor::new(config)),
            head.wrap(Governor::new(config)),
        ),
        None => (get, head),
    };

    web::scope("").route("/{code}", get).route("/{code}", head)
}
