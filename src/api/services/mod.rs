pub mod health;
mod helpers;
pub mod links;
pub mod redirect;
pub mod types;

use actix_web::web;

use crate::api::middleware::RedirectRateLimit;

pub use health::{AppStartTime, HealthService, health_routes};
pub use helpers::{error_from_snaplink, error_response, json_config};
pub use links::{ShortenService, link_routes};
pub use redirect::{RedirectService, RedirectSettings, redirect_routes};
pub use types::{ErrorResponse, HealthResponse, LinkResponse, UrlRequest};

/// Register every route in matching order: API scope, health, then the `/{code}` catch-all.
///
/// Expects `web::Data<LinkService>`, `web::Data<AppStartTime>` and
/// `web::Data<RedirectSettings>` in app data.
pub fn configure_routes(
    cfg: &mut web::ServiceConfig,
    api_prefix: &str,
    rate_limit: Option<&RedirectRateLimit>,
) {
    cfg.service(web::scope(api_prefix).service(link_routes()))
        .service(health_routes())
        .service(redirect_routes(rate_limit));
}
