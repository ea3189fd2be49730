//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::Result;
use tracing::{info, warn};

use crate::api::middleware::{RequestIdMiddleware, redirect_rate_limit};
use crate::api::services::{RedirectSettings, configure_routes};
use crate::config::{AppConfig, CorsConfig};
use crate::runtime::lifetime;

/// Validate CORS configuration at startup (runs once)
fn validate_cors_config(cors_config: &CorsConfig) {
    if cors_config.enabled && cors_config.allowed_origins.is_empty() {
        warn!(
            "CORS enabled but allowed_origins is empty. \
            No cross-origin requests will be allowed. \
            Set allowed_origins explicitly or use '[\"*\"]' for any origin."
        );
    }
}

/// Build CORS middleware from configuration
fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    // When CORS is disabled, use browser's default same-origin policy (restrictive)
    if !cors_config.enabled {
        return Cors::default();
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "HEAD", "POST", "PUT", "DELETE"])
        .allowed_header("Content-Type")
        .allowed_header("Accept")
        .allowed_header("X-Request-ID")
        .expose_headers(vec!["X-Request-ID"])
        .max_age(cors_config.max_age);

    if cors_config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// Run the HTTP server
///
/// This function:
/// 1. Prepares the store and link service
/// 2. Configures and starts the HTTP server
/// 3. Waits until actix-web's signal handling stops it
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &AppConfig) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let link_service = startup.link_service;
    let app_start_time = startup.app_start_time;

    let api_prefix = config.api.prefix.trim_end_matches('/').to_string();
    let redirect_settings = RedirectSettings::from_config(&config.redirect);
    info!(
        "API mounted at {}, redirects answer with {}",
        api_prefix, redirect_settings.status
    );

    // 限流状态在所有 worker 间共享，必须在 HttpServer::new 之外构建
    let rate_limit = redirect_rate_limit(config.redirect.rate_limit_per_minute)?;
    if rate_limit.is_some() {
        info!(
            "Redirect rate limit: {} requests/min per IP",
            config.redirect.rate_limit_per_minute
        );
    }

    let cors_config = config.cors.clone();
    validate_cors_config(&cors_config);

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    info!("Using {} CPU cores for the server", cpu_count);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(build_cors_middleware(&cors_config))
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("Connection", "keep-alive"))
                    .add(("Keep-Alive", "timeout=30, max=1000")),
            )
            .app_data(web::Data::new(link_service.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::Data::new(redirect_settings))
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .configure(|cfg| configure_routes(cfg, &api_prefix, rate_limit.as_ref()))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .shutdown_timeout(30)
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);

    server.bind(&bind_address)?.run().await?;

    warn!("Server stopped, all workers shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_cors_middleware_variants() {
        let disabled = CorsConfig::default();
        let _ = build_cors_middleware(&disabled);

        let any = CorsConfig {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            max_age: 600,
        };
        let _ = build_cors_middleware(&any);

        let listed = CorsConfig {
            enabled: true,
            allowed_origins: vec!["https://app.example.com".to_string()],
            max_age: 600,
        };
        let _ = build_cors_middleware(&listed);
    }
}
