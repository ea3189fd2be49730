//! Link management endpoints under `{prefix}/shorten`

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Responder, web};
use tracing::trace;

use crate::services::LinkService;

use super::helpers::{error_from_snaplink, json_config, json_response};
use super::types::{LinkResponse, UrlRequest};

pub struct ShortenService;

impl ShortenService {
    pub async fn create_link(
        service: web::Data<LinkService>,
        body: web::Json<UrlRequest>,
    ) -> impl Responder {
        trace!("API: create link for '{}'", body.url);
        match service.create(&body.url).await {
            Ok(record) => json_response(StatusCode::CREATED, &LinkResponse::from(record)),
            Err(e) => error_from_snaplink(&e),
        }
    }

    pub async fn get_link(
        service: web::Data<LinkService>,
        path: web::Path<String>,
    ) -> impl Responder {
        Self::read_record(&service, &path.into_inner()).await
    }

    pub async fn get_stats(
        service: web::Data<LinkService>,
        path: web::Path<String>,
    ) -> impl Responder {
        Self::read_record(&service, &path.into_inner()).await
    }

    // 只读，不计入点击数
    async fn read_record(service: &LinkService, code: &str) -> HttpResponse {
        match service.stats(code).await {
            Ok(record) => json_response(StatusCode::OK, &LinkResponse::from(record)),
            Err(e) => error_from_snaplink(&e),
        }
    }

    pub async fn update_link(
        service: web::Data<LinkService>,
        path: web::Path<String>,
        body: web::Json<UrlRequest>,
    ) -> impl Responder {
        let code = path.into_inner();
        trace!("API: update '{}' -> '{}'", code, body.url);
        match service.update(&code, &body.url).await {
            Ok(record) => json_response(StatusCode::OK, &LinkResponse::from(record)),
            Err(e) => error_from_snaplink(&e),
        }
    }

    pub async fn delete_link(
        service: web::Data<LinkService>,
        path: web::Path<String>,
    ) -> impl Responder {
        match service.remove(&path.into_inner()).await {
            Ok(()) => HttpResponse::NoContent().finish(),
            Err(e) => error_from_snaplink(&e),
        }
    }
}

/// Link routes, mounted under the API prefix
pub fn link_routes() -> actix_web::Scope {
    web::scope("/shorten")
        .app_data(json_config())
        .route("", web::post().to(ShortenService::create_link))
        .route("/{code}", web::get().to(ShortenService::get_link))
        .route("/{code}", web::put().to(ShortenService::update_link))
        .route("/{code}", web::delete().to(ShortenService::delete_link))
        .route("/{code}/stats", web::get().to(ShortenService::get_stats))
}
